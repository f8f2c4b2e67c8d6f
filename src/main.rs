use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use bizcore_api::auth::AuthService;
use bizcore_api::config::{init_tracing, load_config};
use bizcore_api::db;
use bizcore_api::handlers::AppServices;
use bizcore_api::services::email::{MailTransport, SmtpMailer};
use bizcore_api::services::scheduler::RuleScheduler;
use bizcore_api::{app_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_config()?;
    init_tracing(&cfg.log_level, cfg.log_json);
    info!(environment = %cfg.environment, "Starting bizcore-api");

    let db = Arc::new(db::establish_connection_from_app_config(&cfg).await?);
    if cfg.auto_migrate {
        db::run_migrations(&db).await?;
        info!("Database migrations applied");
    }

    let mailer: Arc<dyn MailTransport> = Arc::new(SmtpMailer::new(&cfg.smtp)?);
    let services = AppServices::new(db.clone(), mailer);

    // Built-in templates are reset to their defaults on every start
    services.email.ensure_builtin_templates().await?;
    info!("Built-in email templates seeded");

    let auth = Arc::new(AuthService::new(&cfg.jwt_secret, cfg.jwt_expiration));

    let mut scheduler = None;
    if cfg.scheduler_enabled {
        let rule_scheduler = RuleScheduler::new(services.automation.clone()).await?;
        rule_scheduler.register_rules().await?;
        rule_scheduler.start().await?;
        scheduler = Some(rule_scheduler);
    } else {
        warn!("Automation scheduler disabled by configuration");
    }

    let cors_layer = match &cfg.cors_origin {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                error!(origin, "Invalid CORS origin, falling back to permissive");
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    };

    let state = AppState {
        db,
        config: cfg.clone(),
        services,
        auth,
    };

    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer);

    let addr = SocketAddr::new(cfg.host.parse()?, cfg.port);
    info!("bizcore-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(mut rule_scheduler) = scheduler {
        if let Err(e) = rule_scheduler.shutdown().await {
            error!(error = %e, "Scheduler shutdown failed");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
