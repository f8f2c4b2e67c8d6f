use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::collections::HashMap;

use super::common::{fmt_date, fmt_naive_date, month_label, month_start_ago, month_window, total_stock};
use crate::entities::{
    attendance, customer, department, employee, invoice, payroll, product, project, stock, task,
    transaction, warehouse,
};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardSummary {
    employees: u64,
    customers: u64,
    projects: u64,
    products: u64,
    revenue: f64,
    expenses: f64,
    profit: f64,
    profit_margin: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentEmployee {
    id: i32,
    name: String,
    department: String,
    date: String,
    #[serde(rename = "type")]
    activity_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentProject {
    id: i32,
    name: String,
    customer: String,
    date: String,
    #[serde(rename = "type")]
    activity_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentTransaction {
    id: i32,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: String,
    description: String,
    date: String,
    customer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentActivities {
    employees: Vec<RecentEmployee>,
    projects: Vec<RecentProject>,
    transactions: Vec<RecentTransaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyFigures {
    month: String,
    revenue: f64,
    expenses: f64,
    profit: f64,
    profit_margin: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerRevenue {
    customer: String,
    revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyExpense {
    month: String,
    expenses: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyMargin {
    month: String,
    profit_margin: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StockAlert {
    id: i32,
    name: String,
    current_stock: i64,
    threshold: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpcomingTask {
    id: i32,
    name: String,
    project: String,
    assigned_to: String,
    status: String,
    due_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardReport {
    summary: DashboardSummary,
    recent_activities: RecentActivities,
    monthly_data: Vec<MonthlyFigures>,
    customer_revenue_data: Vec<CustomerRevenue>,
    expense_breakdown: Vec<MonthlyExpense>,
    profit_margin_trends: Vec<MonthlyMargin>,
    stock_alerts: Vec<StockAlert>,
    upcoming_tasks: Vec<UpcomingTask>,
}

/// Single-call overview powering the landing dashboard: entity counts,
/// totals, 12-month series and a handful of recent rows.
async fn dashboard_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let db = &*state.db;

    let employee_count = employee::Entity::find().count(db).await?;
    let customer_count = customer::Entity::find().count(db).await?;
    let project_count = project::Entity::find().count(db).await?;
    let product_count = product::Entity::find().count(db).await?;

    let transactions = transaction::Entity::find().all(db).await?;
    let revenue: f64 = transactions
        .iter()
        .filter(|t| t.transaction_type == "income")
        .map(|t| t.amount)
        .sum();
    let expenses: f64 = transactions
        .iter()
        .filter(|t| t.transaction_type == "expense")
        .map(|t| t.amount)
        .sum();
    let profit = revenue - expenses;

    let departments: HashMap<i32, String> = department::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();
    let recent_employees = employee::Entity::find()
        .order_by_desc(employee::Column::CreatedAt)
        .limit(5)
        .all(db)
        .await?
        .into_iter()
        .map(|emp| RecentEmployee {
            id: emp.id,
            name: emp.full_name(),
            department: departments.get(&emp.department_id).cloned().unwrap_or_default(),
            date: fmt_date(emp.created_at),
            activity_type: "employee_added",
        })
        .collect();

    let customer_names: HashMap<i32, String> = customer::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let recent_projects = project::Entity::find()
        .order_by_desc(project::Column::Id)
        .limit(5)
        .all(db)
        .await?
        .into_iter()
        .map(|proj| RecentProject {
            id: proj.id,
            name: proj.name,
            customer: customer_names
                .get(&proj.customer_id)
                .cloned()
                .unwrap_or_default(),
            date: fmt_naive_date(Utc::now().date_naive()),
            activity_type: "project_created",
        })
        .collect();

    let invoices = invoice::Entity::find().all(db).await?;
    let invoice_customers: HashMap<i32, i32> =
        invoices.iter().map(|inv| (inv.id, inv.customer_id)).collect();

    let recent_transactions = transaction::Entity::find()
        .order_by_desc(transaction::Column::Date)
        .limit(5)
        .all(db)
        .await?
        .into_iter()
        .map(|tx| {
            let customer = tx
                .invoice_id
                .and_then(|inv_id| invoice_customers.get(&inv_id))
                .and_then(|cust_id| customer_names.get(cust_id))
                .cloned()
                .unwrap_or_else(|| "N/A".to_string());
            RecentTransaction {
                id: tx.id,
                amount: tx.amount,
                description: match tx.invoice_id {
                    Some(inv_id) => format!("Invoice #{}", inv_id),
                    None => "Manual transaction".to_string(),
                },
                transaction_type: tx.transaction_type,
                date: fmt_date(tx.date),
                customer,
            }
        })
        .collect();

    let mut monthly_data = Vec::with_capacity(12);
    for offset in (0..12).rev() {
        let month_start = month_start_ago(offset);
        let (start, next) = month_window(month_start);

        let month_revenue: f64 = transactions
            .iter()
            .filter(|t| t.transaction_type == "income" && t.date >= start && t.date < next)
            .map(|t| t.amount)
            .sum();
        let month_expenses: f64 = transactions
            .iter()
            .filter(|t| t.transaction_type == "expense" && t.date >= start && t.date < next)
            .map(|t| t.amount)
            .sum();
        let month_profit = month_revenue - month_expenses;

        monthly_data.push(MonthlyFigures {
            month: month_label(month_start),
            revenue: month_revenue,
            expenses: month_expenses,
            profit: month_profit,
            profit_margin: if month_revenue > 0.0 {
                month_profit / month_revenue * 100.0
            } else {
                0.0
            },
        });
    }

    // Top customers by income booked against their invoices
    let mut revenue_by_customer: HashMap<String, f64> = HashMap::new();
    for tx in transactions.iter().filter(|t| t.transaction_type == "income") {
        let name = tx
            .invoice_id
            .and_then(|inv_id| invoice_customers.get(&inv_id))
            .and_then(|cust_id| customer_names.get(cust_id))
            .cloned()
            .unwrap_or_else(|| "Direct Sales".to_string());
        *revenue_by_customer.entry(name).or_insert(0.0) += tx.amount;
    }
    let mut customer_revenue_data: Vec<CustomerRevenue> = revenue_by_customer
        .into_iter()
        .map(|(customer, revenue)| CustomerRevenue { customer, revenue })
        .collect();
    customer_revenue_data.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    customer_revenue_data.truncate(5);

    let expense_breakdown = monthly_data
        .iter()
        .map(|m| MonthlyExpense {
            month: m.month.clone(),
            expenses: m.expenses,
        })
        .collect();
    let profit_margin_trends = monthly_data
        .iter()
        .map(|m| MonthlyMargin {
            month: m.month.clone(),
            profit_margin: m.profit_margin,
        })
        .collect();

    let mut stock_alerts = Vec::new();
    for prod in product::Entity::find().all(db).await? {
        let current = total_stock(db, prod.id).await?;
        if current <= 10 {
            stock_alerts.push(StockAlert {
                id: prod.id,
                name: prod.name,
                current_stock: current,
                threshold: 10,
            });
        }
    }
    stock_alerts.truncate(5);

    let project_names: HashMap<i32, String> = project::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let employee_names: HashMap<i32, String> = employee::Entity::find()
        .all(db)
        .await?
        .iter()
        .map(|e| (e.id, e.full_name()))
        .collect();
    let upcoming_tasks = task::Entity::find()
        .order_by_desc(task::Column::Id)
        .limit(5)
        .all(db)
        .await?
        .into_iter()
        .map(|t| UpcomingTask {
            id: t.id,
            project: project_names.get(&t.project_id).cloned().unwrap_or_default(),
            assigned_to: t
                .assigned_to_id
                .and_then(|id| employee_names.get(&id).cloned())
                .unwrap_or_else(|| "Unassigned".to_string()),
            name: t.name,
            status: t.status,
            due_date: t
                .due_date
                .map(fmt_date)
                .unwrap_or_else(|| fmt_naive_date(Utc::now().date_naive())),
        })
        .collect();

    Ok(Json(DashboardReport {
        summary: DashboardSummary {
            employees: employee_count,
            customers: customer_count,
            projects: project_count,
            products: product_count,
            revenue,
            expenses,
            profit,
            profit_margin: if revenue > 0.0 { profit / revenue * 100.0 } else { 0.0 },
        },
        recent_activities: RecentActivities {
            employees: recent_employees,
            projects: recent_projects,
            transactions: recent_transactions,
        },
        monthly_data,
        customer_revenue_data,
        expense_breakdown,
        profit_margin_trends,
        stock_alerts,
        upcoming_tasks,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeReportRow {
    id: i32,
    name: String,
    email: String,
    department: String,
    hire_date: String,
    attendance: usize,
    total_payroll: f64,
    status: String,
}

async fn employee_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let db = &*state.db;
    let departments: HashMap<i32, String> = department::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();

    let employees = employee::Entity::find().all(db).await?;
    let mut report = Vec::with_capacity(employees.len());
    for emp in employees {
        let attendance_count = attendance::Entity::find()
            .filter(attendance::Column::EmployeeId.eq(emp.id))
            .all(db)
            .await?
            .len();
        let total_payroll: f64 = payroll::Entity::find()
            .filter(payroll::Column::EmployeeId.eq(emp.id))
            .all(db)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();

        report.push(EmployeeReportRow {
            id: emp.id,
            name: emp.full_name(),
            email: emp.email,
            department: departments.get(&emp.department_id).cloned().unwrap_or_default(),
            hire_date: fmt_naive_date(emp.hire_date),
            attendance: attendance_count,
            total_payroll,
            status: emp.status,
        });
    }
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FinancialSummaryRow {
    total_revenue: f64,
    total_expenses: f64,
    net_profit: f64,
    pending_invoices: usize,
    total_pending: f64,
    transaction_count: usize,
}

#[derive(Debug, Serialize)]
struct FinancialMonthRow {
    month: String,
    income: f64,
    expenses: f64,
    profit: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FinancialTransactionRow {
    id: i32,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: String,
    date: String,
    description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FinancialReport {
    summary: FinancialSummaryRow,
    monthly_data: Vec<FinancialMonthRow>,
    recent_transactions: Vec<FinancialTransactionRow>,
}

async fn financial_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let db = &*state.db;
    let transactions = transaction::Entity::find()
        .order_by_desc(transaction::Column::Date)
        .all(db)
        .await?;
    let invoices = invoice::Entity::find().all(db).await?;

    let total_revenue: f64 = transactions
        .iter()
        .filter(|t| t.transaction_type == "income")
        .map(|t| t.amount)
        .sum();
    let total_expenses: f64 = transactions
        .iter()
        .filter(|t| t.transaction_type == "expense")
        .map(|t| t.amount)
        .sum();

    let pending: Vec<&invoice::Model> =
        invoices.iter().filter(|inv| inv.status == "pending").collect();
    let total_pending: f64 = pending.iter().map(|inv| inv.amount).sum();

    let mut monthly_data = Vec::with_capacity(12);
    for offset in (0..12).rev() {
        let month_start = month_start_ago(offset);
        let (start, next) = month_window(month_start);

        let income: f64 = transactions
            .iter()
            .filter(|t| t.transaction_type == "income" && t.date >= start && t.date < next)
            .map(|t| t.amount)
            .sum();
        let expenses: f64 = transactions
            .iter()
            .filter(|t| t.transaction_type == "expense" && t.date >= start && t.date < next)
            .map(|t| t.amount)
            .sum();

        monthly_data.push(FinancialMonthRow {
            month: month_label(month_start),
            income,
            expenses,
            profit: income - expenses,
        });
    }

    let recent_transactions = transactions
        .iter()
        .take(10)
        .map(|t| FinancialTransactionRow {
            id: t.id,
            amount: t.amount,
            transaction_type: t.transaction_type.clone(),
            date: fmt_date(t.date),
            description: match t.invoice_id {
                Some(inv_id) => format!("Invoice #{}", inv_id),
                None => "Manual transaction".to_string(),
            },
        })
        .collect();

    Ok(Json(FinancialReport {
        summary: FinancialSummaryRow {
            total_revenue,
            total_expenses,
            net_profit: total_revenue - total_expenses,
            pending_invoices: pending.len(),
            total_pending,
            transaction_count: transactions.len(),
        },
        monthly_data,
        recent_transactions,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WarehouseStock {
    name: String,
    quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InventoryReportRow {
    id: i32,
    name: String,
    sku: String,
    price: f64,
    stock: i64,
    value: f64,
    status: String,
    warehouses: Vec<WarehouseStock>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InventoryReportSummary {
    total_products: usize,
    total_stock: i64,
    total_value: f64,
    low_stock: usize,
}

#[derive(Debug, Serialize)]
struct InventoryReport {
    summary: InventoryReportSummary,
    products: Vec<InventoryReportRow>,
}

async fn inventory_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let db = &*state.db;
    let warehouses: HashMap<i32, String> = warehouse::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|w| (w.id, w.name))
        .collect();

    let products = product::Entity::find().all(db).await?;
    let mut rows = Vec::with_capacity(products.len());
    for prod in products {
        let levels = stock::Entity::find()
            .filter(stock::Column::ProductId.eq(prod.id))
            .all(db)
            .await?;
        let stock_total: i64 = levels.iter().map(|s| s.quantity as i64).sum();

        rows.push(InventoryReportRow {
            id: prod.id,
            name: prod.name,
            sku: prod.sku,
            price: prod.price,
            stock: stock_total,
            value: stock_total as f64 * prod.price,
            status: if stock_total > 0 { "in-stock" } else { "out-of-stock" }.to_string(),
            warehouses: levels
                .iter()
                .map(|s| WarehouseStock {
                    name: warehouses.get(&s.warehouse_id).cloned().unwrap_or_default(),
                    quantity: s.quantity,
                })
                .collect(),
        });
    }

    let summary = InventoryReportSummary {
        total_products: rows.len(),
        total_stock: rows.iter().map(|r| r.stock).sum(),
        total_value: rows.iter().map(|r| r.value).sum(),
        low_stock: rows.iter().filter(|r| r.stock <= 10).count(),
    };
    Ok(Json(InventoryReport {
        summary,
        products: rows,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerReportRow {
    id: i32,
    name: String,
    email: String,
    phone: String,
    total_projects: usize,
    total_revenue: f64,
    total_invoices: usize,
    last_project: String,
    status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerReportSummary {
    total_customers: usize,
    active_customers: usize,
    total_revenue: f64,
    average_revenue: f64,
}

#[derive(Debug, Serialize)]
struct CustomerReport {
    summary: CustomerReportSummary,
    customers: Vec<CustomerReportRow>,
}

async fn customer_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let db = &*state.db;
    let customers = customer::Entity::find().all(db).await?;

    let mut rows = Vec::with_capacity(customers.len());
    let mut active = 0usize;
    for cust in &customers {
        let projects = project::Entity::find()
            .filter(project::Column::CustomerId.eq(cust.id))
            .all(db)
            .await?;
        let invoices = invoice::Entity::find()
            .filter(invoice::Column::CustomerId.eq(cust.id))
            .all(db)
            .await?;

        if !projects.is_empty() {
            active += 1;
        }
        rows.push(CustomerReportRow {
            id: cust.id,
            name: cust.name.clone(),
            email: cust.email.clone(),
            phone: cust.phone.clone().unwrap_or_default(),
            total_projects: projects.len(),
            total_revenue: invoices.iter().map(|i| i.amount).sum(),
            total_invoices: invoices.len(),
            last_project: projects
                .last()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "None".to_string()),
            status: if projects.is_empty() { "prospect" } else { "active" }.to_string(),
        });
    }

    let total_revenue: f64 = rows.iter().map(|r| r.total_revenue).sum();
    let summary = CustomerReportSummary {
        total_customers: customers.len(),
        active_customers: active,
        total_revenue,
        average_revenue: if customers.is_empty() {
            0.0
        } else {
            total_revenue / customers.len() as f64
        },
    };
    Ok(Json(CustomerReport {
        summary,
        customers: rows,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_report))
        .route("/employees", get(employee_report))
        .route("/financial", get(financial_report))
        .route("/inventory", get(inventory_report))
        .route("/customers", get(customer_report))
}
