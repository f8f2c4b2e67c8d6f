use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::{attendance, customer, employee, invoice, product, stock, task, transaction};
use crate::errors::ServiceError;

/// Flat cost-of-goods-sold ratio used to estimate profit.
const COGS_RATIO: f64 = 0.6;
/// Assumed working days per month for attendance rates.
const WORKING_DAYS_PER_MONTH: f64 = 22.0;
/// Productivity figure under which an employee is flagged.
const LOW_PRODUCTIVITY_THRESHOLD: f64 = 120.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowForecast {
    pub month: String,
    pub projected_income: f64,
    pub projected_expenses: f64,
    pub net_cash_flow: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityInsight {
    pub customer_id: i32,
    pub customer_name: String,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub profit_margin: f64,
    pub order_count: usize,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiAnalysis {
    pub revenue_growth: f64,
    pub expense_growth: f64,
    pub profit_margin: f64,
    pub customer_retention_rate: f64,
    pub employee_productivity: f64,
    pub inventory_turnover: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePerformance {
    pub employee_id: i32,
    pub employee_name: String,
    pub total_hours: f64,
    pub attendance_rate: f64,
    pub pending_tasks: usize,
    pub productivity: f64,
    pub department: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: i32,
    pub name: String,
    pub current_stock: i64,
    pub threshold: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInsights {
    pub total_products: usize,
    pub low_stock_products: usize,
    pub out_of_stock_products: usize,
    pub total_inventory_value: f64,
    pub low_stock_items: Vec<LowStockItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub rec_type: &'static str,
    pub priority: &'static str,
    pub title: &'static str,
    pub description: String,
    pub action: &'static str,
    pub impact: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub metric: String,
    pub data: Vec<TrendPoint>,
    pub trend: f64,
    pub trend_direction: &'static str,
}

/// Fixed seasonal multipliers per calendar month (1 = January).
pub fn seasonal_factor(month: u32) -> f64 {
    match month {
        1 => 0.9,
        2 => 0.85,
        3 => 1.0,
        4 => 1.1,
        5 => 1.15,
        6 => 1.2,
        7 => 1.1,
        8 => 1.05,
        9 => 1.0,
        10 => 1.1,
        11 => 1.2,
        12 => 1.3,
        _ => 1.0,
    }
}

/// Flat 2% growth per forecast step.
pub fn growth_factor(step: u32) -> f64 {
    1.0 + (step as f64 * 0.02)
}

/// Starts at 1.0, drops 0.1 per future month, floored at 0.5.
pub fn forecast_confidence(step: u32) -> f64 {
    (1.0 - step as f64 * 0.1).max(0.5)
}

/// Month-over-month percentage change; 0 when the baseline is 0.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

pub fn trend_direction(trend: f64) -> &'static str {
    if trend > 0.0 {
        "up"
    } else if trend < 0.0 {
        "down"
    } else {
        "stable"
    }
}

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn month_window(first: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = first
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(first)
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(start);
    (start, next)
}

/// Derived analytics over the operational data: forecasts, KPIs,
/// per-entity insights and canned recommendations.
pub struct InsightsService {
    db: Arc<DbPool>,
}

impl InsightsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Projects income/expenses forward from the last six months of
    /// transactions, applying seasonal and growth multipliers.
    #[instrument(skip(self))]
    pub async fn cash_flow_forecast(
        &self,
        months: u32,
    ) -> Result<Vec<CashFlowForecast>, ServiceError> {
        let today = Utc::now().date_naive();
        let history_start = first_of_month(today)
            .checked_sub_months(Months::new(6))
            .unwrap_or(today);
        let (history_start_dt, _) = month_window(history_start);

        let history = transaction::Entity::find()
            .filter(transaction::Column::Date.gte(history_start_dt))
            .all(&*self.db)
            .await?;

        let mut by_month: HashMap<String, (f64, f64)> = HashMap::new();
        for tx in &history {
            let entry = by_month
                .entry(month_key(tx.date.date_naive()))
                .or_insert((0.0, 0.0));
            if tx.transaction_type == "income" {
                entry.0 += tx.amount;
            } else {
                entry.1 += tx.amount;
            }
        }

        let month_count = by_month.len() as f64;
        let (avg_income, avg_expenses) = if month_count > 0.0 {
            let income: f64 = by_month.values().map(|v| v.0).sum();
            let expenses: f64 = by_month.values().map(|v| v.1).sum();
            (income / month_count, expenses / month_count)
        } else {
            (0.0, 0.0)
        };

        let mut forecast = Vec::with_capacity(months as usize);
        for i in 1..=months {
            let target = first_of_month(today)
                .checked_add_months(Months::new(i))
                .unwrap_or(today);

            let growth = growth_factor(i);
            let projected_income = avg_income * seasonal_factor(target.month()) * growth;
            let projected_expenses = avg_expenses * growth;

            forecast.push(CashFlowForecast {
                month: month_key(target),
                projected_income,
                projected_expenses,
                net_cash_flow: projected_income - projected_expenses,
                confidence: forecast_confidence(i),
            });
        }

        Ok(forecast)
    }

    /// Ranks customers by estimated profit margin over their paid invoices.
    /// An invoice counts as paid when its status is "paid" or it has at
    /// least one linked transaction.
    #[instrument(skip(self))]
    pub async fn most_profitable_customers(
        &self,
        limit: usize,
    ) -> Result<Vec<ProfitabilityInsight>, ServiceError> {
        let customers = customer::Entity::find().all(&*self.db).await?;
        let mut insights = Vec::with_capacity(customers.len());

        for cust in customers {
            let invoices = invoice::Entity::find()
                .filter(invoice::Column::CustomerId.eq(cust.id))
                .all(&*self.db)
                .await?;

            let mut total_revenue = 0.0;
            let mut order_count = 0usize;
            for inv in &invoices {
                let paid = if inv.status == "paid" {
                    true
                } else {
                    transaction::Entity::find()
                        .filter(transaction::Column::InvoiceId.eq(inv.id))
                        .one(&*self.db)
                        .await?
                        .is_some()
                };
                if paid {
                    total_revenue += inv.amount;
                    order_count += 1;
                }
            }

            let total_profit = total_revenue * (1.0 - COGS_RATIO);
            let profit_margin = if total_revenue > 0.0 {
                total_profit / total_revenue * 100.0
            } else {
                0.0
            };
            let average_order_value = if order_count > 0 {
                total_revenue / order_count as f64
            } else {
                0.0
            };

            insights.push(ProfitabilityInsight {
                customer_id: cust.id,
                customer_name: cust.name,
                total_revenue,
                total_profit,
                profit_margin,
                order_count,
                average_order_value,
            });
        }

        insights.sort_by(|a, b| {
            b.profit_margin
                .partial_cmp(&a.profit_margin)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        insights.truncate(limit);
        Ok(insights)
    }

    #[instrument(skip(self))]
    pub async fn kpi_analysis(&self) -> Result<KpiAnalysis, ServiceError> {
        let today = Utc::now().date_naive();
        let current = first_of_month(today);
        let last = current.checked_sub_months(Months::new(1)).unwrap_or(current);

        let current_revenue = self.monthly_total(current, "income").await?;
        let last_revenue = self.monthly_total(last, "income").await?;
        let current_expenses = self.monthly_total(current, "expense").await?;
        let last_expenses = self.monthly_total(last, "expense").await?;

        let total_revenue = self.type_total("income").await?;
        let total_expenses = self.type_total("expense").await?;
        let profit_margin = if total_revenue > 0.0 {
            (total_revenue - total_expenses) / total_revenue * 100.0
        } else {
            0.0
        };

        Ok(KpiAnalysis {
            revenue_growth: percent_change(current_revenue, last_revenue),
            expense_growth: percent_change(current_expenses, last_expenses),
            profit_margin,
            customer_retention_rate: self.customer_retention_rate().await?,
            employee_productivity: self.average_employee_hours().await?,
            inventory_turnover: self.inventory_turnover(current_revenue).await?,
        })
    }

    /// Per-employee hours, attendance rate (22-working-day denominator) and
    /// pending task load since the start of the prior month.
    #[instrument(skip(self))]
    pub async fn employee_performance(&self) -> Result<Vec<EmployeePerformance>, ServiceError> {
        let window_start = self.prior_month_start();
        let employees = employee::Entity::find().all(&*self.db).await?;
        let mut out = Vec::with_capacity(employees.len());

        for emp in employees {
            let attendances = attendance::Entity::find()
                .filter(attendance::Column::EmployeeId.eq(emp.id))
                .filter(attendance::Column::Date.gte(window_start))
                .all(&*self.db)
                .await?;

            let total_hours: f64 = attendances.iter().filter_map(|a| a.hours_worked).sum();
            let attendance_rate = attendances.len() as f64 / WORKING_DAYS_PER_MONTH;

            let pending_tasks = task::Entity::find()
                .filter(task::Column::AssignedToId.eq(emp.id))
                .filter(task::Column::Status.ne("completed"))
                .all(&*self.db)
                .await?
                .len();

            out.push(EmployeePerformance {
                employee_id: emp.id,
                employee_name: emp.full_name(),
                total_hours,
                attendance_rate: attendance_rate * 100.0,
                pending_tasks,
                productivity: total_hours * attendance_rate,
                department: emp.department_id,
            });
        }

        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn inventory_insights(&self) -> Result<InventoryInsights, ServiceError> {
        let products = product::Entity::find().all(&*self.db).await?;

        let mut low_stock_items = Vec::new();
        let mut out_of_stock = 0usize;
        let mut total_value = 0.0;

        for prod in &products {
            let total = self.total_stock(prod.id).await?;
            total_value += total as f64 * prod.cost.unwrap_or(prod.price * COGS_RATIO);

            if total == 0 {
                out_of_stock += 1;
            }
            if total <= prod.low_stock_threshold as i64 {
                low_stock_items.push(LowStockItem {
                    id: prod.id,
                    name: prod.name.clone(),
                    current_stock: total,
                    threshold: prod.low_stock_threshold,
                });
            }
        }

        Ok(InventoryInsights {
            total_products: products.len(),
            low_stock_products: low_stock_items.len(),
            out_of_stock_products: out_of_stock,
            total_inventory_value: total_value,
            low_stock_items,
        })
    }

    /// Fixed recommendation rules over inventory, receivables, productivity
    /// and customer activity.
    #[instrument(skip(self))]
    pub async fn recommendations(&self) -> Result<Vec<Recommendation>, ServiceError> {
        let mut recommendations = Vec::new();

        let inventory = self.inventory_insights().await?;
        if inventory.low_stock_products > 0 {
            recommendations.push(Recommendation {
                rec_type: "inventory",
                priority: "high",
                title: "Low Stock Alert",
                description: format!(
                    "{} products are running low on stock",
                    inventory.low_stock_products
                ),
                action: "Review inventory levels and reorder if necessary",
                impact: "Prevent stockouts and maintain customer satisfaction",
            });
        }

        let overdue = invoice::Entity::find()
            .filter(invoice::Column::DueDate.lt(Utc::now()))
            .filter(invoice::Column::Status.ne("paid"))
            .all(&*self.db)
            .await?;
        if !overdue.is_empty() {
            recommendations.push(Recommendation {
                rec_type: "finance",
                priority: "high",
                title: "Overdue Invoices",
                description: format!("{} invoices are overdue", overdue.len()),
                action: "Follow up with customers for payment",
                impact: "Improve cash flow and reduce outstanding receivables",
            });
        }

        let performance = self.employee_performance().await?;
        let low_productivity = performance
            .iter()
            .filter(|p| p.productivity < LOW_PRODUCTIVITY_THRESHOLD)
            .count();
        if low_productivity > 0 {
            recommendations.push(Recommendation {
                rec_type: "hr",
                priority: "medium",
                title: "Employee Productivity",
                description: format!("{} employees have low productivity", low_productivity),
                action: "Review workload distribution and provide support",
                impact: "Improve team efficiency and employee satisfaction",
            });
        }

        let cutoff = Utc::now() - Duration::days(90);
        let customers = customer::Entity::find().all(&*self.db).await?;
        let mut inactive = 0usize;
        for cust in &customers {
            let invoices = invoice::Entity::find()
                .filter(invoice::Column::CustomerId.eq(cust.id))
                .all(&*self.db)
                .await?;
            if let Some(latest) = invoices.iter().map(|i| i.date).max() {
                if latest < cutoff {
                    inactive += 1;
                }
            }
        }
        if inactive > 0 {
            recommendations.push(Recommendation {
                rec_type: "crm",
                priority: "medium",
                title: "Customer Retention",
                description: format!("{} customers haven't placed orders in 90+ days", inactive),
                action: "Reach out to inactive customers with special offers",
                impact: "Increase customer retention and revenue",
            });
        }

        Ok(recommendations)
    }

    /// Six-month series for revenue, expenses, profit or customer signups,
    /// with the trend computed recent-3-average versus oldest-3-average.
    #[instrument(skip(self))]
    pub async fn trend_analysis(&self, metric: &str) -> Result<TrendAnalysis, ServiceError> {
        let today = Utc::now().date_naive();
        let current = first_of_month(today);
        let mut data = Vec::with_capacity(6);

        for i in (0..6).rev() {
            let month_start = current.checked_sub_months(Months::new(i)).unwrap_or(current);
            let value = match metric {
                "revenue" => self.monthly_total(month_start, "income").await?,
                "expenses" => self.monthly_total(month_start, "expense").await?,
                "profit" => {
                    self.monthly_total(month_start, "income").await?
                        - self.monthly_total(month_start, "expense").await?
                }
                "customers" => {
                    let (start, next) = month_window(month_start);
                    customer::Entity::find()
                        .filter(customer::Column::CreatedAt.gte(start))
                        .filter(customer::Column::CreatedAt.lt(next))
                        .all(&*self.db)
                        .await?
                        .len() as f64
                }
                _ => 0.0,
            };

            data.push(TrendPoint {
                month: month_key(month_start),
                value,
            });
        }

        let recent_avg = data.iter().rev().take(3).map(|p| p.value).sum::<f64>() / 3.0;
        let older_avg = data.iter().take(3).map(|p| p.value).sum::<f64>() / 3.0;
        let trend = percent_change(recent_avg, older_avg);

        Ok(TrendAnalysis {
            metric: metric.to_string(),
            data,
            trend,
            trend_direction: trend_direction(trend),
        })
    }

    fn prior_month_start(&self) -> NaiveDate {
        let today = Utc::now().date_naive();
        first_of_month(today)
            .checked_sub_months(Months::new(1))
            .unwrap_or(today)
    }

    async fn monthly_total(
        &self,
        month_start: NaiveDate,
        tx_type: &str,
    ) -> Result<f64, ServiceError> {
        let (start, next) = month_window(month_start);
        let rows = transaction::Entity::find()
            .filter(transaction::Column::TransactionType.eq(tx_type))
            .filter(transaction::Column::Date.gte(start))
            .filter(transaction::Column::Date.lt(next))
            .all(&*self.db)
            .await?;
        Ok(rows.iter().map(|t| t.amount).sum())
    }

    async fn type_total(&self, tx_type: &str) -> Result<f64, ServiceError> {
        let rows = transaction::Entity::find()
            .filter(transaction::Column::TransactionType.eq(tx_type))
            .all(&*self.db)
            .await?;
        Ok(rows.iter().map(|t| t.amount).sum())
    }

    async fn customer_retention_rate(&self) -> Result<f64, ServiceError> {
        let customers = customer::Entity::find().all(&*self.db).await?;
        if customers.is_empty() {
            return Ok(0.0);
        }

        let mut repeat = 0usize;
        for cust in &customers {
            let count = invoice::Entity::find()
                .filter(invoice::Column::CustomerId.eq(cust.id))
                .all(&*self.db)
                .await?
                .len();
            if count > 1 {
                repeat += 1;
            }
        }
        Ok(repeat as f64 / customers.len() as f64 * 100.0)
    }

    async fn average_employee_hours(&self) -> Result<f64, ServiceError> {
        let window_start = self.prior_month_start();
        let employees = employee::Entity::find().all(&*self.db).await?;
        if employees.is_empty() {
            return Ok(0.0);
        }

        let mut total_hours = 0.0;
        for emp in &employees {
            let attendances = attendance::Entity::find()
                .filter(attendance::Column::EmployeeId.eq(emp.id))
                .filter(attendance::Column::Date.gte(window_start))
                .all(&*self.db)
                .await?;
            total_hours += attendances.iter().filter_map(|a| a.hours_worked).sum::<f64>();
        }
        Ok(total_hours / employees.len() as f64)
    }

    async fn inventory_turnover(&self, monthly_revenue: f64) -> Result<f64, ServiceError> {
        let products = product::Entity::find().all(&*self.db).await?;
        let mut total_value = 0.0;
        for prod in &products {
            let total = self.total_stock(prod.id).await?;
            total_value += total as f64 * prod.cost.unwrap_or(prod.price * COGS_RATIO);
        }
        Ok(if total_value > 0.0 {
            monthly_revenue / total_value
        } else {
            0.0
        })
    }

    async fn total_stock(&self, product_id: i32) -> Result<i64, ServiceError> {
        let levels = stock::Entity::find()
            .filter(stock::Column::ProductId.eq(product_id))
            .all(&*self.db)
            .await?;
        Ok(levels.iter().map(|s| s.quantity as i64).sum())
    }
}
