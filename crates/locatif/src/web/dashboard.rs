//! Home page and statistics page.

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Serialize;

use super::{AppError, AppState, NoticeQuery};
use crate::model::{Amount, Payment};
use crate::stats::{Dashboard, MonthlyRevenue, PropertyRevenue, Statistics};

/// Payments listed under the figures.
const RECENT_PAYMENTS: usize = 5;

#[derive(Serialize)]
struct RecentPayment {
    #[serde(flatten)]
    payment: Payment,
    tenant_name: String,
}

#[derive(Serialize)]
struct DashboardPage {
    #[serde(flatten)]
    dashboard: Dashboard,
    occupancy_percent: u32,
    period_label: String,
    recent: Vec<RecentPayment>,
}

pub(super) async fn index(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let today = state.today();
    let (dashboard, recent) = state
        .with_storage(move |storage| {
            let dashboard = Dashboard::compute(storage, today)?;
            let mut recent = Vec::new();
            for payment in storage.recent_payments(RECENT_PAYMENTS)? {
                let tenant_name = storage
                    .get_tenant(payment.tenant_id)?
                    .map(|t| t.display_name())
                    .unwrap_or_default();
                recent.push(RecentPayment {
                    payment,
                    tenant_name,
                });
            }
            Ok((dashboard, recent))
        })
        .await?;

    let page = DashboardPage {
        occupancy_percent: dashboard.occupancy_percent(),
        period_label: dashboard.month.label(),
        dashboard,
        recent,
    };
    Ok(Html(state.views().page(
        "dashboard",
        "Tableau de bord",
        query.code(),
        &page,
    )?))
}

/// One bar of the revenue chart.
#[derive(Serialize)]
struct Bar<'a> {
    #[serde(flatten)]
    revenue: &'a MonthlyRevenue,
    /// Bar length relative to the best month, in percent.
    width: i64,
}

#[derive(Serialize)]
struct StatisticsPage<'a> {
    bars: Vec<Bar<'a>>,
    period_total: Amount,
    properties: &'a [PropertyRevenue],
}

pub(super) async fn statistics(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let today = state.today();
    let stats = state
        .with_storage(move |storage| Statistics::compute(storage, today))
        .await?;

    let max = stats.max_monthly().cents();
    let bars = stats
        .monthly
        .iter()
        .map(|revenue| Bar {
            revenue,
            width: if max == 0 {
                0
            } else {
                revenue.total.cents().saturating_mul(100) / max
            },
        })
        .collect();
    let page = StatisticsPage {
        bars,
        period_total: stats.period_total,
        properties: &stats.properties,
    };
    Ok(Html(state.views().page(
        "statistics",
        "Statistiques",
        None,
        &page,
    )?))
}
