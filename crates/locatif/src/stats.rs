//! Dashboard and statistics figures.
//!
//! Everything here is recomputed from storage on each call and takes the
//! current date as a parameter.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::Result;
use crate::model::{Amount, Month, Property, Tenant};
use crate::storage::Storage;

/// Number of months on the statistics revenue chart, current month included.
pub const REVENUE_MONTHS: u32 = 12;

/// Share of properties with at least one active tenant, in `0.0..=1.0`.
///
/// Zero when there are no properties.
#[must_use]
pub fn occupancy_rate(properties: &[Property], tenants: &[Tenant]) -> f64 {
    if properties.is_empty() {
        return 0.0;
    }
    let occupied_ids: HashSet<i64> = tenants
        .iter()
        .filter(|t| t.active)
        .map(|t| t.property_id)
        .collect();
    let occupied = properties
        .iter()
        .filter(|p| occupied_ids.contains(&p.id))
        .count();
    ratio(occupied, properties.len())
}

fn ratio(part: usize, whole: usize) -> f64 {
    let as_f64 = |n: usize| f64::from(u32::try_from(n).unwrap_or(u32::MAX));
    as_f64(part) / as_f64(whole)
}

/// Whether an active tenant is late for the month containing `today`.
///
/// Late means nothing was recorded for the month and the payment day has passed.
#[must_use]
pub fn is_overdue(tenant: &Tenant, paid_this_month: &HashSet<i64>, today: NaiveDate) -> bool {
    tenant.active
        && !paid_this_month.contains(&tenant.id)
        && today.day() > u32::from(tenant.payment_day)
}

/// A tenant with no payment for the current month past their payment day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueTenant {
    /// Tenant id.
    pub tenant_id: i64,
    /// Display name.
    pub name: String,
    /// Name of the leased property.
    pub property_name: String,
    /// Rent plus charges.
    pub amount_due: Amount,
    /// Day the rent was due.
    pub payment_day: u8,
}

/// Figures on the home page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// The month containing `today`.
    pub month: Month,
    /// Number of properties.
    pub property_count: usize,
    /// Number of active tenants.
    pub active_tenant_count: usize,
    /// Rent plus charges expected from active tenants each month.
    pub expected_revenue: Amount,
    /// Payments recorded for the current month.
    pub collected: Amount,
    /// See [`occupancy_rate`].
    pub occupancy_rate: f64,
    /// Late tenants.
    pub overdue: Vec<OverdueTenant>,
}

impl Dashboard {
    /// Compute the dashboard as of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage query fails.
    pub fn compute(storage: &Storage, today: NaiveDate) -> Result<Self> {
        let month = Month::from_date(today);
        let properties = storage.list_properties()?;
        let active = storage.list_active_tenants()?;
        let by_id: HashMap<i64, &Property> = properties.iter().map(|p| (p.id, p)).collect();

        let due = |tenant: &Tenant| {
            by_id
                .get(&tenant.property_id)
                .map_or(tenant.monthly_rent, |p| tenant.monthly_due(p))
        };
        let expected_revenue: Amount = active.iter().map(due).sum();

        let paid = storage.tenants_paid_for(month)?;
        let overdue = active
            .iter()
            .filter(|t| is_overdue(t, &paid, today))
            .map(|t| OverdueTenant {
                tenant_id: t.id,
                name: t.display_name(),
                property_name: by_id
                    .get(&t.property_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                amount_due: due(t),
                payment_day: t.payment_day,
            })
            .collect();

        Ok(Self {
            month,
            property_count: properties.len(),
            active_tenant_count: active.len(),
            expected_revenue,
            collected: storage.total_for_month(month)?,
            occupancy_rate: occupancy_rate(&properties, &active),
            overdue,
        })
    }

    /// Occupancy as a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn occupancy_percent(&self) -> u32 {
        (self.occupancy_rate * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

/// Revenue for one month of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    /// The month.
    pub month: Month,
    /// Short label, e.g. `Mar 2024`.
    pub label: String,
    /// Sum of payments for the month.
    pub total: Amount,
}

/// Revenue collected for one property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRevenue {
    /// The property.
    pub property: Property,
    /// Its current tenant: the earliest-created active one.
    pub tenant: Option<Tenant>,
    /// Everything the current tenant ever paid, zero without a tenant.
    pub collected: Amount,
}

/// Figures on the statistics page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    /// Oldest month first, ending with the current month.
    pub monthly: Vec<MonthlyRevenue>,
    /// Sum of `monthly`.
    pub period_total: Amount,
    /// One entry per property, in creation order.
    pub properties: Vec<PropertyRevenue>,
}

impl Statistics {
    /// Compute the statistics as of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage query fails.
    pub fn compute(storage: &Storage, today: NaiveDate) -> Result<Self> {
        let current = Month::from_date(today);
        let first = current.minus_months(REVENUE_MONTHS - 1);

        let totals = storage.revenue_by_month(first)?;
        let monthly = (0..REVENUE_MONTHS)
            .rev()
            .map(|back| {
                let month = current.minus_months(back);
                MonthlyRevenue {
                    month,
                    label: month.short_label(),
                    total: totals.get(&month).copied().unwrap_or_default(),
                }
            })
            .collect();

        let period_total = storage.revenue_between(first, current)?;

        let by_tenant = storage.totals_by_tenant()?;
        let mut active = storage.list_active_tenants()?;
        active.sort_by_key(|t| t.id);
        let properties = storage
            .list_properties()?
            .into_iter()
            .map(|property| {
                let tenant = active.iter().find(|t| t.property_id == property.id).cloned();
                let collected = tenant
                    .as_ref()
                    .and_then(|t| by_tenant.get(&t.id).copied())
                    .unwrap_or_default();
                PropertyRevenue {
                    property,
                    tenant,
                    collected,
                }
            })
            .collect();

        Ok(Self {
            monthly,
            period_total,
            properties,
        })
    }

    /// Largest monthly total, for scaling the chart bars.
    #[must_use]
    pub fn max_monthly(&self) -> Amount {
        self.monthly
            .iter()
            .map(|m| m.total)
            .max()
            .unwrap_or_default()
    }
}
