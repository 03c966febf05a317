//! Payment queries and revenue aggregates.

use std::collections::{BTreeMap, HashMap, HashSet};

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::Storage;
use crate::error::Result;
use crate::model::{Amount, Month, NewPayment, Payment};

const SELECT_PAYMENT: &str = r"
SELECT id, tenant_id, category, amount_cents, paid_on, period, method, note
FROM payments
";

impl Storage {
    /// Insert a payment and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// referenced tenant does not exist.
    pub fn insert_payment(&self, payment: &NewPayment) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO payments (tenant_id, category, amount_cents, paid_on, period, method, note)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                payment.tenant_id,
                payment.category,
                payment.amount,
                payment.paid_on,
                payment.period,
                payment.method,
                payment.note,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "Inserted {} payment {} for tenant {}",
            payment.category, id, payment.tenant_id
        );
        Ok(id)
    }

    /// Get a payment by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_payment(&self, id: i64) -> Result<Option<Payment>> {
        let result = self
            .conn
            .query_row(
                &format!("{SELECT_PAYMENT} WHERE id = ?1"),
                [id],
                Self::row_to_payment,
            )
            .optional()?;
        Ok(result)
    }

    /// List all payments, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_payments(&self) -> Result<Vec<Payment>> {
        self.query_payments(
            &format!("{SELECT_PAYMENT} ORDER BY paid_on DESC, id DESC"),
            [],
        )
    }

    /// List the most recent payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent_payments(&self, limit: usize) -> Result<Vec<Payment>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_payments(
            &format!("{SELECT_PAYMENT} ORDER BY paid_on DESC, id DESC LIMIT ?1"),
            [limit],
        )
    }

    /// List one tenant's payments, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_payments_for_tenant(&self, tenant_id: i64) -> Result<Vec<Payment>> {
        self.query_payments(
            &format!("{SELECT_PAYMENT} WHERE tenant_id = ?1 ORDER BY paid_on DESC, id DESC"),
            [tenant_id],
        )
    }

    /// Payments of one tenant for one month, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn payments_for_period(&self, tenant_id: i64, period: Month) -> Result<Vec<Payment>> {
        self.query_payments(
            &format!("{SELECT_PAYMENT} WHERE tenant_id = ?1 AND period = ?2 ORDER BY id"),
            params![tenant_id, period],
        )
    }

    /// Replace every field of a payment.
    ///
    /// Returns `true` if the payment existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_payment(&self, id: i64, payment: &NewPayment) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE payments SET
                tenant_id = ?2, category = ?3, amount_cents = ?4, paid_on = ?5,
                period = ?6, method = ?7, note = ?8
            WHERE id = ?1
            ",
            params![
                id,
                payment.tenant_id,
                payment.category,
                payment.amount,
                payment.paid_on,
                payment.period,
                payment.method,
                payment.note,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a payment.
    ///
    /// Returns `true` if a payment was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_payment(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM payments WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Sum of all payments whose period is `month`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn total_for_month(&self, month: Month) -> Result<Amount> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payments WHERE period = ?1",
            [month],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Sum of payments whose period lies between two months, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn revenue_between(&self, from: Month, to: Month) -> Result<Amount> {
        let total = self.conn.query_row(
            r"
            SELECT COALESCE(SUM(amount_cents), 0) FROM payments
            WHERE period >= ?1 AND period <= ?2
            ",
            params![from, to],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Totals per period for every period from `since` onwards.
    ///
    /// Months without payments are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn revenue_by_month(&self, since: Month) -> Result<BTreeMap<Month, Amount>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT period, SUM(amount_cents) FROM payments
            WHERE period >= ?1
            GROUP BY period
            ",
        )?;
        let totals = stmt
            .query_map([since], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
        Ok(totals)
    }

    /// Lifetime total paid by each tenant that has at least one payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn totals_by_tenant(&self) -> Result<HashMap<i64, Amount>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tenant_id, SUM(amount_cents) FROM payments GROUP BY tenant_id")?;
        let totals = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(totals)
    }

    /// Ids of tenants with at least one payment for `month`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn tenants_paid_for(&self, month: Month) -> Result<HashSet<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT tenant_id FROM payments WHERE period = ?1")?;
        let ids = stmt
            .query_map([month], |row| row.get(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    /// Months that have at least one payment for the tenant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn paid_periods_for_tenant(&self, tenant_id: i64) -> Result<Vec<Month>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT period FROM payments WHERE tenant_id = ?1 ORDER BY period DESC",
        )?;
        let periods = stmt
            .query_map([tenant_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(periods)
    }

    fn query_payments(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Payment>> {
        let mut stmt = self.conn.prepare(sql)?;
        let payments = stmt
            .query_map(params, Self::row_to_payment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(payments)
    }

    fn row_to_payment(row: &rusqlite::Row) -> rusqlite::Result<Payment> {
        Ok(Payment {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            category: row.get(2)?,
            amount: row.get(3)?,
            paid_on: row.get(4)?,
            period: row.get(5)?,
            method: row.get(6)?,
            note: row.get(7)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::error::Error;
    use crate::model::{Amount, NewPayment, PaymentCategory};
    use crate::storage::test_support::*;
    use crate::storage::Storage;

    fn with_tenant() -> (Storage, i64) {
        let storage = storage();
        let property_id = storage.insert_property(&new_property("A")).unwrap();
        let tenant_id = storage
            .insert_tenant(&new_tenant(property_id, "Dupont"))
            .unwrap();
        (storage, tenant_id)
    }

    #[test]
    fn test_insert_and_get() {
        let (storage, tenant_id) = with_tenant();
        let draft = new_payment(tenant_id, PaymentCategory::Water, 30, month(2024, 3));

        let id = storage.insert_payment(&draft).unwrap();

        assert_eq!(storage.get_payment(id).unwrap().unwrap(), draft.with_id(id));
        assert!(storage.get_payment(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_insert_requires_existing_tenant() {
        let storage = storage();
        let result =
            storage.insert_payment(&new_payment(7, PaymentCategory::Rent, 10, month(2024, 1)));
        assert!(matches!(result, Err(Error::DatabaseQuery(_))));
    }

    #[test]
    fn test_list_most_recent_first() {
        let (storage, tenant_id) = with_tenant();
        for m in [2, 5, 3] {
            storage
                .insert_payment(&new_payment(
                    tenant_id,
                    PaymentCategory::Rent,
                    650,
                    month(2024, m),
                ))
                .unwrap();
        }

        let periods: Vec<_> = storage
            .list_payments()
            .unwrap()
            .into_iter()
            .map(|p| p.period.month())
            .collect();
        assert_eq!(periods, [5, 3, 2]);

        let recent = storage.recent_payments(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].period, month(2024, 5));
    }

    #[test]
    fn test_payments_for_period() {
        let (storage, tenant_id) = with_tenant();
        storage
            .insert_payment(&new_payment(tenant_id, PaymentCategory::Rent, 650, month(2024, 3)))
            .unwrap();
        storage
            .insert_payment(&new_payment(tenant_id, PaymentCategory::Water, 30, month(2024, 3)))
            .unwrap();
        storage
            .insert_payment(&new_payment(tenant_id, PaymentCategory::Rent, 650, month(2024, 4)))
            .unwrap();

        let march = storage.payments_for_period(tenant_id, month(2024, 3)).unwrap();
        assert_eq!(march.len(), 2);
        assert!(storage
            .payments_for_period(tenant_id, month(2023, 3))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let (storage, tenant_id) = with_tenant();
        let id = storage
            .insert_payment(&new_payment(tenant_id, PaymentCategory::Rent, 650, month(2024, 3)))
            .unwrap();

        let changed = NewPayment {
            amount: euros(600),
            note: Some("partiel".to_string()),
            ..new_payment(tenant_id, PaymentCategory::Rent, 650, month(2024, 3))
        };
        assert!(storage.update_payment(id, &changed).unwrap());
        assert_eq!(storage.get_payment(id).unwrap().unwrap().amount, euros(600));

        assert!(storage.delete_payment(id).unwrap());
        assert!(!storage.delete_payment(id).unwrap());
        assert!(!storage.update_payment(id, &changed).unwrap());
    }

    #[test]
    fn test_aggregates() {
        let storage = storage();
        let property_id = storage.insert_property(&new_property("A")).unwrap();
        let first = storage
            .insert_tenant(&new_tenant(property_id, "Dupont"))
            .unwrap();
        let second = storage
            .insert_tenant(&new_tenant(property_id, "Durand"))
            .unwrap();
        for (tenant, category, amount, period) in [
            (first, PaymentCategory::Rent, 650, month(2024, 1)),
            (first, PaymentCategory::Water, 30, month(2024, 1)),
            (second, PaymentCategory::Rent, 500, month(2024, 1)),
            (first, PaymentCategory::Rent, 650, month(2024, 2)),
            (first, PaymentCategory::Rent, 640, month(2023, 12)),
        ] {
            storage
                .insert_payment(&new_payment(tenant, category, amount, period))
                .unwrap();
        }

        assert_eq!(storage.total_for_month(month(2024, 1)).unwrap(), euros(1180));
        assert_eq!(storage.total_for_month(month(2024, 6)).unwrap(), Amount::ZERO);

        let by_month = storage.revenue_by_month(month(2024, 1)).unwrap();
        assert_eq!(by_month.len(), 2);
        assert_eq!(by_month[&month(2024, 1)], euros(1180));
        assert_eq!(by_month[&month(2024, 2)], euros(650));

        let by_tenant = storage.totals_by_tenant().unwrap();
        assert_eq!(by_tenant[&first], euros(1970));
        assert_eq!(by_tenant[&second], euros(500));

        let paid = storage.tenants_paid_for(month(2024, 2)).unwrap();
        assert!(paid.contains(&first));
        assert!(!paid.contains(&second));

        assert_eq!(
            storage
                .revenue_between(month(2023, 12), month(2024, 1))
                .unwrap(),
            euros(1820)
        );
        assert_eq!(
            storage
                .revenue_between(month(2024, 3), month(2024, 1))
                .unwrap(),
            Amount::ZERO
        );

        assert_eq!(
            storage.paid_periods_for_tenant(first).unwrap(),
            [month(2024, 2), month(2024, 1), month(2023, 12)]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_create_then_read_returns_same_fields(
            cents in 1i64..10_000_000,
            category in prop::sample::select(PaymentCategory::ALL.to_vec()),
            year in 2000i32..2100,
            m in 1u32..=12,
            day in 1u32..=28,
            note in proptest::option::of("[a-zA-Zé ]{0,40}"),
        ) {
            let (storage, tenant_id) = with_tenant();
            let draft = NewPayment {
                tenant_id,
                category,
                amount: Amount::from_cents(cents).unwrap(),
                paid_on: date(year, m, day),
                period: month(year, m),
                method: None,
                note,
            };

            let id = storage.insert_payment(&draft).unwrap();
            prop_assert_eq!(storage.get_payment(id).unwrap().unwrap(), draft.with_id(id));
        }
    }
}
