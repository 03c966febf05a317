//! Tenant queries.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::Storage;
use crate::error::Result;
use crate::model::{NewTenant, Tenant};

const SELECT_TENANT: &str = r"
SELECT id, last_name, first_name, email, phone, birth_date,
       company_name, siret, company_director, property_id,
       lease_start, lease_end, monthly_rent_cents, deposit_cents, payment_day, active
FROM tenants
";

impl Storage {
    /// Insert a tenant and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// referenced property does not exist.
    pub fn insert_tenant(&self, tenant: &NewTenant) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO tenants
                (last_name, first_name, email, phone, birth_date,
                 company_name, siret, company_director, property_id,
                 lease_start, lease_end, monthly_rent_cents, deposit_cents, payment_day, active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ",
            params![
                tenant.last_name,
                tenant.first_name,
                tenant.email,
                tenant.phone,
                tenant.birth_date,
                tenant.company_name,
                tenant.siret,
                tenant.company_director,
                tenant.property_id,
                tenant.lease_start,
                tenant.lease_end,
                tenant.monthly_rent,
                tenant.deposit,
                tenant.payment_day,
                tenant.active,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted tenant with id {}", id);
        Ok(id)
    }

    /// Get a tenant by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_tenant(&self, id: i64) -> Result<Option<Tenant>> {
        let result = self
            .conn
            .query_row(
                &format!("{SELECT_TENANT} WHERE id = ?1"),
                [id],
                Self::row_to_tenant,
            )
            .optional()?;
        Ok(result)
    }

    /// List all tenants, active first, then by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_tenants(&self) -> Result<Vec<Tenant>> {
        self.query_tenants(
            &format!("{SELECT_TENANT} ORDER BY active DESC, last_name, first_name, id"),
            [],
        )
    }

    /// List tenants whose lease is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_active_tenants(&self) -> Result<Vec<Tenant>> {
        self.query_tenants(
            &format!("{SELECT_TENANT} WHERE active = 1 ORDER BY last_name, first_name, id"),
            [],
        )
    }

    /// List the tenants of one property, most recent lease first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_tenants_for_property(&self, property_id: i64) -> Result<Vec<Tenant>> {
        self.query_tenants(
            &format!("{SELECT_TENANT} WHERE property_id = ?1 ORDER BY lease_start DESC, id DESC"),
            [property_id],
        )
    }

    /// Replace every field of a tenant.
    ///
    /// Returns `true` if the tenant existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_tenant(&self, id: i64, tenant: &NewTenant) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE tenants SET
                last_name = ?2, first_name = ?3, email = ?4, phone = ?5, birth_date = ?6,
                company_name = ?7, siret = ?8, company_director = ?9, property_id = ?10,
                lease_start = ?11, lease_end = ?12, monthly_rent_cents = ?13,
                deposit_cents = ?14, payment_day = ?15, active = ?16
            WHERE id = ?1
            ",
            params![
                id,
                tenant.last_name,
                tenant.first_name,
                tenant.email,
                tenant.phone,
                tenant.birth_date,
                tenant.company_name,
                tenant.siret,
                tenant.company_director,
                tenant.property_id,
                tenant.lease_start,
                tenant.lease_end,
                tenant.monthly_rent,
                tenant.deposit,
                tenant.payment_day,
                tenant.active,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a tenant and its payments.
    ///
    /// Returns `true` if a tenant was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_tenant(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM tenants WHERE id = ?1", [id])?;
        if affected > 0 {
            info!("Deleted tenant {} and its payments", id);
        }
        Ok(affected > 0)
    }

    fn query_tenants(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Tenant>> {
        let mut stmt = self.conn.prepare(sql)?;
        let tenants = stmt
            .query_map(params, Self::row_to_tenant)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tenants)
    }

    fn row_to_tenant(row: &rusqlite::Row) -> rusqlite::Result<Tenant> {
        Ok(Tenant {
            id: row.get(0)?,
            last_name: row.get(1)?,
            first_name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            birth_date: row.get(5)?,
            company_name: row.get(6)?,
            siret: row.get(7)?,
            company_director: row.get(8)?,
            property_id: row.get(9)?,
            lease_start: row.get(10)?,
            lease_end: row.get(11)?,
            monthly_rent: row.get(12)?,
            deposit: row.get(13)?,
            payment_day: row.get(14)?,
            active: row.get(15)?,
        })
    }
}
