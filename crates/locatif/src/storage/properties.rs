//! Property queries.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::Storage;
use crate::error::Result;
use crate::model::{NewProperty, Property};

const SELECT_PROPERTY: &str = r"
SELECT id, name, kind, address, area_m2, description, monthly_charges_cents, acquired_on
FROM properties
";

impl Storage {
    /// Insert a property and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_property(&self, property: &NewProperty) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO properties
                (name, kind, address, area_m2, description, monthly_charges_cents, acquired_on)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                property.name,
                property.kind,
                property.address,
                property.area_m2,
                property.description,
                property.monthly_charges,
                property.acquired_on,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted property with id {}", id);
        Ok(id)
    }

    /// Get a property by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_property(&self, id: i64) -> Result<Option<Property>> {
        let result = self
            .conn
            .query_row(
                &format!("{SELECT_PROPERTY} WHERE id = ?1"),
                [id],
                Self::row_to_property,
            )
            .optional()?;
        Ok(result)
    }

    /// List all properties in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_properties(&self) -> Result<Vec<Property>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_PROPERTY} ORDER BY id"))?;
        let properties = stmt
            .query_map([], Self::row_to_property)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(properties)
    }

    /// Count properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_properties(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM properties", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Replace every field of a property.
    ///
    /// Returns `true` if the property existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_property(&self, id: i64, property: &NewProperty) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE properties SET
                name = ?2, kind = ?3, address = ?4, area_m2 = ?5, description = ?6,
                monthly_charges_cents = ?7, acquired_on = ?8
            WHERE id = ?1
            ",
            params![
                id,
                property.name,
                property.kind,
                property.address,
                property.area_m2,
                property.description,
                property.monthly_charges,
                property.acquired_on,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a property together with its tenants and their payments.
    ///
    /// Returns `true` if a property was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_property(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM properties WHERE id = ?1", [id])?;
        if affected > 0 {
            info!("Deleted property {} and its dependent records", id);
        }
        Ok(affected > 0)
    }

    fn row_to_property(row: &rusqlite::Row) -> rusqlite::Result<Property> {
        Ok(Property {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            address: row.get(3)?,
            area_m2: row.get(4)?,
            description: row.get(5)?,
            monthly_charges: row.get(6)?,
            acquired_on: row.get(7)?,
        })
    }
}
