//! Landlord settings.

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::Storage;
use crate::error::Result;
use crate::model::Landlord;

impl Storage {
    /// Get the landlord settings, if they were ever saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_landlord(&self) -> Result<Option<Landlord>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT name, address, postal_code, city, phone, email, siret
                FROM landlord WHERE id = 1
                ",
                [],
                |row| {
                    Ok(Landlord {
                        name: row.get(0)?,
                        address: row.get(1)?,
                        postal_code: row.get(2)?,
                        city: row.get(3)?,
                        phone: row.get(4)?,
                        email: row.get(5)?,
                        siret: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// Create or replace the landlord settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_landlord(&self, landlord: &Landlord) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO landlord (id, name, address, postal_code, city, phone, email, siret)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                address = excluded.address,
                postal_code = excluded.postal_code,
                city = excluded.city,
                phone = excluded.phone,
                email = excluded.email,
                siret = excluded.siret
            ",
            params![
                landlord.name,
                landlord.address,
                landlord.postal_code,
                landlord.city,
                landlord.phone,
                landlord.email,
                landlord.siret,
            ],
        )?;
        info!("Saved landlord settings");
        Ok(())
    }
}
