//! Storage layer for locatif.
//!
//! This module provides `SQLite`-based persistent storage for properties,
//! tenants, payments and the landlord settings. The database file is the whole
//! persistence layer and doubles as the backup artifact.
//!
//! A [`Storage`] owns one connection. The web layer opens one per request with
//! [`Storage::connect`] and drops it when the request is done; nothing shares a
//! connection across requests.

pub mod migrations;
pub mod schema;

mod landlord;
mod payments;
mod properties;
mod tenants;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Amount, NewProperty, PropertyKind};

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage engine for rental records.
///
/// Provides persistent storage using `SQLite` with support for:
/// - CRUD on properties, tenants and payments
/// - Cascading deletes from property to tenants to payments
/// - Aggregates for the dashboard and statistics pages
/// - Consistent backups of the database file
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        configure(&conn)?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Connect to an existing, already initialized database.
    ///
    /// Used for request-scoped handles: the file must exist and no migration
    /// is attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database file cannot be opened.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        configure(&conn)?;
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        configure(&conn)?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert the demo apartment and commercial unit into an empty database.
    ///
    /// Returns the number of properties inserted (0 when properties already exist).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn seed_demo_properties(&self) -> Result<usize> {
        if self.count_properties()? > 0 {
            return Ok(0);
        }

        let demo = [
            NewProperty {
                name: "Appartement Centre-Ville".to_string(),
                kind: PropertyKind::Apartment,
                address: "12 rue de la République, 75001 Paris".to_string(),
                area_m2: Some(65.0),
                description: Some("Appartement T3 lumineux avec balcon".to_string()),
                monthly_charges: Amount::from_euros(150).unwrap_or_default(),
                acquired_on: NaiveDate::from_ymd_opt(2020, 1, 15),
            },
            NewProperty {
                name: "Local Commercial".to_string(),
                kind: PropertyKind::CommercialUnit,
                address: "45 avenue des Champs, 75008 Paris".to_string(),
                area_m2: Some(120.0),
                description: Some(
                    "Local commercial avec vitrine, idéal commerce de proximité".to_string(),
                ),
                monthly_charges: Amount::from_euros(200).unwrap_or_default(),
                acquired_on: NaiveDate::from_ymd_opt(2018, 6, 1),
            },
        ];

        let tx = self.conn.unchecked_transaction()?;
        for property in &demo {
            self.insert_property(property)?;
        }
        tx.commit()?;

        info!("Seeded {} demo properties", demo.len());
        Ok(demo.len())
    }

    /// Write a consistent copy of the database to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination exists or cannot be written.
    pub fn backup_to(&self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        if destination.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", destination.display()),
            )));
        }
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        self.conn
            .execute("VACUUM INTO ?1", [destination.to_string_lossy()])?;
        info!("Backed up database to {}", destination.display());
        Ok(())
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let count = |table: &str| -> Result<i64> {
            Ok(self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?)
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            properties: count("properties")?,
            tenants: count("tenants")?,
            payments: count("payments")?,
            db_size_bytes,
        })
    }
}

/// Per-connection settings. Foreign keys are off by default in `SQLite`, and
/// the cascading deletes depend on them.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of properties.
    pub properties: i64,
    /// Number of tenants, active or not.
    pub tenants: i64,
    /// Number of recorded payments.
    pub payments: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the storage, receipt and stats tests.

    use chrono::NaiveDate;

    use super::Storage;
    use crate::model::{
        Amount, Month, NewPayment, NewProperty, NewTenant, PaymentCategory, PropertyKind,
    };

    pub fn storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn month(y: i32, m: u32) -> Month {
        Month::new(y, m).unwrap()
    }

    pub fn euros(e: i64) -> Amount {
        Amount::from_euros(e).unwrap()
    }

    pub fn new_property(name: &str) -> NewProperty {
        NewProperty {
            name: name.to_string(),
            kind: PropertyKind::Apartment,
            address: name.to_string(),
            area_m2: Some(42.5),
            description: None,
            monthly_charges: euros(50),
            acquired_on: Some(date(2019, 9, 1)),
        }
    }

    pub fn new_tenant(property_id: i64, last_name: &str) -> NewTenant {
        NewTenant {
            last_name: last_name.to_string(),
            first_name: Some("Jean".to_string()),
            email: Some("jean@example.org".to_string()),
            phone: None,
            birth_date: None,
            company_name: None,
            siret: None,
            company_director: None,
            property_id,
            lease_start: date(2024, 1, 1),
            lease_end: None,
            monthly_rent: euros(650),
            deposit: euros(650),
            payment_day: 5,
            active: true,
        }
    }

    pub fn new_payment(
        tenant_id: i64,
        category: PaymentCategory,
        amount: i64,
        period: Month,
    ) -> NewPayment {
        NewPayment {
            tenant_id,
            category,
            amount: euros(amount),
            paid_on: date(period.year(), period.month(), 3),
            period,
            method: Some("virement".to_string()),
            note: None,
        }
    }
}
