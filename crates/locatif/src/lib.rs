//! `locatif` - Local rental-property management
//!
//! This library provides the core of a single-user landlord tool: properties,
//! tenants and payments kept in a local `SQLite` file, rent receipts rendered
//! as PDF, dashboard figures, and the web interface serving them on loopback.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod forms;
pub mod logging;
pub mod model;
pub mod receipt;
pub mod stats;
pub mod storage;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Amount, Landlord, Month, Payment, PaymentCategory, Property, PropertyKind, Tenant};
pub use receipt::Receipt;
pub use storage::{Storage, StorageStats};
