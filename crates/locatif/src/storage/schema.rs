//! `SQLite` schema definitions for locatif.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the properties table.
pub const CREATE_PROPERTIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS properties (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('apartment', 'commercial_unit')),
    address TEXT NOT NULL,
    area_m2 REAL,
    description TEXT,
    monthly_charges_cents INTEGER NOT NULL DEFAULT 0 CHECK (monthly_charges_cents >= 0),
    acquired_on TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the tenants table.
///
/// Business columns (`company_name`, `siret`, `company_director`) are added
/// by migration 2 so that databases created before them gain the columns too.
pub const CREATE_TENANTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS tenants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    last_name TEXT NOT NULL,
    first_name TEXT,
    email TEXT,
    phone TEXT,
    birth_date TEXT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    lease_start TEXT NOT NULL,
    lease_end TEXT,
    monthly_rent_cents INTEGER NOT NULL CHECK (monthly_rent_cents >= 0),
    deposit_cents INTEGER NOT NULL DEFAULT 0 CHECK (deposit_cents >= 0),
    payment_day INTEGER NOT NULL DEFAULT 1 CHECK (payment_day BETWEEN 1 AND 28),
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (lease_end IS NULL OR lease_end >= lease_start)
)
";

/// SQL statement to create the payments table.
pub const CREATE_PAYMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS payments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    category TEXT NOT NULL CHECK (category IN ('rent', 'water', 'waste', 'property_tax')),
    amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
    paid_on TEXT NOT NULL,
    period TEXT NOT NULL,
    method TEXT,
    note TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the singleton landlord table.
pub const CREATE_LANDLORD_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS landlord (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    postal_code TEXT,
    city TEXT,
    phone TEXT,
    email TEXT,
    siret TEXT
)
";

/// SQL statement to create an index on the tenant's property.
pub const CREATE_TENANT_PROPERTY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_tenants_property ON tenants(property_id)
";

/// SQL statement to create an index for per-tenant, per-month lookups.
pub const CREATE_PAYMENT_TENANT_PERIOD_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_payments_tenant_period ON payments(tenant_id, period)
";

/// SQL statement to create an index for monthly revenue aggregation.
pub const CREATE_PAYMENT_PERIOD_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_payments_period ON payments(period)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PROPERTIES_TABLE,
    CREATE_TENANTS_TABLE,
    CREATE_PAYMENTS_TABLE,
    CREATE_LANDLORD_TABLE,
    CREATE_TENANT_PROPERTY_INDEX,
    CREATE_PAYMENT_TENANT_PERIOD_INDEX,
    CREATE_PAYMENT_PERIOD_INDEX,
    CREATE_METADATA_TABLE,
];
