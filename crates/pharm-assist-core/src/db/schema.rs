//! SQLite schema definition.

/// Inventory and sales schema.
///
/// Every statement is `IF NOT EXISTS`, so opening a pre-existing pharmacy
/// store leaves it untouched.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Drug Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    brand TEXT,
    quantity INTEGER NOT NULL DEFAULT 0,          -- may go negative via unchecked decrement
    expiry_date TEXT,
    price_per_unit REAL
);

CREATE INDEX IF NOT EXISTS idx_drugs_name ON drugs(name);

-- ============================================================================
-- Sales Ledger (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS sales (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    drug_id INTEGER NOT NULL REFERENCES drugs(id),
    quantity_sold INTEGER NOT NULL CHECK (quantity_sold > 0),
    sale_date TEXT NOT NULL                       -- YYYY-MM-DD
);

CREATE INDEX IF NOT EXISTS idx_sales_drug ON sales(drug_id);

-- Sales are never rewritten
CREATE TRIGGER IF NOT EXISTS sales_no_update BEFORE UPDATE ON sales
BEGIN
    SELECT RAISE(ABORT, 'Sales are append-only');
END;

CREATE TRIGGER IF NOT EXISTS sales_no_delete BEFORE DELETE ON sales
BEGIN
    SELECT RAISE(ABORT, 'Sales are append-only');
END;
"#;
