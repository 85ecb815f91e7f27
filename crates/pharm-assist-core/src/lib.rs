//! PharmAssist Core Library
//!
//! Reads a handwritten prescription with a vision model, checks the extracted
//! medicines against the pharmacy inventory, and records sales.
//!
//! # Architecture
//!
//! ```text
//! Prescription image
//!        │
//!        ▼
//!  Vision model (Gemini) ──► raw text ──► Normalizer (fence strip + JSON)
//!                                                │
//!                                       ┌────────▼────────┐
//!                                       │  ExtractedOrder │ (held in Session)
//!                                       └────────┬────────┘
//!                                                │ model-reported availability
//!                                                ▼
//!                                     Table + sell options + inventory
//!                                                │
//!                                      Pharmacist picks a line
//!                                                │
//!                          ┌─────────────────────▼─────────────────────┐
//!                          │  commit_sale (one transaction)             │
//!                          │  insert sale row + decrement stock         │
//!                          └─────────────────────┬─────────────────────┘
//!                                                │ store-verified availability
//!                                                ▼
//!                                  Refreshed table + inventory
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite inventory store (drugs, sales ledger)
//! - [`models`]: Domain types (Drug, Sale, ExtractedOrder, MedicineLine)
//! - [`engine`]: Reconciliation engine and shell-facing outputs
//! - [`config`]: Startup configuration from the environment

pub mod config;
pub mod db;
pub mod engine;
pub mod models;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use db::Database;
pub use engine::{
    ActionOutcome, ReconciliationEngine, ResetOutcome, SellOption, Session, Status, TableRow,
};
pub use models::{
    Availability, AvailabilitySource, Drug, DrugRecord, ExtractedOrder, MedicineLine, Sale,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use pharm_assist_llm::{ExtractionClient, GeminiClient, PrescriptionImage};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PharmAssistError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Model client error: {0}")]
    ClientError(String),
}

impl From<db::DbError> for PharmAssistError {
    fn from(e: db::DbError) -> Self {
        PharmAssistError::DatabaseError(e.to_string())
    }
}

impl From<ConfigError> for PharmAssistError {
    fn from(e: ConfigError) -> Self {
        PharmAssistError::ConfigurationError(e.to_string())
    }
}

impl From<pharm_assist_llm::ExtractionError> for PharmAssistError {
    fn from(e: pharm_assist_llm::ExtractionError) -> Self {
        PharmAssistError::ClientError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PharmAssistError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PharmAssistError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the store at `db_path` and connect a Gemini client.
#[uniffi::export]
pub fn open_pharmacy(
    db_path: String,
    api_key: String,
    model: Option<String>,
) -> Result<Arc<PharmAssistCore>, PharmAssistError> {
    let db = Database::open(&db_path)?;
    let client = GeminiClient::new(api_key, model)?;
    Ok(Arc::new(PharmAssistCore::new(db, Box::new(client))))
}

/// Open using `PHARMACY_DB`, `GOOGLE_API_KEY` and `GEMINI_MODEL`.
#[uniffi::export]
pub fn open_pharmacy_from_env() -> Result<Arc<PharmAssistCore>, PharmAssistError> {
    let config = Config::from_env()?;
    open_pharmacy(
        config.database_path.to_string_lossy().into_owned(),
        config.api_key,
        config.gemini_model,
    )
}

/// Prescription table column headers.
#[uniffi::export]
pub fn prescription_headers() -> Vec<String> {
    engine::PRESCRIPTION_HEADERS
        .iter()
        .map(|h| h.to_string())
        .collect()
}

/// Inventory panel column headers.
#[uniffi::export]
pub fn inventory_headers() -> Vec<String> {
    engine::INVENTORY_HEADERS
        .iter()
        .map(|h| h.to_string())
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe wrapper holding the store, the model client and the session.
#[derive(uniffi::Object)]
pub struct PharmAssistCore {
    db: Arc<Mutex<Database>>,
    client: Box<dyn ExtractionClient>,
    session: Mutex<Session>,
}

impl PharmAssistCore {
    /// Wrap an open store and any extraction client.
    pub fn new(db: Database, client: Box<dyn ExtractionClient>) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            client,
            session: Mutex::new(Session::new()),
        }
    }
}

#[uniffi::export]
impl PharmAssistCore {
    /// Process-image action.
    pub fn process_prescription(&self, image: Vec<u8>) -> Result<FfiActionOutcome, PharmAssistError> {
        let db = self.db.lock()?;
        let mut session = self.session.lock()?;
        let engine = ReconciliationEngine::new(&db, self.client.as_ref());
        let image = PrescriptionImage::from_bytes(image);
        Ok(engine.extract_and_reconcile(&mut session, &image).into())
    }

    /// Sell action, parameterized by a `name|||quantity` token.
    pub fn sell(&self, selection: String) -> Result<FfiActionOutcome, PharmAssistError> {
        let db = self.db.lock()?;
        let session = self.session.lock()?;
        let engine = ReconciliationEngine::new(&db, self.client.as_ref());
        Ok(engine.sell(&session, &selection).into())
    }

    /// Reset action.
    pub fn reset(&self) -> Result<FfiResetOutcome, PharmAssistError> {
        let db = self.db.lock()?;
        let engine = ReconciliationEngine::new(&db, self.client.as_ref());
        Ok(engine.reset().into())
    }

    /// Current inventory panel rows.
    pub fn list_inventory(&self) -> Result<Vec<FfiInventoryRow>, PharmAssistError> {
        let db = self.db.lock()?;
        let drugs = db.list_all_drugs()?;
        Ok(drugs.into_iter().map(|d| d.into()).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe prescription table row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTableRow {
    pub cells: Vec<String>,
    pub is_error: bool,
    /// "ModelReported" or "StoreVerified"; absent on the error row
    pub availability_source: Option<String>,
}

impl From<TableRow> for FfiTableRow {
    fn from(row: TableRow) -> Self {
        let availability_source = match &row {
            TableRow::Medicine(r) => Some(format!("{:?}", r.source)),
            TableRow::Error { .. } => None,
        };
        Self {
            cells: row.cells().to_vec(),
            is_error: row.is_error(),
            availability_source,
        }
    }
}

/// FFI-safe sell option.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSellOption {
    pub label: String,
    pub value: String,
}

impl From<SellOption> for FfiSellOption {
    fn from(option: SellOption) -> Self {
        Self {
            label: option.label,
            value: option.value,
        }
    }
}

/// FFI-safe inventory row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInventoryRow {
    pub name: String,
    pub brand: Option<String>,
    pub quantity: i64,
    pub expiry_date: Option<String>,
    pub price_per_unit: Option<f64>,
}

impl From<DrugRecord> for FfiInventoryRow {
    fn from(record: DrugRecord) -> Self {
        Self {
            name: record.name,
            brand: record.brand,
            quantity: record.quantity,
            expiry_date: record.expiry_date,
            price_per_unit: record.price_per_unit,
        }
    }
}

/// FFI-safe action outcome. `None` fields leave the rendered panel as is.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiActionOutcome {
    pub table: Option<Vec<FfiTableRow>>,
    pub sell_options: Option<Vec<FfiSellOption>>,
    pub status: String,
    pub is_error: bool,
    pub inventory: Option<Vec<FfiInventoryRow>>,
}

impl From<ActionOutcome> for FfiActionOutcome {
    fn from(outcome: ActionOutcome) -> Self {
        Self {
            table: outcome
                .table
                .map(|rows| rows.into_iter().map(|r| r.into()).collect()),
            sell_options: outcome
                .sell_options
                .map(|opts| opts.into_iter().map(|o| o.into()).collect()),
            status: outcome.status.to_string(),
            is_error: outcome.status.is_failure(),
            inventory: outcome
                .inventory
                .map(|drugs| drugs.into_iter().map(|d| d.into()).collect()),
        }
    }
}

/// FFI-safe reset outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiResetOutcome {
    pub clear_image: bool,
    pub table: Vec<FfiTableRow>,
    pub sell_options: Vec<FfiSellOption>,
    pub status: String,
    pub inventory: Vec<FfiInventoryRow>,
}

impl From<ResetOutcome> for FfiResetOutcome {
    fn from(outcome: ResetOutcome) -> Self {
        Self {
            clear_image: outcome.clear_image,
            table: outcome.table.into_iter().map(|r| r.into()).collect(),
            sell_options: outcome.sell_options.into_iter().map(|o| o.into()).collect(),
            status: outcome.status.to_string(),
            inventory: outcome.inventory.into_iter().map(|d| d.into()).collect(),
        }
    }
}
