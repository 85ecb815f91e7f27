//! Outputs handed back to the presentation shell.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Availability, AvailabilitySource, DrugRecord, MedicineLine};

use super::selection::Selection;

/// Column headers of the prescription table.
pub const PRESCRIPTION_HEADERS: [&str; 5] = [
    "Drug Name",
    "Frequency / Day",
    "Duration (Days)",
    "Required Quantity",
    "Available",
];

/// Column headers of the inventory panel.
pub const INVENTORY_HEADERS: [&str; 5] = [
    "Drug Name",
    "Brand",
    "Quantity Left",
    "Expiry Date",
    "Price / Unit",
];

/// One medicine row with the availability judgment that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionRow {
    pub name: String,
    pub frequency: String,
    pub duration: String,
    pub required_quantity: i64,
    pub availability: Availability,
    pub source: AvailabilitySource,
}

impl PrescriptionRow {
    pub fn new(line: &MedicineLine, availability: Availability, source: AvailabilitySource) -> Self {
        Self {
            name: line.name.clone(),
            frequency: line.frequency.clone(),
            duration: line.duration.clone(),
            required_quantity: line.required_quantity,
            availability,
            source,
        }
    }
}

/// A row of the prescription table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TableRow {
    Medicine(PrescriptionRow),
    /// Sentinel row shown in place of parsed data when extraction fails
    Error { message: String },
}

impl TableRow {
    pub fn is_error(&self) -> bool {
        matches!(self, TableRow::Error { .. })
    }

    /// Display cells in [`PRESCRIPTION_HEADERS`] order.
    pub fn cells(&self) -> [String; 5] {
        match self {
            TableRow::Medicine(row) => [
                row.name.clone(),
                row.frequency.clone(),
                row.duration.clone(),
                row.required_quantity.to_string(),
                row.availability.mark().to_string(),
            ],
            TableRow::Error { message } => [
                "Error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                message.clone(),
            ],
        }
    }
}

/// A drug the pharmacist can sell from the current prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SellOption {
    /// Dropdown label, e.g. `Paracetamol (10)`
    pub label: String,
    /// Selection token, e.g. `Paracetamol|||10`
    pub value: String,
}

impl SellOption {
    pub fn new(name: &str, quantity: i64) -> Self {
        Self {
            label: format!("{} ({})", name, quantity),
            value: Selection::token(name, quantity),
        }
    }
}

/// Status line shown to the operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Clear,
    Success(String),
    Failure(String),
}

impl Status {
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failure(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Clear => Ok(()),
            Status::Success(message) => write!(f, "✅ {}", message),
            Status::Failure(message) => write!(f, "❌ {}", message),
        }
    }
}

/// Result of a process-image or sell action.
///
/// `None` means "leave what is currently rendered untouched"; `Some(vec![])`
/// clears the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub table: Option<Vec<TableRow>>,
    pub sell_options: Option<Vec<SellOption>>,
    pub status: Status,
    pub inventory: Option<Vec<DrugRecord>>,
}

impl ActionOutcome {
    /// A failure that leaves every panel as rendered.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            table: None,
            sell_options: None,
            status: Status::Failure(message.into()),
            inventory: None,
        }
    }

    /// A failure that clears every panel.
    pub fn cleared(message: impl Into<String>) -> Self {
        Self {
            table: Some(Vec::new()),
            sell_options: Some(Vec::new()),
            status: Status::Failure(message.into()),
            inventory: Some(Vec::new()),
        }
    }

    /// Extraction failure: a single sentinel row and nothing to sell.
    pub fn extraction_failed(error: impl fmt::Display) -> Self {
        Self {
            table: Some(vec![TableRow::Error {
                message: error.to_string(),
            }]),
            sell_options: Some(Vec::new()),
            status: Status::Failure("Failed to process image.".into()),
            inventory: Some(Vec::new()),
        }
    }
}

/// Result of the reset action.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetOutcome {
    /// The shell should clear the uploaded image
    pub clear_image: bool,
    pub table: Vec<TableRow>,
    pub sell_options: Vec<SellOption>,
    pub status: Status,
    pub inventory: Vec<DrugRecord>,
}
