//! Sell-selection tokens (`name|||quantity`).

use thiserror::Error;

/// Separator between drug name and quantity in a selection token.
pub const SELECTION_SEPARATOR: &str = "|||";

/// Reasons a selection token is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No drug selected.")]
    Empty,

    #[error("Malformed selection. Please reprocess prescription.")]
    MissingSeparator,

    #[error("Failed to process selection ({0}): invalid quantity")]
    InvalidQuantity(String),
}

/// A parsed sell selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub quantity: i64,
}

impl Selection {
    /// Encode a name and quantity as a selection token.
    pub fn token(name: &str, quantity: i64) -> String {
        format!("{}{}{}", name, SELECTION_SEPARATOR, quantity)
    }

    /// Parse a selection token. The quantity must be a positive integer.
    pub fn parse(token: &str) -> Result<Self, SelectionError> {
        if token.trim().is_empty() {
            return Err(SelectionError::Empty);
        }

        let (name, quantity) = token
            .split_once(SELECTION_SEPARATOR)
            .ok_or(SelectionError::MissingSeparator)?;

        let quantity = quantity
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| SelectionError::InvalidQuantity(token.to_string()))?;

        Ok(Self {
            name: name.trim().to_string(),
            quantity,
        })
    }
}
