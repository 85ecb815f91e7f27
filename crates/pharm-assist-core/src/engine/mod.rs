//! Prescription-to-sale reconciliation.
//!
//! Pipeline: Image → Model → Normalizer → Availability → Sale → Stock → Inventory
//!
//! Availability is judged in two separate passes:
//! - after extraction, the model's own "Availability" field is shown as-is
//!   ([`AvailabilitySource::ModelReported`]);
//! - after a sale, every line is re-checked against current stock
//!   ([`AvailabilitySource::StoreVerified`]).

mod selection;
mod view;

pub use selection::*;
pub use view::*;

use pharm_assist_llm::{
    parse_prescription, ExtractionClient, ExtractionError, PrescriptionImage, VISION_PROMPT,
};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{Availability, AvailabilitySource, ExtractedOrder, MedicineLine};

/// Engine errors. These never reach the shell; they are turned into statuses.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Operator session state, owned by the shell.
///
/// Holds the most recently extracted order. A new extraction overwrites it;
/// a failed extraction or a reset leaves it in place.
#[derive(Debug, Default, Clone)]
pub struct Session {
    order: Option<ExtractedOrder>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self) -> Option<&ExtractedOrder> {
        self.order.as_ref()
    }

    /// Replace the current order, returning the previous one.
    pub fn replace_order(&mut self, order: ExtractedOrder) -> Option<ExtractedOrder> {
        self.order.replace(order)
    }
}

/// Coordinates the extraction client and the inventory store.
pub struct ReconciliationEngine<'a> {
    db: &'a Database,
    client: &'a dyn ExtractionClient,
}

impl<'a> ReconciliationEngine<'a> {
    /// Create a new engine.
    pub fn new(db: &'a Database, client: &'a dyn ExtractionClient) -> Self {
        Self { db, client }
    }

    // =========================================================================
    // Process image
    // =========================================================================

    /// Extract a prescription from an image and render it with the model's
    /// availability judgment. Failures become a single error row.
    pub fn extract_and_reconcile(
        &self,
        session: &mut Session,
        image: &PrescriptionImage,
    ) -> ActionOutcome {
        match self.try_extract(session, image) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, details = ?e, "failed to process prescription image");
                ActionOutcome::extraction_failed(&e)
            }
        }
    }

    fn try_extract(
        &self,
        session: &mut Session,
        image: &PrescriptionImage,
    ) -> EngineResult<ActionOutcome> {
        let raw = self.client.extract(VISION_PROMPT, image)?;
        let output = parse_prescription(&raw)?;
        let order = ExtractedOrder::from(&output);

        tracing::info!(medicines = order.len(), "prescription extracted");

        let (table, sell_options) = model_reported_rows(&order);
        session.replace_order(order);

        let inventory = self.db.list_all_drugs()?;

        Ok(ActionOutcome {
            table: Some(table),
            sell_options: Some(sell_options),
            status: Status::Clear,
            inventory: Some(inventory),
        })
    }

    // =========================================================================
    // Sell
    // =========================================================================

    /// Sell the drug named by a `name|||quantity` token and re-verify every
    /// line of the session's order against the store.
    pub fn sell(&self, session: &Session, selection: &str) -> ActionOutcome {
        let selection = match Selection::parse(selection) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::warn!(selection, error = %e, "rejected sell selection");
                return ActionOutcome::rejected(e.to_string());
            }
        };

        match self.try_sell(session, &selection) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    drug = %selection.name,
                    quantity = selection.quantity,
                    error = %e,
                    details = ?e,
                    "sale failed"
                );
                ActionOutcome::cleared(format!("Error processing sale for {}", selection.name))
            }
        }
    }

    fn try_sell(&self, session: &Session, selection: &Selection) -> EngineResult<ActionOutcome> {
        let name = selection.name.as_str();
        let quantity = selection.quantity;

        let drug_id = match self.db.find_drug_id(name) {
            Ok(id) => id,
            Err(DbError::NotFound(_)) => {
                tracing::warn!(drug = name, "drug not in inventory");
                return Ok(ActionOutcome::rejected(format!(
                    "{} not found in inventory",
                    name
                )));
            }
            Err(DbError::AmbiguousName { ids, .. }) => {
                tracing::warn!(drug = name, matches = ids.len(), "ambiguous drug name");
                return Ok(ActionOutcome::rejected(format!(
                    "{} matches {} inventory records",
                    name,
                    ids.len()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let stock = self.db.get_stock(drug_id)?;
        if stock < quantity {
            tracing::warn!(drug = name, stock, requested = quantity, "insufficient stock");
            return Ok(insufficient_stock(name, stock));
        }

        match self.db.commit_sale(drug_id, quantity) {
            Ok(sale) => {
                tracing::info!(drug = name, drug_id, quantity, sale_id = sale.id, "sale recorded");
            }
            Err(DbError::InsufficientStock { available, .. }) => {
                tracing::warn!(drug = name, available, requested = quantity, "stock changed before sale");
                return Ok(insufficient_stock(name, available));
            }
            Err(e) => return Err(e.into()),
        }

        let new_stock = self.db.get_stock(drug_id)?;
        let status = Status::Success(format!(
            "Sale recorded for {} ({} units)\n📦 Remaining stock: {} units",
            name, quantity, new_stock
        ));

        let (table, sell_options) = match session.order() {
            Some(order) => self.store_verified_rows(order),
            None => (Vec::new(), Vec::new()),
        };
        let inventory = self.db.list_all_drugs()?;

        Ok(ActionOutcome {
            table: Some(table),
            sell_options: Some(sell_options),
            status,
            inventory: Some(inventory),
        })
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Clear the operator view and reload the inventory panel.
    ///
    /// The session's order is not touched.
    pub fn reset(&self) -> ResetOutcome {
        let (inventory, status) = match self.db.list_all_drugs() {
            Ok(inventory) => (inventory, Status::Clear),
            Err(e) => {
                tracing::error!(error = %e, "failed to reload inventory");
                (Vec::new(), Status::Failure("Failed to load inventory.".into()))
            }
        };

        ResetOutcome {
            clear_image: true,
            table: Vec::new(),
            sell_options: Vec::new(),
            status,
            inventory,
        }
    }

    // =========================================================================
    // Availability
    // =========================================================================

    /// Availability of one line against current stock. Lookup failures count
    /// as unavailable.
    pub fn store_verified_availability(&self, line: &MedicineLine) -> Availability {
        let stock = self
            .db
            .find_drug_id(&line.name)
            .and_then(|id| self.db.get_stock(id));

        match stock {
            Ok(stock) => Availability::from_bool(stock >= line.required_quantity),
            Err(e) => {
                tracing::debug!(medicine = %line.name, error = %e, "treating line as unavailable");
                Availability::Unavailable
            }
        }
    }

    /// Rows and sell options re-derived from the store.
    pub fn store_verified_rows(&self, order: &ExtractedOrder) -> (Vec<TableRow>, Vec<SellOption>) {
        build_rows(order, AvailabilitySource::StoreVerified, |line| {
            self.store_verified_availability(line)
        })
    }
}

/// Rows and sell options using the model's own availability claims.
pub fn model_reported_rows(order: &ExtractedOrder) -> (Vec<TableRow>, Vec<SellOption>) {
    build_rows(order, AvailabilitySource::ModelReported, |line| {
        line.model_availability
    })
}

fn build_rows<F>(
    order: &ExtractedOrder,
    source: AvailabilitySource,
    availability_of: F,
) -> (Vec<TableRow>, Vec<SellOption>)
where
    F: Fn(&MedicineLine) -> Availability,
{
    let mut table = Vec::with_capacity(order.len());
    let mut sell_options = Vec::new();

    for line in &order.lines {
        let availability = availability_of(line);
        table.push(TableRow::Medicine(PrescriptionRow::new(line, availability, source)));

        if line.is_sellable_with(availability) {
            sell_options.push(SellOption::new(&line.name, line.required_quantity));
        }
    }

    (table, sell_options)
}

fn insufficient_stock(name: &str, available: i64) -> ActionOutcome {
    ActionOutcome::rejected(format!(
        "Not enough stock for {} (available: {})",
        name, available
    ))
}
