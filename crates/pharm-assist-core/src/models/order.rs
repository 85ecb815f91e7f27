//! Extracted prescription orders.

use pharm_assist_llm::{PrescriptionOutput, RawMedicine};
use serde::{Deserialize, Serialize};

/// Whether a medicine line can be filled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    pub fn from_bool(available: bool) -> Self {
        if available {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }

    pub fn is_available(self) -> bool {
        self == Availability::Available
    }

    /// Table cell mark.
    pub fn mark(self) -> &'static str {
        match self {
            Availability::Available => "✓",
            Availability::Unavailable => "✗",
        }
    }
}

/// Which pass produced an availability judgment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AvailabilitySource {
    /// Taken from the model's own "Availability" field at extraction time
    ModelReported,
    /// Recomputed from current store stock after a sale
    StoreVerified,
}

/// One prescribed medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineLine {
    /// Medicine name as extracted (trimmed)
    pub name: String,
    /// Doses per day, as the model wrote it
    pub frequency: String,
    /// Days of treatment, as the model wrote it
    pub duration: String,
    /// frequency × duration, or 0 when either is malformed
    pub required_quantity: i64,
    /// The model's availability claim
    pub model_availability: Availability,
}

impl MedicineLine {
    /// Build a line from raw model output, deriving the required quantity.
    pub fn from_raw(raw: &RawMedicine) -> Self {
        let required_quantity = required_quantity(&raw.frequency, &raw.duration);

        if let Some(reported) = parse_count(&raw.required_quantity) {
            if reported != required_quantity {
                tracing::warn!(
                    medicine = %raw.name.trim(),
                    reported,
                    computed = required_quantity,
                    "model required_quantity disagrees with frequency x duration"
                );
            }
        }

        Self {
            name: raw.name.trim().to_string(),
            frequency: raw.frequency.trim().to_string(),
            duration: raw.duration.trim().to_string(),
            required_quantity,
            model_availability: Availability::from_bool(raw.reported_available()),
        }
    }

    /// A line can be offered for sale only with a name and a positive quantity.
    pub fn is_sellable_with(&self, availability: Availability) -> bool {
        availability.is_available() && !self.name.is_empty() && self.required_quantity > 0
    }
}

/// The most recent successfully parsed prescription.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedOrder {
    pub lines: Vec<MedicineLine>,
}

impl ExtractedOrder {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl From<&PrescriptionOutput> for ExtractedOrder {
    fn from(output: &PrescriptionOutput) -> Self {
        Self {
            lines: output.medicines.iter().map(MedicineLine::from_raw).collect(),
        }
    }
}

/// Parse a non-negative whole number written as text ("2", " 5 ", "3.0").
pub fn parse_count(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return (n >= 0).then_some(n);
    }

    let f = value.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// frequency × duration when both are well-formed, otherwise 0.
pub fn required_quantity(frequency: &str, duration: &str) -> i64 {
    match (parse_count(frequency), parse_count(duration)) {
        (Some(f), Some(d)) => f.checked_mul(d).unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, frequency: &str, duration: &str, availability: &str) -> RawMedicine {
        RawMedicine {
            name: name.into(),
            frequency: frequency.into(),
            duration: duration.into(),
            required_quantity: "0".into(),
            availability: availability.into(),
        }
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("2"), Some(2));
        assert_eq!(parse_count(" 5 "), Some(5));
        assert_eq!(parse_count("3.0"), Some(3));
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("twice"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_required_quantity() {
        assert_eq!(required_quantity("2", "5"), 10);
        assert_eq!(required_quantity("3", "7"), 21);
        assert_eq!(required_quantity("2", "five"), 0);
        assert_eq!(required_quantity("", "5"), 0);
    }

    #[test]
    fn test_line_from_raw() {
        let line = MedicineLine::from_raw(&raw("  Paracetamol ", "2", "5", "Yes"));
        assert_eq!(line.name, "Paracetamol");
        assert_eq!(line.required_quantity, 10);
        assert_eq!(line.model_availability, Availability::Available);
        assert!(line.is_sellable_with(line.model_availability));
    }

    #[test]
    fn test_malformed_line_is_unsellable() {
        let line = MedicineLine::from_raw(&raw("Ibuprofen", "as needed", "5", "yes"));
        assert_eq!(line.required_quantity, 0);
        assert!(!line.is_sellable_with(Availability::Available));
    }

    #[test]
    fn test_unnamed_line_is_unsellable() {
        let line = MedicineLine::from_raw(&raw("   ", "1", "1", "Yes"));
        assert!(!line.is_sellable_with(Availability::Available));
    }

    #[test]
    fn test_order_from_output() {
        let output = PrescriptionOutput {
            medicines: vec![raw("A", "1", "2", "No"), raw("B", "2", "2", "YES")],
        };
        let order = ExtractedOrder::from(&output);
        assert_eq!(order.len(), 2);
        assert_eq!(order.lines[0].model_availability, Availability::Unavailable);
        assert_eq!(order.lines[1].required_quantity, 4);
    }
}
