//! Instruction template for prescription extraction.
//!
//! The template is sent verbatim alongside the prescription image. It pins the
//! JSON shape that [`crate::parse_prescription`] expects back.

/// Default Gemini model used for vision extraction.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Fixed instruction sent with every prescription image.
pub const VISION_PROMPT: &str = r#"You are a pharmacy assistant. Read the handwritten prescription in the attached image and extract every prescribed medicine.

Respond with JSON only, in exactly this shape:
{
  "medicines": [
    {
      "name": "<medicine name as written>",
      "frequency": "<doses per day, a whole number such as 2>",
      "duration": "<number of days, a whole number such as 5>",
      "required_quantity": "<frequency multiplied by duration>",
      "Availability": "<Yes or No>"
    }
  ]
}

Rules:
- Take every value from the image itself. Never guess or invent a value.
- required_quantity is frequency multiplied by duration.
- Availability is either "Yes" or "No".
- Leave out dosage strength and price.
- No prose, no markdown, no code fences. Plain JSON only."#;
