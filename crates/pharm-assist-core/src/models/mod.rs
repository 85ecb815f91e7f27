//! Domain models for the pharmacy assistant.

mod drug;
mod order;

pub use drug::*;
pub use order::*;
