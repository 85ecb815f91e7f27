//! Vision model wrapper for prescription extraction.
//!
//! This crate sends a handwritten prescription image to a Gemini vision model
//! with a fixed instruction template and normalizes the free-form reply into a
//! structured [`PrescriptionOutput`].

pub mod client;
pub mod extraction;
pub mod image;
pub mod prompts;

pub use client::*;
pub use extraction::*;
pub use image::*;
pub use prompts::*;
