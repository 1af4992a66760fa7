// src/extract/mod.rs
//! Turning a downloaded agenda into text, and text into named fields.

pub mod fields;
pub mod text;

pub use fields::{extract_fields, ExtractedFields, PatternRules};
pub use text::{ExtractionError, PdfTextExtractor, TextExtractor};
