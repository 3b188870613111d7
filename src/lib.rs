//! scanshelf - scanned-book PDF processing.
//!
//! Converts scanned-book PDFs into browsable page images, OCR text, a
//! per-publication search index, and bibliographic metadata looked up from
//! ISBNs found in the text.

pub mod config;
pub mod models;
pub mod ocr;
pub mod services;
