pub mod document;
pub mod merge;
pub mod text;

#[cfg(test)]
pub(crate) mod fixtures;

pub use document::{PdfDocument, Rotation};
