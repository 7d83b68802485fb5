pub mod document;
pub mod layout;

pub use document::{PdfDocument, PdfError, PdfPage};
pub use layout::{detect_tables, TextTable};
