pub mod document;
pub mod query;
pub mod similarity;
pub mod stopwords;

pub use document::{Document, DocumentKind};
pub use query::QueryShape;
