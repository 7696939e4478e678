pub mod document;
pub mod query;
pub mod similarity;
pub mod text;
pub mod time_serde;

pub use document::Document;
pub use query::{DateRange, DocumentFilter, SizeRange};
