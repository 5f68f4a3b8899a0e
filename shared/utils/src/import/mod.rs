//! XML Order Import Module
//!
//! Parses vendor order exports into normalized order records.
//! The vendor layout is a configurable field-mapping table (`ORDINE` by
//! default, `Order` for older exports).

pub mod document;
pub mod error;
pub mod parser;
pub mod schema;

pub use document::{XmlDocument, XmlElement, XmlNode};
pub use error::ImportError;
pub use parser::{normalize_order_date, OrderXmlImporter};
pub use schema::{ElementPath, OrderXmlSchema, SchemaSelection, SchemaVariant};
