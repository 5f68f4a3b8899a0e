//! Vendor XML layouts
//!
//! An [`OrderXmlSchema`] is a field-mapping table from logical order fields to
//! element paths. The importer only ever reads through a schema, so adding a
//! vendor export format means adding a table, not a code path.

use orderdesk_models::OrderField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{OrderDeskError, OrderDeskResult};

/// `/`-separated element names, resolved one descendant lookup at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementPath(Vec<String>);

impl ElementPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for ElementPath {
    type Err = OrderDeskError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = path.split('/').map(|s| s.trim().to_string()).collect();

        if segments.iter().any(String::is_empty) {
            return Err(OrderDeskError::configuration(format!(
                "element path '{}' has an empty segment",
                path
            )));
        }

        Ok(Self(segments))
    }
}

impl TryFrom<String> for ElementPath {
    type Error = OrderDeskError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        path.parse()
    }
}

impl From<ElementPath> for String {
    fn from(path: ElementPath) -> Self {
        path.0.join("/")
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Known vendor export layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Current export: `ORDINE` / `TESTA`.
    Ordine,
    /// Older export: `Order` / `Header`.
    Legacy,
}

impl SchemaVariant {
    pub fn schema(&self) -> OrderXmlSchema {
        match self {
            Self::Ordine => OrderXmlSchema::ordine(),
            Self::Legacy => OrderXmlSchema::legacy(),
        }
    }
}

/// Root and header tags plus where each logical field lives under the header.
///
/// Fields without an entry are always null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderXmlSchema {
    pub name: String,
    pub root: String,
    pub header: String,
    pub fields: BTreeMap<OrderField, ElementPath>,
}

impl OrderXmlSchema {
    /// Current vendor layout.
    ///
    /// The reseller name is read from `RIF` and the customer name from
    /// `VAR/CLI_1`; both are vendor-specific placements.
    pub fn ordine() -> Self {
        Self::from_table(
            "ordine",
            "ORDINE",
            "TESTA",
            &[
                (OrderField::OrderNumber, "NUMERO"),
                (OrderField::OrderDate, "DATA"),
                (OrderField::OrderType, "TIPO"),
                (OrderField::ResellerName, "RIF"),
                (OrderField::CustomerNumber, "CLIENTE"),
                (OrderField::CustomerName, "VAR/CLI_1"),
            ],
        )
    }

    pub fn legacy() -> Self {
        Self::from_table(
            "legacy",
            "Order",
            "Header",
            &[
                (OrderField::OrderNumber, "OrderNumber"),
                (OrderField::OrderDate, "OrderDate"),
                (OrderField::OrderType, "OrderType"),
                (OrderField::CustomerName, "Customer/CustomerName"),
                (OrderField::CustomerNumber, "Customer/CustomerNumber"),
                (OrderField::ResellerName, "Reseller/ResellerName"),
                (OrderField::ResellerCode, "Reseller/ResellerCode"),
                (OrderField::ProjectName, "ProjectName"),
                (OrderField::Designer, "Designer"),
            ],
        )
    }

    fn from_table(name: &str, root: &str, header: &str, table: &[(OrderField, &str)]) -> Self {
        let fields = table
            .iter()
            .map(|(field, path)| {
                let segments = path.split('/').map(str::to_string).collect();
                (*field, ElementPath(segments))
            })
            .collect();

        Self {
            name: name.to_string(),
            root: root.to_string(),
            header: header.to_string(),
            fields,
        }
    }

    pub fn path(&self, field: OrderField) -> Option<&ElementPath> {
        self.fields.get(&field)
    }

    /// Reject layouts that could never yield a complete record.
    pub fn validate(&self) -> OrderDeskResult<()> {
        if self.root.trim().is_empty() {
            return Err(OrderDeskError::configuration(format!(
                "schema '{}' has an empty root element name",
                self.name
            )));
        }
        if self.header.trim().is_empty() {
            return Err(OrderDeskError::configuration(format!(
                "schema '{}' has an empty header element name",
                self.name
            )));
        }

        let unmapped: Vec<&str> = OrderField::REQUIRED
            .iter()
            .filter(|field| !self.fields.contains_key(field))
            .map(|field| field.as_str())
            .collect();

        if !unmapped.is_empty() {
            return Err(OrderDeskError::configuration(format!(
                "schema '{}' does not map required fields: {}",
                self.name,
                unmapped.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for OrderXmlSchema {
    fn default() -> Self {
        Self::ordine()
    }
}

/// Either a built-in layout by name or a full custom table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSelection {
    Preset(SchemaVariant),
    Custom(OrderXmlSchema),
}

impl SchemaSelection {
    pub fn resolve(&self) -> OrderDeskResult<OrderXmlSchema> {
        let schema = match self {
            Self::Preset(variant) => variant.schema(),
            Self::Custom(schema) => schema.clone(),
        };
        schema.validate()?;
        Ok(schema)
    }
}

impl Default for SchemaSelection {
    fn default() -> Self {
        Self::Preset(SchemaVariant::Ordine)
    }
}
