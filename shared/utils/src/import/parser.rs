//! XML Order Importer
//!
//! Turns one vendor XML order export into a [`ParsedOrderRecord`], or an
//! [`ImportError`] explaining why it could not.

use orderdesk_models::{OrderField, ParsedOrderRecord};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::document::{XmlDocument, XmlElement};
use super::error::ImportError;
use super::schema::{ElementPath, OrderXmlSchema, SchemaVariant};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Stateless importer bound to one vendor layout.
#[derive(Debug, Clone, Default)]
pub struct OrderXmlImporter {
    schema: OrderXmlSchema,
}

impl OrderXmlImporter {
    pub fn new(schema: OrderXmlSchema) -> Self {
        Self { schema }
    }

    pub fn for_variant(variant: SchemaVariant) -> Self {
        Self::new(variant.schema())
    }

    pub fn schema(&self) -> &OrderXmlSchema {
        &self.schema
    }

    /// Parse raw file contents as read from disk or an upload.
    ///
    /// Text that is not UTF-8 is decoded with the encoding named in the XML
    /// declaration (or a UTF-16 byte order mark).
    pub fn parse_bytes(&self, data: &[u8]) -> Result<ParsedOrderRecord, ImportError> {
        let text = decode_document(data)?;
        self.parse(&text)
    }

    /// Parse one order document.
    pub fn parse(&self, raw: &str) -> Result<ParsedOrderRecord, ImportError> {
        let result = self.parse_document(raw);
        if let Err(error) = &result {
            warn!(schema = %self.schema.name, kind = error.kind(), %error, "XML order import failed");
        }
        result
    }

    fn parse_document(&self, raw: &str) -> Result<ParsedOrderRecord, ImportError> {
        let text = raw.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK);
        let document = XmlDocument::parse(text)?;

        let root = &document.root;
        if root.name != self.schema.root {
            return Err(ImportError::UnexpectedRootElement {
                expected: self.schema.root.clone(),
                found: Some(root.name.clone()),
            });
        }

        let header = root
            .child(&self.schema.header)
            .ok_or_else(|| ImportError::MissingRequiredElement {
                element: "header".to_string(),
                tag: self.schema.header.clone(),
            })?;

        let mut values: BTreeMap<OrderField, String> = BTreeMap::new();
        for field in OrderField::ALL {
            let value = self
                .schema
                .path(field)
                .and_then(|path| lookup_text(header, path));
            debug!(field = field.as_str(), value = value.as_deref().unwrap_or("N/D"), "order field lookup");
            if let Some(value) = value {
                values.insert(field, value);
            }
        }

        if let Some(raw_date) = values.remove(&OrderField::OrderDate) {
            match normalize_order_date(&raw_date) {
                Some(date) => {
                    values.insert(OrderField::OrderDate, date);
                }
                None => warn!(value = %raw_date, "order date is not in DD/MM/YYYY form"),
            }
        }

        let missing: Vec<OrderField> = OrderField::REQUIRED
            .into_iter()
            .filter(|field| !values.contains_key(field))
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::IncompleteOrderData { missing });
        }

        let mut take = |field: OrderField| values.remove(&field);
        let record = ParsedOrderRecord {
            order_number: take(OrderField::OrderNumber).unwrap_or_default(),
            order_date: take(OrderField::OrderDate).unwrap_or_default(),
            order_type: take(OrderField::OrderType).unwrap_or_default(),
            customer_name: take(OrderField::CustomerName),
            customer_number: take(OrderField::CustomerNumber),
            reseller_name: take(OrderField::ResellerName).unwrap_or_default(),
            reseller_code: take(OrderField::ResellerCode),
            project_name: take(OrderField::ProjectName),
            designer: take(OrderField::Designer),
        };

        debug!(order_number = %record.order_number, schema = %self.schema.name, "parsed XML order");
        Ok(record)
    }
}

fn decode_document(data: &[u8]) -> Result<Cow<'_, str>, ImportError> {
    if let Ok(text) = std::str::from_utf8(data) {
        return Ok(Cow::Borrowed(text));
    }

    // Read up to the declaration so the reader picks up the declared encoding.
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Decl(_) | Event::Start(_) | Event::Empty(_) | Event::Eof) | Err(_) => break,
            Ok(_) => buf.clear(),
        }
    }

    let decoder = reader.decoder();
    decoder.decode(data).map_err(|e| ImportError::GenericParseError {
        message: format!("file is not valid {} text: {}", decoder.encoding().name(), e),
    })
}

/// Resolve a path under `scope` and return its trimmed text, `None` when the
/// element is missing or has no text.
fn lookup_text(scope: &XmlElement, path: &ElementPath) -> Option<String> {
    let mut current = scope;
    for segment in path.segments() {
        current = current.descendant(segment)?;
    }

    let text = current.text_content();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// `DD/MM/YYYY` to `YYYY-MM-DD`. Anything that does not split into exactly
/// three parts is treated as no date.
pub fn normalize_order_date(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.split('/').map(str::trim).collect();
    match parts.as_slice() {
        [day, month, year] => Some(format!("{}-{}-{}", year, month, day)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ORDINE_XML: &str = "<ORDINE><TESTA><NUMERO>1001</NUMERO><DATA>12/01/2024</DATA><TIPO>Standard</TIPO><RIF>Acme Resellers</RIF><CLIENTE>C-55</CLIENTE><VAR><CLI_1>Acme Corp</CLI_1></VAR></TESTA></ORDINE>";

    const LEGACY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Order>
  <Header>
    <OrderNumber>A-77</OrderNumber>
    <OrderDate>05/03/2024</OrderDate>
    <OrderType>Rush</OrderType>
    <Customer>
      <CustomerName>Globex</CustomerName>
      <CustomerNumber>G-1</CustomerNumber>
    </Customer>
    <Reseller>
      <ResellerName>Initech Partners</ResellerName>
      <ResellerCode>IP-9</ResellerCode>
    </Reseller>
    <ProjectName>Warehouse</ProjectName>
    <Designer>M. Rossi</Designer>
  </Header>
</Order>"#;

    #[test]
    fn test_ordine_end_to_end() {
        let record = OrderXmlImporter::default().parse(ORDINE_XML).unwrap();

        assert_eq!(
            record,
            ParsedOrderRecord {
                order_number: "1001".to_string(),
                order_date: "2024-01-12".to_string(),
                order_type: "Standard".to_string(),
                customer_name: Some("Acme Corp".to_string()),
                customer_number: Some("C-55".to_string()),
                reseller_name: "Acme Resellers".to_string(),
                reseller_code: None,
                project_name: None,
                designer: None,
            }
        );
    }

    #[test]
    fn test_legacy_variant_populates_all_fields() {
        let record = OrderXmlImporter::for_variant(SchemaVariant::Legacy)
            .parse(LEGACY_XML)
            .unwrap();

        assert_eq!(record.order_number, "A-77");
        assert_eq!(record.order_date, "2024-03-05");
        assert_eq!(record.customer_name.as_deref(), Some("Globex"));
        assert_eq!(record.reseller_name, "Initech Partners");
        assert_eq!(record.reseller_code.as_deref(), Some("IP-9"));
        assert_eq!(record.project_name.as_deref(), Some("Warehouse"));
        assert_eq!(record.designer.as_deref(), Some("M. Rossi"));
    }

    #[test]
    fn test_tolerates_bom_and_surrounding_whitespace() {
        let input = format!("\u{feff}\n  {}  \n\n", ORDINE_XML);
        let record = OrderXmlImporter::default().parse(&input).unwrap();
        assert_eq!(record.order_number, "1001");

        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(ORDINE_XML.as_bytes());
        assert_eq!(OrderXmlImporter::default().parse_bytes(&bytes).unwrap(), record);
    }

    #[test]
    fn test_malformed_xml() {
        let error = OrderXmlImporter::default()
            .parse("<ORDINE><TESTA><NUMERO>1001</NUMERO></TESTA>")
            .unwrap_err();
        assert_eq!(error.kind(), "MALFORMED_XML");
    }

    #[test]
    fn test_unexpected_root_names_found_element() {
        let error = OrderXmlImporter::default().parse(LEGACY_XML).unwrap_err();
        assert_eq!(
            error,
            ImportError::UnexpectedRootElement {
                expected: "ORDINE".to_string(),
                found: Some("Order".to_string()),
            }
        );
        assert!(error.to_string().contains("<Order>"));
    }

    #[test]
    fn test_missing_header() {
        let error = OrderXmlImporter::default()
            .parse("<ORDINE><CORPO><NUMERO>1</NUMERO></CORPO></ORDINE>")
            .unwrap_err();
        assert_eq!(
            error,
            ImportError::MissingRequiredElement {
                element: "header".to_string(),
                tag: "TESTA".to_string(),
            }
        );
    }

    #[test]
    fn test_header_must_be_direct_child_of_root() {
        let error = OrderXmlImporter::default()
            .parse("<ORDINE><WRAP><TESTA><NUMERO>1</NUMERO></TESTA></WRAP></ORDINE>")
            .unwrap_err();
        assert_eq!(error.kind(), "MISSING_REQUIRED_ELEMENT");
    }

    #[test]
    fn test_missing_reseller_is_incomplete() {
        let xml = "<ORDINE><TESTA><NUMERO>1001</NUMERO><DATA>12/01/2024</DATA><TIPO>Standard</TIPO><RIF>  </RIF></TESTA></ORDINE>";
        let error = OrderXmlImporter::default().parse(xml).unwrap_err();
        assert_eq!(
            error,
            ImportError::IncompleteOrderData {
                missing: vec![OrderField::ResellerName],
            }
        );
    }

    #[test]
    fn test_customer_name_is_optional() {
        let xml = "<ORDINE><TESTA><NUMERO>1001</NUMERO><DATA>12/01/2024</DATA><TIPO>Standard</TIPO><RIF>Acme Resellers</RIF></TESTA></ORDINE>";
        let record = OrderXmlImporter::default().parse(xml).unwrap();
        assert!(record.customer_name.is_none());
        assert!(record.customer_number.is_none());
    }

    #[test]
    fn test_bad_date_fails_at_completeness_check() {
        let xml = "<ORDINE><TESTA><NUMERO>1001</NUMERO><DATA>2024-01-12</DATA><RIF>Acme</RIF></TESTA></ORDINE>";
        let error = OrderXmlImporter::default().parse(xml).unwrap_err();
        assert_eq!(
            error,
            ImportError::IncompleteOrderData {
                missing: vec![OrderField::OrderDate, OrderField::OrderType],
            }
        );
        assert_eq!(
            error.to_string(),
            "missing essential order data: order_date, order_type"
        );
    }

    #[test]
    fn test_invalid_utf8_is_generic_failure() {
        let error = OrderXmlImporter::default()
            .parse_bytes(&[0x3C, 0xFF, 0xFE, 0x3E])
            .unwrap_err();
        assert_eq!(error.kind(), "GENERIC_PARSE_ERROR");
    }

    #[test]
    fn test_declared_latin1_is_decoded() {
        let xml = "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><ORDINE><TESTA><NUMERO>1001</NUMERO><DATA>12/01/2024</DATA><TIPO>Standard</TIPO><RIF>Acme Resellers</RIF><VAR><CLI_1>Citt@ Srl</CLI_1></VAR></TESTA></ORDINE>";
        let bytes: Vec<u8> = xml.bytes().map(|b| if b == b'@' { 0xE0 } else { b }).collect();
        assert!(std::str::from_utf8(&bytes).is_err());

        let record = OrderXmlImporter::default().parse_bytes(&bytes).unwrap();
        assert_eq!(record.customer_name.as_deref(), Some("Citt\u{e0} Srl"));
        assert_eq!(record.reseller_name, "Acme Resellers");
    }

    #[test]
    fn test_text_split_by_comment_or_cdata_keeps_spacing() {
        let xml = "<ORDINE><TESTA><NUMERO>1001</NUMERO><DATA>12/01/2024</DATA><TIPO>Standard</TIPO><RIF>Acme<!-- x --> Resellers</RIF><VAR><CLI_1> Acme <![CDATA[& Co]]> Corp </CLI_1></VAR></TESTA></ORDINE>";
        let record = OrderXmlImporter::default().parse(xml).unwrap();

        assert_eq!(record.reseller_name, "Acme Resellers");
        assert_eq!(record.customer_name.as_deref(), Some("Acme & Co Corp"));
    }

    #[test]
    fn test_normalize_order_date() {
        assert_eq!(normalize_order_date("05/03/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_order_date("5/3/2024").as_deref(), Some("2024-3-5"));
        assert_eq!(normalize_order_date("05-03-2024"), None);
        assert_eq!(normalize_order_date("05/03/2024/1"), None);
    }

    proptest! {
        /// Any DD/MM/YYYY date is reordered into YYYY-MM-DD.
        #[test]
        fn prop_date_is_reordered(day in 1u32..=31, month in 1u32..=12, year in 1900u32..2100) {
            let raw = format!("{:02}/{:02}/{}", day, month, year);
            let expected = format!("{}-{:02}-{:02}", year, month, day);
            prop_assert_eq!(normalize_order_date(&raw), Some(expected));
        }

        /// Parsing is pure: the same text always yields the same record.
        #[test]
        fn prop_parse_is_idempotent(
            number in "[A-Z0-9-]{1,12}",
            reseller in "[A-Za-z][A-Za-z ]{0,20}[A-Za-z]",
            kind in "[A-Za-z]{1,10}",
        ) {
            let xml = format!(
                "<ORDINE><TESTA><NUMERO>{}</NUMERO><DATA>01/02/2024</DATA><TIPO>{}</TIPO><RIF>{}</RIF></TESTA></ORDINE>",
                number, kind, reseller
            );
            let importer = OrderXmlImporter::default();
            let first = importer.parse(&xml).unwrap();
            let second = importer.parse(&xml).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.reseller_name, reseller);
        }
    }
}
