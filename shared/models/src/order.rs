//! Order domain models for the order desk.
//!
//! This module defines the record produced by an XML import, the typed payloads
//! used to create and edit orders, the persisted order row, and the listing
//! query used by the orders screen.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Date format stored for `order_date` (`YYYY-MM-DD`).
pub const ORDER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Logical fields of an order, independent of any vendor XML layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    OrderNumber,
    OrderDate,
    OrderType,
    CustomerName,
    CustomerNumber,
    ResellerName,
    ResellerCode,
    ProjectName,
    Designer,
}

impl OrderField {
    pub const ALL: [OrderField; 9] = [
        OrderField::OrderNumber,
        OrderField::OrderDate,
        OrderField::OrderType,
        OrderField::CustomerName,
        OrderField::CustomerNumber,
        OrderField::ResellerName,
        OrderField::ResellerCode,
        OrderField::ProjectName,
        OrderField::Designer,
    ];

    /// Fields that must be non-empty for an import to produce a record.
    pub const REQUIRED: [OrderField; 4] = [
        OrderField::OrderNumber,
        OrderField::OrderDate,
        OrderField::OrderType,
        OrderField::ResellerName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderNumber => "order_number",
            Self::OrderDate => "order_date",
            Self::OrderType => "order_type",
            Self::CustomerName => "customer_name",
            Self::CustomerNumber => "customer_number",
            Self::ResellerName => "reseller_name",
            Self::ResellerCode => "reseller_code",
            Self::ProjectName => "project_name",
            Self::Designer => "designer",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized output of an XML order import.
///
/// `order_date` is kept as the `YYYY-MM-DD` string the importer produced;
/// conversion to a calendar date happens when the record becomes a [`NewOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOrderRecord {
    pub order_number: String,
    pub order_date: String,
    pub order_type: String,
    pub customer_name: Option<String>,
    pub customer_number: Option<String>,
    pub reseller_name: String,
    pub reseller_code: Option<String>,
    pub project_name: Option<String>,
    pub designer: Option<String>,
}

/// Insert payload for the order store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewOrder {
    #[validate(length(min = 1, max = 255, message = "Order number must be between 1 and 255 characters"))]
    pub order_number: String,
    pub order_date: NaiveDate,
    #[validate(length(max = 255))]
    pub order_type: Option<String>,
    #[validate(length(max = 255))]
    pub customer_name: Option<String>,
    #[validate(length(max = 255))]
    pub customer_number: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Reseller name must be between 1 and 255 characters"))]
    pub reseller_name: String,
    #[validate(length(max = 255))]
    pub reseller_code: Option<String>,
    #[validate(length(max = 255))]
    pub project_name: Option<String>,
    #[validate(length(max = 255))]
    pub designer: Option<String>,
    pub agent_id: Option<Uuid>,
}

impl TryFrom<ParsedOrderRecord> for NewOrder {
    type Error = ValidationError;

    fn try_from(record: ParsedOrderRecord) -> Result<Self, Self::Error> {
        let order_date = NaiveDate::parse_from_str(&record.order_date, ORDER_DATE_FORMAT)
            .map_err(|_| {
                let mut error = ValidationError::new("order_date");
                error.message = Some(format!("'{}' is not a valid calendar date", record.order_date).into());
                error
            })?;

        Ok(Self {
            order_number: record.order_number,
            order_date,
            order_type: Some(record.order_type),
            customer_name: record.customer_name,
            customer_number: record.customer_number,
            reseller_name: record.reseller_name,
            reseller_code: record.reseller_code,
            project_name: record.project_name,
            designer: record.designer,
            agent_id: None,
        })
    }
}

/// Edit payload. The order number is fixed once an order exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrderUpdate {
    pub order_date: NaiveDate,
    #[validate(length(max = 255))]
    pub order_type: Option<String>,
    #[validate(length(max = 255))]
    pub customer_name: Option<String>,
    #[validate(length(max = 255))]
    pub customer_number: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Reseller name must be between 1 and 255 characters"))]
    pub reseller_name: String,
    #[validate(length(max = 255))]
    pub reseller_code: Option<String>,
    #[validate(length(max = 255))]
    pub project_name: Option<String>,
    #[validate(length(max = 255))]
    pub designer: Option<String>,
    pub agent_id: Option<Uuid>,
}

/// Persisted order row, with the assigned agent's name joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrderRecord {
    pub id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub order_type: Option<String>,
    pub customer_name: Option<String>,
    pub customer_number: Option<String>,
    pub reseller_name: String,
    pub reseller_code: Option<String>,
    pub project_name: Option<String>,
    pub designer: Option<String>,
    pub agent_id: Option<Uuid>,
    pub agent_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn from_new(order: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_number: order.order_number,
            order_date: order.order_date,
            order_type: order.order_type,
            customer_name: order.customer_name,
            customer_number: order.customer_number,
            reseller_name: order.reseller_name,
            reseller_code: order.reseller_code,
            project_name: order.project_name,
            designer: order.designer,
            agent_id: order.agent_id,
            agent_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit, leaving `order_number` and `created_at` untouched.
    pub fn apply_update(&mut self, update: OrderUpdate, now: DateTime<Utc>) {
        self.order_date = update.order_date;
        self.order_type = update.order_type;
        self.customer_name = update.customer_name;
        self.customer_number = update.customer_number;
        self.reseller_name = update.reseller_name;
        self.reseller_code = update.reseller_code;
        self.project_name = update.project_name;
        self.designer = update.designer;
        if self.agent_id != update.agent_id {
            self.agent_name = None;
        }
        self.agent_id = update.agent_id;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortColumn {
    OrderNumber,
    #[default]
    OrderDate,
    CustomerName,
    ResellerName,
    AgentName,
    CreatedAt,
    UpdatedAt,
}

impl OrderSortColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::OrderNumber => "order_number",
            Self::OrderDate => "order_date",
            Self::CustomerName => "customer_name",
            Self::ResellerName => "reseller_name",
            Self::AgentName => "agent_name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

/// Filters, sort and pagination for the orders listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_query_dates"))]
pub struct OrderQuery {
    /// Case-insensitive substring of `order_number`.
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort: OrderSortColumn,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page numbers start at 1"))]
    pub page: u32,
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub per_page: u32,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            search: None,
            start_date: None,
            end_date: None,
            sort: OrderSortColumn::default(),
            direction: SortDirection::default(),
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl OrderQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Search term with surrounding whitespace removed, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub fn matches(&self, order: &OrderRecord) -> bool {
        if let Some(term) = self.search_term() {
            if !order
                .order_number
                .to_lowercase()
                .contains(&term.to_lowercase())
            {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if order.order_date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if order.order_date > end {
                return false;
            }
        }
        true
    }
}

fn validate_query_dates(query: &OrderQuery) -> Result<(), ValidationError> {
    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) if start > end => {
            Err(ValidationError::new("start_date_after_end_date"))
        }
        _ => Ok(()),
    }
}

/// One page of orders plus the total matching the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<OrderRecord>,
    pub total_count: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl OrderPage {
    pub fn new(orders: Vec<OrderRecord>, total_count: u64, query: &OrderQuery) -> Self {
        let per_page = u64::from(query.per_page.max(1));
        Self {
            orders,
            total_count,
            page: query.page,
            per_page: query.per_page,
            total_pages: total_count.div_ceil(per_page),
        }
    }
}
