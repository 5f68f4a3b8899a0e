//! Order import flow
//!
//! Checks the operator may import, parses the uploaded XML, stores the order
//! and reports the outcome. One file per call; nothing is retried.

pub mod notifier;

use std::sync::Arc;
use thiserror::Error;

use orderdesk_database::{OrderStore, StoreError};
use orderdesk_models::{AccessDenied, Capability, NewOrder, OrderRecord, Session};
use orderdesk_utils::{
    validate_file_size, validate_file_type, validate_model, ImportConfig, ImportError, OrderDeskError,
    OrderXmlImporter,
};

use crate::metrics::IMPORT_OUTCOMES;
pub use notifier::{Notice, NoticeLevel, Notifier, TracingNotifier};

#[derive(Debug, Error)]
pub enum ImportFailure {
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    #[error("{message}")]
    InvalidFile { message: String },

    #[error(transparent)]
    Parse(#[from] ImportError),

    #[error("invalid order data: {message}")]
    InvalidRecord { message: String },

    #[error("order \"{order_number}\" already exists")]
    Duplicate { order_number: String },

    #[error("order could not be saved: {0}")]
    Storage(StoreError),
}

impl ImportFailure {
    /// Label used for the outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "forbidden",
            Self::InvalidFile { .. } => "invalid_file",
            Self::Parse(ImportError::MalformedXml { .. }) => "malformed_xml",
            Self::Parse(ImportError::UnexpectedRootElement { .. }) => "unexpected_root_element",
            Self::Parse(ImportError::MissingRequiredElement { .. }) => "missing_required_element",
            Self::Parse(ImportError::IncompleteOrderData { .. }) => "incomplete_order_data",
            Self::Parse(ImportError::GenericParseError { .. }) => "generic_parse_error",
            Self::InvalidRecord { .. } => "invalid_record",
            Self::Duplicate { .. } => "duplicate",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl From<ImportFailure> for OrderDeskError {
    fn from(failure: ImportFailure) -> Self {
        match failure {
            ImportFailure::Forbidden(denied) => denied.into(),
            ImportFailure::InvalidFile { message } => OrderDeskError::validation("file", message),
            ImportFailure::Parse(error) => error.into(),
            ImportFailure::InvalidRecord { message } => OrderDeskError::validation("order", message),
            duplicate @ ImportFailure::Duplicate { .. } => OrderDeskError::conflict(duplicate.to_string()),
            ImportFailure::Storage(error) => OrderDeskError::database(error.to_string()),
        }
    }
}

pub struct OrderImportService {
    importer: OrderXmlImporter,
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    config: ImportConfig,
}

impl OrderImportService {
    pub fn new(
        importer: OrderXmlImporter,
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        config: ImportConfig,
    ) -> Self {
        Self {
            importer,
            store,
            notifier,
            config,
        }
    }

    pub fn schema_name(&self) -> &str {
        &self.importer.schema().name
    }

    /// Import one uploaded order file on behalf of `session`.
    pub async fn import(
        &self,
        session: &Session,
        filename: &str,
        data: &[u8],
    ) -> Result<OrderRecord, ImportFailure> {
        let result = self.run(session, filename, data).await;

        match &result {
            Ok(record) => {
                IMPORT_OUTCOMES.with_label_values(&["imported"]).inc();
                self.notifier
                    .success(&format!("Order \"{}\" imported successfully", record.order_number));
                tracing::info!(
                    order_id = %record.id,
                    order_number = %record.order_number,
                    user_id = %session.user_id,
                    filename,
                    "Order imported"
                );
            }
            Err(failure) => {
                IMPORT_OUTCOMES.with_label_values(&[failure.outcome()]).inc();
                self.notifier.error(&failure.to_string());
                tracing::warn!(
                    outcome = failure.outcome(),
                    error = %failure,
                    user_id = %session.user_id,
                    filename,
                    "Order import rejected"
                );
            }
        }

        result
    }

    async fn run(&self, session: &Session, filename: &str, data: &[u8]) -> Result<OrderRecord, ImportFailure> {
        session.require(Capability::ImportOrders)?;

        validate_file_type(filename, &self.config.allowed_extensions)
            .and_then(|_| validate_file_size(data.len() as u64, self.config.max_file_size))
            .map_err(|e| ImportFailure::InvalidFile { message: e.to_string() })?;

        let parsed = self.importer.parse_bytes(data)?;

        let order = NewOrder::try_from(parsed).map_err(|e| ImportFailure::InvalidRecord {
            message: e
                .message
                .as_deref()
                .map(str::to_string)
                .unwrap_or_else(|| e.code.to_string()),
        })?;
        validate_model(&order).map_err(|e| ImportFailure::InvalidRecord { message: e.to_string() })?;

        self.store.insert(order).await.map_err(|error| match error {
            StoreError::Conflict { order_number } => ImportFailure::Duplicate { order_number },
            other => ImportFailure::Storage(other),
        })
    }
}
