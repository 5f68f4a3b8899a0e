//! # Orderdesk Core Domain Models
//!
//! Domain models shared by the order desk services.
//!
//! ## Key Models
//!
//! - **ParsedOrderRecord**: The normalized record produced by an XML order import
//! - **NewOrder / OrderUpdate**: Typed payloads for creating and editing orders
//! - **OrderRecord**: A persisted order row
//! - **OrderQuery / OrderPage**: Filters, sorting and pagination for order listings
//! - **Session / Profile / Role**: Who is acting and what they are allowed to do
//!
//! ## Validation
//!
//! Write payloads derive `validator::Validate`:
//! - Length validation for string fields
//! - Page size bounds and date range ordering on queries

pub mod order;
pub mod profile;


pub use order::*;
pub use profile::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;
    use validator::Validate;

    fn parsed_record() -> ParsedOrderRecord {
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
    }

    fn admin_session() -> Session {
        Session::new(
            Uuid::new_v4(),
            Some(Profile {
                id: Uuid::new_v4(),
                first_name: Some("Ada".to_string()),
                last_name: None,
                role: Role::Admin,
                agent_id: None,
            }),
        )
    }

    #[test]
    fn test_new_order_from_parsed_record() {
        let order = NewOrder::try_from(parsed_record()).unwrap();

        assert_eq!(order.order_number, "1001");
        assert_eq!(order.order_date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
        assert_eq!(order.order_type.as_deref(), Some("Standard"));
        assert_eq!(order.customer_name.as_deref(), Some("Acme Corp"));
        assert!(order.agent_id.is_none());
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_new_order_rejects_impossible_date() {
        let mut record = parsed_record();
        record.order_date = "2024-13-45".to_string();

        let error = NewOrder::try_from(record).unwrap_err();
        assert_eq!(error.code, "order_date");
    }

    #[test]
    fn test_new_order_requires_reseller_name() {
        let mut order = NewOrder::try_from(parsed_record()).unwrap();
        order.reseller_name = String::new();

        let errors = order.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("reseller_name"));
    }

    #[test]
    fn test_order_update_keeps_order_number() {
        let created = Utc::now();
        let mut record = OrderRecord::from_new(NewOrder::try_from(parsed_record()).unwrap(), created);

        record.apply_update(
            OrderUpdate {
                order_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                order_type: Some("Express".to_string()),
                customer_name: None,
                customer_number: None,
                reseller_name: "Other Reseller".to_string(),
                reseller_code: Some("R-9".to_string()),
                project_name: None,
                designer: None,
                agent_id: None,
            },
            created + chrono::Duration::seconds(5),
        );

        assert_eq!(record.order_number, "1001");
        assert_eq!(record.reseller_name, "Other Reseller");
        assert_eq!(record.created_at, created);
        assert!(record.updated_at > created);
    }

    #[test]
    fn test_agent_name_sort_and_reassignment() {
        let query: OrderQuery = serde_json::from_str(r#"{"sort": "agent_name", "direction": "asc"}"#).unwrap();
        assert_eq!(query.sort.column_name(), "agent_name");

        let mut record = OrderRecord::from_new(NewOrder::try_from(parsed_record()).unwrap(), Utc::now());
        record.agent_name = Some("Marta".to_string());
        let update = OrderUpdate {
            order_date: record.order_date,
            order_type: None,
            customer_name: None,
            customer_number: None,
            reseller_name: record.reseller_name.clone(),
            reseller_code: None,
            project_name: None,
            designer: None,
            agent_id: Some(Uuid::new_v4()),
        };
        record.apply_update(update, Utc::now());
        assert!(record.agent_name.is_none());
    }

    #[test]
    fn test_order_query_defaults_and_offset() {
        let query = OrderQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 10);
        assert_eq!(query.sort, OrderSortColumn::OrderDate);
        assert_eq!(query.direction, SortDirection::Desc);
        assert_eq!(query.offset(), 0);

        let third_page = OrderQuery { page: 3, per_page: 25, ..OrderQuery::default() };
        assert_eq!(third_page.offset(), 50);
    }

    #[test]
    fn test_order_query_deserializes_with_defaults() {
        let query: OrderQuery = serde_json::from_str(r#"{"search": "10", "sort": "reseller_name"}"#).unwrap();
        assert_eq!(query.search_term(), Some("10"));
        assert_eq!(query.sort, OrderSortColumn::ResellerName);
        assert_eq!(query.direction, SortDirection::Desc);
        assert_eq!(query.per_page, 10);
    }

    #[test]
    fn test_order_query_rejects_inverted_range() {
        let query = OrderQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..OrderQuery::default()
        };
        assert!(query.validate().is_err());

        let oversized = OrderQuery { per_page: 500, ..OrderQuery::default() };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn test_order_query_matching() {
        let record = OrderRecord::from_new(NewOrder::try_from(parsed_record()).unwrap(), Utc::now());

        let by_number = OrderQuery { search: Some(" 100 ".to_string()), ..OrderQuery::default() };
        assert!(by_number.matches(&record));

        let outside = OrderQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..OrderQuery::default()
        };
        assert!(!outside.matches(&record));

        let inclusive = OrderQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 12),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 12),
            ..OrderQuery::default()
        };
        assert!(inclusive.matches(&record));
    }

    #[test]
    fn test_order_page_total_pages() {
        let query = OrderQuery { per_page: 10, ..OrderQuery::default() };
        assert_eq!(OrderPage::new(Vec::new(), 0, &query).total_pages, 0);
        assert_eq!(OrderPage::new(Vec::new(), 10, &query).total_pages, 1);
        assert_eq!(OrderPage::new(Vec::new(), 11, &query).total_pages, 2);
    }

    #[test]
    fn test_admin_session_capabilities() {
        let session = admin_session();
        assert!(session.is_admin());
        assert!(session.can_edit());
        assert!(session.require(Capability::ImportOrders).is_ok());
    }

    #[test]
    fn test_viewer_session_is_read_only() {
        let mut session = admin_session();
        if let Some(profile) = session.profile.as_mut() {
            profile.role = Role::Viewer;
        }

        assert!(!session.is_admin());
        assert!(!session.can_edit());
        assert!(session.can(Capability::ViewOrders));
        assert_eq!(
            session.require(Capability::ImportOrders),
            Err(AccessDenied { capability: Capability::ImportOrders })
        );
    }

    #[test]
    fn test_role_capability_sets() {
        assert_eq!(
            Role::Admin.capabilities(),
            &[Capability::ViewOrders, Capability::EditOrders, Capability::ImportOrders]
        );
        assert_eq!(Role::Viewer.capabilities(), &[Capability::ViewOrders]);
        let json = serde_json::to_string(&Capability::ImportOrders).unwrap();
        assert_eq!(json, "\"import_orders\"");
    }

    #[test]
    fn test_session_without_profile_has_no_capabilities() {
        let session = Session::new(Uuid::new_v4(), None);
        assert!(session.capabilities().is_empty());
        assert!(!session.can(Capability::ViewOrders));
    }

    #[test]
    fn test_profile_display_name() {
        let session = admin_session();
        let profile = session.profile.unwrap();
        assert_eq!(profile.display_name().as_deref(), Some("Ada"));
    }

    #[test]
    fn test_order_field_names() {
        assert_eq!(OrderField::ResellerName.to_string(), "reseller_name");
        assert!(OrderField::OrderDate.is_required());
        assert!(!OrderField::CustomerName.is_required());
        let json = serde_json::to_string(&OrderField::CustomerNumber).unwrap();
        assert_eq!(json, "\"customer_number\"");
    }
}
