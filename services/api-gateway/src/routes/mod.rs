use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::{handlers::*, middleware::auth_middleware, AppState};

pub fn create_api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/session", get(current_session))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/import", post(import_order))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route_layer(from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/health/detailed", get(detailed_health_check))
        .merge(protected)
}
