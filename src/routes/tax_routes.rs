use axum::{Router, middleware::from_fn, routing::{delete, get, put}};
use crate::{AppState, auth::require_admin, controllers::tax_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    let taxes = Router::new()
        .route("/", get(tax_controller::get_taxes).post(tax_controller::create_tax))
        .route("/analytics/summary", get(tax_controller::get_tax_summary))
        .route("/:id", get(tax_controller::get_tax_by_id))
        .route("/update/:id", put(tax_controller::update_tax))
        .route("/delete/:id", delete(tax_controller::delete_tax))
        .route_layer(from_fn(require_admin));

    router.nest("/api/tax", taxes)
}
