use axum::{Router, middleware::from_fn, routing::get};
use crate::{AppState, auth::require_admin, controllers::profit_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    let profit = Router::new()
        .route("/", get(profit_controller::get_net_profit))
        .route_layer(from_fn(require_admin));

    router.nest("/api/profit", profit)
}
