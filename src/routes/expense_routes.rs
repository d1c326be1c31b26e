use axum::{Router, middleware::from_fn, routing::{delete, get, put}};
use crate::{AppState, auth::require_admin, controllers::expense_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    let expenses = Router::new()
        .route(
            "/",
            get(expense_controller::get_all_expenses).post(expense_controller::create_expense),
        )
        .route("/expense/total-expance", get(expense_controller::get_total_expenses))
        .route("/expense/:id", get(expense_controller::get_expense_by_id))
        .route("/search-expense", get(expense_controller::search_expense))
        .route("/update/:id", put(expense_controller::update_expense))
        .route("/delete/:id", delete(expense_controller::delete_expense))
        .route("/monthly-expenses", get(expense_controller::get_monthly_expense_data))
        .route("/yearly-expenses", get(expense_controller::get_yearly_expense_data))
        .route_layer(from_fn(require_admin));

    router.nest("/api/expences", expenses)
}
