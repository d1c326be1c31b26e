use axum::{Router, middleware::from_fn, routing::{delete, get, post, put}};
use crate::{AppState, auth::require_admin, controllers::user_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    // listing and profile edits are open to any signed-in user
    let users = Router::new()
        .route(
            "/",
            get(user_controller::get_users)
                .merge(post(user_controller::create_user).route_layer(from_fn(require_admin))),
        )
        .route("/:id", get(user_controller::get_user_by_id))
        .route("/update/:id", put(user_controller::update_user))
        .route(
            "/delete/:id",
            delete(user_controller::delete_user).route_layer(from_fn(require_admin)),
        );

    router.nest("/api/users", users)
}
