use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::auth_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    let auth = Router::new()
        .route("/login", post(auth_controller::post_login))
        .route("/register", post(auth_controller::post_register))
        .route("/me", get(auth_controller::get_me));

    router.nest("/api/auth", auth)
}
