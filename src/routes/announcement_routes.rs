use axum::{Router, middleware::from_fn, routing::{delete, get, put}};
use crate::{AppState, auth::require_admin, controllers::announcement_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    let any_user = Router::new()
        .route("/active/announcement", get(announcement_controller::get_active_announcements));

    let admin_only = Router::new()
        .route(
            "/",
            get(announcement_controller::get_announcements).post(announcement_controller::create_announcement),
        )
        .route("/:id", get(announcement_controller::get_announcement_by_id))
        .route("/update/:id", put(announcement_controller::update_announcement))
        .route("/delete/:id", delete(announcement_controller::delete_announcement))
        .route_layer(from_fn(require_admin));

    router.nest("/api/announcements", any_user.merge(admin_only))
}
