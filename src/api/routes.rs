use crate::api::handlers::{auth, checkpoints, device_docs, devices, system, users};
use crate::auth::auth_middleware;
use crate::inventory::DeviceKind;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};

/// Device and inspection-document routes for one kind.
fn kind_routes(kind: DeviceKind) -> Router<AppState> {
    let list = format!("/{}", kind.list_segment());
    let item = format!("/{}", kind.segment());
    let by_id = format!("/{}/{{id}}", kind.segment());

    Router::new()
        .route(&list, get(devices::list_devices))
        .route(&item, post(devices::create_device))
        .route(
            &by_id,
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route(&format!("/doc{}", list), get(device_docs::list_docs))
        .route(&format!("/doc{}", item), post(device_docs::create_doc))
        .route(
            &format!("/doc{}", by_id),
            get(device_docs::get_doc)
                .put(device_docs::update_doc)
                .delete(device_docs::delete_doc),
        )
        .layer(Extension(kind))
}

/// Routes mounted under `/api`.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let mut public_routes = Router::new()
        // Public routes (no auth required)
        .route("/login", post(auth::login));

    if state.config.server.debug {
        public_routes = public_routes.route("/version", get(system::version));
    }

    let mut protected_routes = Router::new()
        .route("/me", get(auth::me))
        // Account management
        .route("/user", post(users::create_user))
        .route("/users", get(users::list_users))
        .route(
            "/user/{username}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Inventory
        .route("/device/count", get(devices::device_count))
        .route("/docs", get(device_docs::list_all_docs))
        .route(
            "/checkpoint/{device}",
            get(checkpoints::get_checklist).put(checkpoints::update_checklist),
        );

    for kind in DeviceKind::ALL {
        protected_routes = protected_routes.merge(kind_routes(kind));
    }

    let protected_routes = protected_routes.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    public_routes.merge(protected_routes)
}
