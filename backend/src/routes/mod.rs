//! Route definitions for the Basket Stock API

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. Everything except login sits behind the PIN gate.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/session", get(handlers::session))
        .nest("/products", product_routes())
        .nest("/stock", stock_routes())
        .nest("/basket-types", basket_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/supervisors", supervisor_routes())
        .nest("/leaders", leader_routes())
        .nest("/cells", cell_routes())
        .nest("/families", family_routes())
        .nest("/deliveries", delivery_routes())
        .route("/reports/deliveries", get(handlers::delivery_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Login (public)
        .route("/auth/login", post(handlers::login))
        .merge(protected)
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::current_stock))
        .route("/entries", post(handlers::create_stock_entry))
        .route("/movements", get(handlers::list_movements))
}

fn basket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_basket_types).post(handlers::create_basket_type))
        .route(
            "/:basket_type_id",
            get(handlers::get_basket_type)
                .put(handlers::update_basket_type)
                .delete(handlers::delete_basket_type),
        )
        .route(
            "/:basket_type_id/items",
            get(handlers::list_recipe_items).put(handlers::upsert_recipe_item),
        )
        .route(
            "/:basket_type_id/items/:item_id",
            delete(handlers::remove_recipe_item),
        )
        .route("/:basket_type_id/analysis", get(handlers::analyze_basket))
        .route("/:basket_type_id/summary", get(handlers::basket_summary))
        .route("/:basket_type_id/mountable", get(handlers::mountable_baskets))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/quick-checkout", post(handlers::quick_checkout))
}

fn supervisor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_supervisors).post(handlers::create_supervisor))
        .route(
            "/:supervisor_id",
            get(handlers::get_supervisor)
                .put(handlers::update_supervisor)
                .delete(handlers::delete_supervisor),
        )
}

fn leader_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_leaders).post(handlers::create_leader))
        .route(
            "/:leader_id",
            get(handlers::get_leader)
                .put(handlers::update_leader)
                .delete(handlers::delete_leader),
        )
}

fn cell_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_cells).post(handlers::create_cell))
        .route(
            "/:cell_id",
            get(handlers::get_cell)
                .put(handlers::update_cell)
                .delete(handlers::delete_cell),
        )
}

fn family_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_families).post(handlers::create_family))
        .route(
            "/:family_id",
            get(handlers::get_family)
                .put(handlers::update_family)
                .delete(handlers::delete_family),
        )
}

fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_deliveries).post(handlers::record_delivery))
        .route("/custom", post(handlers::record_custom_delivery))
        .route("/:delivery_id", get(handlers::get_delivery))
}
