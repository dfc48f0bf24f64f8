//! Basket Stock - Backend Server
//!
//! Tracks donated food stock for a church's basket program: products,
//! basket recipes, how many baskets can be assembled, and deliveries to
//! registered families.

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod middleware;
mod routes;
mod services;
mod store;

pub use config::Config;

use store::{MemoryRowStore, PgRowStore, RowStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RowStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "basket_stock_server=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Basket Stock Server");
    tracing::info!("Environment: {}", config.environment);
    if !config.auth.pin_required() {
        tracing::warn!("No access PIN configured; every route is open");
    }

    let store: Arc<dyn RowStore> = if config.database.is_memory() {
        tracing::info!("Using in-memory row store");
        Arc::new(MemoryRowStore::new())
    } else {
        tracing::info!("Connecting to database...");
        let pg = PgRowStore::connect(&config.database).await?;
        tracing::info!("Database connection established");

        // Run migrations in development
        if config.environment == "development" {
            tracing::info!("Running database migrations...");
            pg.migrate().await?;
            tracing::info!("Migrations completed");
        }
        Arc::new(pg)
    };

    // Create application state
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((ip, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    store.close().await;
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Signal handlers unavailable, falling back to ctrl-c");
            }
        }
    }
    let _ = tokio::signal::ctrl_c().await;
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Basket Stock API v1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with_pin(pin: &str) -> Router {
        let mut config = Config::for_tests();
        config.auth.pin = pin.to_string();
        create_app(AppState {
            store: Arc::new(MemoryRowStore::new()),
            config: Arc::new(config),
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app_with_pin("1234");
        let (status, body) = send(&app, get_request("/api/v1/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], "connected");
    }

    #[tokio::test]
    async fn test_pin_gate() {
        let app = app_with_pin("1234");

        let (status, _) = send(&app, get_request("/api/v1/products", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/auth/login", json!({ "pin": "0000" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/auth/login", json!({ "pin": "1234" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["access_token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get_request("/api/v1/auth/session", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pin_protected"], true);

        let (status, _) = send(&app, get_request("/api/v1/products", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_token_signed_with_guessed_secret_is_refused() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let app = app_with_pin("4321");
        let now = chrono::Utc::now().timestamp();
        let claims = services::auth::Claims {
            sub: "anyone".to_string(),
            exp: now + 600,
            iat: now,
        };
        let forged = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"change-me"))
            .unwrap();

        let (status, body) = send(&app, get_request("/api/v1/products", Some(&forged))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_basket_flow_over_http() {
        let app = app_with_pin("");

        let (status, rice) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/products",
                json!({ "name": "Arroz", "unit": "kg" }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let rice_id = rice["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/stock/entries",
                json!({ "product_id": rice_id, "quantity": 7.0 }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, basket) = send(
            &app,
            json_request("POST", "/api/v1/basket-types", json!({ "name": "Cesta Adulto" }), None),
        )
        .await;
        let basket_id = basket["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/basket-types/{}/items", basket_id),
                json!({ "product_id": rice_id, "quantity_required": 2.0 }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, summary) = send(
            &app,
            get_request(&format!("/api/v1/basket-types/{}/summary", basket_id), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["complete"], 3);
        assert_eq!(summary["limiting_product"], "Arroz");
        assert_eq!(summary["missing_for_next"], 1.0);

        let (status, _) = send(
            &app,
            get_request(&format!("/api/v1/basket-types/{}/mountable", uuid::Uuid::new_v4()), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responses_are_gzipped_on_request() {
        let app = app_with_pin("");
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/products",
                json!({ "name": "Feijão carioca tipo 1", "unit": "kg" }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let request = Request::builder()
            .uri("/api/v1/products")
            .header(header::ACCEPT_ENCODING, "gzip")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    }

    #[tokio::test]
    async fn test_validation_error_body_is_bilingual() {
        let app = app_with_pin("");
        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/products", json!({ "name": "   " }), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "name");
        assert!(body["error"]["message_pt"].is_string());
    }
}
