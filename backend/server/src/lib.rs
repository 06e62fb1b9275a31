//! Documentation of a neighborhood food sharing platform.
//!
//! Neighbors post surplus food, browse what is nearby, message each other,
//! claim a post and review the exchange afterwards.
//!
//!
//!
//! # General Infrastructure
//! - User goes to the public endpoint running the reverse proxy
//! - Proxy authenticates the user and forwards the request with `X-User-Id`
//! - This server trusts that header and never sees credentials
//! - One SQLite file on the server machine, see the `bank` crate
//!
//!
//!
//! # Claims
//!
//! **Goal**: two neighbors tapping "claim" on the same post at the same time
//! must not both walk away thinking they got it.
//!
//! - Claim handler calls into `bank::claim`
//! - The claim runs in an immediate write transaction
//! - Winner gets 200 with the claimed post
//! - Everyone else gets 409, the owner gets 400
//!
//!
//!
//! # Routes
//!
//! | method | path | caller |
//! |---|---|---|
//! | GET | `/` | anyone |
//! | POST | `/register` | anyone |
//! | GET, PUT | `/me` | user |
//! | GET | `/categories` | anyone |
//! | POST | `/categories` | admin |
//! | GET | `/food-posts` | anyone |
//! | POST | `/food-posts` | user |
//! | GET | `/food-posts/{id}` | anyone |
//! | PUT, DELETE | `/food-posts/{id}` | owner |
//! | POST | `/food-posts/{id}/claim` | user |
//! | GET, POST | `/messages` | user |
//! | POST | `/reviews` | user |
//! | GET | `/users/{id}/reviews` | anyone |
//!
//!
//!
//! # Setup
//!
//! Create the database and default rows.
//! ```sh
//! cargo run -p seed -- --database food.db
//! ```
//!
//! Start the server.
//! ```sh
//! RUST_LOG=info DATABASE_PATH=food.db cargo run -p food
//! ```
//!
//! Hammer one post with concurrent claims.
//! ```sh
//! cargo run -p tester -- --post 1 --claimants 2,3,4,5
//! ```
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{ACCEPT, CONTENT_TYPE},
    },
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod search;
pub mod state;
pub mod utils;

use config::Config;
use extract::USER_ID_HEADER;
use routes::{
    categories_handler, claim_handler, create_category_handler, create_post_handler,
    create_review_handler, delete_post_handler, home_handler, me_handler, messages_handler,
    post_handler, register_handler, reviews_handler, search_handler, send_message_handler,
    update_me_handler, update_post_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(state.config.cors_max_age);

    Router::new()
        .route("/", get(home_handler))
        .route("/register", post(register_handler))
        .route("/me", get(me_handler).put(update_me_handler))
        .route(
            "/categories",
            get(categories_handler).post(create_category_handler),
        )
        .route(
            "/food-posts",
            get(search_handler).post(create_post_handler),
        )
        .route(
            "/food-posts/{id}",
            get(post_handler)
                .put(update_post_handler)
                .delete(delete_post_handler),
        )
        .route("/food-posts/{id}/claim", post(claim_handler))
        .route(
            "/messages",
            get(messages_handler).post(send_message_handler),
        )
        .route("/reviews", post(create_review_handler))
        .route("/users/{id}/reviews", get(reviews_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
