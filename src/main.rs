#![warn(clippy::pedantic)]

mod client;
mod config;
mod error;
mod escape;
mod extract;
mod model;
mod ratelimit;
mod route;
mod service;
mod store;

use std::net::SocketAddr;

use argon2::Argon2;
use axum::{
	extract::DefaultBodyLimit,
	http::{header, HeaderValue, Method},
	routing::get,
	Router,
};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{
	catch_panic::CatchPanicLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
	trace::TraceLayer,
};

use client::IdentityClient;
use config::Config;
use store::Store;

pub use error::Error;

pub type AppState = State;

/// The shared application state.
///
/// This contains all shared dependencies that handlers need to access:
/// the storage handle, the password hasher and the client for the
/// external identity service. It is constructed once at startup and
/// handed to substates via [`axum::extract::FromRef`].
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: Store,
	pub hasher: Argon2<'static>,
	pub identity: IdentityClient,
}

/// Maximum accepted request body, applied before any parsing.
const BODY_LIMIT: usize = 10 * 1024;

/// Assembles the full router: routes mounted under both `/api` and the
/// bare path, plus the cross-cutting middleware stack.
///
/// The rate limiter is optional because it keys on the peer address,
/// which only exists when serving over a real socket.
fn app(state: State, config: &Config, limiter: Option<ratelimit::RateLimit>) -> Router {
	let api = route::routes();

	let mut router = Router::new()
		.route("/health", get(route::health))
		.nest("/api", api.clone())
		.merge(api)
		.fallback(route::fallback)
		.with_state(state)
		.layer(
			ServiceBuilder::new()
				.layer(DefaultBodyLimit::max(BODY_LIMIT))
				.layer(TraceLayer::new_for_http()),
		);

	if let Some(config) = limiter {
		router = router.layer(GovernorLayer { config });
	}

	router.layer(
		ServiceBuilder::new()
			.layer(CatchPanicLayer::custom(error::handle_panic))
			.layer(SetResponseHeaderLayer::if_not_present(
				header::CONTENT_SECURITY_POLICY,
				HeaderValue::from_static("default-src 'self'"),
			))
			.layer(SetResponseHeaderLayer::if_not_present(
				header::X_CONTENT_TYPE_OPTIONS,
				HeaderValue::from_static("nosniff"),
			))
			.layer(SetResponseHeaderLayer::if_not_present(
				header::X_FRAME_OPTIONS,
				HeaderValue::from_static("DENY"),
			))
			.layer(cors(config)),
	)
}

/// Restricts cross-origin access to the single configured origin,
/// with credentials and a 24h preflight cache.
fn cors(config: &Config) -> CorsLayer {
	CorsLayer::new()
		.allow_origin(
			config
				.cors_origin
				.parse::<HeaderValue>()
				.expect("CORS_ORIGIN must be a valid header value"),
		)
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
		.allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
		.allow_credentials(true)
		.max_age(std::time::Duration::from_secs(86_400))
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt::init();
	dotenvy::dotenv().ok();

	let config = Config::from_env();

	let store = Store::connect(&config.database_url)
		.await
		.expect("failed to open the database");
	store
		.init_schema()
		.await
		.expect("failed to create database tables");

	let state = State {
		store: store.clone(),
		hasher: Argon2::default(),
		identity: IdentityClient::new(config.identity_api.clone()),
	};

	let limiter = ratelimit::from_config(&config);
	ratelimit::cleanup_old_limits(&[&limiter]);

	let app = app(state, &config, Some(limiter));

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", config.port);
	tracing::info!("cors origin: {}", config.cors_origin);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await
	.expect("server exited with an error");

	store.close().await;
}

async fn shutdown_signal() {
	tokio::signal::ctrl_c()
		.await
		.expect("failed to listen for shutdown signal");

	tracing::info!("shutting down");
}
