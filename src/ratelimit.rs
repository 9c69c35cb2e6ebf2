use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	http::{header, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

use crate::config::Config;
use crate::error::ErrorResponse;

pub type RateLimit = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// Builds the per-peer limiter from the configured window and ceiling.
///
/// The window is modelled as a token bucket holding the full ceiling,
/// refilling one request per `window / ceiling`.
pub fn from_config(config: &Config) -> RateLimit {
	assert!(
		config.rate_limit_max_requests > 0,
		"RATE_LIMIT_MAX_REQUESTS must be at least 1"
	);

	let period = Duration::from_millis(
		(config.rate_limit_window_ms / u64::from(config.rate_limit_max_requests)).max(1),
	);

	Arc::new(
		GovernorConfigBuilder::default()
			.period(period)
			.burst_size(config.rate_limit_max_requests)
			.use_headers()
			.error_handler(error_handler)
			.finish()
			.expect("invalid rate limit configuration"),
	)
}

fn error_handler(error: GovernorError) -> Response<Body> {
	match error {
		GovernorError::TooManyRequests { wait_time, .. } => (
			StatusCode::TOO_MANY_REQUESTS,
			[(header::RETRY_AFTER, wait_time.to_string())],
			Json(ErrorResponse {
				error: "too many requests, please try again later".into(),
			}),
		)
			.into_response(),
		GovernorError::UnableToExtractKey | GovernorError::Other { .. } => (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(ErrorResponse {
				error: "an internal error occurred".into(),
			}),
		)
			.into_response(),
	}
}

/// Periodically drops peers that have not been seen for a while, so
/// the limiter's key map does not grow without bound.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();
	let interval = Duration::from_secs(60);

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}

#[cfg(test)]
mod test {
	use std::net::SocketAddr;

	use argon2::Argon2;
	use axum::{
		body::Body,
		extract::ConnectInfo,
		http::{header, Request, StatusCode},
	};
	use tower::ServiceExt;

	use super::from_config;
	use crate::client::IdentityClient;
	use crate::config::Config;
	use crate::store::Store;
	use crate::State;

	fn config(max_requests: u32) -> Config {
		Config {
			port: 8000,
			database_url: "sqlite::memory:".into(),
			cors_origin: "http://localhost:3000".into(),
			rate_limit_window_ms: 60 * 60 * 1000,
			rate_limit_max_requests: max_requests,
			identity_api: String::new(),
		}
	}

	#[test]
	fn default_configuration_builds() {
		// 900s / 100 requests = 9s per token; just assert it builds.
		let _limit = from_config(&config(100));
	}

	#[test]
	#[should_panic(expected = "RATE_LIMIT_MAX_REQUESTS must be at least 1")]
	fn zero_ceiling_fails_at_startup_with_a_named_message() {
		let _limit = from_config(&config(0));
	}

	fn request(peer: SocketAddr) -> Request<Body> {
		let mut request = Request::builder()
			.uri("/health")
			.body(Body::empty())
			.unwrap();

		// The key extractor reads the peer address the socket would
		// have provided.
		request.extensions_mut().insert(ConnectInfo(peer));
		request
	}

	#[tokio::test]
	async fn requests_over_the_ceiling_get_429_with_retry_after() {
		let config = config(2);

		let store = Store::connect("sqlite::memory:").await.unwrap();
		store.init_schema().await.unwrap();

		let state = State {
			store,
			hasher: Argon2::default(),
			identity: IdentityClient::new("http://127.0.0.1:1/".into()),
		};

		let app = crate::app(state, &config, Some(from_config(&config)));
		let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();

		for _ in 0..2 {
			let response = app.clone().oneshot(request(peer)).await.unwrap();

			assert_eq!(response.status(), StatusCode::OK);
		}

		let response = app.clone().oneshot(request(peer)).await.unwrap();

		assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
		assert!(response.headers().get(header::RETRY_AFTER).is_some());
	}
}
