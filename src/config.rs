/// Runtime configuration, read once at startup.
///
/// Every knob comes from the environment (or a `.env` file via
/// [`dotenvy`]) with defaults matching a local development setup.
#[derive(Debug, Clone)]
pub struct Config {
	pub port: u16,
	pub database_url: String,
	pub cors_origin: String,
	pub rate_limit_window_ms: u64,
	pub rate_limit_max_requests: u32,
	pub identity_api: String,
}

impl Config {
	pub fn from_env() -> Self {
		Self {
			port: var_or("PORT", 8000),
			database_url: std::env::var("DATABASE_URL")
				.unwrap_or_else(|_| "sqlite::memory:".into()),
			cors_origin: std::env::var("CORS_ORIGIN")
				.unwrap_or_else(|_| "http://localhost:3000".into()),
			// 100 requests per 15 minutes unless overridden
			rate_limit_window_ms: var_or("RATE_LIMIT_WINDOW_MS", 15 * 60 * 1000),
			rate_limit_max_requests: var_or("RATE_LIMIT_MAX_REQUESTS", 100),
			identity_api: std::env::var("IDENTITY_API")
				.unwrap_or_else(|_| "https://randomuser.me/api/".into()),
		}
	}
}

fn var_or<T: std::str::FromStr>(name: &str, default: T) -> T {
	std::env::var(name).map_or(default, |value| {
		value
			.parse()
			.unwrap_or_else(|_| panic!("{name} must be a number"))
	})
}
