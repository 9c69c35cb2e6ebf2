use serde::Deserialize;

use crate::Error;

/// A generated identity: a display name and a throwaway password.
#[derive(Debug)]
pub struct Identity {
	pub name: String,
	pub password: String,
}

/// Client for the external identity-generation service
/// (randomuser.me-compatible). The base URL is configurable so tests
/// can point it at a local stub.
#[derive(Clone)]
pub struct IdentityClient {
	http: reqwest::Client,
	base_url: String,
}

#[derive(Deserialize)]
struct ApiResponse {
	results: Vec<ApiIdentity>,
}

#[derive(Deserialize)]
struct ApiIdentity {
	name: ApiName,
	login: ApiLogin,
}

#[derive(Deserialize)]
struct ApiName {
	first: String,
	last: String,
}

#[derive(Deserialize)]
struct ApiLogin {
	password: String,
}

impl IdentityClient {
	pub fn new(base_url: String) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url,
		}
	}

	/// Fetches one generated identity. No retries; the first failure
	/// is surfaced as [`Error::Upstream`].
	pub async fn fetch(&self) -> Result<Identity, Error> {
		let response = self
			.http
			.get(&self.base_url)
			.send()
			.await?
			.error_for_status()?
			.json::<ApiResponse>()
			.await?;

		let identity = response
			.results
			.into_iter()
			.next()
			.ok_or(Error::UpstreamPayload)?;

		Ok(Identity {
			name: format!("{} {}", identity.name.first, identity.name.last),
			password: identity.login.password,
		})
	}
}
