//! Client configuration and builder.

// std
use std::{env, time::Duration};
// self
use crate::{
	_prelude::*,
	client::{AuthClient, Credentials},
	error::ConfigError,
	http::{AuthTransport, TlsVerification},
	policy::SecuredEndpoints,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Host contacted when no auth server is configured.
pub const DEFAULT_AUTH_SERVER: &str = "auth.iudx.org.in";
/// Environment variable whose presence silences failure diagnostics.
pub const EXPECT_FAILURE_ENV: &str = "EXPECT_FAILURE";

/// Connection settings shared by every client built from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthClientConfig {
	/// Auth server host (optionally `host:port`), contacted over HTTPS.
	pub auth_server: String,
	/// Full base URL; takes precedence over [`auth_server`](Self::auth_server) when set.
	pub base_url: Option<Url>,
	/// Server certificate validation mode.
	pub tls_verification: TlsVerification,
	/// Suppresses failure diagnostics for every call.
	pub expect_failure: bool,
	/// Whole-request timeout applied by the transport.
	pub timeout: Option<Duration>,
	/// Follow HTTP redirects (reqwest's default limit) instead of returning the `3xx` as is.
	pub follow_redirects: bool,
}
impl AuthClientConfig {
	/// Default configuration with `expect_failure` taken from [`EXPECT_FAILURE_ENV`].
	pub fn from_env() -> Self {
		Self { expect_failure: env::var_os(EXPECT_FAILURE_ENV).is_some(), ..Default::default() }
	}

	/// Resolves the URL every endpoint path is appended to.
	pub fn resolve_base_url(&self) -> Result<Url, ConfigError> {
		if let Some(url) = &self.base_url {
			return Ok(url.clone());
		}

		let value = format!("https://{}", self.auth_server);

		Url::parse(&value).map_err(|source| ConfigError::InvalidBaseUrl { value, source })
	}
}
impl Default for AuthClientConfig {
	fn default() -> Self {
		Self {
			auth_server: DEFAULT_AUTH_SERVER.into(),
			base_url: None,
			tls_verification: TlsVerification::default(),
			expect_failure: false,
			timeout: None,
			follow_redirects: false,
		}
	}
}

/// Builder for [`AuthClient`] values.
#[derive(Debug)]
pub struct AuthClientBuilder {
	/// Certificate/key pair presented to the server.
	pub credentials: Credentials,
	/// Connection settings.
	pub config: AuthClientConfig,
	/// Step-up policy; empty unless provided.
	pub secured_endpoints: Arc<SecuredEndpoints>,
}
impl AuthClientBuilder {
	/// Creates a builder seeded with [`AuthClientConfig::from_env`] and an empty policy.
	pub fn new(credentials: Credentials) -> Self {
		Self {
			credentials,
			config: AuthClientConfig::from_env(),
			secured_endpoints: Default::default(),
		}
	}

	/// Replaces the whole configuration.
	pub fn config(mut self, config: AuthClientConfig) -> Self {
		self.config = config;

		self
	}

	/// Sets the auth server host.
	pub fn auth_server(mut self, host: impl Into<String>) -> Self {
		self.config.auth_server = host.into();

		self
	}

	/// Overrides the base URL (scheme included), e.g. for a local mock server.
	pub fn base_url(mut self, url: Url) -> Self {
		self.config.base_url = Some(url);

		self
	}

	/// Shares a loaded step-up policy with the client.
	pub fn secured_endpoints(mut self, policy: impl Into<Arc<SecuredEndpoints>>) -> Self {
		self.secured_endpoints = policy.into();

		self
	}

	/// Overrides server certificate validation.
	pub fn tls_verification(mut self, verification: TlsVerification) -> Self {
		self.config.tls_verification = verification;

		self
	}

	/// Opts into [`TlsVerification::AcceptInvalidCerts`].
	pub fn danger_accept_invalid_certs(self) -> Self {
		self.tls_verification(TlsVerification::AcceptInvalidCerts)
	}

	/// Overrides the failure expectation read from the environment.
	pub fn expect_failure(mut self, expect_failure: bool) -> Self {
		self.config.expect_failure = expect_failure;

		self
	}

	/// Sets the transport timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.config.timeout = Some(timeout);

		self
	}

	/// Opts into following redirects returned by intermediaries in front of the auth server.
	pub fn follow_redirects(mut self, follow: bool) -> Self {
		self.config.follow_redirects = follow;

		self
	}

	/// Builds a client around a caller-provided transport.
	pub fn build_with_transport<T>(self, transport: impl Into<Arc<T>>) -> Result<AuthClient<T>>
	where
		T: ?Sized + AuthTransport,
	{
		let base_url = self.config.resolve_base_url()?;

		Ok(AuthClient::with_transport(
			self.credentials,
			base_url,
			self.secured_endpoints,
			transport,
		)
		.with_expect_failure(self.config.expect_failure))
	}

	/// Builds a reqwest-backed client presenting the configured credentials.
	#[cfg(feature = "reqwest")]
	pub fn build(self) -> Result<AuthClient<ReqwestTransport>> {
		let transport = ReqwestTransport::from_credentials(&self.credentials, &self.config)?;

		self.build_with_transport(transport)
	}
}
