//! Transport primitives for auth server calls.
//!
//! The module exposes [`AuthTransport`] alongside the [`OutboundRequest`] and
//! [`TransportResponse`] envelopes so downstream crates can plug in custom HTTP stacks without
//! touching the step-up or normalization logic in [`AuthClient::call`]. A transport only moves
//! bytes: it receives a fully resolved URL, the final header set, and the JSON text payload, and
//! reports the status line, `content-type`, and body text it got back. Any status code is a
//! successful transport outcome; only network, TLS, and IO failures are errors.
//!
//! [`AuthClient::call`]: crate::client::AuthClient::call

// self
use crate::{_prelude::*, error::TransportError, policy::HttpMethod};
#[cfg(feature = "reqwest")]
use crate::{
	client::{AuthClientConfig, Credentials},
	error::ConfigError,
};

/// Boxed future returned by [`AuthTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTPS stacks capable of carrying auth server requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared (behind
/// `Arc<T>`) by several clients, and the returned futures must be `Send` so callers can drive
/// them from any executor.
pub trait AuthTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once the full response body has been read.
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// Whether the transport validates the auth server's certificate chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsVerification {
	#[default]
	/// Validate the server certificate against the platform trust roots.
	Verify,
	/// Accept any server certificate, including self-signed and expired ones.
	///
	/// Only meant for local and test deployments that terminate TLS with throwaway
	/// certificates; never enable it against a production auth server.
	AcceptInvalidCerts,
}
impl TlsVerification {
	/// Returns true when server certificates are not validated.
	pub fn accepts_invalid_certs(self) -> bool {
		matches!(self, Self::AcceptInvalidCerts)
	}
}

/// Fully resolved request handed to an [`AuthTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute URL including the query string.
	pub url: Url,
	/// Final header set, keyed by lower-case header name.
	pub headers: BTreeMap<String, String>,
	/// JSON text payload (`null` when the call carries no body).
	pub body: String,
}
impl OutboundRequest {
	/// Looks up a header value by lower-case name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).map(String::as_str)
	}
}

/// Raw response reported by an [`AuthTransport`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase associated with the status, when known.
	pub reason: Option<String>,
	/// Value of the `content-type` response header.
	pub content_type: Option<String>,
	/// Response body decoded as text.
	pub body: String,
}
impl TransportResponse {
	/// Returns true when the response declares an `application/json` media type.
	///
	/// Media-type parameters such as `charset` are ignored and the comparison is
	/// case-insensitive; a missing header never counts as JSON.
	pub fn is_json(&self) -> bool {
		self.content_type.as_deref().is_some_and(|value| {
			value
				.split(';')
				.next()
				.is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
		})
	}
}

/// Media type sent with, and expected back from, every auth server call.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Thin wrapper around [`ReqwestClient`] configured for mutual TLS.
///
/// [`ReqwestTransport::from_credentials`] loads the client certificate and key into a reqwest
/// identity and applies the configured [`TlsVerification`] mode and timeout.
///
/// Redirects are not followed unless [`AuthClientConfig::follow_redirects`] is set, so a `3xx`
/// from an intermediary surfaces as an unsuccessful, non-JSON response instead of being chased.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a mutually-authenticated client from the certificate/key pair.
	pub fn from_credentials(
		credentials: &Credentials,
		config: &AuthClientConfig,
	) -> Result<Self, ConfigError> {
		let identity = reqwest::Identity::from_pem(&credentials.identity_pem()?)
			.map_err(ConfigError::invalid_identity)?;
		let client = Self::client_builder(config)
			.identity(identity)
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Reqwest builder carrying the verification, redirect, and timeout settings of `config`.
	///
	/// [`from_credentials`](Self::from_credentials) adds the client identity on top; callers
	/// with extra needs (custom roots, proxies) can start from here instead.
	pub fn client_builder(config: &AuthClientConfig) -> reqwest::ClientBuilder {
		let redirect = if config.follow_redirects {
			reqwest::redirect::Policy::default()
		} else {
			reqwest::redirect::Policy::none()
		};
		let builder = ReqwestClient::builder()
			.redirect(redirect)
			.danger_accept_invalid_certs(config.tls_verification.accepts_invalid_certs());

		match config.timeout {
			Some(timeout) => builder.timeout(timeout),
			None => builder,
		}
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl AuthTransport for ReqwestTransport {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let OutboundRequest { method, url, headers, body } = request;
			let mut builder = self.0.request(reqwest_method(method), url).body(body);

			for (name, value) in headers {
				builder = builder.header(name, value);
			}

			let response = builder.send().await?;
			let status = response.status();
			let content_type = response
				.headers()
				.get(reqwest::header::CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.text().await?;

			Ok(TransportResponse {
				status: status.as_u16(),
				reason: status.canonical_reason().map(str::to_owned),
				content_type,
				body,
			})
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: HttpMethod) -> reqwest::Method {
	match method {
		HttpMethod::Get => reqwest::Method::GET,
		HttpMethod::Post => reqwest::Method::POST,
		HttpMethod::Put => reqwest::Method::PUT,
		HttpMethod::Patch => reqwest::Method::PATCH,
		HttpMethod::Delete => reqwest::Method::DELETE,
	}
}
