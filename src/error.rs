//! Client-level error types shared across the policy table, transports, and the request pipeline.

// std
use std::path::PathBuf;
// self
use crate::{_prelude::*, policy::PolicyError};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Routine HTTP failures never surface here; they are folded into
/// [`NormalizedResponse`](crate::client::NormalizedResponse) with `success == false`.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Secured-endpoint policy could not be loaded.
	#[error(transparent)]
	Policy(#[from] PolicyError),

	/// Server declared `application/json` but sent a body that does not parse.
	#[error("Auth server returned malformed JSON from {url} (status {status}).")]
	MalformedResponse {
		/// Fully qualified request URL.
		url: String,
		/// HTTP status code of the offending response.
		status: u16,
		/// Underlying JSON parsing failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Configuration failures raised while assembling a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A certificate or key file could not be read.
	#[error("Unable to read {kind} file {}.", .path.display())]
	CredentialRead {
		/// Which half of the credential pair failed (`certificate` or `key`).
		kind: &'static str,
		/// Path that was attempted.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Certificate and key do not form a usable TLS identity.
	#[error("Client certificate and key do not form a valid TLS identity.")]
	InvalidIdentity {
		/// Transport-specific parsing failure.
		#[source]
		source: BoxError,
	},
	/// Base URL or auth server host cannot be parsed.
	#[error("Auth server URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Rejected input.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a transport's identity parsing failure inside [`ConfigError`].
	pub fn invalid_identity(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::InvalidIdentity { source: Box::new(src) }
	}
}

/// Transport-level failures (network, TLS, IO).
///
/// Transports return these to the request pipeline, which records them as unsuccessful calls.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the auth server.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the auth server.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
