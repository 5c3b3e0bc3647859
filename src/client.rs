//! Auth client, credentials, and session state.
//!
//! [`AuthClient`] owns the certificate/key pair, the server base URL, the injected
//! [`SecuredEndpoints`] table, and the step-up session identifier. All typed operations funnel
//! into [`AuthClient::call`] (see [`call`]) so endpoint classification, header injection, and
//! response normalization happen in exactly one place.

pub mod call;
pub mod config;
pub mod ops;

pub use call::*;
pub use config::*;
pub use ops::*;

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// self
use crate::{_prelude::*, error::ConfigError, http::AuthTransport, policy::SecuredEndpoints};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestAuthClient = AuthClient<ReqwestTransport>;

/// Client certificate and private key locations used for mutual TLS.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	certificate: PathBuf,
	key: PathBuf,
}
impl Credentials {
	/// Pairs a PEM certificate path with its PEM private key path.
	pub fn new(certificate: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
		Self { certificate: certificate.into(), key: key.into() }
	}

	/// Certificate path.
	pub fn certificate(&self) -> &Path {
		&self.certificate
	}

	/// Private key path.
	pub fn key(&self) -> &Path {
		&self.key
	}

	/// Reads both files and joins them into a single PEM bundle (certificate first).
	pub fn identity_pem(&self) -> Result<Vec<u8>, ConfigError> {
		let mut pem = read_pem("certificate", &self.certificate)?;

		if !pem.ends_with(b"\n") {
			pem.push(b'\n');
		}

		pem.extend_from_slice(&read_pem("key", &self.key)?);

		Ok(pem)
	}
}

fn read_pem(kind: &'static str, path: &Path) -> Result<Vec<u8>, ConfigError> {
	fs::read(path)
		.map_err(|source| ConfigError::CredentialRead { kind, path: path.to_path_buf(), source })
}

/// Step-up session identifier shared by every call made through one client.
///
/// Starts at the [`SessionState::UNSET`] sentinel. Only [`SessionState::set`] changes it; the
/// request pipeline merely reads the current value.
#[derive(Debug)]
pub struct SessionState(RwLock<String>);
impl SessionState {
	/// Sentinel sent before any session has been assigned.
	pub const UNSET: &'static str = "0";

	/// Returns a copy of the current identifier.
	pub fn get(&self) -> String {
		self.0.read().clone()
	}

	/// Replaces the current identifier.
	pub fn set(&self, id: impl Into<String>) {
		*self.0.write() = id.into();
	}

	/// Returns true once a value other than the sentinel has been written.
	pub fn is_assigned(&self) -> bool {
		*self.0.read() != Self::UNSET
	}
}
impl Default for SessionState {
	fn default() -> Self {
		Self(RwLock::new(Self::UNSET.to_owned()))
	}
}

/// Mutually-authenticated client for the auth server.
pub struct AuthClient<T>
where
	T: ?Sized + AuthTransport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Read-only step-up policy shared with other clients.
	pub secured_endpoints: Arc<SecuredEndpoints>,
	/// Scheme + authority (and optional path prefix) requests are resolved against.
	pub base_url: Url,
	credentials: Credentials,
	session: SessionState,
	expect_failure: bool,
}
impl<T> AuthClient<T>
where
	T: ?Sized + AuthTransport,
{
	/// Creates a client that reuses a caller-provided transport.
	///
	/// The transport is expected to already carry the identity derived from `credentials`;
	/// [`AuthClientBuilder::build`] wires both together for the reqwest stack.
	pub fn with_transport(
		credentials: Credentials,
		base_url: Url,
		secured_endpoints: Arc<SecuredEndpoints>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			secured_endpoints,
			base_url,
			credentials,
			session: SessionState::default(),
			expect_failure: false,
		}
	}

	/// Suppresses failure diagnostics for every call made through this client.
	pub fn with_expect_failure(mut self, expect_failure: bool) -> Self {
		self.expect_failure = expect_failure;

		self
	}

	/// Replaces the step-up session identifier used by subsequent secured calls.
	pub fn set_user_session_id(&self, id: impl Into<String>) {
		self.session.set(id);
	}

	/// Current step-up session identifier (the `"0"` sentinel until one is set).
	pub fn session_id(&self) -> String {
		self.session.get()
	}

	/// Credentials this client was created with.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Returns true when failure diagnostics are suppressed client-wide.
	pub fn expects_failure(&self) -> bool {
		self.expect_failure
	}
}
#[cfg(feature = "reqwest")]
impl AuthClient<ReqwestTransport> {
	/// Starts building a reqwest-backed client for the provided credentials.
	pub fn builder(credentials: Credentials) -> AuthClientBuilder {
		AuthClientBuilder::new(credentials)
	}
}
impl<T> Debug for AuthClient<T>
where
	T: ?Sized + AuthTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient")
			.field("base_url", &self.base_url.as_str())
			.field("credentials", &self.credentials)
			.field("secured_endpoints", &self.secured_endpoints.len())
			.field("session_assigned", &self.session.is_assigned())
			.field("expect_failure", &self.expect_failure)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn session_state_starts_at_sentinel() {
		let session = SessionState::default();

		assert_eq!(session.get(), "0");
		assert!(!session.is_assigned());

		session.set("abc-123");

		assert_eq!(session.get(), "abc-123");
		assert!(session.is_assigned());
	}

	#[test]
	fn identity_pem_joins_certificate_and_key() {
		let dir = std::env::temp_dir();
		let pid = std::process::id();
		let cert = dir.join(format!("mtls_auth_client_identity_cert_{pid}.pem"));
		let key = dir.join(format!("mtls_auth_client_identity_key_{pid}.pem"));

		fs::write(&cert, "CERT").expect("Failed to write certificate fixture.");
		fs::write(&key, "KEY\n").expect("Failed to write key fixture.");

		let pem = Credentials::new(&cert, &key)
			.identity_pem()
			.expect("Both credential files should be readable.");

		assert_eq!(pem, b"CERT\nKEY\n");

		let err = Credentials::new(&cert, dir.join("mtls_auth_client_absent_key.pem"))
			.identity_pem()
			.expect_err("Missing key must be reported.");

		assert!(matches!(err, ConfigError::CredentialRead { kind: "key", .. }));

		for path in [&cert, &key] {
			fs::remove_file(path).unwrap_or_else(|e| {
				panic!("Failed to remove credential fixture {}: {e}", path.display())
			});
		}
	}
}
