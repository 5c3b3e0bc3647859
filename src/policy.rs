//! Secured-endpoint policy table consulted before every request.
//!
//! The table maps fully qualified endpoint paths (for example `/auth/v1/token`) to the HTTP
//! methods that require step-up authentication on that path. It is loaded once, validated, and
//! then shared read-only (typically behind an [`Arc`]) by every client that needs it. Lookups
//! are exact-string matches; a path that is absent from the table never requires step-up.

mod method;

pub use method::*;

// std
use std::{fs, path::Path};
// self
use crate::_prelude::*;

/// Failures raised while loading or validating a policy document.
#[derive(Debug, ThisError)]
pub enum PolicyError {
	/// Policy file could not be read.
	#[error("Unable to read secured-endpoint policy {path}.")]
	Read {
		/// Display form of the attempted path.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Policy document is not valid JSON or does not match the expected shape.
	#[error("Secured-endpoint policy is malformed.")]
	Parse {
		/// Path-aware parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Endpoint keys must be absolute paths.
	#[error("Secured endpoint `{path}` must start with `/`.")]
	RelativePath {
		/// Offending endpoint key.
		path: String,
	},
}

#[derive(Deserialize)]
struct PolicyDocument {
	secured_endpoints: BTreeMap<String, Vec<HttpMethod>>,
}

/// Immutable map of endpoint paths to the methods that require step-up authentication.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecuredEndpoints {
	entries: BTreeMap<String, BTreeSet<HttpMethod>>,
}
impl SecuredEndpoints {
	/// Builds a table from `(path, methods)` pairs, merging duplicate paths.
	pub fn new<I, P, M>(entries: I) -> Result<Self, PolicyError>
	where
		I: IntoIterator<Item = (P, M)>,
		P: Into<String>,
		M: IntoIterator<Item = HttpMethod>,
	{
		let mut table = BTreeMap::<String, BTreeSet<HttpMethod>>::new();

		for (path, methods) in entries {
			let path = path.into();

			if !path.starts_with('/') {
				return Err(PolicyError::RelativePath { path });
			}

			table.entry(path).or_default().extend(methods);
		}

		Ok(Self { entries: table })
	}

	/// Reads and validates the policy document stored at `path`.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
		let path = path.as_ref();
		let bytes = fs::read(path)
			.map_err(|source| PolicyError::Read { path: path.display().to_string(), source })?;

		Self::from_json_slice(&bytes)
	}

	/// Parses a policy document of the form `{"secured_endpoints": {"/path": ["POST"]}}`.
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PolicyError> {
		let mut de = serde_json::Deserializer::from_slice(bytes);
		let document: PolicyDocument = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| PolicyError::Parse { source })?;

		Self::new(document.secured_endpoints)
	}

	/// String flavor of [`from_json_slice`](Self::from_json_slice).
	pub fn from_json_str(document: &str) -> Result<Self, PolicyError> {
		Self::from_json_slice(document.as_bytes())
	}

	/// Returns true iff `path` is listed and `method` is one of its secured methods.
	pub fn requires_step_up(&self, path: &str, method: HttpMethod) -> bool {
		self.entries.get(path).is_some_and(|methods| methods.contains(&method))
	}

	/// Secured methods registered for `path`, if any.
	pub fn methods(&self, path: &str) -> Option<impl Iterator<Item = HttpMethod> + '_> {
		self.entries.get(path).map(|methods| methods.iter().copied())
	}

	/// Iterator over every secured `(path, method)` pair in path order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, HttpMethod)> {
		self.entries
			.iter()
			.flat_map(|(path, methods)| methods.iter().map(move |method| (path.as_str(), *method)))
	}

	/// Number of secured paths.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true when no endpoint requires step-up.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
