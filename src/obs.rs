//! Optional observability helpers for auth server calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to wrap each call in an `mtls_auth_client.call` span with
//!   `api`, `method`, and `step_up` fields, and to emit failure diagnostics as `WARN` events.
//! - Enable `metrics` to increment the `mtls_auth_client_call_total` counter once per call,
//!   labeled by `api` + `outcome`.

mod diagnostics;
mod metrics;
mod tracing;

pub use diagnostics::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Terminal classification of a single call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// HTTP 200 with a JSON body.
	Success,
	/// Any status other than 200.
	Failure,
	/// HTTP 200 whose body was not declared as JSON.
	NonJson,
	/// The request never produced an HTTP response.
	TransportError,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::NonJson => "non_json",
			CallOutcome::TransportError => "transport_error",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
