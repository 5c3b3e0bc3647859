// self
use crate::{error::TransportError, http::TransportResponse};

/// Diagnostic event for a response whose status is not 200.
pub fn warn_call_failure(url: &str, response: &TransportResponse) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			target: "mtls_auth_client",
			url,
			status = response.status,
			reason = response.reason.as_deref().unwrap_or_default(),
			body = response.body.as_str(),
			"auth API failure"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (url, response);
	}
}

/// Diagnostic event for a response that did not declare `application/json`.
pub fn warn_content_type_mismatch(url: &str, content_type: Option<&str>) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			target: "mtls_auth_client",
			url,
			content_type = content_type.unwrap_or("<missing>"),
			"auth did not send 'application/json'"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (url, content_type);
	}
}

/// Diagnostic event for a request that never produced an HTTP response.
pub fn warn_transport_failure(url: &str, error: &TransportError) {
	#[cfg(feature = "tracing")]
	{
		let cause = std::error::Error::source(error).map(ToString::to_string).unwrap_or_default();

		tracing::warn!(
			target: "mtls_auth_client",
			url,
			%error,
			cause = cause.as_str(),
			"auth API unreachable"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (url, error);
	}
}
