#![allow(dead_code)]

// std
use std::{collections::VecDeque, io, sync::Arc};
// crates.io
use parking_lot::Mutex;
// self
use mtls_auth_client::{
	client::{AuthClient, AuthClientBuilder, Credentials},
	error::TransportError,
	http::{AuthTransport, OutboundRequest, TransportFuture, TransportResponse},
	policy::{HttpMethod, SecuredEndpoints},
	url::Url,
};

pub const BASE_URL: &str = "https://auth.test.local";

/// Scripted reply handed back by [`RecordingTransport`].
#[derive(Clone, Debug)]
pub enum Reply {
	Response(TransportResponse),
	Unreachable,
}
impl Reply {
	pub fn json(status: u16, body: &str) -> Self {
		Self::Response(TransportResponse {
			status,
			reason: None,
			content_type: Some("application/json".into()),
			body: body.into(),
		})
	}

	pub fn text(status: u16, body: &str) -> Self {
		Self::Response(TransportResponse {
			status,
			reason: Some("OK".into()),
			content_type: Some("text/plain".into()),
			body: body.into(),
		})
	}
}

/// In-process transport that records every outbound request.
///
/// Queued replies are served first; once the queue is empty the fallback reply is reused.
#[derive(Debug)]
pub struct RecordingTransport {
	fallback: Reply,
	queued: Mutex<VecDeque<Reply>>,
	requests: Mutex<Vec<OutboundRequest>>,
}
impl RecordingTransport {
	pub fn replying(fallback: Reply) -> Self {
		Self { fallback, queued: Mutex::new(VecDeque::new()), requests: Mutex::new(Vec::new()) }
	}

	pub fn enqueue(&self, reply: Reply) {
		self.queued.lock().push_back(reply);
	}

	pub fn requests(&self) -> Vec<OutboundRequest> {
		self.requests.lock().clone()
	}

	pub fn last_request(&self) -> OutboundRequest {
		self.requests.lock().last().cloned().expect("At least one request should be recorded.")
	}
}
impl AuthTransport for RecordingTransport {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		self.requests.lock().push(request);

		let reply = self.queued.lock().pop_front().unwrap_or_else(|| self.fallback.clone());

		Box::pin(async move {
			match reply {
				Reply::Response(response) => Ok(response),
				Reply::Unreachable => Err(TransportError::from(io::Error::new(
					io::ErrorKind::ConnectionRefused,
					"connection refused",
				))),
			}
		})
	}
}

pub fn credentials() -> Credentials {
	Credentials::new("tests/fixtures/unused-cert.pem", "tests/fixtures/unused-key.pem")
}

/// Policy mirroring the auth server's sensitive endpoints.
pub fn secured_endpoints() -> SecuredEndpoints {
	SecuredEndpoints::from_json_str(
		r#"{
			"secured_endpoints": {
				"/auth/v1/token": ["POST"],
				"/auth/v1/provider/access": ["POST", "DELETE"],
				"/auth/v1/audit/tokens": ["POST"],
				"/auth/v1/token/revoke-all": ["POST"]
			}
		}"#,
	)
	.expect("Fixture policy should parse.")
}

pub fn recording_client(fallback: Reply) -> AuthClient<RecordingTransport> {
	recording_client_with(AuthClientBuilder::new(credentials()).expect_failure(true), fallback)
}

/// Builds a recording client from a caller-configured builder.
pub fn recording_client_with(
	builder: AuthClientBuilder,
	fallback: Reply,
) -> AuthClient<RecordingTransport> {
	let client: AuthClient<RecordingTransport> = builder
		.base_url(Url::parse(BASE_URL).expect("Fixture base URL should parse."))
		.secured_endpoints(secured_endpoints())
		.build_with_transport(RecordingTransport::replying(fallback))
		.expect("Recording client should build.");

	client
}

pub fn shared_transport(client: &AuthClient<RecordingTransport>) -> Arc<RecordingTransport> {
	client.transport.clone()
}

/// Strips the `/auth/v1/` prefix from a policy path.
pub fn api_suffix(path: &str) -> &str {
	path.strip_prefix("/auth/v1/").expect("Fixture paths live under /auth/v1/.")
}

pub const ALL_METHODS: [HttpMethod; 5] =
	[HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete];
