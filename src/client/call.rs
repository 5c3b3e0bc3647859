//! Generic request primitive shared by every typed operation.
//!
//! [`AuthClient::call`] runs the whole pipeline for one [`AuthRequest`]:
//!
//! 1. Resolve the endpoint path (`/auth/v1/<api>`) and classify it against the client's
//!    [`SecuredEndpoints`](crate::policy::SecuredEndpoints) table.
//! 2. Assemble a fresh header map: `content-type: application/json`, then caller headers, then
//!    (for secured pairs) `session-id` and `tfa: true`, which callers cannot override.
//! 3. Dispatch through the client's [`AuthTransport`].
//! 4. Normalize: `success` is true iff the status is exactly 200; JSON bodies are parsed and
//!    returned with their status code; anything else becomes a `null` response.
//!
//! Routine failures (non-200 statuses, non-JSON bodies, unreachable servers) come back as
//! [`NormalizedResponse`] values and emit a diagnostic unless failure was expected. Only a body
//! that claims to be JSON but does not parse is returned as an [`Error`].

// self
use crate::{
	_prelude::*,
	client::AuthClient,
	error::ConfigError,
	http::{AuthTransport, JSON_MEDIA_TYPE, OutboundRequest, TransportResponse},
	obs::{self, CallOutcome, CallSpan},
	policy::HttpMethod,
};

/// Path segment identifying the auth service.
pub const SERVICE_PREFIX: &str = "/auth";
/// API version segment.
pub const API_VERSION: &str = "v1";
/// Header carrying the step-up session identifier.
pub const SESSION_ID_HEADER: &str = "session-id";
/// Header flagging a step-up authenticated call.
pub const STEP_UP_HEADER: &str = "tfa";

const CONTENT_TYPE_HEADER: &str = "content-type";

/// Fully qualified endpoint path for an API suffix, e.g. `token` → `/auth/v1/token`.
pub fn endpoint_path(api: &str) -> String {
	format!("{SERVICE_PREFIX}/{API_VERSION}/{api}")
}

/// Per-call request descriptor consumed by [`AuthClient::call`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthRequest {
	/// API suffix appended to `/auth/v1/`.
	pub api: String,
	/// HTTP method (defaults to `POST`).
	pub method: HttpMethod,
	/// JSON body; `None` is sent as `null`.
	pub body: Option<Value>,
	/// Query parameters.
	pub params: BTreeMap<String, String>,
	/// Extra headers merged over the `content-type` default.
	pub headers: BTreeMap<String, String>,
	/// Suppresses failure diagnostics for this call only.
	pub expect_failure: bool,
}
impl AuthRequest {
	/// Creates a descriptor with no body, parameters, or extra headers.
	pub fn new(api: impl Into<String>, method: HttpMethod) -> Self {
		Self { api: api.into(), method, ..Default::default() }
	}

	/// `GET` descriptor.
	pub fn get(api: impl Into<String>) -> Self {
		Self::new(api, HttpMethod::Get)
	}

	/// `POST` descriptor.
	pub fn post(api: impl Into<String>) -> Self {
		Self::new(api, HttpMethod::Post)
	}

	/// `PUT` descriptor.
	pub fn put(api: impl Into<String>) -> Self {
		Self::new(api, HttpMethod::Put)
	}

	/// `DELETE` descriptor.
	pub fn delete(api: impl Into<String>) -> Self {
		Self::new(api, HttpMethod::Delete)
	}

	/// Sets the JSON body.
	pub fn with_body(mut self, body: impl Into<Value>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Adds (or replaces) a query parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());

		self
	}

	/// Adds (or replaces) an extra header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Marks failure as expected, silencing diagnostics for this call.
	pub fn expect_failure(mut self) -> Self {
		self.expect_failure = true;

		self
	}

	/// Endpoint path this descriptor resolves to.
	pub fn endpoint(&self) -> String {
		endpoint_path(&self.api)
	}
}

/// Uniform result returned for every completed call.
///
/// Serializes as `{"success", "response", "status_code"}`, omitting `status_code` when the
/// server did not answer with JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResponse {
	/// True iff the server answered with HTTP 200.
	pub success: bool,
	/// Parsed JSON body, or `None` when the body was not JSON.
	pub response: Option<Value>,
	/// HTTP status, present only for JSON responses.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status_code: Option<u16>,
}
impl NormalizedResponse {
	/// Returns true when the server answered with a JSON body.
	pub fn is_json(&self) -> bool {
		self.status_code.is_some()
	}

	/// Consumes the response, yielding the parsed body.
	pub fn into_response(self) -> Option<Value> {
		self.response
	}

	fn unreachable() -> Self {
		Self { success: false, response: None, status_code: None }
	}
}

impl<T> AuthClient<T>
where
	T: ?Sized + AuthTransport,
{
	/// Sends one request through the step-up aware pipeline.
	pub async fn call(&self, request: AuthRequest) -> Result<NormalizedResponse> {
		let AuthRequest { api, method, body, params, headers, expect_failure } = request;
		let endpoint = endpoint_path(&api);
		let step_up = self.secured_endpoints.requires_step_up(&endpoint, method);
		let quiet = expect_failure || self.expects_failure();
		let span = CallSpan::new(&api, method, step_up);

		span.instrument(async {
			let url = self.resolve_url(&endpoint, &params)?;
			let outbound = OutboundRequest {
				method,
				url: url.clone(),
				headers: self.outgoing_headers(headers, step_up),
				body: body.unwrap_or(Value::Null).to_string(),
			};
			let (response, outcome) = match self.transport.execute(outbound).await {
				Ok(response) => normalize(url.as_str(), response, quiet)?,
				Err(e) => {
					if !quiet {
						obs::warn_transport_failure(url.as_str(), &e);
					}

					(NormalizedResponse::unreachable(), CallOutcome::TransportError)
				},
			};

			obs::record_call_outcome(&api, outcome);

			Ok(response)
		})
		.await
	}

	fn resolve_url(&self, endpoint: &str, params: &BTreeMap<String, String>) -> Result<Url> {
		let value = format!("{}{endpoint}", self.base_url.as_str().trim_end_matches('/'));
		let mut url =
			Url::parse(&value).map_err(|source| ConfigError::InvalidBaseUrl { value, source })?;

		if !params.is_empty() {
			url.query_pairs_mut().extend_pairs(params);
		}

		Ok(url)
	}

	fn outgoing_headers(
		&self,
		caller: BTreeMap<String, String>,
		step_up: bool,
	) -> BTreeMap<String, String> {
		let mut headers =
			BTreeMap::from([(CONTENT_TYPE_HEADER.to_owned(), JSON_MEDIA_TYPE.to_owned())]);

		headers.extend(caller.into_iter().map(|(name, value)| (name.to_ascii_lowercase(), value)));

		if step_up {
			headers.insert(SESSION_ID_HEADER.into(), self.session_id());
			headers.insert(STEP_UP_HEADER.into(), "true".into());
		}

		headers
	}
}

fn normalize(
	url: &str,
	response: TransportResponse,
	quiet: bool,
) -> Result<(NormalizedResponse, CallOutcome)> {
	let success = response.status == 200;

	if !success && !quiet {
		obs::warn_call_failure(url, &response);
	}
	if !response.is_json() {
		if !quiet {
			obs::warn_content_type_mismatch(url, response.content_type.as_deref());
		}

		let outcome = if success { CallOutcome::NonJson } else { CallOutcome::Failure };

		return Ok((NormalizedResponse { success, response: None, status_code: None }, outcome));
	}

	let parsed = serde_json::from_str::<Value>(&response.body).map_err(|source| {
		Error::MalformedResponse { url: url.to_owned(), status: response.status, source }
	})?;
	let outcome = if success { CallOutcome::Success } else { CallOutcome::Failure };

	Ok((
		NormalizedResponse { success, response: Some(parsed), status_code: Some(response.status) },
		outcome,
	))
}
