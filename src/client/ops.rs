//! Typed auth server operations.
//!
//! Each operation is a pure parameter-shaping constructor on [`AuthRequest`] paired with an
//! [`AuthClient`] method that sends it through [`AuthClient::call`]. The constructors carry all
//! of the shaping rules (optional fields, scalar-to-array wrapping, conditional headers), so they
//! can be inspected without a transport.

// crates.io
use serde_json::{Map, json};
// self
use crate::{
	_prelude::*,
	client::{AuthClient, AuthRequest, NormalizedResponse},
	http::AuthTransport,
};

/// Header naming the provider on whose behalf an access rule is managed.
pub const PROVIDER_EMAIL_HEADER: &str = "provider-email";

/// One value or a list of values, always sent as a JSON array.
///
/// Scalars (strings, objects, numbers) become a one-element array; arrays pass through
/// unchanged, so `"abc"` and `["abc"]` produce identical request bodies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OneOrMany(pub Vec<Value>);
impl OneOrMany {
	/// Number of values.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no values are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Converts into the JSON array sent on the wire.
	pub fn into_value(self) -> Value {
		Value::Array(self.0)
	}
}
impl From<&str> for OneOrMany {
	fn from(value: &str) -> Self {
		Self(vec![value.into()])
	}
}
impl From<String> for OneOrMany {
	fn from(value: String) -> Self {
		Self(vec![value.into()])
	}
}
impl From<Value> for OneOrMany {
	fn from(value: Value) -> Self {
		match value {
			Value::Array(values) => Self(values),
			scalar => Self(vec![scalar]),
		}
	}
}
impl<T> From<Vec<T>> for OneOrMany
where
	T: Into<Value>,
{
	fn from(values: Vec<T>) -> Self {
		Self(values.into_iter().map(Into::into).collect())
	}
}
impl<T, const N: usize> From<[T; N]> for OneOrMany
where
	T: Into<Value>,
{
	fn from(values: [T; N]) -> Self {
		Self(values.into_iter().map(Into::into).collect())
	}
}

/// Parameters for the `token` API.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenRequest {
	/// Access request(s) the token should cover.
	pub request: Value,
	/// Requested token lifetime in seconds.
	pub token_time: Option<u64>,
}
impl TokenRequest {
	/// Creates a request without an explicit lifetime.
	pub fn new(request: impl Into<Value>) -> Self {
		Self { request: request.into(), token_time: None }
	}

	/// Requests a specific token lifetime in seconds; `0` leaves the server default in place.
	pub fn with_token_time(mut self, seconds: u64) -> Self {
		self.token_time = Some(seconds).filter(|seconds| *seconds != 0);

		self
	}

	fn into_body(self) -> Value {
		let mut body = Map::new();

		body.insert("request".into(), self.request);

		if let Some(seconds) = self.token_time {
			body.insert("token-time".into(), seconds.into());
		}

		Value::Object(body)
	}
}

/// Parameters for the `token/introspect` API.
#[derive(Clone, Debug, PartialEq)]
pub struct IntrospectRequest {
	/// Token under inspection.
	pub token: String,
	/// Token of the resource server performing the introspection.
	pub server_token: Option<String>,
	/// Access request(s) to verify against the token.
	pub request: Option<OneOrMany>,
}
impl IntrospectRequest {
	/// Introspects `token` without a server token or request filter.
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: token.into(), server_token: None, request: None }
	}

	/// Attaches the resource server's own token; empty values are ignored.
	pub fn with_server_token(mut self, server_token: impl Into<String>) -> Self {
		self.server_token = Some(server_token.into()).filter(|value| !value.is_empty());

		self
	}

	/// Restricts introspection to the given request(s).
	///
	/// Blank values (`null`, `false`, `""`, `[]`, `{}`) are ignored; anything else is sent as an
	/// array.
	pub fn with_request(mut self, request: impl Into<Value>) -> Self {
		let request: Value = request.into();

		self.request = (!is_blank(&request)).then(|| OneOrMany::from(request));

		self
	}

	fn into_body(self) -> Value {
		let mut body = Map::new();

		body.insert("token".into(), self.token.into());

		if let Some(server_token) = self.server_token {
			body.insert("server-token".into(), server_token.into());
		}
		if let Some(request) = self.request {
			body.insert("request".into(), request.into_value());
		}

		Value::Object(body)
	}
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null | Value::Bool(false) => true,
		Value::String(value) => value.is_empty(),
		Value::Array(values) => values.is_empty(),
		Value::Object(map) => map.is_empty(),
		_ => false,
	}
}

impl AuthRequest {
	/// `POST certificate-info` with no body.
	pub fn certificate_info() -> Self {
		Self::post("certificate-info")
	}

	/// `POST token`.
	pub fn get_token(request: TokenRequest) -> Self {
		Self::post("token").with_body(request.into_body())
	}

	/// `POST token/introspect`.
	pub fn introspect_token(request: IntrospectRequest) -> Self {
		Self::post("token/introspect").with_body(request.into_body())
	}

	/// `POST token/revoke` with `{"tokens": [...]}`.
	pub fn revoke_tokens(tokens: impl Into<OneOrMany>) -> Self {
		let tokens: OneOrMany = tokens.into();

		Self::post("token/revoke").with_body(json!({ "tokens": tokens.into_value() }))
	}

	/// `POST token/revoke` with `{"token-hashes": [...]}`.
	pub fn revoke_token_hashes(token_hashes: impl Into<OneOrMany>) -> Self {
		let token_hashes: OneOrMany = token_hashes.into();

		Self::post("token/revoke").with_body(json!({ "token-hashes": token_hashes.into_value() }))
	}

	/// `POST token/revoke-all` for every token issued to a certificate.
	pub fn revoke_all(serial: impl Into<String>, fingerprint: impl Into<String>) -> Self {
		let (serial, fingerprint): (String, String) = (serial.into(), fingerprint.into());

		Self::post("token/revoke-all")
			.with_body(json!({ "serial": serial, "fingerprint": fingerprint }))
	}

	/// `POST audit/tokens` covering the last `hours` hours.
	pub fn audit_tokens(hours: u32) -> Self {
		Self::post("audit/tokens").with_body(json!({ "hours": hours }))
	}

	/// `POST provider/access` granting an access rule.
	pub fn provider_access(request: impl Into<Value>, provider_email: Option<&str>) -> Self {
		Self::post("provider/access").with_body(request).with_provider_email(provider_email)
	}

	/// `DELETE provider/access` removing an access rule.
	pub fn delete_rule(request: impl Into<Value>, provider_email: Option<&str>) -> Self {
		Self::delete("provider/access").with_body(request).with_provider_email(provider_email)
	}

	/// `GET provider/access` listing access rules.
	pub fn get_provider_access(provider_email: Option<&str>) -> Self {
		Self::get("provider/access").with_body(json!({})).with_provider_email(provider_email)
	}

	/// `POST admin/organizations` registering an organization.
	pub fn organization_reg(organization: impl Into<Value>) -> Self {
		let organization: Value = organization.into();

		Self::post("admin/organizations").with_body(json!({ "organization": organization }))
	}

	/// `GET admin/provider/registrations`, optionally filtered by status.
	pub fn get_provider_regs(filter: Option<&str>) -> Self {
		let request = Self::get("admin/provider/registrations").with_body(json!({}));

		match filter {
			Some(filter) => request.with_param("filter", filter),
			None => request,
		}
	}

	/// `PUT admin/provider/registrations/status` updating a provider's registration status.
	pub fn update_provider_status(user_id: impl Display, status: impl Into<String>) -> Self {
		Self::put("admin/provider/registrations/status")
			.with_body(json!({}))
			.with_param("user_id", user_id.to_string())
			.with_param("status", status)
	}

	/// `GET delegate/providers`.
	pub fn get_delegate_providers() -> Self {
		Self::get("delegate/providers").with_body(json!({}))
	}

	/// `POST get-session-id` starting a step-up session.
	pub fn get_session_id(request: impl Into<Value>) -> Self {
		Self::post("get-session-id").with_body(request)
	}

	fn with_provider_email(self, provider_email: Option<&str>) -> Self {
		match provider_email.filter(|email| !email.is_empty()) {
			Some(email) => self.with_header(PROVIDER_EMAIL_HEADER, email),
			None => self,
		}
	}
}

impl<T> AuthClient<T>
where
	T: ?Sized + AuthTransport,
{
	/// Describes the certificate the client presented.
	pub async fn certificate_info(&self) -> Result<NormalizedResponse> {
		self.call(AuthRequest::certificate_info()).await
	}

	/// Requests an access token.
	pub async fn get_token(&self, request: TokenRequest) -> Result<NormalizedResponse> {
		self.call(AuthRequest::get_token(request)).await
	}

	/// Introspects a token.
	pub async fn introspect_token(&self, request: IntrospectRequest) -> Result<NormalizedResponse> {
		self.call(AuthRequest::introspect_token(request)).await
	}

	/// Revokes one or more tokens.
	pub async fn revoke_tokens(&self, tokens: impl Into<OneOrMany>) -> Result<NormalizedResponse> {
		self.call(AuthRequest::revoke_tokens(tokens)).await
	}

	/// Revokes one or more tokens by hash.
	pub async fn revoke_token_hashes(
		&self,
		token_hashes: impl Into<OneOrMany>,
	) -> Result<NormalizedResponse> {
		self.call(AuthRequest::revoke_token_hashes(token_hashes)).await
	}

	/// Revokes every token issued to the certificate with this serial and fingerprint.
	pub async fn revoke_all(
		&self,
		serial: impl Into<String>,
		fingerprint: impl Into<String>,
	) -> Result<NormalizedResponse> {
		self.call(AuthRequest::revoke_all(serial, fingerprint)).await
	}

	/// Audits tokens issued or introspected in the last `hours` hours.
	pub async fn audit_tokens(&self, hours: u32) -> Result<NormalizedResponse> {
		self.call(AuthRequest::audit_tokens(hours)).await
	}

	/// Grants an access rule.
	pub async fn provider_access(
		&self,
		request: impl Into<Value>,
		provider_email: Option<&str>,
	) -> Result<NormalizedResponse> {
		self.call(AuthRequest::provider_access(request, provider_email)).await
	}

	/// Deletes an access rule.
	pub async fn delete_rule(
		&self,
		request: impl Into<Value>,
		provider_email: Option<&str>,
	) -> Result<NormalizedResponse> {
		self.call(AuthRequest::delete_rule(request, provider_email)).await
	}

	/// Lists access rules.
	pub async fn get_provider_access(
		&self,
		provider_email: Option<&str>,
	) -> Result<NormalizedResponse> {
		self.call(AuthRequest::get_provider_access(provider_email)).await
	}

	/// Registers an organization.
	pub async fn organization_reg(
		&self,
		organization: impl Into<Value>,
	) -> Result<NormalizedResponse> {
		self.call(AuthRequest::organization_reg(organization)).await
	}

	/// Lists provider registrations.
	pub async fn get_provider_regs(&self, filter: Option<&str>) -> Result<NormalizedResponse> {
		self.call(AuthRequest::get_provider_regs(filter)).await
	}

	/// Updates a provider registration status.
	pub async fn update_provider_status(
		&self,
		user_id: impl Display,
		status: impl Into<String>,
	) -> Result<NormalizedResponse> {
		self.call(AuthRequest::update_provider_status(user_id, status)).await
	}

	/// Lists providers that delegated access management to the caller.
	pub async fn get_delegate_providers(&self) -> Result<NormalizedResponse> {
		self.call(AuthRequest::get_delegate_providers()).await
	}

	/// Starts a step-up session; pass the returned identifier to
	/// [`set_user_session_id`](Self::set_user_session_id).
	pub async fn get_session_id(&self, request: impl Into<Value>) -> Result<NormalizedResponse> {
		self.call(AuthRequest::get_session_id(request)).await
	}
}
