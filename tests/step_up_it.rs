mod common;

// crates.io
use serde_json::json;
// self
use common::*;
use mtls_auth_client::{
	client::{AuthRequest, SESSION_ID_HEADER, STEP_UP_HEADER, TokenRequest},
	policy::HttpMethod,
};

#[tokio::test]
async fn secured_pairs_carry_step_up_headers() {
	let client = recording_client(Reply::json(200, "{}"));
	let transport = shared_transport(&client);
	let pairs = client
		.secured_endpoints
		.iter()
		.map(|(path, method)| (api_suffix(path).to_owned(), method))
		.collect::<Vec<_>>();

	assert!(!pairs.is_empty());

	for (api, method) in &pairs {
		client
			.call(AuthRequest::new(api.as_str(), *method))
			.await
			.expect("Recorded call should normalize.");

		let request = transport.last_request();

		assert_eq!(request.header(SESSION_ID_HEADER), Some("0"), "{method} {api}");
		assert_eq!(request.header(STEP_UP_HEADER), Some("true"), "{method} {api}");
		assert_eq!(request.header("content-type"), Some("application/json"));
	}

	assert_eq!(transport.requests().len(), pairs.len());
}

#[tokio::test]
async fn unsecured_pairs_never_carry_step_up_headers() {
	let client = recording_client(Reply::json(200, "{}"));
	let transport = shared_transport(&client);
	let apis = ["token", "provider/access", "audit/tokens", "certificate-info", "token/introspect"];

	client.set_user_session_id("session-123");

	for api in apis {
		for method in ALL_METHODS {
			let endpoint = format!("/auth/v1/{api}");

			if client.secured_endpoints.requires_step_up(&endpoint, method) {
				continue;
			}

			client
				.call(AuthRequest::new(api, method))
				.await
				.expect("Recorded call should normalize.");

			let request = transport.last_request();

			assert_eq!(request.header(SESSION_ID_HEADER), None, "{method} {api}");
			assert_eq!(request.header(STEP_UP_HEADER), None, "{method} {api}");
		}
	}

	// `GET provider/access` is not listed even though `POST`/`DELETE` are.
	client.get_provider_access(None).await.expect("Recorded call should normalize.");

	assert_eq!(transport.last_request().header(STEP_UP_HEADER), None);
}

#[tokio::test]
async fn session_setter_feeds_later_calls() {
	let client = recording_client(Reply::json(200, r#"{"token":"t"}"#));
	let transport = shared_transport(&client);

	client
		.get_token(TokenRequest::new(json!({"id": "rs.example.com/resource-group"})))
		.await
		.expect("Recorded call should normalize.");

	assert_eq!(transport.last_request().header(SESSION_ID_HEADER), Some("0"));

	client.set_user_session_id("abc");
	client.audit_tokens(24).await.expect("Recorded call should normalize.");

	assert_eq!(transport.last_request().header(SESSION_ID_HEADER), Some("abc"));
	assert_eq!(client.session_id(), "abc");

	client.set_user_session_id("def");
	client.revoke_all("serial", "fingerprint").await.expect("Recorded call should normalize.");

	assert_eq!(transport.last_request().header(SESSION_ID_HEADER), Some("def"));
}

#[tokio::test]
async fn caller_headers_cannot_override_step_up_values() {
	let client = recording_client(Reply::json(200, "{}"));
	let transport = shared_transport(&client);

	client.set_user_session_id("real-session");
	client
		.call(
			AuthRequest::post("token")
				.with_header("TFA", "false")
				.with_header("Session-Id", "forged")
				.with_header("Content-Type", "application/vnd.custom+json"),
		)
		.await
		.expect("Recorded call should normalize.");

	let request = transport.last_request();

	assert_eq!(request.header(SESSION_ID_HEADER), Some("real-session"));
	assert_eq!(request.header(STEP_UP_HEADER), Some("true"));
	assert_eq!(request.header("content-type"), Some("application/vnd.custom+json"));
	assert!(!request.headers.contains_key("TFA"));
}

#[tokio::test]
async fn headers_do_not_leak_between_calls() {
	let client = recording_client(Reply::json(200, "{}"));
	let transport = shared_transport(&client);

	client
		.get_provider_access(Some("provider@example.com"))
		.await
		.expect("Recorded call should normalize.");

	assert_eq!(transport.last_request().header("provider-email"), Some("provider@example.com"));

	client.get_provider_access(None).await.expect("Recorded call should normalize.");

	let request = transport.last_request();

	assert_eq!(request.header("provider-email"), None);
	assert_eq!(request.headers.len(), 1, "Only the content-type default should remain.");
}

#[tokio::test]
async fn requests_resolve_url_method_and_body() {
	let client = recording_client(Reply::json(200, "{}"));
	let transport = shared_transport(&client);

	client.certificate_info().await.expect("Recorded call should normalize.");

	let request = transport.last_request();

	assert_eq!(request.method, HttpMethod::Post);
	assert_eq!(request.url.as_str(), "https://auth.test.local/auth/v1/certificate-info");
	assert_eq!(request.body, "null");

	client.update_provider_status(42, "approved").await.expect("Recorded call should normalize.");

	let request = transport.last_request();

	assert_eq!(request.method, HttpMethod::Put);
	assert_eq!(request.url.path(), "/auth/v1/admin/provider/registrations/status");
	assert_eq!(request.url.query(), Some("status=approved&user_id=42"));
	assert_eq!(request.body, "{}");

	client.get_provider_regs(None).await.expect("Recorded call should normalize.");

	let request = transport.last_request();

	assert_eq!(request.method, HttpMethod::Get);
	assert_eq!(request.url.query(), None);
	assert_eq!(request.body, "{}");
}

#[tokio::test]
async fn scalar_and_list_revocations_send_identical_bodies() {
	let client = recording_client(Reply::json(200, "{}"));
	let transport = shared_transport(&client);

	client.revoke_tokens("abc").await.expect("Recorded call should normalize.");
	client.revoke_tokens(["abc"]).await.expect("Recorded call should normalize.");

	let requests = transport.requests();

	assert_eq!(requests[0].body, requests[1].body);
	assert_eq!(
		serde_json::from_str::<serde_json::Value>(&requests[0].body)
			.expect("Recorded body should be JSON."),
		json!({"tokens": ["abc"]}),
	);
}

#[tokio::test]
async fn unreachable_server_is_recovered() {
	let client = recording_client(Reply::Unreachable);
	let response = client.certificate_info().await.expect("Transport failures are recovered.");

	assert!(!response.success);
	assert_eq!(response.response, None);
	assert_eq!(response.status_code, None);
}

#[tokio::test]
async fn routine_failures_come_back_normalized() {
	let client = recording_client(Reply::json(200, "{}"));
	let transport = shared_transport(&client);

	transport.enqueue(Reply::json(403, r#"{"error":"forbidden"}"#));
	transport.enqueue(Reply::text(200, "hello"));

	let denied = client.audit_tokens(1).await.expect("Non-200 JSON is normalized.");

	assert!(!denied.success);
	assert_eq!(denied.status_code, Some(403));
	assert_eq!(denied.response, Some(json!({"error": "forbidden"})));

	let text = client.get_delegate_providers().await.expect("Non-JSON is normalized.");

	assert!(text.success);
	assert_eq!(text.response, None);
	assert!(!text.is_json());

	let ok = client.get_delegate_providers().await.expect("Fallback reply is JSON.");

	assert!(ok.success);
	assert_eq!(ok.response, Some(json!({})));
}
