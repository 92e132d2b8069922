#![cfg(feature = "server")]

mod common;

// std
use std::sync::Arc;
// crates.io
use axum::{
	body::{self, Body},
	http::{Method, Request, StatusCode, header},
};
use tower::ServiceExt;
// self
use common::RecordingTransport;
use oauth1_broker::{gateway::Gateway, server};

fn router(transport: Arc<RecordingTransport>) -> axum::Router {
	let broker = common::broker_with(common::descriptor("https://api.smugmug.example"), transport);

	server::router(Arc::new(Gateway::new(broker)))
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).expect("Request fixture should build.")
}

#[tokio::test]
async fn start_oauth_route_sets_location_and_cookie() {
	let transport =
		RecordingTransport::new([common::form(200, "oauth_token=RT1&oauth_token_secret=RTS1")]);
	let response = router(transport)
		.oneshot(get("/api/start-oauth"))
		.await
		.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::FOUND);
	assert_eq!(
		response.headers().get(header::LOCATION).and_then(|value| value.to_str().ok()),
		Some("https://api.smugmug.example/services/oauth/1.0a/authorize?oauth_token=RT1")
	);
	assert!(
		response
			.headers()
			.get(header::SET_COOKIE)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|cookie| cookie.starts_with("oauth1_broker_rts="))
	);
}

#[tokio::test]
async fn get_folders_route_rejects_get() {
	let transport = RecordingTransport::new([]);
	let response = router(transport.clone())
		.oneshot(get("/api/get-folders"))
		.await
		.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn create_folder_route_reports_missing_fields() {
	let transport = RecordingTransport::new([]);
	let response = router(transport.clone())
		.oneshot(get("/api/create-folder?access_token=AT"))
		.await
		.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		response.headers().get(header::CONTENT_TYPE).and_then(|value| value.to_str().ok()),
		Some("application/json")
	);
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn callback_route_reads_the_cookie_header() {
	let transport = RecordingTransport::new([
		common::form(200, "oauth_token=RT1&oauth_token_secret=RTS1"),
		common::form(200, "oauth_token=AT1&oauth_token_secret=ATS1"),
	]);
	let router = router(transport.clone());
	let start = router
		.clone()
		.oneshot(get("/api/start-oauth"))
		.await
		.expect("Router should answer.");
	let cookie = start
		.headers()
		.get(header::SET_COOKIE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(';').next())
		.expect("Carrier cookie should be set.")
		.to_owned();
	let request = Request::builder()
		.uri("/api/callback?oauth_token=RT1&oauth_verifier=V1")
		.header(header::COOKIE, cookie)
		.body(Body::empty())
		.expect("Request fixture should build.");
	let response = router.oneshot(request).await.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn wrong_methods_answer_with_the_json_envelope() {
	let transport = RecordingTransport::new([]);
	let router = router(transport.clone());

	for (method, uri) in [
		(Method::POST, "/api/start-oauth"),
		(Method::POST, "/api/callback"),
		(Method::DELETE, "/api/create-folder"),
		(Method::GET, "/api/get-folders"),
		(Method::PUT, "/api/update-folder"),
		(Method::PATCH, "/api/userinfo"),
	] {
		let request = Request::builder()
			.method(method.clone())
			.uri(uri)
			.body(Body::empty())
			.expect("Request fixture should build.");
		let response = router.clone().oneshot(request).await.expect("Router should answer.");

		assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");

		let bytes = body::to_bytes(response.into_body(), usize::MAX)
			.await
			.expect("Response body should be readable.");
		let envelope: serde_json::Value =
			serde_json::from_slice(&bytes).expect("405 body should be JSON.");

		assert_eq!(envelope["error"], "Method not allowed", "{method} {uri}");
		assert!(envelope["details"].is_string(), "{method} {uri}");
	}

	assert!(transport.requests().is_empty());
}
