//! `axum` bindings for the gateway handlers.

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{Query, State},
	http::{HeaderMap, HeaderValue, Method, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{any, get},
};
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	gateway::{Gateway, GatewayBody, GatewayResponse},
	http::ProviderHttpClient,
	provider::HttpMethod,
};

type QueryPairs = Query<Vec<(String, String)>>;

/// Mounts every gateway handler under `/api/*`.
pub fn router<C>(gateway: Arc<Gateway<C>>) -> Router
where
	C: ?Sized + ProviderHttpClient,
{
	Router::new()
		.route("/api/start-oauth", get(start_oauth::<C>).fallback(use_get))
		.route("/api/callback", get(callback::<C>).fallback(use_get))
		.route(
			"/api/create-folder",
			get(create_folder::<C>).post(create_folder::<C>).fallback(use_get),
		)
		.route("/api/get-folders", any(get_folders::<C>))
		.route("/api/update-folder", any(update_folder::<C>))
		.route("/api/userinfo", get(user_info::<C>).fallback(use_get))
		.with_state(gateway)
}

/// Serves `router` on `listener` until the process stops.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
	#[cfg(feature = "tracing")]
	if let Ok(addr) = listener.local_addr() {
		tracing::info!(%addr, "broker gateway listening");
	}

	axum::serve(listener, router).await
}

async fn start_oauth<C>(State(gateway): State<Arc<Gateway<C>>>) -> Response
where
	C: ?Sized + ProviderHttpClient,
{
	into_response(gateway.start_oauth().await)
}

async fn callback<C>(
	State(gateway): State<Arc<Gateway<C>>>,
	Query(query): QueryPairs,
	headers: HeaderMap,
) -> Response
where
	C: ?Sized + ProviderHttpClient,
{
	let cookie = headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.collect::<Vec<_>>()
		.join("; ");
	let cookie = (!cookie.is_empty()).then_some(cookie.as_str());

	into_response(gateway.callback(query, cookie).await)
}

async fn create_folder<C>(
	State(gateway): State<Arc<Gateway<C>>>,
	Query(query): QueryPairs,
) -> Response
where
	C: ?Sized + ProviderHttpClient,
{
	into_response(gateway.create_folder(query).await)
}

async fn get_folders<C>(
	State(gateway): State<Arc<Gateway<C>>>,
	method: Method,
	body: Bytes,
) -> Response
where
	C: ?Sized + ProviderHttpClient,
{
	into_response(gateway.get_folders(method.as_str(), &body).await)
}

async fn update_folder<C>(
	State(gateway): State<Arc<Gateway<C>>>,
	method: Method,
	body: Bytes,
) -> Response
where
	C: ?Sized + ProviderHttpClient,
{
	into_response(gateway.update_folder(method.as_str(), &body).await)
}

async fn user_info<C>(State(gateway): State<Arc<Gateway<C>>>, Query(query): QueryPairs) -> Response
where
	C: ?Sized + ProviderHttpClient,
{
	into_response(gateway.user_info(query).await)
}

// Keeps wrong-method answers inside the JSON envelope instead of axum's empty 405.
async fn use_get() -> Response {
	into_response(GatewayResponse::method_not_allowed(HttpMethod::Get))
}

fn into_response(response: GatewayResponse) -> Response {
	let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
	let mut http = match response.body {
		GatewayBody::Json(value) => (status, Json(value)).into_response(),
		GatewayBody::Redirect(location) =>
			(status, [(header::LOCATION, location.to_string())]).into_response(),
	};

	if let Some(cookie) = response.set_cookie.and_then(|value| HeaderValue::from_str(&value).ok()) {
		http.headers_mut().append(header::SET_COOKIE, cookie);
	}

	http
}
