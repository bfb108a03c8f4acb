use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use loandocs_api::auth::{generate_jwt, Claims, Role};
use loandocs_api::state::AppState;
use loandocs_api::storage::MemoryStorage;

pub const BOUNDARY: &str = "X-LOANDOCS-TEST-BOUNDARY";

pub struct TestApp {
    pub router: Router,
    pub storage: Arc<MemoryStorage>,
}

/// Fresh in-memory app per test. The dev-profile JWT secret is used for
/// token minting, so no environment setup is needed.
pub fn test_app() -> TestApp {
    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::in_memory_with_storage(storage.clone());
    TestApp {
        router: loandocs_api::app(state),
        storage,
    }
}

pub fn token_for(user_id: Uuid, role: Role) -> String {
    let email = match role {
        Role::Admin => "admin@example.com",
        Role::User => "user@example.com",
    };
    generate_jwt(Claims::new(user_id, role, email.to_string())).expect("token")
}

pub fn user_token(user_id: Uuid) -> String {
    token_for(user_id, Role::User)
}

pub fn admin_token() -> String {
    token_for(Uuid::new_v4(), Role::Admin)
}

/// Fire one request at the router and decode the JSON body.
pub async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Hand-rolled multipart body: text fields plus an optional `file` part.
pub fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((filename, bytes)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Create a loan application through the API, returning its id.
pub async fn create_application(
    router: &Router,
    token: &str,
    has_partner: bool,
    is_self_employed: bool,
) -> Result<Uuid> {
    let (status, body) = send(
        router,
        json_request(
            "POST",
            "/api/applications",
            Some(token),
            Some(serde_json::json!({
                "hasPartner": has_partner,
                "isSelfEmployed": is_self_employed,
                "loanAmount": 250000.0,
                "propertyValue": 320000.0,
                "termMonths": 360
            })),
        ),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "create application: {} {}", status, body);

    let id = body["application"]["id"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("missing application id: {}", body))?;
    Ok(Uuid::parse_str(id)?)
}
