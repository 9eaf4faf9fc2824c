use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{AuthConfig, SupabaseClaims};

const SECRET: &str = "router-test-secret";

pub(crate) fn with_auth(router: Router) -> Router {
    router.layer(Extension(Arc::new(AuthConfig {
        jwt_secret: SECRET.to_string(),
    })))
}

pub(crate) fn bearer(user_id: Uuid) -> String {
    let claims = SupabaseClaims {
        sub: user_id.to_string(),
        role: "authenticated".to_string(),
        aud: "authenticated".to_string(),
        email: None,
        exp: 9_999_999_999,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    format!("Bearer {token}")
}

pub(crate) fn get(uri: &str, user_id: Uuid) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user_id))
        .body(Body::empty())
        .unwrap()
}

pub(crate) fn post_json(uri: &str, user_id: Uuid, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user_id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(crate) async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
