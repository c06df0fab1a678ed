mod common;

use anyhow::Result;
use axum::http::StatusCode;
use houzdey_api::auth::{generate_jwt, Claims};

use common::{TestApp, SECRET};

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/api/v1/users/me/properties", None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], true);
    assert_eq!(res.body["code"], "UNAUTHORIZED");

    let res = app.delete("/api/v1/properties/66eb45085bc5f324f674a07f", None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn public_routes_ignore_missing_tokens() -> Result<()> {
    let app = TestApp::new();
    let res = app.get("/api/v1/properties", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let forged = generate_jwt(&Claims::new("alice", None, 1), "not-the-secret")?;

    let res = app.get("/api/v1/users/me/properties", Some(&forged)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_tokens_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let mut claims = Claims::new("alice", None, 1);
    claims.iat -= 7200;
    claims.exp = claims.iat + 60;
    let expired = generate_jwt(&claims, SECRET)?;

    let res = app.get("/api/v1/users/me/properties", Some(&expired)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let res = app.get("/api/v1/users/me/properties", Some("not.a.jwt")).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
