use crate::support::*;
use axum::http::{Method, StatusCode};
use uuid::Uuid;

fn expired() -> i64 {
    chrono::Utc::now().timestamp() - 120
}

#[tokio::test]
async fn history_rejects_tokens_that_fail_verification() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let stale = format!("Bearer {}", app.token_expiring_at(Uuid::new_v4(), expired())?);

            for authorization in ["Bearer not.a.jwt", stale.as_str()] {
                for method in [Method::GET, Method::DELETE] {
                    let (status, headers, body) = app
                        .request_with_extra_headers(
                            method.clone(),
                            "/api/search/history",
                            &[("authorization", authorization)],
                        )
                        .await?;
                    assert_status(status, StatusCode::UNAUTHORIZED, method.as_str());
                    assert!(headers.contains_key("www-authenticate"));
                    assert!(error_message(&parse_json(&body)?)?.contains("Invalid bearer token"));
                }
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_treats_unverifiable_tokens_as_anonymous() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            seed_catalogue(&app.store).await?;
            let me = Uuid::new_v4();
            let stale = format!("Bearer {}", app.token_expiring_at(me, expired())?);

            for authorization in ["Bearer not.a.jwt", stale.as_str()] {
                let (status, _, body) = app
                    .request_with_extra_headers(
                        Method::GET,
                        "/api/search?q=react",
                        &[("authorization", authorization)],
                    )
                    .await?;
                assert_status(status, StatusCode::OK, authorization);
                assert_eq!(field_u64(&parse_json(&body)?, "total")?, 3);
            }
            app.settle().await;

            let (_, body) = app.get_json_as(me, "/api/search/history").await?;
            assert_eq!(field_u64(&body, "total")?, 0, "anonymous searches are not recorded");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn public_routes_ignore_expired_tokens() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            seed_catalogue(&app.store).await?;
            let stale = format!("Bearer {}", app.token_expiring_at(Uuid::new_v4(), expired())?);

            let (status, _, body) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/api/search/suggestions?q=re",
                    &[("authorization", stale.as_str())],
                )
                .await?;
            assert_status(status, StatusCode::OK, "suggestions");
            assert_eq!(suggestion_labels(&parse_json(&body)?, "tags")?, vec!["React"]);

            for path in ["/api/search/popular", "/api/search/suggestions?q=re"] {
                let (status, _, _) = app
                    .request_with_extra_headers(
                        Method::GET,
                        path,
                        &[("authorization", "Bearer not.a.jwt")],
                    )
                    .await?;
                assert_status(status, StatusCode::OK, path);
            }

            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/api/search/popular",
                    &[("authorization", stale.as_str())],
                )
                .await?;
            assert_status(status, StatusCode::OK, "popular");
            Ok(())
        })
    })
    .await
}
