use crate::support::*;
use axum::http::StatusCode;
use std::collections::HashSet;

#[tokio::test]
async fn pages_partition_the_result_set() -> anyhow::Result<()> {
    with_each_backend(|app| {
        Box::pin(async move {
            seed_numbered(&app.store, 23).await?;

            let mut seen = HashSet::new();
            for page in 1..=3 {
                let (status, body) = app
                    .get_json(&format!("/api/search?page={page}&limit=10"))
                    .await?;
                assert_status(status, StatusCode::OK, "page");
                assert_page(&body, 23, 3, page)?;

                let titles = blog_titles(&body)?;
                let expected = if page == 3 { 3 } else { 10 };
                assert_eq!(titles.len(), expected, "page {page}");
                for title in titles {
                    assert!(seen.insert(title.clone()), "{title} appeared twice");
                }
            }
            assert_eq!(seen.len(), 23);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn page_past_the_end_is_empty_not_an_error() -> anyhow::Result<()> {
    with_each_backend(|app| {
        Box::pin(async move {
            seed_numbered(&app.store, 5).await?;

            let (status, body) = app.get_json("/api/search?page=9&limit=2").await?;
            assert_status(status, StatusCode::OK, "past the end");
            assert_page(&body, 5, 3, 9)?;
            assert!(blog_titles(&body)?.is_empty());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn out_of_range_paging_values_are_clamped() -> anyhow::Result<()> {
    with_each_backend(|app| {
        Box::pin(async move {
            seed_numbered(&app.store, 120).await?;

            let (_, body) = app.get_json("/api/search?page=0&limit=0").await?;
            assert_eq!(field_u64(&body, "currentPage")?, 1);
            assert_eq!(blog_titles(&body)?.len(), 1);

            let (_, body) = app.get_json("/api/search?page=-4&limit=5000").await?;
            assert_eq!(field_u64(&body, "currentPage")?, 1);
            assert_eq!(blog_titles(&body)?.len(), 100);
            assert_eq!(field_u64(&body, "totalPages")?, 2);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn default_page_size_is_ten() -> anyhow::Result<()> {
    with_each_backend(|app| {
        Box::pin(async move {
            seed_numbered(&app.store, 12).await?;

            let (_, body) = app.get_json("/api/search").await?;
            assert_eq!(blog_titles(&body)?.len(), 10);
            assert_page(&body, 12, 2, 1)?;
            Ok(())
        })
    })
    .await
}
