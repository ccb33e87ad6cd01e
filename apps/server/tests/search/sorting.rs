use crate::support::*;
use axum::http::StatusCode;

#[tokio::test]
async fn popular_react_posts_page_by_views() -> anyhow::Result<()> {
    with_each_backend(|app| {
        Box::pin(async move {
            seed_catalogue(&app.store).await?;

            let (status, body) = app
                .get_json("/api/search?q=react&sort=popular&page=1&limit=2")
                .await?;
            assert_status(status, StatusCode::OK, "popular search");
            assert_page(&body, 3, 2, 1)?;
            assert_eq!(blog_counts(&body, "views")?, vec![50, 30]);

            let (_, body) = app
                .get_json("/api/search?q=react&sort=popular&page=2&limit=2")
                .await?;
            assert_eq!(blog_counts(&body, "views")?, vec![10]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn each_sort_mode_orders_by_its_key() -> anyhow::Result<()> {
    with_each_backend(|app| {
        Box::pin(async move {
            seed_catalogue(&app.store).await?;

            let (_, body) = app.get_json("/api/search?sort=recent").await?;
            assert_eq!(
                blog_titles(&body)?,
                vec![
                    "Getting started with React hooks",
                    "Styling components",
                    "React server rendering",
                    "Ownership in Rust",
                ]
            );

            let (_, body) = app.get_json("/api/search?sort=oldest").await?;
            assert_eq!(blog_titles(&body)?[0], "Ownership in Rust");

            let (_, body) = app.get_json("/api/search?sort=popular").await?;
            let views = blog_counts(&body, "views")?;
            assert_sorted_desc(&views, "popular");
            assert_eq!(views[0], 80);

            let (_, body) = app.get_json("/api/search?sort=likes").await?;
            let likes = blog_counts(&body, "likes")?;
            assert_sorted_desc(&likes, "likes");
            assert_eq!(likes[0], 9);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_sort_falls_back_to_recent() -> anyhow::Result<()> {
    with_each_backend(|app| {
        Box::pin(async move {
            seed_catalogue(&app.store).await?;

            let (status, unknown) = app.get_json("/api/search?sort=trending").await?;
            assert_status(status, StatusCode::OK, "unknown sort");
            let (_, recent) = app.get_json("/api/search").await?;
            assert_eq!(blog_titles(&unknown)?, blog_titles(&recent)?);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn strict_sort_rejects_unknown_tokens() -> anyhow::Result<()> {
    with_each_backend_with_config(
        |config| config.search.strict_sort = true,
        |app| {
            Box::pin(async move {
                let (status, body) = app.get_json("/api/search?sort=trending").await?;
                assert_client_error(status, &body, "strict sort");
                assert!(error_message(&body)?.contains("trending"));
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn ties_are_broken_deterministically() -> anyhow::Result<()> {
    with_each_backend(|app| {
        Box::pin(async move {
            for i in 0..6 {
                let post = BlogBuilder::new(format!("Tied {i}")).views(7).build();
                app.store.insert_content(&post).await?;
            }

            let (_, first) = app.get_json("/api/search?sort=popular&limit=3").await?;
            let (_, again) = app.get_json("/api/search?sort=popular&limit=3").await?;
            assert_eq!(blog_titles(&first)?, blog_titles(&again)?);

            let (_, second) = app
                .get_json("/api/search?sort=popular&limit=3&page=2")
                .await?;
            let mut all = blog_titles(&first)?;
            all.extend(blog_titles(&second)?);
            all.sort();
            all.dedup();
            assert_eq!(all.len(), 6, "tied rows must not straddle pages");
            Ok(())
        })
    })
    .await
}
