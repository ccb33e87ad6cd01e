use super::builders::{category, tag, user, BlogBuilder};
use super::store::TestStore;
use quill_search::models::{CategoryRef, ContentRecord, TagRef, UserRecord};

/// A small, fully-linked catalogue used by most search tests
pub struct Catalogue {
    pub alice: UserRecord,
    pub bob: UserRecord,
    pub frontend: CategoryRef,
    pub backend: CategoryRef,
    pub react: TagRef,
    pub rust: TagRef,
    pub css: TagRef,
    pub posts: Vec<ContentRecord>,
}

/// Seed directory entries and posts into `store`
pub async fn seed_catalogue(store: &TestStore) -> anyhow::Result<Catalogue> {
    let alice = user("Alice Moreau", "alice");
    let bob = user("Bob Reyes", "bob");
    let frontend = category("Frontend");
    let backend = category("Backend");
    let react = tag("React");
    let rust = tag("Rust");
    let css = tag("CSS");

    for u in [&alice, &bob] {
        store.insert_user(u).await?;
    }
    for c in [&frontend, &backend] {
        store.insert_category(c).await?;
    }
    for t in [&react, &rust, &css] {
        store.insert_tag(t).await?;
    }

    let posts = vec![
        BlogBuilder::new("Getting started with React hooks")
            .content("useState and useEffect walkthrough")
            .author(&alice)
            .category(&frontend)
            .tag(&react)
            .views(50)
            .likes(4)
            .days_ago(1)
            .build(),
        BlogBuilder::new("Styling components")
            .content("Scoped CSS for React applications")
            .author(&alice)
            .category(&frontend)
            .tag(&css)
            .tag(&react)
            .views(10)
            .likes(9)
            .days_ago(10)
            .build(),
        BlogBuilder::new("React server rendering")
            .excerpt("Streaming HTML from the edge")
            .author(&bob)
            .category(&frontend)
            .tag(&react)
            .views(30)
            .likes(1)
            .days_ago(40)
            .build(),
        BlogBuilder::new("Ownership in Rust")
            .content("Borrowing rules explained")
            .author(&bob)
            .category(&backend)
            .tag(&rust)
            .views(80)
            .likes(2)
            .days_ago(100)
            .build(),
        BlogBuilder::new("Unpublished React notes")
            .content("react react react")
            .author(&alice)
            .category(&frontend)
            .tag(&react)
            .views(999)
            .draft()
            .build(),
    ];

    for post in &posts {
        store.insert_content(post).await?;
    }

    Ok(Catalogue {
        alice,
        bob,
        frontend,
        backend,
        react,
        rust,
        css,
        posts,
    })
}

/// `n` published posts with distinct titles, one day apart
pub async fn seed_numbered(store: &TestStore, n: usize) -> anyhow::Result<Vec<ContentRecord>> {
    let mut posts = Vec::with_capacity(n);
    for i in 0..n {
        let post = BlogBuilder::new(format!("Post {i:02}"))
            .views(i as i64)
            .days_ago(i as i64)
            .build();
        store.insert_content(&post).await?;
        posts.push(post);
    }
    Ok(posts)
}
