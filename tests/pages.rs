//! Router-level tests for page rendering and the response cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use vetrina::application::page::PageService;
use vetrina::application::revalidate::RevalidateService;
use vetrina::cache::{CacheState, ResponseCache};
use vetrina::config::CacheSettings;
use vetrina::content::{ContentError, ContentStore};
use vetrina::domain::documents::{
    DetailDocument, DocumentKind, PageDocument, SiteSettings, TeamMember,
};
use vetrina::infra::http::{HttpState, build_router};

#[derive(Default)]
struct ScriptedStore {
    pages: HashMap<String, PageDocument>,
    details: HashMap<String, DetailDocument>,
    page_fail: bool,
    page_calls: AtomicUsize,
}

impl ScriptedStore {
    fn with_page(mut self, slug: &str, document: serde_json::Value) -> Self {
        self.pages
            .insert(slug.to_string(), serde_json::from_value(document).unwrap());
        self
    }

    fn with_detail(mut self, slug: &str, document: serde_json::Value) -> Self {
        self.details
            .insert(slug.to_string(), serde_json::from_value(document).unwrap());
        self
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn site_settings(&self) -> Result<SiteSettings, ContentError> {
        Ok(SiteSettings {
            title: Some("Meridian".into()),
            ..Default::default()
        })
    }

    async fn page_by_slug(&self, slug: &str) -> Result<Option<PageDocument>, ContentError> {
        self.page_calls.fetch_add(1, Ordering::Relaxed);
        if self.page_fail {
            return Err(ContentError::decode("store unavailable"));
        }
        Ok(self.pages.get(slug).cloned())
    }

    async fn detail_by_slug(
        &self,
        _kind: DocumentKind,
        slug: &str,
    ) -> Result<Option<DetailDocument>, ContentError> {
        Ok(self.details.get(slug).cloned())
    }

    async fn slugs(&self, _kind: DocumentKind) -> Result<Vec<String>, ContentError> {
        Ok(Vec::new())
    }

    async fn team_members(&self) -> Result<Vec<TeamMember>, ContentError> {
        Ok(Vec::new())
    }
}

fn cache_settings(revalidate: Duration) -> CacheSettings {
    CacheSettings {
        enabled: true,
        revalidate,
        max_entries: NonZeroUsize::new(16).unwrap(),
    }
}

struct Harness {
    router: Router,
    store: Arc<ScriptedStore>,
}

fn harness(store: ScriptedStore, revalidate: Duration) -> Harness {
    let store = Arc::new(store);
    let as_store: Arc<dyn ContentStore> = store.clone();
    let cache = Arc::new(ResponseCache::new(&cache_settings(revalidate)));

    let revalidate_service = Arc::new(RevalidateService::new(
        Some("VALID".to_string()),
        as_store.clone(),
        cache.clone(),
    ));

    let router = build_router(HttpState {
        pages: Arc::new(PageService::new(as_store)),
        revalidate: revalidate_service,
        cache: Some(CacheState { cache }),
    });

    Harness { router, store }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn home_page() -> serde_json::Value {
    json!({
        "title": "Home",
        "slug": {"current": "home"},
        "blocks": [
            {"_type": "hero", "_key": "h1", "headline": "We build memorable brands"},
            {"_type": "statsSection", "stats": [
                {"value": "120+", "label": "Projects shipped"},
            ]},
            {"_type": "someFutureBlock", "payload": true},
        ],
    })
}

#[tokio::test]
async fn home_renders_dispatched_blocks_in_order() {
    let h = harness(ScriptedStore::default().with_page("home", home_page()), Duration::from_secs(60));

    let (status, body) = get(&h.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("We build memorable brands"));
    assert!(body.contains("Projects shipped"));
    assert!(body.contains(r#"data-key="h1""#));
    // The unknown block left no trace.
    assert!(!body.contains("someFutureBlock"));
    // Page meta picked up the site title.
    assert!(body.contains("<title>Home — Meridian</title>"));
}

#[tokio::test]
async fn second_request_is_served_from_cache() {
    let h = harness(ScriptedStore::default().with_page("home", home_page()), Duration::from_secs(60));

    let (first, _) = get(&h.router, "/").await;
    let (second, _) = get(&h.router, "/").await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(h.store.page_calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn stale_cache_entries_are_recomputed() {
    let h = harness(ScriptedStore::default().with_page("home", home_page()), Duration::ZERO);

    get(&h.router, "/").await;
    get(&h.router, "/").await;
    assert_eq!(h.store.page_calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn webhook_invalidation_forces_a_fresh_render() {
    let h = harness(ScriptedStore::default().with_page("home", home_page()), Duration::from_secs(60));

    get(&h.router, "/").await;
    get(&h.router, "/").await;
    assert_eq!(h.store.page_calls.load(Ordering::Relaxed), 1);

    let response = h
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/revalidate?secret=VALID")
                .header("content-type", "application/json")
                .body(Body::from(json!({"document": {"_type": "homePage"}}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    get(&h.router, "/").await;
    assert_eq!(h.store.page_calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn missing_page_renders_not_found() {
    let h = harness(ScriptedStore::default(), Duration::from_secs(60));

    let (status, body) = get(&h.router, "/about").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page Not Found"));
}

#[tokio::test]
async fn unknown_paths_fall_back_to_not_found() {
    let h = harness(ScriptedStore::default(), Duration::from_secs(60));

    let (status, _) = get(&h.router, "/admin/login").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fetch_failure_degrades_to_a_rendered_fallback() {
    let h = harness(
        ScriptedStore {
            page_fail: true,
            ..Default::default()
        },
        Duration::from_secs(60),
    );

    let (status, body) = get(&h.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Content is temporarily unavailable"));

    // Degraded renders are not cached, so recovery is immediate.
    get(&h.router, "/").await;
    assert_eq!(h.store.page_calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn detail_route_renders_document_header_and_blocks() {
    let h = harness(
        ScriptedStore::default().with_detail(
            "aurora",
            json!({
                "title": "Aurora rebrand",
                "category": "Identity",
                "excerpt": "A complete visual overhaul.",
                "blocks": [
                    {"_type": "fullDescriptionSection", "body": "Brief.\n\nOutcome."},
                ],
            }),
        ),
        Duration::from_secs(60),
    );

    let (status, body) = get(&h.router, "/work/aurora").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Aurora rebrand"));
    assert!(body.contains("Identity"));
    assert!(body.contains("A complete visual overhaul."));
    assert!(body.contains("Outcome."));
}

#[tokio::test]
async fn health_and_robots_bypass_the_cache() {
    let h = harness(ScriptedStore::default(), Duration::from_secs(60));

    let (status, _) = get(&h.router, "/_health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = get(&h.router, "/robots.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("User-agent"));
}
