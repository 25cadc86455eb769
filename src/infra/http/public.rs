use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::warn;

use crate::{
    application::{page::PageService, revalidate::RevalidateService},
    cache::{CacheState, response_cache_layer},
    content::ContentError,
    domain::documents::DocumentKind,
    presentation::views::{
        DetailContext, DetailTemplate, LayoutChrome, LayoutContext, PageContext, PageTemplate,
        render_not_found_response, render_template_response,
    },
};

use super::{
    middleware::{log_responses, set_request_context},
    revalidate,
};

#[derive(Clone)]
pub struct HttpState {
    pub pages: Arc<PageService>,
    pub revalidate: Arc<RevalidateService>,
    pub cache: Option<CacheState>,
}

pub fn build_router(state: HttpState) -> Router {
    // Routes whose rendered output participates in the response cache.
    let cached_routes = Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/services", get(services_index))
        .route("/work", get(work_index))
        .route("/blog", get(blog_index))
        .route("/services/{slug}", get(service_detail))
        .route("/work/{slug}", get(project_detail))
        .route("/blog/{slug}", get(post_detail))
        .fallback(fallback);

    let cached_routes = if let Some(cache_state) = state.cache.clone() {
        cached_routes.layer(middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ))
    } else {
        cached_routes
    };

    // Plumbing routes stay outside the cache.
    let static_routes = Router::new()
        .route("/robots.txt", get(robots_txt))
        .route("/_health", get(health))
        .route("/api/revalidate", post(revalidate::handle));

    cached_routes
        .merge(static_routes)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn home(State(state): State<HttpState>) -> Response {
    page_response(state, "home", "/").await
}

async fn about(State(state): State<HttpState>) -> Response {
    page_response(state, "about", "/about").await
}

async fn contact(State(state): State<HttpState>) -> Response {
    page_response(state, "contact", "/contact").await
}

async fn services_index(State(state): State<HttpState>) -> Response {
    page_response(state, "services", "/services").await
}

async fn work_index(State(state): State<HttpState>) -> Response {
    page_response(state, "work", "/work").await
}

async fn blog_index(State(state): State<HttpState>) -> Response {
    page_response(state, "blog", "/blog").await
}

async fn service_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    detail_response(state, DocumentKind::Service, slug).await
}

async fn project_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    detail_response(state, DocumentKind::Project, slug).await
}

async fn post_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    detail_response(state, DocumentKind::Post, slug).await
}

async fn fallback(State(state): State<HttpState>) -> Response {
    let chrome = state.pages.chrome().await;
    render_not_found_response(chrome)
}

async fn page_response(state: HttpState, slug: &str, path: &str) -> Response {
    let chrome = state.pages.chrome().await;

    match state.pages.page(slug).await {
        Ok(Some(page)) => {
            let chrome = chrome.for_page(page.title.as_deref(), page.seo.as_ref(), path);
            let view = LayoutContext::new(
                chrome,
                PageContext {
                    nodes: page.nodes,
                    degraded: false,
                },
            );
            render_template_response(PageTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(error) => degraded_response(chrome, path, &error),
    }
}

async fn detail_response(state: HttpState, kind: DocumentKind, slug: String) -> Response {
    let chrome = state.pages.chrome().await;
    let path = kind.detail_path(&slug);

    match state.pages.detail(kind, &slug).await {
        Ok(Some(detail)) => {
            let chrome = chrome.for_page(Some(&detail.title), detail.seo.as_ref(), &path);
            let view = LayoutContext::new(
                chrome,
                DetailContext {
                    title: detail.title,
                    kicker: detail.kicker,
                    excerpt: detail.excerpt,
                    cover_url: detail.cover_url,
                    cover_alt: detail.cover_alt,
                    nodes: detail.nodes,
                },
            );
            render_template_response(DetailTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(error) => degraded_response(chrome, &path, &error),
    }
}

/// A failed content fetch renders the page shell with a quiet notice instead
/// of failing the request. The response opts out of the cache so recovery is
/// immediate.
fn degraded_response(chrome: LayoutChrome, path: &str, error: &ContentError) -> Response {
    warn!(
        target = "vetrina::http",
        path,
        error = %error,
        "content fetch failed; rendering degraded page"
    );

    let chrome = chrome.for_page(None, None, path);
    let view = LayoutContext::new(chrome, PageContext::degraded());
    let mut response = render_template_response(PageTemplate { view }, StatusCode::OK);
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        axum::http::HeaderValue::from_static("no-store"),
    );
    response
}

async fn robots_txt() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\n",
    )
        .into_response()
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
