//! Revalidation: mapping content-change notifications to path invalidations.
//!
//! The notification sender's payload shape has drifted across versions, so
//! the changed document is looked for at several locations in order; the
//! four-location list is the whole known contract. Path invalidation is
//! best-effort: one attempt per path, failures logged and skipped.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::paths::paths_for;
use crate::cache::store::ResponseCache;
use crate::content::ContentStore;
use crate::domain::documents::DocumentKind;

/// Payload locations probed for the changed document, in order.
const CHANGE_LOCATIONS: [&str; 3] = ["document", "result", "body"];

/// The changed document extracted from a notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    pub document_type: String,
    pub slug: Option<String>,
}

/// Try each known payload location, then the payload root. Each probe is
/// total; the first one that yields a document type wins.
pub fn extract_change(payload: &Value) -> Option<DocumentChange> {
    CHANGE_LOCATIONS
        .iter()
        .filter_map(|key| payload.get(key))
        .find_map(change_at)
        .or_else(|| change_at(payload))
}

fn change_at(value: &Value) -> Option<DocumentChange> {
    let document_type = value
        .get("_type")
        .or_else(|| value.get("type"))
        .and_then(Value::as_str)
        .filter(|document_type| !document_type.is_empty())?;

    Some(DocumentChange {
        document_type: document_type.to_string(),
        slug: value.get("slug").and_then(slug_text),
    })
}

fn slug_text(value: &Value) -> Option<String> {
    match value {
        Value::String(slug) if !slug.is_empty() => Some(slug.clone()),
        Value::Object(map) => map
            .get("current")
            .and_then(Value::as_str)
            .filter(|slug| !slug.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Error)]
#[error("failed to invalidate path: {0}")]
pub struct InvalidateError(pub String);

/// Seam between path computation and whatever holds the cached responses.
#[async_trait]
pub trait PathInvalidator: Send + Sync {
    async fn invalidate_path(&self, path: &str) -> Result<(), InvalidateError>;
}

#[async_trait]
impl PathInvalidator for ResponseCache {
    async fn invalidate_path(&self, path: &str) -> Result<(), InvalidateError> {
        self.invalidate(path);
        Ok(())
    }
}

/// Outcome of one notification: every path attempted and the subset that
/// failed. The HTTP layer answers 200 either way.
#[derive(Debug, Default)]
pub struct RevalidateOutcome {
    pub paths: Vec<String>,
    pub failed: Vec<String>,
}

pub struct RevalidateService {
    secret: Option<String>,
    store: Arc<dyn ContentStore>,
    invalidator: Arc<dyn PathInvalidator>,
}

impl RevalidateService {
    pub fn new(
        secret: Option<String>,
        store: Arc<dyn ContentStore>,
        invalidator: Arc<dyn PathInvalidator>,
    ) -> Self {
        Self {
            secret,
            store,
            invalidator,
        }
    }

    /// Plain equality against the one configured secret. With no secret
    /// configured every request is rejected.
    pub fn authorize(&self, provided: Option<&str>) -> bool {
        match (self.secret.as_deref(), provided) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }

    /// Compute and invalidate the stale paths for one notification payload.
    pub async fn process(&self, payload: &Value) -> RevalidateOutcome {
        counter!("vetrina_revalidate_request_total").increment(1);

        let Some(change) = extract_change(payload) else {
            debug!(
                target = "vetrina::revalidate",
                "no document type found in payload; nothing to invalidate"
            );
            return RevalidateOutcome::default();
        };

        let paths = self.paths_for_change(&change).await;
        let mut failed = Vec::new();

        for path in &paths {
            if let Err(error) = self.invalidator.invalidate_path(path).await {
                counter!("vetrina_revalidate_path_fail_total").increment(1);
                warn!(
                    target = "vetrina::revalidate",
                    path,
                    error = %error,
                    "path invalidation failed; continuing with remaining paths"
                );
                failed.push(path.clone());
            }
        }

        info!(
            target = "vetrina::revalidate",
            document_type = change.document_type,
            slug = change.slug.as_deref().unwrap_or(""),
            paths = paths.len(),
            failed = failed.len(),
            "revalidation processed"
        );

        RevalidateOutcome {
            paths: paths.into_iter().collect(),
            failed,
        }
    }

    async fn paths_for_change(&self, change: &DocumentChange) -> BTreeSet<String> {
        let mut paths = paths_for(&change.document_type, change.slug.as_deref());

        // Any recognized change also refreshes the root page.
        paths.insert("/".to_string());

        // Site-wide settings shape every rendered page, detail pages
        // included, so fan out across every known slug. A failed listing
        // degrades to the static set.
        if change.document_type == "siteSettings" {
            for kind in DocumentKind::ALL {
                match self.store.slugs(kind).await {
                    Ok(slugs) => {
                        paths.extend(slugs.iter().map(|slug| kind.detail_path(slug)));
                    }
                    Err(error) => {
                        warn!(
                            target = "vetrina::revalidate",
                            kind = kind.as_str(),
                            error = %error,
                            "slug enumeration failed; falling back to static paths"
                        );
                    }
                }
            }
        }

        paths
    }
}
