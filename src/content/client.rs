//! HTTP client for the hosted content store.
//!
//! One client is constructed at startup and injected wherever content is
//! read; there is no global handle. Queries go to the store's query endpoint
//! as GET requests with the query string and its parameters in the URL, and
//! come back wrapped in a `{"result": ...}` envelope.

use std::time::Instant;

use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ContentSettings;
use crate::domain::documents::{
    DetailDocument, DocumentKind, PageDocument, SiteSettings, TeamMember,
};

use super::{ContentError, ContentStore, decode, query};

const CONTENT_API_HOST: &str = "api.sanity.io";

#[derive(Debug)]
pub struct ContentClient {
    http: reqwest::Client,
    query_url: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    #[serde(default)]
    result: Value,
}

impl ContentClient {
    pub fn new(settings: &ContentSettings) -> Result<Self, ContentError> {
        let root = match (&settings.base_url, &settings.project_id) {
            (Some(base_url), _) => base_url.trim_end_matches('/').to_string(),
            (None, Some(project_id)) => format!("https://{project_id}.{CONTENT_API_HOST}"),
            (None, None) => {
                return Err(ContentError::configuration(
                    "either content.base_url or content.project_id must be set",
                ));
            }
        };

        let version = settings.api_version.trim_start_matches('v');
        let query_url = Url::parse(&format!(
            "{root}/v{version}/data/query/{dataset}",
            dataset = settings.dataset
        ))
        .map_err(|err| ContentError::configuration(format!("invalid content endpoint: {err}")))?;

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            query_url,
            token: settings.token.clone(),
        })
    }

    /// Run one query and unwrap the result envelope.
    async fn query(&self, query: &str, params: &[(&str, &str)]) -> Result<Value, ContentError> {
        let mut request = self
            .http
            .get(self.query_url.clone())
            .query(&[("query", query)]);

        for (name, value) in params {
            // String parameters travel JSON-encoded, as the store expects.
            request = request.query(&[(
                format!("${name}"),
                Value::String((*value).to_string()).to_string(),
            )]);
        }

        if let Some(token) = self.token.as_ref() {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let outcome = self.run(request).await;
        histogram!("vetrina_content_fetch_ms").record(started.elapsed().as_millis() as f64);

        if outcome.is_err() {
            counter!("vetrina_content_fetch_fail_total").increment(1);
        }
        outcome
    }

    async fn run(&self, request: reqwest::RequestBuilder) -> Result<Value, ContentError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
            });
        }

        let envelope = response.json::<QueryEnvelope>().await?;
        Ok(envelope.result)
    }
}

#[async_trait::async_trait]
impl ContentStore for ContentClient {
    async fn site_settings(&self) -> Result<SiteSettings, ContentError> {
        let result = self.query(&query::site_settings(), &[]).await?;
        decode::site_settings(result)
    }

    async fn page_by_slug(&self, slug: &str) -> Result<Option<PageDocument>, ContentError> {
        let result = self.query(&query::page_by_slug(), &[("slug", slug)]).await?;
        debug!(
            target = "vetrina::content",
            slug,
            found = !result.is_null(),
            "fetched page document"
        );
        decode::page(result)
    }

    async fn detail_by_slug(
        &self,
        kind: DocumentKind,
        slug: &str,
    ) -> Result<Option<DetailDocument>, ContentError> {
        let result = self
            .query(&query::detail_by_slug(kind), &[("slug", slug)])
            .await?;
        decode::detail(result)
    }

    async fn slugs(&self, kind: DocumentKind) -> Result<Vec<String>, ContentError> {
        let result = self.query(&query::slugs(kind), &[]).await?;
        Ok(decode::slugs(result))
    }

    async fn team_members(&self) -> Result<Vec<TeamMember>, ContentError> {
        let result = self.query(&query::team_members(), &[]).await?;
        Ok(decode::team_members(result))
    }
}
