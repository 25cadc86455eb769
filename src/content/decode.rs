//! Lenient decoding of query results.
//!
//! The store's payloads are author-controlled and drift over time. Decoding
//! is tolerant at every level that tolerance is cheap: absent documents read
//! as `None`, list elements that fail to decode are dropped with a log, and
//! only a structurally broken top-level document surfaces as an error.

use serde_json::Value;
use tracing::debug;

use crate::domain::documents::{DetailDocument, PageDocument, SiteSettings, TeamMember};

use super::ContentError;

pub fn page(value: Value) -> Result<Option<PageDocument>, ContentError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|err| ContentError::decode(err.to_string()))
}

pub fn detail(value: Value) -> Result<Option<DetailDocument>, ContentError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|err| ContentError::decode(err.to_string()))
}

pub fn site_settings(value: Value) -> Result<SiteSettings, ContentError> {
    if value.is_null() {
        return Ok(SiteSettings::default());
    }
    serde_json::from_value(value).map_err(|err| ContentError::decode(err.to_string()))
}

/// A slug listing is an array of strings; anything else in the array is
/// skipped.
pub fn slugs(value: Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(slug) if !slug.is_empty() => Some(slug),
            other => {
                debug!(
                    target = "vetrina::content::decode",
                    value = %other,
                    "skipping non-string slug entry"
                );
                None
            }
        })
        .collect()
}

pub fn team_members(value: Value) -> Vec<TeamMember> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<TeamMember>(item) {
            Ok(member) => Some(member),
            Err(err) => {
                debug!(
                    target = "vetrina::content::decode",
                    error = %err,
                    "skipping team member that failed to decode"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_page_reads_as_absent() {
        assert!(page(Value::Null).unwrap().is_none());
    }

    #[test]
    fn page_with_blocks_decodes() {
        let document = page(json!({
            "title": "Studio",
            "slug": {"current": "home"},
            "blocks": [{"_type": "hero", "headline": "Hello"}],
        }))
        .unwrap()
        .expect("document present");

        assert_eq!(document.title.as_deref(), Some("Studio"));
        assert_eq!(document.blocks.len(), 1);
    }

    #[test]
    fn slug_listing_skips_non_strings() {
        let listing = slugs(json!(["aurora", 7, null, "meridian", ""]));
        assert_eq!(listing, vec!["aurora".to_string(), "meridian".to_string()]);
    }

    #[test]
    fn slug_listing_of_wrong_shape_is_empty() {
        assert!(slugs(json!({"not": "an array"})).is_empty());
    }

    #[test]
    fn null_settings_fall_back_to_defaults() {
        let settings = site_settings(Value::Null).unwrap();
        assert!(settings.title.is_none());
    }

    #[test]
    fn broken_team_member_is_skipped() {
        let members = team_members(json!([
            {"name": "Ada", "role": "Design lead"},
            "not-an-object",
        ]));
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name.as_deref(), Some("Ada"));
    }
}
