//! Canned queries against the content store.
//!
//! The store speaks a projection query language; everything we need fits in
//! a handful of static shapes. Reference fields are expanded here so the
//! rendering pipeline receives self-contained documents.

use crate::domain::documents::DocumentKind;

/// Projection applied to every block list. Expands the references a block
/// may carry (services, projects, posts, testimonials, team members) and
/// resolves image/file assets to URLs.
const BLOCK_PROJECTION: &str = r#"blocks[]{
  ...,
  "background": background{
    color,
    "image": image{"url": asset->url, alt},
    "video": video{"url": asset->url}
  },
  "image": image{"url": asset->url, alt},
  services[]->{title, slug, excerpt, icon},
  projects[]->{title, slug, excerpt, category, "cover": cover{"url": asset->url, alt}},
  posts[]->{title, slug, excerpt, "publishedAt": publishedAt, "cover": cover{"url": asset->url, alt}},
  testimonials[]->{quote, author, role, company, "avatar": avatar{"url": asset->url, alt}},
  members[]->{name, role, bio, "photo": photo{"url": asset->url, alt}}
}"#;

pub fn page_by_slug() -> String {
    format!(
        r#"*[_type == "page" && slug.current == $slug][0]{{title, slug, seo, {BLOCK_PROJECTION}}}"#
    )
}

pub fn detail_by_slug(kind: DocumentKind) -> String {
    format!(
        r#"*[_type == "{kind}" && slug.current == $slug][0]{{title, slug, excerpt, category, seo, publishedAt, "cover": cover{{"url": asset->url, alt}}, {BLOCK_PROJECTION}}}"#,
        kind = kind.as_str(),
    )
}

pub fn slugs(kind: DocumentKind) -> String {
    format!(
        r#"*[_type == "{kind}" && defined(slug.current)].slug.current"#,
        kind = kind.as_str(),
    )
}

pub fn site_settings() -> String {
    r#"*[_type == "siteSettings"][0]{title, tagline, canonicalBase, nav, footerText, contactEmail, contactPhone, seo}"#
        .to_string()
}

pub fn team_members() -> String {
    r#"*[_type == "teamMember"] | order(name asc){name, role, bio, "photo": photo{"url": asset->url, alt}}"#
        .to_string()
}
