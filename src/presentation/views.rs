//! Layout chrome and page-level templates.

use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::dispatch::RenderedNode;
use crate::application::error::{ErrorReport, HttpError};
use crate::domain::documents::{Seo, SiteSettings};

const DEFAULT_SITE_TITLE: &str = "Studio";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

// ============================================================================
// Chrome
// ============================================================================

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub tagline: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

/// Everything shared by every rendered page: branding, navigation, footer,
/// and the site-default meta values a page refines via [`LayoutChrome::for_page`].
#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    canonical_base: String,
}

impl LayoutChrome {
    /// Build chrome from fetched site settings, defaulting every absent
    /// field. Also serves as the degraded chrome when the settings fetch
    /// fails.
    pub fn from_settings(settings: &SiteSettings) -> Self {
        let title = settings
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_SITE_TITLE)
            .to_string();
        let tagline = settings.tagline.clone().unwrap_or_default();

        let entries: Vec<NavigationLinkView> = settings
            .nav
            .iter()
            .flatten()
            .filter_map(|link| {
                let label = link.label.as_deref().unwrap_or("").trim();
                let href = link.href.as_deref().unwrap_or("").trim();
                (!label.is_empty() && !href.is_empty()).then(|| NavigationLinkView {
                    label: label.to_string(),
                    href: href.to_string(),
                })
            })
            .collect();
        let entries = if entries.is_empty() {
            default_navigation()
        } else {
            entries
        };

        let copy = settings
            .footer_text
            .clone()
            .filter(|copy| !copy.is_empty())
            .unwrap_or_else(|| format!("© {title}"));

        let description = settings
            .seo
            .as_ref()
            .and_then(|seo| seo.description.clone())
            .or_else(|| settings.tagline.clone())
            .unwrap_or_default();
        let meta_title = settings
            .seo
            .as_ref()
            .and_then(|seo| seo.title.clone())
            .unwrap_or_else(|| title.clone());

        let canonical_base = settings
            .canonical_base
            .as_deref()
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_default();

        Self {
            brand: BrandView {
                title,
                tagline,
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                copy,
                email: settings.contact_email.clone().unwrap_or_default(),
                phone: settings.contact_phone.clone().unwrap_or_default(),
            },
            meta: PageMetaView {
                title: meta_title,
                description,
                canonical: String::new(),
            },
            canonical_base,
        }
    }

    pub fn degraded() -> Self {
        Self::from_settings(&SiteSettings::default())
    }

    /// Refine the chrome's meta for one page: document SEO wins, then the
    /// page title suffixed with the site title, then site defaults.
    pub fn for_page(&self, title: Option<&str>, seo: Option<&Seo>, path: &str) -> Self {
        let mut chrome = self.clone();

        let seo_title = seo.and_then(|seo| seo.title.as_deref()).filter(|t| !t.is_empty());
        chrome.meta.title = match (seo_title, title.filter(|t| !t.is_empty())) {
            (Some(seo_title), _) => seo_title.to_string(),
            (None, Some(title)) => format!("{title} — {}", self.brand.title),
            (None, None) => self.meta.title.clone(),
        };

        if let Some(description) = seo
            .and_then(|seo| seo.description.as_deref())
            .filter(|d| !d.is_empty())
        {
            chrome.meta.description = description.to_string();
        }

        chrome.meta.canonical = if self.canonical_base.is_empty() {
            String::new()
        } else {
            format!("{}{path}", self.canonical_base)
        };

        chrome
    }
}

fn default_navigation() -> Vec<NavigationLinkView> {
    [
        ("Home", "/"),
        ("About", "/about"),
        ("Services", "/services"),
        ("Work", "/work"),
        ("Blog", "/blog"),
        ("Contact", "/contact"),
    ]
    .into_iter()
    .map(|(label, href)| NavigationLinkView {
        label: label.to_string(),
        href: href.to_string(),
    })
    .collect()
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

// ============================================================================
// Page content contexts
// ============================================================================

/// A block-built page. `degraded` marks the fallback state rendered when the
/// content fetch failed.
pub struct PageContext {
    pub nodes: Vec<RenderedNode>,
    pub degraded: bool,
}

impl PageContext {
    pub fn degraded() -> Self {
        Self {
            nodes: Vec::new(),
            degraded: true,
        }
    }
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub view: LayoutContext<PageContext>,
}

/// A detail page (service, project, or post): a header built from the
/// document's own fields followed by its dispatched blocks.
pub struct DetailContext {
    pub title: String,
    pub kicker: String,
    pub excerpt: String,
    pub cover_url: String,
    pub cover_alt: String,
    pub nodes: Vec<RenderedNode>,
}

#[derive(Template)]
#[template(path = "detail.html")]
pub struct DetailTemplate {
    pub view: LayoutContext<DetailContext>,
}

// ============================================================================
// Error page
// ============================================================================

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::documents::NavLink;

    #[test]
    fn chrome_defaults_when_settings_are_empty() {
        let chrome = LayoutChrome::from_settings(&SiteSettings::default());
        assert_eq!(chrome.brand.title, DEFAULT_SITE_TITLE);
        assert_eq!(chrome.navigation.entries.len(), 6);
        assert_eq!(chrome.footer.copy, format!("© {DEFAULT_SITE_TITLE}"));
    }

    #[test]
    fn blank_nav_links_are_dropped() {
        let settings = SiteSettings {
            nav: Some(vec![
                NavLink {
                    label: Some("Work".into()),
                    href: Some("/work".into()),
                },
                NavLink {
                    label: Some("".into()),
                    href: Some("/nowhere".into()),
                },
            ]),
            ..Default::default()
        };

        let chrome = LayoutChrome::from_settings(&settings);
        assert_eq!(chrome.navigation.entries.len(), 1);
        assert_eq!(chrome.navigation.entries[0].label, "Work");
    }

    #[test]
    fn page_meta_prefers_document_seo() {
        let settings = SiteSettings {
            title: Some("Meridian".into()),
            canonical_base: Some("https://meridian.example/".into()),
            ..Default::default()
        };
        let chrome = LayoutChrome::from_settings(&settings);

        let seo = Seo {
            title: Some("Custom title".into()),
            description: Some("Custom description".into()),
        };
        let refined = chrome.for_page(Some("About"), Some(&seo), "/about");
        assert_eq!(refined.meta.title, "Custom title");
        assert_eq!(refined.meta.description, "Custom description");
        assert_eq!(refined.meta.canonical, "https://meridian.example/about");

        let fallback = chrome.for_page(Some("About"), None, "/about");
        assert_eq!(fallback.meta.title, "About — Meridian");
    }
}
