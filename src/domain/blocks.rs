//! Page-builder blocks.
//!
//! A page document carries an ordered list of typed blocks. The block set is
//! closed on our side: editors can publish block types this build does not
//! know yet, and those decode into [`BlockBody::Unknown`] and are skipped by
//! the dispatcher instead of failing the page.

use serde::{Deserialize, Deserializer};

use crate::domain::documents::{
    PostSummary, ProjectSummary, ServiceSummary, TeamMember, Testimonial,
};

/// One content unit in a page's ordered block list.
///
/// `key` is the store-assigned identity used for stable list rendering; `id`
/// is the fallback when a key is missing. Both may be absent, in which case
/// the dispatcher synthesizes `"{type}-{index}"`.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub body: BlockBody,
}

/// Closed sum over the known block types, tagged by the store's `_type`.
///
/// The `Unknown` arm is deliberate: unrecognized tags are dropped silently so
/// editors can roll out new block types ahead of the rendering code.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "_type", rename_all = "camelCase")]
pub enum BlockBody {
    Hero(HeroBlock),
    PageHero(PageHeroBlock),
    ServicesOverview(ServicesOverviewBlock),
    FeaturedProjects(FeaturedProjectsBlock),
    Testimonials(TestimonialsBlock),
    AboutSection(AboutSectionBlock),
    CtaSection(CtaSectionBlock),
    TextImageBlock(TextImageBlock),
    StatsSection(StatsSectionBlock),
    ServiceList(ServiceListBlock),
    BlogPosts(BlogPostsBlock),
    ContactForm(ContactFormBlock),
    FeaturesSection(FeaturesSectionBlock),
    ProcessSection(ProcessSectionBlock),
    FullDescriptionSection(FullDescriptionSectionBlock),
    ServiceCtaSection(ServiceCtaSectionBlock),
    OurStory(OurStoryBlock),
    OurValues(OurValuesBlock),
    MeetOurTeam(MeetOurTeamBlock),
    PackagesBlock(PackagesBlock),
    #[serde(other)]
    Unknown,
}

impl BlockBody {
    /// The store-side type tag, used when synthesizing list keys.
    pub fn tag(&self) -> &'static str {
        match self {
            BlockBody::Hero(_) => "hero",
            BlockBody::PageHero(_) => "pageHero",
            BlockBody::ServicesOverview(_) => "servicesOverview",
            BlockBody::FeaturedProjects(_) => "featuredProjects",
            BlockBody::Testimonials(_) => "testimonials",
            BlockBody::AboutSection(_) => "aboutSection",
            BlockBody::CtaSection(_) => "ctaSection",
            BlockBody::TextImageBlock(_) => "textImageBlock",
            BlockBody::StatsSection(_) => "statsSection",
            BlockBody::ServiceList(_) => "serviceList",
            BlockBody::BlogPosts(_) => "blogPosts",
            BlockBody::ContactForm(_) => "contactForm",
            BlockBody::FeaturesSection(_) => "featuresSection",
            BlockBody::ProcessSection(_) => "processSection",
            BlockBody::FullDescriptionSection(_) => "fullDescriptionSection",
            BlockBody::ServiceCtaSection(_) => "serviceCtaSection",
            BlockBody::OurStory(_) => "ourStory",
            BlockBody::OurValues(_) => "ourValues",
            BlockBody::MeetOurTeam(_) => "meetOurTeam",
            BlockBody::PackagesBlock(_) => "packagesBlock",
            BlockBody::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Shared value objects
// ============================================================================

/// A slug as stored by the CMS: either a bare string or `{"current": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slug(pub String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Plain(String),
            Object { current: Option<String> },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Plain(value) => Slug(value),
            Raw::Object { current } => Slug(current.unwrap_or_default()),
        })
    }
}

/// A call-to-action pair. Either half may be missing; a CTA with neither
/// renders nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cta {
    pub text: Option<String>,
    pub link: Option<String>,
}

impl Cta {
    pub fn is_blank(&self) -> bool {
        self.text.as_deref().unwrap_or("").is_empty()
            && self.link.as_deref().unwrap_or("").is_empty()
    }
}

/// An image reference, already dereferenced by the fetch query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// A file (video) reference, already dereferenced by the fetch query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileRef {
    pub url: Option<String>,
}

/// Section background. The three carriers are mutually exclusive render
/// paths; [`Background::resolve`] picks one with precedence video → image →
/// color.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Background {
    pub color: Option<String>,
    pub image: Option<ImageRef>,
    pub video: Option<FileRef>,
}

/// The single background rendering path selected from a [`Background`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundChoice {
    Video(String),
    Image(String),
    Color(String),
    None,
}

impl Background {
    pub fn resolve(&self) -> BackgroundChoice {
        if let Some(url) = self
            .video
            .as_ref()
            .and_then(|video| video.url.as_deref())
            .filter(|url| !url.is_empty())
        {
            return BackgroundChoice::Video(url.to_string());
        }
        if let Some(url) = self
            .image
            .as_ref()
            .and_then(|image| image.url.as_deref())
            .filter(|url| !url.is_empty())
        {
            return BackgroundChoice::Image(url.to_string());
        }
        if let Some(color) = self.color.as_deref().filter(|color| !color.is_empty()) {
            return BackgroundChoice::Color(color.to_string());
        }
        BackgroundChoice::None
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Stat {
    pub value: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessStep {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Package {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub cta: Option<Cta>,
}

// ============================================================================
// Block payloads
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroBlock {
    pub headline: Option<String>,
    pub subheadline: Option<String>,
    pub primary_cta: Option<Cta>,
    pub secondary_cta: Option<Cta>,
    pub background: Option<Background>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageHeroBlock {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub background: Option<Background>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServicesOverviewBlock {
    pub heading: Option<String>,
    pub intro: Option<String>,
    pub services: Option<Vec<ServiceSummary>>,
    pub cta: Option<Cta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturedProjectsBlock {
    pub heading: Option<String>,
    pub projects: Option<Vec<ProjectSummary>>,
    pub cta: Option<Cta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialsBlock {
    pub heading: Option<String>,
    pub testimonials: Option<Vec<Testimonial>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AboutSectionBlock {
    pub heading: Option<String>,
    pub body: Option<String>,
    pub image: Option<ImageRef>,
    pub cta: Option<Cta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaSectionBlock {
    pub heading: Option<String>,
    pub body: Option<String>,
    pub cta: Option<Cta>,
    pub background: Option<Background>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextImageBlock {
    pub heading: Option<String>,
    pub body: Option<String>,
    pub image: Option<ImageRef>,
    pub image_left: Option<bool>,
    pub cta: Option<Cta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsSectionBlock {
    pub heading: Option<String>,
    pub stats: Option<Vec<Stat>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceListBlock {
    pub heading: Option<String>,
    pub services: Option<Vec<ServiceSummary>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlogPostsBlock {
    pub heading: Option<String>,
    pub posts: Option<Vec<PostSummary>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactFormBlock {
    pub heading: Option<String>,
    pub intro: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturesSectionBlock {
    pub heading: Option<String>,
    pub features: Option<Vec<Feature>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessSectionBlock {
    pub heading: Option<String>,
    pub steps: Option<Vec<ProcessStep>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FullDescriptionSectionBlock {
    pub heading: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceCtaSectionBlock {
    pub heading: Option<String>,
    pub body: Option<String>,
    pub cta: Option<Cta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OurStoryBlock {
    pub heading: Option<String>,
    pub body: Option<String>,
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OurValuesBlock {
    pub heading: Option<String>,
    pub values: Option<Vec<Feature>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeetOurTeamBlock {
    pub heading: Option<String>,
    pub intro: Option<String>,
    pub members: Option<Vec<TeamMember>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackagesBlock {
    pub heading: Option<String>,
    pub intro: Option<String>,
    pub packages: Option<Vec<Package>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slug_accepts_plain_string() {
        let slug: Slug = serde_json::from_value(json!("branding")).unwrap();
        assert_eq!(slug.as_str(), "branding");
    }

    #[test]
    fn slug_accepts_current_object() {
        let slug: Slug = serde_json::from_value(json!({"current": "hello-world"})).unwrap();
        assert_eq!(slug.as_str(), "hello-world");
    }

    #[test]
    fn slug_defaults_empty_when_current_missing() {
        let slug: Slug = serde_json::from_value(json!({})).unwrap();
        assert!(slug.is_empty());
    }

    #[test]
    fn block_decodes_known_type() {
        let block: Block = serde_json::from_value(json!({
            "_type": "hero",
            "_key": "k1",
            "headline": "We build brands",
        }))
        .unwrap();

        assert_eq!(block.key.as_deref(), Some("k1"));
        match block.body {
            BlockBody::Hero(hero) => {
                assert_eq!(hero.headline.as_deref(), Some("We build brands"));
                assert!(hero.primary_cta.is_none());
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn block_with_unrecognized_tag_decodes_to_unknown() {
        let block: Block = serde_json::from_value(json!({
            "_type": "carousel3d",
            "_key": "k2",
            "whatever": [1, 2, 3],
        }))
        .unwrap();

        assert!(matches!(block.body, BlockBody::Unknown));
        assert_eq!(block.body.tag(), "unknown");
    }

    #[test]
    fn background_precedence_video_image_color() {
        let background = Background {
            color: Some("#112233".into()),
            image: Some(ImageRef {
                url: Some("https://cdn.example/cover.jpg".into()),
                alt: None,
            }),
            video: Some(FileRef {
                url: Some("https://cdn.example/reel.mp4".into()),
            }),
        };
        assert_eq!(
            background.resolve(),
            BackgroundChoice::Video("https://cdn.example/reel.mp4".into())
        );

        let background = Background {
            video: None,
            ..background
        };
        assert_eq!(
            background.resolve(),
            BackgroundChoice::Image("https://cdn.example/cover.jpg".into())
        );

        let background = Background {
            image: None,
            ..background
        };
        assert_eq!(
            background.resolve(),
            BackgroundChoice::Color("#112233".into())
        );
    }

    #[test]
    fn empty_background_resolves_to_none() {
        assert_eq!(Background::default().resolve(), BackgroundChoice::None);
    }

    #[test]
    fn cta_blankness() {
        assert!(Cta::default().is_blank());
        assert!(
            !Cta {
                text: Some("See our work".into()),
                link: None
            }
            .is_blank()
        );
    }
}
