//! Section views, one per block type.
//!
//! Coercion from block payloads happens here and nowhere else: every
//! optional payload field is defaulted before a template sees it, so the
//! templates stay free of missing-value handling beyond plain emptiness
//! checks.

use askama::Template;

use crate::domain::blocks::{
    AboutSectionBlock, Background, BackgroundChoice, BlogPostsBlock, ContactFormBlock, Cta,
    CtaSectionBlock, FeaturedProjectsBlock, FeaturesSectionBlock, FullDescriptionSectionBlock,
    HeroBlock, ImageRef, MeetOurTeamBlock, OurStoryBlock, OurValuesBlock, PackagesBlock,
    PageHeroBlock, ProcessSectionBlock, ServiceCtaSectionBlock, ServiceListBlock,
    ServicesOverviewBlock, StatsSectionBlock, TestimonialsBlock, TextImageBlock,
};
use crate::domain::documents::{
    DocumentKind, PostSummary, ProjectSummary, ServiceSummary, TeamMember, Testimonial,
};

const DEFAULT_CTA_TEXT: &str = "Learn more";

// ============================================================================
// Shared view pieces
// ============================================================================

#[derive(Clone)]
pub struct CtaView {
    pub text: String,
    pub href: String,
}

/// A CTA renders when either half is present; the missing half gets a
/// serviceable default.
fn cta_view(cta: &Option<Cta>) -> Option<CtaView> {
    cta.as_ref().filter(|cta| !cta.is_blank()).map(|cta| CtaView {
        text: cta
            .text
            .clone()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_CTA_TEXT.to_string()),
        href: cta
            .link
            .clone()
            .filter(|link| !link.is_empty())
            .unwrap_or_else(|| "#".to_string()),
    })
}

#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

fn image_view(image: &Option<ImageRef>) -> Option<ImageView> {
    image
        .as_ref()
        .and_then(|image| image.url.as_deref())
        .filter(|url| !url.is_empty())
        .map(|url| ImageView {
            url: url.to_string(),
            alt: image
                .as_ref()
                .and_then(|image| image.alt.clone())
                .unwrap_or_default(),
        })
}

/// The resolved, mutually exclusive background rendering path.
#[derive(Clone, Default)]
pub struct BackgroundView {
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub color: Option<String>,
}

fn background_view(background: &Option<Background>) -> BackgroundView {
    match background
        .as_ref()
        .map(Background::resolve)
        .unwrap_or(BackgroundChoice::None)
    {
        BackgroundChoice::Video(url) => BackgroundView {
            video_url: Some(url),
            ..Default::default()
        },
        BackgroundChoice::Image(url) => BackgroundView {
            image_url: Some(url),
            ..Default::default()
        },
        BackgroundChoice::Color(color) => BackgroundView {
            color: Some(color),
            ..Default::default()
        },
        BackgroundChoice::None => BackgroundView::default(),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Plain-text body copy is authored with blank lines between paragraphs.
fn paragraphs(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or("")
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Cards for expanded references
// ============================================================================

#[derive(Clone)]
pub struct ServiceCardView {
    pub title: String,
    pub href: String,
    pub excerpt: String,
    pub icon: String,
}

fn service_card(summary: &ServiceSummary) -> ServiceCardView {
    ServiceCardView {
        title: text(&summary.title),
        href: summary
            .slug
            .as_ref()
            .filter(|slug| !slug.is_empty())
            .map(|slug| DocumentKind::Service.detail_path(slug.as_str()))
            .unwrap_or_else(|| DocumentKind::Service.listing_path().to_string()),
        excerpt: text(&summary.excerpt),
        icon: text(&summary.icon),
    }
}

#[derive(Clone)]
pub struct ProjectCardView {
    pub title: String,
    pub href: String,
    pub excerpt: String,
    pub category: String,
    pub image: Option<ImageView>,
}

fn project_card(summary: &ProjectSummary) -> ProjectCardView {
    ProjectCardView {
        title: text(&summary.title),
        href: summary
            .slug
            .as_ref()
            .filter(|slug| !slug.is_empty())
            .map(|slug| DocumentKind::Project.detail_path(slug.as_str()))
            .unwrap_or_else(|| DocumentKind::Project.listing_path().to_string()),
        excerpt: text(&summary.excerpt),
        category: text(&summary.category),
        image: image_view(&summary.cover),
    }
}

#[derive(Clone)]
pub struct PostCardView {
    pub title: String,
    pub href: String,
    pub excerpt: String,
    pub published: String,
    pub image: Option<ImageView>,
}

fn post_card(summary: &PostSummary) -> PostCardView {
    PostCardView {
        title: text(&summary.title),
        href: summary
            .slug
            .as_ref()
            .filter(|slug| !slug.is_empty())
            .map(|slug| DocumentKind::Post.detail_path(slug.as_str()))
            .unwrap_or_else(|| DocumentKind::Post.listing_path().to_string()),
        excerpt: text(&summary.excerpt),
        published: summary.published_label().unwrap_or_default(),
        image: image_view(&summary.cover),
    }
}

// ============================================================================
// Section templates
// ============================================================================

#[derive(Template)]
#[template(path = "sections/hero.html")]
pub struct HeroView {
    pub headline: String,
    pub subheadline: String,
    pub primary_cta: Option<CtaView>,
    pub secondary_cta: Option<CtaView>,
    pub background: BackgroundView,
}

impl HeroView {
    pub fn from_block(block: &HeroBlock) -> Self {
        Self {
            headline: text(&block.headline),
            subheadline: text(&block.subheadline),
            primary_cta: cta_view(&block.primary_cta),
            secondary_cta: cta_view(&block.secondary_cta),
            background: background_view(&block.background),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/page_hero.html")]
pub struct PageHeroView {
    pub title: String,
    pub subtitle: String,
    pub background: BackgroundView,
}

impl PageHeroView {
    pub fn from_block(block: &PageHeroBlock) -> Self {
        Self {
            title: text(&block.title),
            subtitle: text(&block.subtitle),
            background: background_view(&block.background),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/services_overview.html")]
pub struct ServicesOverviewView {
    pub heading: String,
    pub intro: String,
    pub services: Vec<ServiceCardView>,
    pub cta: Option<CtaView>,
}

impl ServicesOverviewView {
    pub fn from_block(block: &ServicesOverviewBlock) -> Self {
        Self {
            heading: text(&block.heading),
            intro: text(&block.intro),
            services: block
                .services
                .iter()
                .flatten()
                .map(service_card)
                .collect(),
            cta: cta_view(&block.cta),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/featured_projects.html")]
pub struct FeaturedProjectsView {
    pub heading: String,
    pub projects: Vec<ProjectCardView>,
    pub cta: Option<CtaView>,
}

impl FeaturedProjectsView {
    pub fn from_block(block: &FeaturedProjectsBlock) -> Self {
        Self {
            heading: text(&block.heading),
            projects: block.projects.iter().flatten().map(project_card).collect(),
            cta: cta_view(&block.cta),
        }
    }
}

#[derive(Clone)]
pub struct TestimonialView {
    pub quote: String,
    pub author: String,
    pub attribution: String,
    pub avatar: Option<ImageView>,
}

fn testimonial_view(entry: &Testimonial) -> TestimonialView {
    let attribution = [entry.role.as_deref(), entry.company.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    TestimonialView {
        quote: text(&entry.quote),
        author: text(&entry.author),
        attribution,
        avatar: image_view(&entry.avatar),
    }
}

#[derive(Template)]
#[template(path = "sections/testimonials.html")]
pub struct TestimonialsView {
    pub heading: String,
    pub entries: Vec<TestimonialView>,
}

impl TestimonialsView {
    pub fn from_block(block: &TestimonialsBlock) -> Self {
        Self {
            heading: text(&block.heading),
            entries: block
                .testimonials
                .iter()
                .flatten()
                .map(testimonial_view)
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/about.html")]
pub struct AboutSectionView {
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub image: Option<ImageView>,
    pub cta: Option<CtaView>,
}

impl AboutSectionView {
    pub fn from_block(block: &AboutSectionBlock) -> Self {
        Self {
            heading: text(&block.heading),
            paragraphs: paragraphs(&block.body),
            image: image_view(&block.image),
            cta: cta_view(&block.cta),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/cta.html")]
pub struct CtaSectionView {
    pub heading: String,
    pub body: String,
    pub cta: Option<CtaView>,
    pub background: BackgroundView,
}

impl CtaSectionView {
    pub fn from_block(block: &CtaSectionBlock) -> Self {
        Self {
            heading: text(&block.heading),
            body: text(&block.body),
            cta: cta_view(&block.cta),
            background: background_view(&block.background),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/text_image.html")]
pub struct TextImageView {
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub image: Option<ImageView>,
    pub image_left: bool,
    pub cta: Option<CtaView>,
}

impl TextImageView {
    pub fn from_block(block: &TextImageBlock) -> Self {
        Self {
            heading: text(&block.heading),
            paragraphs: paragraphs(&block.body),
            image: image_view(&block.image),
            image_left: block.image_left.unwrap_or(false),
            cta: cta_view(&block.cta),
        }
    }
}

#[derive(Clone)]
pub struct StatView {
    pub value: String,
    pub label: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "sections/stats.html")]
pub struct StatsSectionView {
    pub heading: String,
    pub stats: Vec<StatView>,
}

impl StatsSectionView {
    pub fn from_block(block: &StatsSectionBlock) -> Self {
        Self {
            heading: text(&block.heading),
            stats: block
                .stats
                .iter()
                .flatten()
                .map(|stat| StatView {
                    value: text(&stat.value),
                    label: text(&stat.label),
                    description: text(&stat.description),
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/service_list.html")]
pub struct ServiceListView {
    pub heading: String,
    pub services: Vec<ServiceCardView>,
}

impl ServiceListView {
    pub fn from_block(block: &ServiceListBlock) -> Self {
        Self {
            heading: text(&block.heading),
            services: block.services.iter().flatten().map(service_card).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/blog_posts.html")]
pub struct BlogPostsView {
    pub heading: String,
    pub posts: Vec<PostCardView>,
}

impl BlogPostsView {
    pub fn from_block(block: &BlogPostsBlock) -> Self {
        Self {
            heading: text(&block.heading),
            posts: block.posts.iter().flatten().map(post_card).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/contact_form.html")]
pub struct ContactFormView {
    pub heading: String,
    pub intro: String,
    pub email: String,
    pub phone: String,
}

impl ContactFormView {
    pub fn from_block(block: &ContactFormBlock) -> Self {
        Self {
            heading: text(&block.heading),
            intro: text(&block.intro),
            email: text(&block.email),
            phone: text(&block.phone),
        }
    }
}

#[derive(Clone)]
pub struct FeatureView {
    pub title: String,
    pub description: String,
    pub icon: String,
}

fn feature_view(feature: &crate::domain::blocks::Feature) -> FeatureView {
    FeatureView {
        title: text(&feature.title),
        description: text(&feature.description),
        icon: text(&feature.icon),
    }
}

#[derive(Template)]
#[template(path = "sections/features.html")]
pub struct FeaturesSectionView {
    pub heading: String,
    pub features: Vec<FeatureView>,
}

impl FeaturesSectionView {
    pub fn from_block(block: &FeaturesSectionBlock) -> Self {
        Self {
            heading: text(&block.heading),
            features: block.features.iter().flatten().map(feature_view).collect(),
        }
    }
}

#[derive(Clone)]
pub struct ProcessStepView {
    pub number: usize,
    pub title: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "sections/process.html")]
pub struct ProcessSectionView {
    pub heading: String,
    pub steps: Vec<ProcessStepView>,
}

impl ProcessSectionView {
    pub fn from_block(block: &ProcessSectionBlock) -> Self {
        Self {
            heading: text(&block.heading),
            steps: block
                .steps
                .iter()
                .flatten()
                .enumerate()
                .map(|(index, step)| ProcessStepView {
                    number: index + 1,
                    title: text(&step.title),
                    description: text(&step.description),
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/full_description.html")]
pub struct FullDescriptionView {
    pub heading: String,
    pub paragraphs: Vec<String>,
}

impl FullDescriptionView {
    pub fn from_block(block: &FullDescriptionSectionBlock) -> Self {
        Self {
            heading: text(&block.heading),
            paragraphs: paragraphs(&block.body),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/service_cta.html")]
pub struct ServiceCtaView {
    pub heading: String,
    pub body: String,
    pub cta: Option<CtaView>,
}

impl ServiceCtaView {
    pub fn from_block(block: &ServiceCtaSectionBlock) -> Self {
        Self {
            heading: text(&block.heading),
            body: text(&block.body),
            cta: cta_view(&block.cta),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/our_story.html")]
pub struct OurStoryView {
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub image: Option<ImageView>,
}

impl OurStoryView {
    pub fn from_block(block: &OurStoryBlock) -> Self {
        Self {
            heading: text(&block.heading),
            paragraphs: paragraphs(&block.body),
            image: image_view(&block.image),
        }
    }
}

#[derive(Template)]
#[template(path = "sections/our_values.html")]
pub struct OurValuesView {
    pub heading: String,
    pub values: Vec<FeatureView>,
}

impl OurValuesView {
    pub fn from_block(block: &OurValuesBlock) -> Self {
        Self {
            heading: text(&block.heading),
            values: block.values.iter().flatten().map(feature_view).collect(),
        }
    }
}

#[derive(Clone)]
pub struct TeamMemberView {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub photo: Option<ImageView>,
}

fn team_member_view(member: &TeamMember) -> TeamMemberView {
    TeamMemberView {
        name: text(&member.name),
        role: text(&member.role),
        bio: text(&member.bio),
        photo: image_view(&member.photo),
    }
}

#[derive(Template)]
#[template(path = "sections/team.html")]
pub struct TeamView {
    pub heading: String,
    pub intro: String,
    pub members: Vec<TeamMemberView>,
}

impl TeamView {
    /// Team sections published without inline members fall back to the full
    /// team roster carried by the dispatch context.
    pub fn from_block(block: &MeetOurTeamBlock, fallback: &[TeamMember]) -> Self {
        let inline = block.members.as_deref().unwrap_or_default();
        let members = if inline.is_empty() { fallback } else { inline };

        Self {
            heading: text(&block.heading),
            intro: text(&block.intro),
            members: members.iter().map(team_member_view).collect(),
        }
    }
}

#[derive(Clone)]
pub struct PackageView {
    pub name: String,
    pub price: String,
    pub description: String,
    pub features: Vec<String>,
    pub cta: Option<CtaView>,
}

#[derive(Template)]
#[template(path = "sections/packages.html")]
pub struct PackagesView {
    pub heading: String,
    pub intro: String,
    pub packages: Vec<PackageView>,
}

impl PackagesView {
    pub fn from_block(block: &PackagesBlock) -> Self {
        Self {
            heading: text(&block.heading),
            intro: text(&block.intro),
            packages: block
                .packages
                .iter()
                .flatten()
                .map(|package| PackageView {
                    name: text(&package.name),
                    price: text(&package.price),
                    description: text(&package.description),
                    features: package.features.clone().unwrap_or_default(),
                    cta: cta_view(&package.cta),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::blocks::Slug;

    #[test]
    fn cta_defaults_the_missing_half() {
        let view = cta_view(&Some(Cta {
            text: None,
            link: Some("/contact".into()),
        }))
        .expect("cta renders");
        assert_eq!(view.text, DEFAULT_CTA_TEXT);
        assert_eq!(view.href, "/contact");

        let view = cta_view(&Some(Cta {
            text: Some("Start a project".into()),
            link: None,
        }))
        .expect("cta renders");
        assert_eq!(view.href, "#");
    }

    #[test]
    fn blank_cta_renders_nothing() {
        assert!(cta_view(&None).is_none());
        assert!(cta_view(&Some(Cta::default())).is_none());
    }

    #[test]
    fn service_card_without_slug_links_to_the_listing() {
        let card = service_card(&ServiceSummary::default());
        assert_eq!(card.href, "/services");

        let card = service_card(&ServiceSummary {
            slug: Some(Slug("branding".into())),
            ..Default::default()
        });
        assert_eq!(card.href, "/services/branding");
    }

    #[test]
    fn body_copy_splits_into_paragraphs() {
        let body = Some("First.\n\nSecond.\n\n\n\n".to_string());
        assert_eq!(paragraphs(&body), vec!["First.", "Second."]);
        assert!(paragraphs(&None).is_empty());
    }

    #[test]
    fn team_falls_back_to_roster_only_when_inline_members_missing() {
        let roster = vec![TeamMember {
            name: Some("Ada".into()),
            ..Default::default()
        }];

        let empty_block = MeetOurTeamBlock::default();
        let view = TeamView::from_block(&empty_block, &roster);
        assert_eq!(view.members.len(), 1);
        assert_eq!(view.members[0].name, "Ada");

        let inline_block = MeetOurTeamBlock {
            members: Some(vec![TeamMember {
                name: Some("Grace".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let view = TeamView::from_block(&inline_block, &roster);
        assert_eq!(view.members.len(), 1);
        assert_eq!(view.members[0].name, "Grace");
    }

    #[test]
    fn testimonial_attribution_joins_present_parts() {
        let view = testimonial_view(&Testimonial {
            quote: Some("Superb.".into()),
            author: Some("Noor".into()),
            role: Some("CMO".into()),
            company: Some("Aurora".into()),
            ..Default::default()
        });
        assert_eq!(view.attribution, "CMO, Aurora");

        let view = testimonial_view(&Testimonial {
            role: Some("CMO".into()),
            ..Default::default()
        });
        assert_eq!(view.attribution, "CMO");
    }
}
