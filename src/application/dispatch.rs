//! Block dispatch.
//!
//! Walks a page's ordered block list and renders each known block through
//! its section view. This function is total: unknown block types and blocks
//! whose template fails to render produce no node, and nothing here returns
//! an error.

use askama::Template;
use tracing::{debug, error};

use crate::domain::blocks::{Block, BlockBody};
use crate::domain::documents::TeamMember;
use crate::presentation::sections::{
    AboutSectionView, BlogPostsView, ContactFormView, CtaSectionView, FeaturedProjectsView,
    FeaturesSectionView, FullDescriptionView, HeroView, OurStoryView, OurValuesView, PackagesView,
    PageHeroView, ProcessSectionView, ServiceCtaView, ServiceListView, ServicesOverviewView,
    StatsSectionView, TeamView, TestimonialsView, TextImageView,
};

/// Context threaded through one dispatch run.
#[derive(Default)]
pub struct DispatchContext {
    /// Full team roster, used by team sections published without inline
    /// members.
    pub team_fallback: Vec<TeamMember>,
}

/// One rendered page section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    /// Stable identity for list rendering: explicit key, then document id,
    /// then `"{type}-{index}"`.
    pub key: String,
    pub html: String,
}

/// Render every known block, in order. Unknown types are dropped silently;
/// the output is never longer than the input.
pub fn dispatch(blocks: &[Block], ctx: &DispatchContext) -> Vec<RenderedNode> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(index, block)| render_block(block, index, ctx))
        .collect()
}

/// Whether any block in the list needs the team roster fallback, so callers
/// can skip that fetch on pages without a team section.
pub fn wants_team_fallback(blocks: &[Block]) -> bool {
    blocks.iter().any(|block| match &block.body {
        BlockBody::MeetOurTeam(team) => team.members.as_deref().unwrap_or_default().is_empty(),
        _ => false,
    })
}

pub fn resolve_key(block: &Block, index: usize) -> String {
    block
        .key
        .clone()
        .filter(|key| !key.is_empty())
        .or_else(|| block.id.clone().filter(|id| !id.is_empty()))
        .unwrap_or_else(|| format!("{}-{index}", block.body.tag()))
}

fn render_block(block: &Block, index: usize, ctx: &DispatchContext) -> Option<RenderedNode> {
    let html = match &block.body {
        BlockBody::Hero(b) => render(HeroView::from_block(b)),
        BlockBody::PageHero(b) => render(PageHeroView::from_block(b)),
        BlockBody::ServicesOverview(b) => render(ServicesOverviewView::from_block(b)),
        BlockBody::FeaturedProjects(b) => render(FeaturedProjectsView::from_block(b)),
        BlockBody::Testimonials(b) => render(TestimonialsView::from_block(b)),
        BlockBody::AboutSection(b) => render(AboutSectionView::from_block(b)),
        BlockBody::CtaSection(b) => render(CtaSectionView::from_block(b)),
        BlockBody::TextImageBlock(b) => render(TextImageView::from_block(b)),
        BlockBody::StatsSection(b) => render(StatsSectionView::from_block(b)),
        BlockBody::ServiceList(b) => render(ServiceListView::from_block(b)),
        BlockBody::BlogPosts(b) => render(BlogPostsView::from_block(b)),
        BlockBody::ContactForm(b) => render(ContactFormView::from_block(b)),
        BlockBody::FeaturesSection(b) => render(FeaturesSectionView::from_block(b)),
        BlockBody::ProcessSection(b) => render(ProcessSectionView::from_block(b)),
        BlockBody::FullDescriptionSection(b) => render(FullDescriptionView::from_block(b)),
        BlockBody::ServiceCtaSection(b) => render(ServiceCtaView::from_block(b)),
        BlockBody::OurStory(b) => render(OurStoryView::from_block(b)),
        BlockBody::OurValues(b) => render(OurValuesView::from_block(b)),
        BlockBody::MeetOurTeam(b) => render(TeamView::from_block(b, &ctx.team_fallback)),
        BlockBody::PackagesBlock(b) => render(PackagesView::from_block(b)),
        BlockBody::Unknown => {
            // Editors can publish block types this build does not know yet.
            debug!(
                target = "vetrina::dispatch",
                index, "skipping block with unrecognized type"
            );
            return None;
        }
    }?;

    Some(RenderedNode {
        key: resolve_key(block, index),
        html,
    })
}

fn render<T: Template>(view: T) -> Option<String> {
    match view.render() {
        Ok(html) => Some(html),
        Err(err) => {
            error!(
                target = "vetrina::dispatch",
                error = %err,
                "section template failed to render; section omitted"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn blocks_from(value: serde_json::Value) -> Vec<Block> {
        crate::domain::documents::decode_blocks(value)
    }

    #[test]
    fn dispatch_never_outgrows_its_input() {
        let blocks = blocks_from(json!([
            {"_type": "hero", "headline": "Hi"},
            {"_type": "futureBlockType", "payload": {"x": 1}},
            {"_type": "statsSection"},
        ]));
        assert_eq!(blocks.len(), 3);

        let nodes = dispatch(&blocks, &DispatchContext::default());
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn dispatch_of_empty_list_is_empty() {
        assert!(dispatch(&[], &DispatchContext::default()).is_empty());
    }

    #[test]
    fn blocks_with_missing_fields_still_render() {
        let blocks = blocks_from(json!([
            {"_type": "hero"},
            {"_type": "ctaSection"},
            {"_type": "meetOurTeam"},
            {"_type": "packagesBlock"},
        ]));

        let nodes = dispatch(&blocks, &DispatchContext::default());
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn explicit_key_wins_then_id_then_synthesized() {
        let blocks = blocks_from(json!([
            {"_type": "hero", "_key": "k-hero"},
            {"_type": "hero", "_id": "doc-42"},
            {"_type": "hero"},
        ]));

        let nodes = dispatch(&blocks, &DispatchContext::default());
        assert_eq!(nodes[0].key, "k-hero");
        assert_eq!(nodes[1].key, "doc-42");
        assert_eq!(nodes[2].key, "hero-2");
    }

    #[test]
    fn same_type_at_different_indices_gets_distinct_keys() {
        let blocks = blocks_from(json!([
            {"_type": "ctaSection"},
            {"_type": "ctaSection"},
        ]));

        let nodes = dispatch(&blocks, &DispatchContext::default());
        assert_eq!(nodes.len(), 2);
        assert_ne!(nodes[0].key, nodes[1].key);
    }

    #[test]
    fn order_is_preserved() {
        let blocks = blocks_from(json!([
            {"_type": "pageHero", "title": "About"},
            {"_type": "ourStory", "heading": "Our story"},
            {"_type": "meetOurTeam", "heading": "The team"},
        ]));

        let nodes = dispatch(&blocks, &DispatchContext::default());
        assert_eq!(nodes[0].key, "pageHero-0");
        assert_eq!(nodes[1].key, "ourStory-1");
        assert_eq!(nodes[2].key, "meetOurTeam-2");
    }

    #[test]
    fn team_fallback_is_wanted_only_without_inline_members() {
        let without = blocks_from(json!([{"_type": "meetOurTeam"}]));
        assert!(wants_team_fallback(&without));

        let with = blocks_from(json!([
            {"_type": "meetOurTeam", "members": [{"name": "Ada"}]},
        ]));
        assert!(!wants_team_fallback(&with));

        let none = blocks_from(json!([{"_type": "hero"}]));
        assert!(!wants_team_fallback(&none));
    }

    #[test]
    fn hero_nodes_carry_their_copy() {
        let blocks = blocks_from(json!([
            {"_type": "hero", "headline": "We build memorable brands"},
        ]));

        let nodes = dispatch(&blocks, &DispatchContext::default());
        assert!(nodes[0].html.contains("We build memorable brands"));
    }

    #[test]
    fn html_in_block_copy_is_escaped() {
        let blocks = blocks_from(json!([
            {"_type": "hero", "headline": "<script>alert(1)</script>"},
        ]));

        let nodes = dispatch(&blocks, &DispatchContext::default());
        assert!(!nodes[0].html.contains("<script>"));
        assert!(nodes[0].html.contains("&lt;script&gt;"));
    }
}
