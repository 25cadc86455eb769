//! Content model mirrored from the content store's document schema.

pub mod blocks;
pub mod documents;
