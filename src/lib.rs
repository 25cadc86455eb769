//! `vetrina` — a server-rendered brochure-site engine that assembles agency
//! pages from headless CMS content blocks, with per-path response caching and
//! webhook-driven revalidation.

pub mod application;
pub mod cache;
pub mod config;
pub mod content;
pub mod domain;
pub mod infra;
pub mod presentation;
