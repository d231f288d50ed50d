//! Relevance, engagement and home-feed ranking for video and post catalogs.
//!
//! The scorers are pure functions over already-fetched items:
//!
//! - [`relevance::score`] matches a query against an item through a
//!   priority cascade of fields.
//! - [`engagement::score`] turns view, comment and like counts into a
//!   popularity score.
//! - [`ranker`] blends the two for search and for category filters.
//! - [`feed`] composes a home feed from freshness, engagement,
//!   personalization, general appeal, creator variety and trending signals.

pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod engagement;
pub mod error;
pub mod feed;
pub mod output;
pub mod profile;
pub mod ranker;
pub mod relevance;
pub mod source;
pub mod utils;
