//! July resources
//!
//! Typed filters and item models for each list the mobile client shows, and
//! the [`ApiClient`] that turns a filter into a ready [`Paginator`].
//!
//! [`Paginator`]: crate::pagination::Paginator

mod client;
mod filters;
mod models;

pub use client::ApiClient;
pub use filters::{
    parse_date, CommentFilter, CustomAffirmationFilter, EmotionStatFilter, InteractionType,
    KnowledgeFilter, ListFilter, MyStarFilter, ResourceKind, StarFilter, TopicFilter, DATE_FORMAT,
};
pub use models::{Affirmation, Comment, EmotionStat, KnowledgeItem, Label, Star, Topic};
