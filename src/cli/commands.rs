//! CLI commands and argument parsing

use crate::error::Result;
use crate::resources::{
    CommentFilter, EmotionStatFilter, InteractionType, KnowledgeFilter, ListFilter, ResourceKind,
    StarFilter, TopicFilter,
};
use crate::types::QueryParams;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

/// July list client
#[derive(Parser, Debug)]
#[command(name = "july-paging")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL from the config
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a list resource
    Fetch {
        /// Resource to list (knowledge, my_star, topic, comment, star, emotion_stat, custom_affirmation)
        resource: ResourceKind,

        /// Stop after this many pages (default: until the list ends)
        #[arg(long)]
        pages: Option<usize>,

        /// Items per page (default: from config)
        #[arg(long)]
        page_size: Option<u32>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List labels, optionally those of one topic
    Labels {
        #[arg(long)]
        topic_id: Option<String>,
    },

    /// Validate the client configuration
    Validate,
}

/// Filter flags; each resource reads the ones it understands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Knowledge search keyword
    #[arg(long)]
    pub keyword: Option<String>,

    /// Knowledge category
    #[arg(long)]
    pub category: Option<String>,

    /// Knowledge tag
    #[arg(long)]
    pub tag: Option<String>,

    #[arg(long)]
    pub user_id: Option<String>,

    #[arg(long)]
    pub label_id: Option<String>,

    #[arg(long)]
    pub topic_id: Option<String>,

    /// STAR, HUG or PAT
    #[arg(long)]
    pub interaction_type: Option<InteractionType>,

    /// Emotion statistics window in days
    #[arg(long)]
    pub days: Option<u32>,

    /// Emotion statistics range start (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Emotion statistics range end (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

impl FilterArgs {
    /// Query parameters for `kind`, built through its typed filter
    pub fn query_for(&self, kind: ResourceKind) -> Result<QueryParams> {
        let (query, used): (QueryParams, &[&str]) = match kind {
            ResourceKind::Knowledge => (
                KnowledgeFilter {
                    keyword: self.keyword.clone(),
                    category: self.category.clone(),
                    tag: self.tag.clone(),
                }
                .to_query()?,
                &["keyword", "category", "tag"][..],
            ),
            ResourceKind::Topic => (
                TopicFilter {
                    user_id: self.user_id.clone(),
                    label_id: self.label_id.clone(),
                }
                .to_query()?,
                &["user_id", "label_id"][..],
            ),
            ResourceKind::Comment => (
                CommentFilter {
                    topic_id: self.topic_id.clone(),
                    user_id: self.user_id.clone(),
                }
                .to_query()?,
                &["topic_id", "user_id"][..],
            ),
            ResourceKind::Star => (
                StarFilter {
                    topic_id: self.topic_id.clone(),
                    user_id: self.user_id.clone(),
                    interaction_type: self.interaction_type,
                }
                .to_query()?,
                &["topic_id", "user_id", "interaction_type"][..],
            ),
            ResourceKind::EmotionStat => (
                EmotionStatFilter {
                    days: self.days,
                    start_date: self.start_date,
                    end_date: self.end_date,
                }
                .to_query()?,
                &["days", "start_date", "end_date"][..],
            ),
            ResourceKind::MyStar | ResourceKind::CustomAffirmation | ResourceKind::Label => {
                (QueryParams::new(), &[][..])
            }
        };

        for flag in self.given() {
            if !used.contains(&flag) {
                warn!("--{} does not apply to {} and is ignored", flag.replace('_', "-"), kind);
            }
        }
        Ok(query)
    }

    /// Names of the flags that were given
    fn given(&self) -> Vec<&'static str> {
        [
            ("keyword", self.keyword.is_some()),
            ("category", self.category.is_some()),
            ("tag", self.tag.is_some()),
            ("user_id", self.user_id.is_some()),
            ("label_id", self.label_id.is_some()),
            ("topic_id", self.topic_id.is_some()),
            ("interaction_type", self.interaction_type.is_some()),
            ("days", self.days.is_some()),
            ("start_date", self.start_date.is_some()),
            ("end_date", self.end_date.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, given)| given.then_some(name))
        .collect()
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
