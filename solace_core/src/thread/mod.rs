//! Forum threads: discussions with arbitrarily nested comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    entity::prelude::DiscussionModel,
    ids::{DiscussionId, UserId},
    timestamps,
};

mod path;
mod time_ago;
mod tree;

pub use path::{CommentPath, PathError};
pub use time_ago::TimeAgo;
pub use tree::{CommentNode, CommentTree};

pub const ANONYMOUS: &str = "Anonymous";

/// Author details denormalised onto a post or comment when it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub user_id: UserId,
    pub display_name: String,
    pub profile_pic_url: String,
}

impl Author {
    pub fn new(user_id: UserId, display_name: String, profile_pic_url: String) -> Self {
        let display_name = if display_name.trim().is_empty() {
            ANONYMOUS.to_string()
        } else {
            display_name
        };
        Self {
            user_id,
            display_name,
            profile_pic_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionView {
    pub id: DiscussionId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub triggers: Vec<String>,
    pub author: Author,
    pub created_at: String,
    pub time_ago: TimeAgo,
    pub replies: i64,
    pub likes: i64,
    pub views: i64,
    pub is_pinned: bool,
    pub liked_by_viewer: bool,
}

impl DiscussionView {
    pub fn from_model(model: DiscussionModel, now: DateTime<Utc>, liked_by_viewer: bool) -> Self {
        let time_ago = timestamps::parse(&model.created_at)
            .map(|at| TimeAgo::between(at, now))
            .unwrap_or(TimeAgo::JustNow);

        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            category: model.category,
            tags: model.tags.into(),
            triggers: model.triggers.into(),
            author: Author::new(
                model.author_id,
                model.author_display_name,
                model.author_profile_pic_url,
            ),
            created_at: model.created_at,
            time_ago,
            replies: model.replies,
            likes: model.likes,
            views: model.views,
            is_pinned: model.is_pinned,
            liked_by_viewer,
        }
    }
}

/// A discussion together with its full comment tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub discussion: DiscussionView,
    pub comments: CommentTree,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}
