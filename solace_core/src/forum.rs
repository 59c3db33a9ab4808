//! Listing rules for the discussion board.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{thread::DiscussionView, timestamps};

pub const DEFAULT_PAGE_SIZE: usize = 4;
pub const TRENDING_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    MostRecent,
    MostPopular,
    MostReplies,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    AllTime,
    /// Since midnight UTC.
    Today,
    ThisWeek,
    ThisMonth,
}

impl TimeWindow {
    fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeWindow::AllTime => None,
            TimeWindow::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            TimeWindow::ThisWeek => Some(now - Duration::days(7)),
            TimeWindow::ThisMonth => now.checked_sub_months(chrono::Months::new(1)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDiscussion {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumQuery {
    pub search: Option<String>,
    /// `None` lists every category.
    pub category: Option<String>,
    pub window: TimeWindow,
    pub sort: SortOrder,
    /// Drop discussions carrying any of the viewer's own trigger labels.
    pub hide_my_triggers: bool,
    pub offset: usize,
    /// Page size; `None` means [`DEFAULT_PAGE_SIZE`].
    pub limit: Option<usize>,
}

fn matches_search(d: &DiscussionView, needle: &str) -> bool {
    d.title.to_lowercase().contains(needle)
        || d.content.to_lowercase().contains(needle)
        || d.tags.iter().any(|t| t.to_lowercase().contains(needle))
        || d.author.display_name.to_lowercase().contains(needle)
}

fn shares_trigger(d: &DiscussionView, hidden: &[String]) -> bool {
    d.triggers
        .iter()
        .any(|t| hidden.iter().any(|h| h.eq_ignore_ascii_case(t)))
}

/// Filters, sorts and pages `discussions` (expected newest first).
pub fn apply(
    discussions: Vec<DiscussionView>,
    query: &ForumQuery,
    viewer_triggers: &[String],
    now: DateTime<Utc>,
) -> Vec<DiscussionView> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let cutoff = query.window.cutoff(now);

    let mut kept: Vec<DiscussionView> = discussions
        .into_iter()
        .filter(|d| needle.as_deref().is_none_or(|n| matches_search(d, n)))
        .filter(|d| query.category.as_deref().is_none_or(|c| d.category == c))
        .filter(|d| match cutoff {
            None => true,
            Some(cutoff) => timestamps::parse(&d.created_at).is_some_and(|at| at >= cutoff),
        })
        .filter(|d| !(query.hide_my_triggers && shares_trigger(d, viewer_triggers)))
        .collect();

    // stable sorts keep newest-first among equal counts
    match query.sort {
        SortOrder::MostRecent => kept.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::MostPopular => kept.sort_by(|a, b| b.likes.cmp(&a.likes)),
        SortOrder::MostReplies => kept.sort_by(|a, b| b.replies.cmp(&a.replies)),
    }

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    kept.into_iter().skip(query.offset).take(limit).collect()
}

/// Replies weigh double; views are log-scaled so they cannot dominate.
pub fn trending_score(d: &DiscussionView) -> f64 {
    (d.replies as f64) * 2.0 + d.likes as f64 + 3.0 * ((d.views as f64) + 1.0).log10()
}

pub fn trending(mut discussions: Vec<DiscussionView>, count: usize) -> Vec<DiscussionView> {
    discussions.sort_by(|a, b| trending_score(b).total_cmp(&trending_score(a)));
    discussions.truncate(count);
    discussions
}
