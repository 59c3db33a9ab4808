use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, CommentPath, PathError, TimeAgo};
use crate::{entity::prelude::CommentModel, ids::CommentId, timestamps};

/// A comment positioned in its thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: CommentId,
    pub path: CommentPath,
    pub parent: Option<usize>,
    /// Arena indices of direct replies, oldest first.
    pub children: Vec<usize>,
    pub author: Author,
    pub content: String,
    pub created_at: String,
    pub time_ago: TimeAgo,
    pub likes: i64,
    pub liked_by_viewer: bool,
}

/// Every comment of one discussion, linked by arena index.
///
/// Top-level comments are ordered newest first, replies under a parent
/// oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentTree {
    nodes: Vec<CommentNode>,
    roots: Vec<usize>,
}

impl CommentTree {
    pub fn build(
        mut rows: Vec<CommentModel>,
        now: DateTime<Utc>,
        liked: &HashSet<CommentId>,
    ) -> Result<Self, PathError> {
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let position: HashMap<CommentId, usize> =
            rows.iter().enumerate().map(|(at, row)| (row.id, at)).collect();

        // Linked by id, not by time: a reply may be stamped before its parent.
        let mut tops = Vec::new();
        let mut replies: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
        for (at, row) in rows.iter().enumerate() {
            match row.parent_id {
                None => tops.push(at),
                Some(parent_id) => match position.get(&parent_id) {
                    Some(&parent) => replies[parent].push(at),
                    None => {
                        tracing::warn!(comment = %row.id, parent = %parent_id, "dropping orphaned reply");
                    }
                },
            }
        }

        let mut rows: Vec<Option<CommentModel>> = rows.into_iter().map(Some).collect();
        let mut tree = CommentTree::default();
        let mut stack: Vec<(usize, Option<usize>)> =
            tops.iter().rev().map(|&at| (at, None)).collect();

        // Rows never reached from a root (orphans and their descendants) are left out.
        while let Some((at, parent)) = stack.pop() {
            let Some(row) = rows[at].take() else {
                continue;
            };

            let path = CommentPath::parse(&row.path)?;
            let time_ago = timestamps::parse(&row.created_at)
                .map(|stamp| TimeAgo::between(stamp, now))
                .unwrap_or(TimeAgo::JustNow);

            let slot = tree.nodes.len();
            tree.nodes.push(CommentNode {
                id: row.id,
                path,
                parent,
                children: Vec::new(),
                author: Author::new(
                    row.author_id,
                    row.author_display_name,
                    row.author_profile_pic_url,
                ),
                content: row.content,
                created_at: row.created_at,
                time_ago,
                likes: row.likes,
                liked_by_viewer: liked.contains(&row.id),
            });

            match parent {
                Some(p) => tree.nodes[p].children.push(slot),
                None => tree.roots.push(slot),
            }
            stack.extend(replies[at].iter().rev().map(|&child| (child, Some(slot))));
        }

        tree.roots.reverse();
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &CommentNode> {
        self.roots.iter().map(|&slot| &self.nodes[slot])
    }

    pub fn children<'a>(&'a self, node: &'a CommentNode) -> impl Iterator<Item = &'a CommentNode> {
        node.children.iter().map(|&slot| &self.nodes[slot])
    }

    pub fn find(&self, path: &CommentPath) -> Option<&CommentNode> {
        self.nodes.iter().find(|node| &node.path == path)
    }

    /// Depth-first, pre-order, with each node's nesting depth.
    pub fn walk(&self) -> Vec<(usize, &CommentNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, usize)> =
            self.roots.iter().rev().map(|&slot| (0, slot)).collect();

        while let Some((depth, slot)) = stack.pop() {
            let node = &self.nodes[slot];
            out.push((depth, node));
            stack.extend(node.children.iter().rev().map(|&child| (depth + 1, child)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{DiscussionId, UserId};
    use chrono::Duration;

    struct Fixture {
        discussion: DiscussionId,
        author: UserId,
        start: DateTime<Utc>,
        rows: Vec<CommentModel>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                discussion: DiscussionId::new(),
                author: UserId::new(),
                start: Utc::now() - Duration::days(1),
                rows: Vec::new(),
            }
        }

        fn add(&mut self, parent: Option<&CommentPath>, minute: i64) -> CommentPath {
            let id = CommentId::new();
            let path = match parent {
                Some(p) => p.child(id),
                None => CommentPath::top_level(self.discussion, id),
            };
            self.rows.push(CommentModel {
                id,
                discussion_id: self.discussion,
                parent_id: parent.map(|p| p.comment_id()),
                path: path.to_string(),
                author_id: self.author,
                author_display_name: "Wren".to_string(),
                author_profile_pic_url: String::new(),
                content: format!("at {minute}"),
                created_at: timestamps::stamp(self.start + Duration::minutes(minute)),
                likes: 0,
            });
            path
        }

        fn build(self) -> CommentTree {
            CommentTree::build(self.rows, Utc::now(), &HashSet::new()).unwrap()
        }
    }

    #[test]
    fn empty_thread_builds_empty_tree() {
        let tree = Fixture::new().build();
        assert!(tree.is_empty());
        assert_eq!(tree.roots().count(), 0);
    }

    #[test]
    fn roots_newest_first_replies_oldest_first() {
        let mut f = Fixture::new();
        let first = f.add(None, 1);
        let second = f.add(None, 2);
        let early = f.add(Some(&first), 3);
        let late = f.add(Some(&first), 4);
        let tree = f.build();

        let roots: Vec<_> = tree.roots().map(|n| n.path.clone()).collect();
        assert_eq!(roots, vec![second, first.clone()]);

        let first_node = tree.find(&first).unwrap();
        let replies: Vec<_> = tree.children(first_node).map(|n| n.path.clone()).collect();
        assert_eq!(replies, vec![early, late]);
    }

    #[test]
    fn deep_chains_are_complete_and_paths_unique() {
        let mut f = Fixture::new();
        let mut minute = 0;
        for _ in 0..3 {
            minute += 1;
            let mut parent = f.add(None, minute);
            for _ in 0..5 {
                minute += 1;
                f.add(Some(&parent), minute);
                minute += 1;
                parent = f.add(Some(&parent), minute);
            }
        }
        let total = f.rows.len();
        let tree = f.build();

        assert_eq!(tree.len(), total);
        assert_eq!(tree.roots().count(), 3);

        let walked = tree.walk();
        assert_eq!(walked.len(), total);
        assert_eq!(walked.iter().map(|(d, _)| *d).max(), Some(5));

        let unique: HashSet<_> = walked.iter().map(|(_, n)| n.path.to_string()).collect();
        assert_eq!(unique.len(), total);

        for (depth, node) in walked {
            assert_eq!(node.path.depth(), depth);
        }
    }

    #[test]
    fn walk_visits_each_subtree_before_the_next_root() {
        let mut f = Fixture::new();
        let a = f.add(None, 1);
        let a1 = f.add(Some(&a), 2);
        let b = f.add(None, 3);
        let tree = f.build();

        let order: Vec<_> = tree.walk().into_iter().map(|(_, n)| n.path.clone()).collect();
        assert_eq!(order, vec![b, a, a1]);
    }

    #[test]
    fn orphans_and_their_descendants_are_dropped() {
        let mut f = Fixture::new();
        let kept = f.add(None, 1);
        let ghost = CommentPath::top_level(f.discussion, CommentId::new());
        let orphan = f.add(Some(&ghost), 2);
        f.add(Some(&orphan), 3);
        let tree = f.build();

        assert_eq!(tree.len(), 1);
        assert!(tree.find(&kept).is_some());
    }

    #[test]
    fn reply_stamped_before_its_parent_is_kept() {
        let mut f = Fixture::new();
        let parent = f.add(None, 10);
        let early = f.add(Some(&parent), 8);
        let grandchild = f.add(Some(&early), 9);
        let tree = f.build();

        assert_eq!(tree.len(), 3);
        let parent_node = tree.find(&parent).unwrap();
        let replies: Vec<_> = tree.children(parent_node).map(|n| n.path.clone()).collect();
        assert_eq!(replies, vec![early.clone()]);

        let early_node = tree.find(&early).unwrap();
        assert_eq!(tree.children(early_node).next().unwrap().path, grandchild);
    }

    #[test]
    fn marks_the_viewers_likes() {
        let mut f = Fixture::new();
        let liked = f.add(None, 1);
        let other = f.add(None, 2);
        let mut likes = HashSet::new();
        likes.insert(liked.comment_id());

        let tree = CommentTree::build(f.rows, Utc::now(), &likes).unwrap();
        assert!(tree.find(&liked).unwrap().liked_by_viewer);
        assert!(!tree.find(&other).unwrap().liked_by_viewer);
    }
}
