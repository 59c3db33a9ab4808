use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{CommentId, DiscussionId};

const ROOT: &str = "forum";
const COMMENTS: &str = "comments";
const REPLIES: &str = "replies";

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("malformed comment path `{0}`")]
    Malformed(String),
    #[error("bad id in comment path")]
    BadId(#[from] uuid::Error),
}

/// Storage location of a comment:
/// `forum/{discussion}/comments/{id}` followed by `/replies/{id}` per level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentPath {
    discussion: DiscussionId,
    // root comment first, never empty
    chain: Vec<CommentId>,
}

impl CommentPath {
    pub fn top_level(discussion: DiscussionId, comment: CommentId) -> Self {
        Self {
            discussion,
            chain: vec![comment],
        }
    }

    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let malformed = || PathError::Malformed(raw.to_string());
        let segments: Vec<&str> = raw.split('/').collect();

        // forum/{d}/comments/{c} then pairs of replies/{r}
        if segments.len() < 4 || segments.len() % 2 != 0 {
            return Err(malformed());
        }
        if segments[0] != ROOT || segments[2] != COMMENTS {
            return Err(malformed());
        }

        let discussion = DiscussionId::parse_str(segments[1])?;
        let mut chain = vec![CommentId::parse_str(segments[3])?];

        for pair in segments[4..].chunks(2) {
            if pair[0] != REPLIES {
                return Err(malformed());
            }
            chain.push(CommentId::parse_str(pair[1])?);
        }

        Ok(Self { discussion, chain })
    }

    pub fn child(&self, reply: CommentId) -> Self {
        let mut chain = self.chain.clone();
        chain.push(reply);
        Self {
            discussion: self.discussion,
            chain,
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.chain.len() == 1 {
            return None;
        }
        Some(Self {
            discussion: self.discussion,
            chain: self.chain[..self.chain.len() - 1].to_vec(),
        })
    }

    pub fn discussion_id(&self) -> DiscussionId {
        self.discussion
    }

    /// The comment this path points at.
    pub fn comment_id(&self) -> CommentId {
        self.chain[self.chain.len() - 1]
    }

    /// 0 for a top-level comment.
    pub fn depth(&self) -> usize {
        self.chain.len() - 1
    }
}

impl fmt::Display for CommentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ROOT}/{}/{COMMENTS}/{}", self.discussion, self.chain[0])?;
        for reply in &self.chain[1..] {
            write!(f, "/{REPLIES}/{reply}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for CommentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CommentPath {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CommentPath> for String {
    fn from(path: CommentPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_nested_paths() {
        let d = DiscussionId::new();
        let (a, b, c) = (CommentId::new(), CommentId::new(), CommentId::new());

        let path = CommentPath::top_level(d, a).child(b).child(c);

        assert_eq!(
            path.to_string(),
            format!("forum/{d}/comments/{a}/replies/{b}/replies/{c}")
        );
        assert_eq!(path.depth(), 2);
        assert_eq!(path.comment_id(), c);
        assert_eq!(path.discussion_id(), d);
    }

    #[test]
    fn parse_accepts_every_depth() {
        let d = DiscussionId::new();
        let mut path = CommentPath::top_level(d, CommentId::new());
        for _ in 0..6 {
            assert_eq!(CommentPath::parse(&path.to_string()).unwrap(), path);
            path = path.child(CommentId::new());
        }
    }

    #[test]
    fn parent_walks_up_to_the_top_level() {
        let d = DiscussionId::new();
        let top = CommentPath::top_level(d, CommentId::new());
        let reply = top.child(CommentId::new());

        assert_eq!(reply.parent(), Some(top.clone()));
        assert_eq!(top.parent(), None);
    }

    #[test]
    fn rejects_malformed_paths() {
        let d = DiscussionId::new();
        let c = CommentId::new();

        for raw in [
            String::new(),
            format!("forum/{d}"),
            format!("forum/{d}/comments"),
            format!("blog/{d}/comments/{c}"),
            format!("forum/{d}/replies/{c}"),
            format!("forum/{d}/comments/{c}/comments/{c}"),
            format!("forum/{d}/comments/{c}/replies"),
        ] {
            assert!(
                matches!(CommentPath::parse(&raw), Err(PathError::Malformed(_))),
                "accepted {raw:?}"
            );
        }

        assert!(matches!(
            CommentPath::parse(&format!("forum/{d}/comments/nope")),
            Err(PathError::BadId(_))
        ));
    }

    #[test]
    fn serializes_as_the_path_string() {
        let path = CommentPath::top_level(DiscussionId::new(), CommentId::new());
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, format!("\"{path}\""));
        assert_eq!(serde_json::from_str::<CommentPath>(&json).unwrap(), path);
    }
}
