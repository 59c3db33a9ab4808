use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{sea_query::Expr, DatabaseConnection, TransactionTrait};
use thiserror::Error;
use zel_core::prelude::*;

use super::{
    profiles::{ProfilesService, ProfilesServiceError},
    resolve_session,
};
use crate::{
    entity::prelude::*,
    forum::{self, ForumQuery, NewDiscussion, TRENDING_COUNT},
    ids::{CommentId, DiscussionId},
    session::Session,
    thread::{
        Author, CommentPath, CommentTree, DiscussionView, LikeState, PathError, Thread, ANONYMOUS,
    },
    timestamps,
};

#[derive(Debug, Error)]
pub enum ForumServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error(transparent)]
    Profiles(#[from] ProfilesServiceError),

    #[error("invalid comment path")]
    Path(#[from] PathError),

    #[error("discussion not found")]
    DiscussionNotFound,

    #[error("comment not found")]
    CommentNotFound,

    #[error("content must not be empty")]
    EmptyContent,

    #[error("title must not be empty")]
    MissingTitle,

    #[error("not signed in")]
    Unauthenticated,
}

impl From<ForumServiceError> for ResourceError {
    fn from(error: ForumServiceError) -> Self {
        match error {
            ForumServiceError::DbError(error) => ResourceError::infra(error),
            ForumServiceError::Profiles(error) => error.into(),
            ForumServiceError::Path(_) => ResourceError::app(error),
            ForumServiceError::DiscussionNotFound => ResourceError::app(error),
            ForumServiceError::CommentNotFound => ResourceError::app(error),
            ForumServiceError::EmptyContent => ResourceError::app(error),
            ForumServiceError::MissingTitle => ResourceError::app(error),
            ForumServiceError::Unauthenticated => ResourceError::app(error),
        }
    }
}

fn required(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Clone)]
pub struct ForumService {
    db: DatabaseConnection,
    profiles: ProfilesService,
}

impl ForumService {
    pub fn new(db: DatabaseConnection, profiles: ProfilesService) -> Self {
        Self { db, profiles }
    }

    async fn author_for(&self, session: &Session) -> Result<Author, ForumServiceError> {
        let picture = self.profiles._profile_image(session.user_id).await?;
        Ok(Author::new(session.user_id, session.name_or(ANONYMOUS), picture))
    }

    async fn liked_discussion_ids(
        &self,
        viewer: Option<&Session>,
    ) -> Result<HashSet<DiscussionId>, ForumServiceError> {
        let Some(viewer) = viewer else {
            return Ok(HashSet::new());
        };

        Ok(DiscussionLike::find()
            .filter(DiscussionLikeColumn::UserId.eq(viewer.user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|like| like.discussion_id)
            .collect())
    }

    async fn all_discussions(
        &self,
        viewer: Option<&Session>,
    ) -> Result<Vec<DiscussionView>, ForumServiceError> {
        let liked = self.liked_discussion_ids(viewer).await?;
        let now = Utc::now();

        Ok(Discussion::find()
            .order_by_desc(DiscussionColumn::CreatedAt)
            .order_by_desc(DiscussionColumn::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| {
                let liked_by_viewer = liked.contains(&model.id);
                DiscussionView::from_model(model, now, liked_by_viewer)
            })
            .collect())
    }

    /// Start a new discussion
    pub async fn _create_discussion(
        &self,
        session: &Session,
        discussion: NewDiscussion,
    ) -> Result<DiscussionView, ForumServiceError> {
        let title = required(&discussion.title).ok_or(ForumServiceError::MissingTitle)?;
        let content = required(&discussion.content).ok_or(ForumServiceError::EmptyContent)?;
        let author = self.author_for(session).await?;

        let model = DiscussionActiveModel {
            id: Set(DiscussionId::new()),
            title: Set(title),
            content: Set(content),
            category: Set(discussion.category),
            tags: Set(discussion.tags.into()),
            triggers: Set(discussion.triggers.into()),
            author_id: Set(author.user_id),
            author_display_name: Set(author.display_name),
            author_profile_pic_url: Set(author.profile_pic_url),
            created_at: Set(timestamps::now()),
            replies: Set(0),
            likes: Set(0),
            views: Set(0),
            is_pinned: Set(false),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(discussion = %model.id, author = %session.user_id, "discussion created");
        Ok(DiscussionView::from_model(model, Utc::now(), false))
    }

    /// Search, filter, sort and page the board for `viewer`
    pub async fn _list_discussions(
        &self,
        viewer: Option<&Session>,
        query: ForumQuery,
    ) -> Result<Vec<DiscussionView>, ForumServiceError> {
        let hidden = match viewer {
            Some(viewer) if query.hide_my_triggers => {
                self.profiles._triggers_of(viewer.user_id).await?
            }
            _ => Vec::new(),
        };

        let discussions = self.all_discussions(viewer).await?;
        tracing::debug!(total = discussions.len(), "listing discussions");
        Ok(forum::apply(discussions, &query, &hidden, Utc::now()))
    }

    pub async fn _trending_discussions(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<DiscussionView>, ForumServiceError> {
        let discussions = self.all_discussions(None).await?;
        Ok(forum::trending(discussions, limit.unwrap_or(TRENDING_COUNT)))
    }

    /// Count a view, then load the discussion with its whole comment tree
    pub async fn _load_thread(
        &self,
        discussion_id: DiscussionId,
        viewer: Option<&Session>,
    ) -> Result<Thread, ForumServiceError> {
        let viewed = Discussion::update_many()
            .col_expr(DiscussionColumn::Views, Expr::col(DiscussionColumn::Views).add(1))
            .filter(DiscussionColumn::Id.eq(discussion_id))
            .exec(&self.db)
            .await?;

        if viewed.rows_affected == 0 {
            tracing::debug!(discussion = %discussion_id, "thread not found");
            return Err(ForumServiceError::DiscussionNotFound);
        }

        let model = Discussion::find_by_id(discussion_id)
            .one(&self.db)
            .await?
            .ok_or(ForumServiceError::DiscussionNotFound)?;

        let rows = Comment::find()
            .filter(CommentColumn::DiscussionId.eq(discussion_id))
            .all(&self.db)
            .await?;

        let (liked_comments, liked_discussion) = match viewer {
            Some(viewer) => {
                let comments: HashSet<CommentId> = CommentLike::find()
                    .filter(CommentLikeColumn::UserId.eq(viewer.user_id))
                    .all(&self.db)
                    .await?
                    .into_iter()
                    .map(|like| like.comment_id)
                    .collect();
                let discussion = DiscussionLike::find_by_id((viewer.user_id, discussion_id))
                    .one(&self.db)
                    .await?
                    .is_some();
                (comments, discussion)
            }
            None => (HashSet::new(), false),
        };

        let now = Utc::now();
        let comments = CommentTree::build(rows, now, &liked_comments)?;
        tracing::debug!(discussion = %discussion_id, comments = comments.len(), "thread loaded");

        Ok(Thread {
            discussion: DiscussionView::from_model(model, now, liked_discussion),
            comments,
        })
    }

    async fn insert_comment(
        &self,
        session: &Session,
        discussion_id: DiscussionId,
        parent: Option<&CommentPath>,
        content: &str,
    ) -> Result<CommentPath, ForumServiceError> {
        let content = required(content).ok_or(ForumServiceError::EmptyContent)?;
        let author = self.author_for(session).await?;
        let id = CommentId::new();

        // write first so the transaction holds the write lock before it reads
        let txn = self.db.begin().await?;

        let counted = Discussion::update_many()
            .col_expr(DiscussionColumn::Replies, Expr::col(DiscussionColumn::Replies).add(1))
            .filter(DiscussionColumn::Id.eq(discussion_id))
            .exec(&txn)
            .await?;

        if counted.rows_affected == 0 {
            txn.rollback().await?;
            return Err(ForumServiceError::DiscussionNotFound);
        }

        let path = match parent {
            None => CommentPath::top_level(discussion_id, id),
            Some(parent) => {
                let found = Comment::find_by_id(parent.comment_id()).one(&txn).await?;
                match found {
                    Some(row) if row.path == parent.to_string() => parent.child(id),
                    _ => {
                        txn.rollback().await?;
                        return Err(ForumServiceError::CommentNotFound);
                    }
                }
            }
        };

        CommentActiveModel {
            id: Set(id),
            discussion_id: Set(discussion_id),
            parent_id: Set(path.parent().map(|p| p.comment_id())),
            path: Set(path.to_string()),
            author_id: Set(author.user_id),
            author_display_name: Set(author.display_name),
            author_profile_pic_url: Set(author.profile_pic_url),
            content: Set(content),
            created_at: Set(timestamps::now()),
            likes: Set(0),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(discussion = %discussion_id, %path, "comment posted");
        Ok(path)
    }

    /// Add a top-level comment to a discussion
    pub async fn _post_comment(
        &self,
        session: &Session,
        discussion_id: DiscussionId,
        content: String,
    ) -> Result<CommentPath, ForumServiceError> {
        self.insert_comment(session, discussion_id, None, &content).await
    }

    /// Reply to the comment at `parent`, at any depth
    pub async fn _post_reply(
        &self,
        session: &Session,
        parent: CommentPath,
        content: String,
    ) -> Result<CommentPath, ForumServiceError> {
        self.insert_comment(session, parent.discussion_id(), Some(&parent), &content)
            .await
    }

    pub async fn _toggle_comment_like(
        &self,
        session: &Session,
        path: CommentPath,
    ) -> Result<LikeState, ForumServiceError> {
        let comment_id = path.comment_id();
        let txn = self.db.begin().await?;

        // unlike attempt first, so the transaction opens with a write
        let removed = CommentLike::delete_by_id((session.user_id, comment_id))
            .exec(&txn)
            .await?
            .rows_affected;

        let found = Comment::find_by_id(comment_id)
            .one(&txn)
            .await?
            .filter(|row| row.path == path.to_string());
        if found.is_none() {
            txn.rollback().await?;
            return Err(ForumServiceError::CommentNotFound);
        }

        let liked = removed == 0;
        if liked {
            CommentLike::insert(CommentLikeActiveModel {
                user_id: Set(session.user_id),
                comment_id: Set(comment_id),
                created_at: Set(timestamps::now()),
            })
            .exec(&txn)
            .await?;
        }

        let delta: i64 = if liked { 1 } else { -1 };
        Comment::update_many()
            .col_expr(CommentColumn::Likes, Expr::col(CommentColumn::Likes).add(delta))
            .filter(CommentColumn::Id.eq(comment_id))
            .exec(&txn)
            .await?;

        let likes = Comment::find_by_id(comment_id)
            .one(&txn)
            .await?
            .map(|row| row.likes)
            .ok_or(ForumServiceError::CommentNotFound)?;

        txn.commit().await?;

        tracing::info!(%path, liked, "comment like toggled");
        Ok(LikeState { liked, likes })
    }

    pub async fn _toggle_discussion_like(
        &self,
        session: &Session,
        discussion_id: DiscussionId,
    ) -> Result<LikeState, ForumServiceError> {
        let txn = self.db.begin().await?;

        let removed = DiscussionLike::delete_by_id((session.user_id, discussion_id))
            .exec(&txn)
            .await?
            .rows_affected;

        if Discussion::find_by_id(discussion_id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Err(ForumServiceError::DiscussionNotFound);
        }

        let liked = removed == 0;
        if liked {
            DiscussionLike::insert(DiscussionLikeActiveModel {
                user_id: Set(session.user_id),
                discussion_id: Set(discussion_id),
                created_at: Set(timestamps::now()),
            })
            .exec(&txn)
            .await?;
        }

        let delta: i64 = if liked { 1 } else { -1 };
        Discussion::update_many()
            .col_expr(DiscussionColumn::Likes, Expr::col(DiscussionColumn::Likes).add(delta))
            .filter(DiscussionColumn::Id.eq(discussion_id))
            .exec(&txn)
            .await?;

        let likes = Discussion::find_by_id(discussion_id)
            .one(&txn)
            .await?
            .map(|row| row.likes)
            .ok_or(ForumServiceError::DiscussionNotFound)?;

        txn.commit().await?;

        tracing::info!(discussion = %discussion_id, liked, "discussion like toggled");
        Ok(LikeState { liked, likes })
    }

    /// Paths of every comment the user has liked, oldest like first
    pub async fn _liked_comment_paths(
        &self,
        session: &Session,
    ) -> Result<Vec<CommentPath>, ForumServiceError> {
        let rows = CommentLike::find()
            .filter(CommentLikeColumn::UserId.eq(session.user_id))
            .order_by_asc(CommentLikeColumn::CreatedAt)
            .find_also_related(Comment)
            .all(&self.db)
            .await?;

        rows.into_iter()
            .filter_map(|(_, comment)| comment)
            .map(|comment| CommentPath::parse(&comment.path).map_err(ForumServiceError::from))
            .collect()
    }

    pub async fn _liked_discussions(
        &self,
        session: &Session,
    ) -> Result<Vec<DiscussionId>, ForumServiceError> {
        Ok(DiscussionLike::find()
            .filter(DiscussionLikeColumn::UserId.eq(session.user_id))
            .order_by_asc(DiscussionLikeColumn::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|like| like.discussion_id)
            .collect())
    }

    async fn viewer(&self, ctx: &RequestContext) -> Result<Option<Session>, ForumServiceError> {
        Ok(resolve_session(&self.db, &ctx.connection().remote_id()).await?)
    }

    async fn require_session(&self, ctx: &RequestContext) -> Result<Session, ForumServiceError> {
        self.viewer(ctx).await?.ok_or(ForumServiceError::Unauthenticated)
    }
}

#[zel_service(name = "forum")]
trait Forum {
    #[method(name = "create_discussion")]
    async fn create_discussion(&self, discussion: NewDiscussion) -> Result<DiscussionView, ResourceError>;

    #[method(name = "list_discussions")]
    async fn list_discussions(&self, query: ForumQuery) -> Result<Vec<DiscussionView>, ResourceError>;

    #[method(name = "trending_discussions")]
    async fn trending_discussions(&self, limit: Option<usize>) -> Result<Vec<DiscussionView>, ResourceError>;

    #[method(name = "load_thread")]
    async fn load_thread(&self, discussion_id: DiscussionId) -> Result<Thread, ResourceError>;

    #[method(name = "post_comment")]
    async fn post_comment(
        &self,
        discussion_id: DiscussionId,
        content: String,
    ) -> Result<CommentPath, ResourceError>;

    #[method(name = "post_reply")]
    async fn post_reply(&self, parent: CommentPath, content: String) -> Result<CommentPath, ResourceError>;

    #[method(name = "toggle_comment_like")]
    async fn toggle_comment_like(&self, path: CommentPath) -> Result<LikeState, ResourceError>;

    #[method(name = "toggle_discussion_like")]
    async fn toggle_discussion_like(&self, discussion_id: DiscussionId) -> Result<LikeState, ResourceError>;

    #[method(name = "liked_comment_paths")]
    async fn liked_comment_paths(&self) -> Result<Vec<CommentPath>, ResourceError>;

    #[method(name = "liked_discussions")]
    async fn liked_discussions(&self) -> Result<Vec<DiscussionId>, ResourceError>;
}

#[async_trait]
impl ForumServer for ForumService {
    async fn create_discussion(
        &self,
        ctx: RequestContext,
        discussion: NewDiscussion,
    ) -> Result<DiscussionView, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._create_discussion(&session, discussion).await?)
    }

    async fn list_discussions(
        &self,
        ctx: RequestContext,
        query: ForumQuery,
    ) -> Result<Vec<DiscussionView>, ResourceError> {
        let viewer = self.viewer(&ctx).await?;
        Ok(self._list_discussions(viewer.as_ref(), query).await?)
    }

    async fn trending_discussions(
        &self,
        _ctx: RequestContext,
        limit: Option<usize>,
    ) -> Result<Vec<DiscussionView>, ResourceError> {
        Ok(self._trending_discussions(limit).await?)
    }

    async fn load_thread(
        &self,
        ctx: RequestContext,
        discussion_id: DiscussionId,
    ) -> Result<Thread, ResourceError> {
        let viewer = self.viewer(&ctx).await?;
        Ok(self._load_thread(discussion_id, viewer.as_ref()).await?)
    }

    async fn post_comment(
        &self,
        ctx: RequestContext,
        discussion_id: DiscussionId,
        content: String,
    ) -> Result<CommentPath, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._post_comment(&session, discussion_id, content).await?)
    }

    async fn post_reply(
        &self,
        ctx: RequestContext,
        parent: CommentPath,
        content: String,
    ) -> Result<CommentPath, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._post_reply(&session, parent, content).await?)
    }

    async fn toggle_comment_like(
        &self,
        ctx: RequestContext,
        path: CommentPath,
    ) -> Result<LikeState, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._toggle_comment_like(&session, path).await?)
    }

    async fn toggle_discussion_like(
        &self,
        ctx: RequestContext,
        discussion_id: DiscussionId,
    ) -> Result<LikeState, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._toggle_discussion_like(&session, discussion_id).await?)
    }

    async fn liked_comment_paths(&self, ctx: RequestContext) -> Result<Vec<CommentPath>, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._liked_comment_paths(&session).await?)
    }

    async fn liked_discussions(&self, ctx: RequestContext) -> Result<Vec<DiscussionId>, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._liked_discussions(&session).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{forum::SortOrder, test_utils};

    async fn setup_test_service() -> ForumService {
        let db = test_utils::setup_db().await;
        let profiles = ProfilesService::new(db.clone(), test_utils::cipher());
        ForumService::new(db, profiles)
    }

    fn new_discussion(title: &str) -> NewDiscussion {
        NewDiscussion {
            title: title.to_string(),
            content: "Looking for advice".to_string(),
            category: "Anxiety".to_string(),
            tags: vec!["sleep".to_string()],
            triggers: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_discussion_starts_with_zero_counters() {
        let service = setup_test_service().await;
        let session = test_utils::create_test_profile(&service.db, "rowan@example.com", None).await;

        let view = service
            ._create_discussion(&session, new_discussion("  First night shift  "))
            .await
            .unwrap();

        assert_eq!(view.title, "First night shift");
        assert_eq!((view.replies, view.likes, view.views), (0, 0, 0));
        assert!(!view.is_pinned);
        assert_eq!(view.author.display_name, "rowan");

        let mut blank = new_discussion("   ");
        let result = service._create_discussion(&session, blank.clone()).await;
        assert!(matches!(result, Err(ForumServiceError::MissingTitle)));

        blank.title = "ok".to_string();
        blank.content = "\n".to_string();
        let result = service._create_discussion(&session, blank).await;
        assert!(matches!(result, Err(ForumServiceError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_load_thread_counts_every_view() {
        let service = setup_test_service().await;
        let session = test_utils::create_test_profile(&service.db, "a@example.com", None).await;
        let discussion = service._create_discussion(&session, new_discussion("Views")).await.unwrap();

        let first = service._load_thread(discussion.id, None).await.unwrap();
        let second = service._load_thread(discussion.id, Some(&session)).await.unwrap();

        assert_eq!(first.discussion.views, 1);
        assert_eq!(second.discussion.views, 2);
        assert!(second.comments.is_empty());

        let missing = service._load_thread(DiscussionId::new(), None).await;
        assert!(matches!(missing, Err(ForumServiceError::DiscussionNotFound)));
    }

    #[tokio::test]
    async fn test_nested_replies_load_as_complete_tree() {
        let service = setup_test_service().await;
        let session =
            test_utils::create_test_profile(&service.db, "a@example.com", Some("Sage")).await;
        let discussion = service._create_discussion(&session, new_discussion("Tree")).await.unwrap();

        let older = service
            ._post_comment(&session, discussion.id, "first".to_string())
            .await
            .unwrap();
        let newer = service
            ._post_comment(&session, discussion.id, "second".to_string())
            .await
            .unwrap();

        let mut parent = older.clone();
        for depth in 0..4 {
            parent = service
                ._post_reply(&session, parent, format!("depth {}", depth + 1))
                .await
                .unwrap();
        }
        let sibling = service
            ._post_reply(&session, older.clone(), "later reply".to_string())
            .await
            .unwrap();

        let thread = service._load_thread(discussion.id, None).await.unwrap();
        assert_eq!(thread.discussion.replies, 7);
        assert_eq!(thread.comments.len(), 7);

        let roots: Vec<_> = thread.comments.roots().map(|n| n.path.clone()).collect();
        assert_eq!(roots, vec![newer, older.clone()]);

        let older_node = thread.comments.find(&older).unwrap();
        let replies: Vec<_> = thread
            .comments
            .children(older_node)
            .map(|n| n.path.clone())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1], sibling);

        let deepest = thread.comments.find(&parent).unwrap();
        assert_eq!(deepest.path.depth(), 4);
        assert_eq!(deepest.content, "depth 4");
        assert_eq!(deepest.author.display_name, "Sage");

        let unique: HashSet<_> = thread
            .comments
            .walk()
            .into_iter()
            .map(|(_, n)| n.path.to_string())
            .collect();
        assert_eq!(unique.len(), 7);
    }

    #[tokio::test]
    async fn test_comment_validation() {
        let service = setup_test_service().await;
        let session = test_utils::create_test_profile(&service.db, "a@example.com", None).await;
        let discussion = service._create_discussion(&session, new_discussion("Rules")).await.unwrap();

        let result = service._post_comment(&session, discussion.id, "   ".to_string()).await;
        assert!(matches!(result, Err(ForumServiceError::EmptyContent)));

        let result = service._post_comment(&session, DiscussionId::new(), "hi".to_string()).await;
        assert!(matches!(result, Err(ForumServiceError::DiscussionNotFound)));

        let ghost = CommentPath::top_level(discussion.id, CommentId::new());
        let result = service._post_reply(&session, ghost, "hi".to_string()).await;
        assert!(matches!(result, Err(ForumServiceError::CommentNotFound)));

        let thread = service._load_thread(discussion.id, None).await.unwrap();
        assert_eq!(thread.discussion.replies, 0);
    }

    #[tokio::test]
    async fn test_like_unlike_like_nets_one() {
        let service = setup_test_service().await;
        let session = test_utils::create_test_profile(&service.db, "a@example.com", None).await;
        let discussion = service._create_discussion(&session, new_discussion("Likes")).await.unwrap();
        let top = service
            ._post_comment(&session, discussion.id, "top".to_string())
            .await
            .unwrap();
        let reply = service._post_reply(&session, top, "deep".to_string()).await.unwrap();

        let states = [
            service._toggle_comment_like(&session, reply.clone()).await.unwrap(),
            service._toggle_comment_like(&session, reply.clone()).await.unwrap(),
            service._toggle_comment_like(&session, reply.clone()).await.unwrap(),
        ];
        assert_eq!(
            states,
            [
                LikeState { liked: true, likes: 1 },
                LikeState { liked: false, likes: 0 },
                LikeState { liked: true, likes: 1 },
            ]
        );

        assert_eq!(service._liked_comment_paths(&session).await.unwrap(), vec![reply.clone()]);

        let thread = service._load_thread(discussion.id, Some(&session)).await.unwrap();
        let node = thread.comments.find(&reply).unwrap();
        assert_eq!(node.likes, 1);
        assert!(node.liked_by_viewer);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_replies_and_likes_on_pooled_file_db() {
        let (db, path) = test_utils::setup_file_db().await;
        let profiles = ProfilesService::new(db.clone(), test_utils::cipher());
        let service = ForumService::new(db, profiles);

        let author = test_utils::create_test_profile(&service.db, "a@example.com", None).await;
        let discussion = service._create_discussion(&author, new_discussion("Busy")).await.unwrap();
        let top = service
            ._post_comment(&author, discussion.id, "top".to_string())
            .await
            .unwrap();

        let mut users = Vec::new();
        for i in 0..6 {
            let email = format!("user{i}@example.com");
            users.push(test_utils::create_test_profile(&service.db, &email, None).await);
        }

        let mut set = tokio::task::JoinSet::new();
        for session in users {
            let service = service.clone();
            let parent = top.clone();
            let discussion_id = discussion.id;
            set.spawn(async move {
                service._post_reply(&session, parent.clone(), "same".to_string()).await?;
                service._toggle_comment_like(&session, parent).await?;
                service._toggle_discussion_like(&session, discussion_id).await?;
                Ok::<_, ForumServiceError>(())
            });
        }
        while let Some(joined) = set.join_next().await {
            joined.unwrap().unwrap();
        }

        let thread = service._load_thread(discussion.id, None).await.unwrap();
        assert_eq!(thread.discussion.replies, 7);
        assert_eq!(thread.discussion.likes, 6);
        let node = thread.comments.find(&top).unwrap();
        assert_eq!(node.likes, 6);
        assert_eq!(node.children.len(), 6);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_discussion_like_toggle() {
        let service = setup_test_service().await;
        let author = test_utils::create_test_profile(&service.db, "a@example.com", None).await;
        let reader = test_utils::create_test_profile(&service.db, "b@example.com", None).await;
        let discussion = service._create_discussion(&author, new_discussion("Likes")).await.unwrap();

        let state = service._toggle_discussion_like(&reader, discussion.id).await.unwrap();
        assert_eq!(state, LikeState { liked: true, likes: 1 });
        service._toggle_discussion_like(&author, discussion.id).await.unwrap();

        assert_eq!(service._liked_discussions(&reader).await.unwrap(), vec![discussion.id]);

        let state = service._toggle_discussion_like(&reader, discussion.id).await.unwrap();
        assert_eq!(state, LikeState { liked: false, likes: 1 });
        assert!(service._liked_discussions(&reader).await.unwrap().is_empty());

        let thread = service._load_thread(discussion.id, Some(&author)).await.unwrap();
        assert!(thread.discussion.liked_by_viewer);
    }

    #[tokio::test]
    async fn test_listing_hides_viewer_triggers() {
        let service = setup_test_service().await;
        let viewer = test_utils::create_test_profile(&service.db, "v@example.com", None).await;
        service
            .profiles
            ._update_triggers(&viewer, vec!["Grief".to_string()])
            .await
            .unwrap();

        let mut flagged = new_discussion("Losing my dad");
        flagged.triggers = vec!["grief".to_string()];
        service._create_discussion(&viewer, flagged).await.unwrap();
        service._create_discussion(&viewer, new_discussion("Sleep tips")).await.unwrap();

        let all = service
            ._list_discussions(Some(&viewer), ForumQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Sleep tips");

        let query = ForumQuery {
            hide_my_triggers: true,
            ..Default::default()
        };
        let shown = service._list_discussions(Some(&viewer), query.clone()).await.unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Sleep tips");

        // anonymous viewers have no triggers to hide
        assert_eq!(service._list_discussions(None, query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_trending_and_reply_sort() {
        let service = setup_test_service().await;
        let session = test_utils::create_test_profile(&service.db, "a@example.com", None).await;

        let quiet = service._create_discussion(&session, new_discussion("quiet")).await.unwrap();
        let busy = service._create_discussion(&session, new_discussion("busy")).await.unwrap();
        for _ in 0..3 {
            service._post_comment(&session, busy.id, "+1".to_string()).await.unwrap();
        }
        service._load_thread(quiet.id, None).await.unwrap();

        let trending = service._trending_discussions(None).await.unwrap();
        assert_eq!(trending[0].id, busy.id);

        let top = service._trending_discussions(Some(1)).await.unwrap();
        assert_eq!(top.len(), 1);

        let query = ForumQuery {
            sort: SortOrder::MostReplies,
            ..Default::default()
        };
        let sorted = service._list_discussions(None, query).await.unwrap();
        assert_eq!(sorted[0].replies, 3);
    }
}
