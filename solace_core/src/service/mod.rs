use iroh::PublicKey;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, SqlErr};

use crate::{entity::prelude::*, session::Session};

pub mod counseling;
pub mod forum;
pub mod profiles;

/// Identity provider: maps the connecting node key to its user.
pub(crate) async fn resolve_session<C: ConnectionTrait>(
    db: &C,
    node_id: &PublicKey,
) -> Result<Option<Session>, DbErr> {
    let found = Identity::find()
        .filter(IdentityColumn::NodeId.eq(node_id.as_bytes().to_vec()))
        .find_also_related(Profile)
        .one(db)
        .await?;

    Ok(found.and_then(|(_, profile)| profile).map(|p| Session::from_profile(&p)))
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
