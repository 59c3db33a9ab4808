use iroh::PublicKey;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zel_core::prelude::*;

use super::{is_unique_violation, resolve_session};
use crate::{
    crypto::{PiiCipher, PiiError},
    entity::prelude::*,
    ids::UserId,
    session::Session,
    timestamps,
};

#[derive(Debug, Error)]
pub enum ProfilesServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("sealed profile field could not be processed")]
    Pii(#[from] PiiError),

    #[error("profile not found")]
    ProfileNotFound,

    #[error("email is already registered")]
    EmailTaken,

    #[error("this device already has a profile")]
    AlreadyRegistered,

    #[error("email must not be empty")]
    InvalidEmail,

    #[error("not signed in")]
    Unauthenticated,
}

impl From<ProfilesServiceError> for ResourceError {
    fn from(error: ProfilesServiceError) -> Self {
        match error {
            ProfilesServiceError::DbError(error) => ResourceError::infra(error),
            ProfilesServiceError::Pii(error) => ResourceError::infra(error),
            ProfilesServiceError::ProfileNotFound => ResourceError::app(error),
            ProfilesServiceError::EmailTaken => ResourceError::app(error),
            ProfilesServiceError::AlreadyRegistered => ResourceError::app(error),
            ProfilesServiceError::InvalidEmail => ResourceError::app(error),
            ProfilesServiceError::Unauthenticated => ResourceError::app(error),
        }
    }
}

/// Account setup form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSetup {
    pub email: String,
    pub display_name: Option<String>,
    pub phone: String,
    pub age: Option<String>,
    /// Topics the user wants hidden.
    pub triggers: Vec<String>,
    pub bio: String,
    pub preferences: String,
    pub profile_image_url: Option<String>,
}

/// A profile with its sealed fields opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<String>,
    pub triggers: Vec<String>,
    pub bio: String,
    pub preferences: String,
    pub profile_image_url: Option<String>,
    pub setup_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone)]
pub struct ProfilesService {
    db: DatabaseConnection,
    cipher: PiiCipher,
}

impl ProfilesService {
    pub fn new(db: DatabaseConnection, cipher: PiiCipher) -> Self {
        Self { db, cipher }
    }

    fn open(&self, model: ProfileModel) -> Result<ProfileView, PiiError> {
        Ok(ProfileView {
            user_id: model.id,
            email: model.email,
            display_name: model.display_name,
            phone: model.phone.as_deref().map(|p| self.cipher.open(p)).transpose()?,
            age: model.age.as_deref().map(|a| self.cipher.open(a)).transpose()?,
            triggers: self.cipher.open_all(&model.triggers.0)?,
            bio: model.bio,
            preferences: model.preferences,
            profile_image_url: model.profile_image_url,
            setup_completed: model.setup_completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn find(&self, user_id: UserId) -> Result<ProfileModel, ProfilesServiceError> {
        Profile::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(ProfilesServiceError::ProfileNotFound)
    }

    /// Create the profile and bind it to the calling node in one transaction
    pub async fn _setup_profile(
        &self,
        node_id: PublicKey,
        setup: ProfileSetup,
    ) -> Result<ProfileView, ProfilesServiceError> {
        let email = setup.email.trim().to_string();
        if email.is_empty() {
            return Err(ProfilesServiceError::InvalidEmail);
        }

        if resolve_session(&self.db, &node_id).await?.is_some() {
            return Err(ProfilesServiceError::AlreadyRegistered);
        }

        let age = match setup.age.as_deref().map(str::trim) {
            Some(age) if !age.is_empty() => Some(self.cipher.seal(age)?),
            _ => None,
        };
        let now = timestamps::now();
        let user_id = UserId::new();

        let profile = ProfileActiveModel {
            id: Set(user_id),
            email: Set(email),
            display_name: Set(setup.display_name.filter(|n| !n.trim().is_empty())),
            phone: Set(Some(self.cipher.seal(setup.phone.trim())?)),
            age: Set(age),
            triggers: Set(self.cipher.seal_all(&setup.triggers)?.into()),
            bio: Set(setup.bio),
            preferences: Set(setup.preferences),
            profile_image_url: Set(setup.profile_image_url),
            setup_completed: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let txn = self.db.begin().await?;

        let model = match profile.insert(&txn).await {
            Ok(model) => model,
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!("profile setup rejected: email already registered");
                return Err(ProfilesServiceError::EmailTaken);
            }
            Err(err) => return Err(err.into()),
        };

        let identity = IdentityActiveModel {
            node_id: Set(node_id.as_bytes().to_vec()),
            user_id: Set(user_id),
        };
        Identity::insert(identity).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(user = %user_id, "profile created");
        Ok(self.open(model)?)
    }

    /// Resolve the user bound to a node key
    pub async fn _session_for(
        &self,
        node_id: &PublicKey,
    ) -> Result<Option<Session>, ProfilesServiceError> {
        Ok(resolve_session(&self.db, node_id).await?)
    }

    pub async fn _get_profile(&self, session: &Session) -> Result<ProfileView, ProfilesServiceError> {
        let model = self.find(session.user_id).await?;
        Ok(self.open(model)?)
    }

    /// Profile image for author attribution; empty when unset or missing
    pub async fn _profile_image(&self, user_id: UserId) -> Result<String, ProfilesServiceError> {
        let model = Profile::find_by_id(user_id).one(&self.db).await?;
        Ok(model.and_then(|p| p.profile_image_url).unwrap_or_default())
    }

    /// Opened trigger labels, empty when the user has no profile
    pub async fn _triggers_of(&self, user_id: UserId) -> Result<Vec<String>, ProfilesServiceError> {
        match Profile::find_by_id(user_id).one(&self.db).await? {
            Some(model) => Ok(self.cipher.open_all(&model.triggers.0)?),
            None => Ok(Vec::new()),
        }
    }

    /// Require setup to be completed again on next sign in
    pub async fn _mark_setup_incomplete(&self, session: &Session) -> Result<(), ProfilesServiceError> {
        let mut profile: ProfileActiveModel = self.find(session.user_id).await?.into();
        profile.setup_completed = Set(false);
        profile.updated_at = Set(timestamps::now());
        profile.update(&self.db).await?;

        tracing::info!(user = %session.user_id, "profile setup marked incomplete");
        Ok(())
    }

    pub async fn _update_triggers(
        &self,
        session: &Session,
        triggers: Vec<String>,
    ) -> Result<ProfileView, ProfilesServiceError> {
        let mut profile: ProfileActiveModel = self.find(session.user_id).await?.into();
        profile.triggers = Set(self.cipher.seal_all(&triggers)?.into());
        profile.updated_at = Set(timestamps::now());
        let model = profile.update(&self.db).await?;

        Ok(self.open(model)?)
    }

    async fn require_session(&self, ctx: &RequestContext) -> Result<Session, ProfilesServiceError> {
        self._session_for(&ctx.connection().remote_id())
            .await?
            .ok_or(ProfilesServiceError::Unauthenticated)
    }
}

#[zel_service(name = "profiles")]
trait Profiles {
    #[method(name = "setup_profile")]
    async fn setup_profile(&self, setup: ProfileSetup) -> Result<ProfileView, ResourceError>;

    #[method(name = "get_profile")]
    async fn get_profile(&self) -> Result<ProfileView, ResourceError>;

    #[method(name = "mark_setup_incomplete")]
    async fn mark_setup_incomplete(&self) -> Result<(), ResourceError>;

    #[method(name = "update_triggers")]
    async fn update_triggers(&self, triggers: Vec<String>) -> Result<ProfileView, ResourceError>;
}

#[async_trait]
impl ProfilesServer for ProfilesService {
    async fn setup_profile(
        &self,
        ctx: RequestContext,
        setup: ProfileSetup,
    ) -> Result<ProfileView, ResourceError> {
        let node_id = ctx.connection().remote_id();
        Ok(self._setup_profile(node_id, setup).await?)
    }

    async fn get_profile(&self, ctx: RequestContext) -> Result<ProfileView, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._get_profile(&session).await?)
    }

    async fn mark_setup_incomplete(&self, ctx: RequestContext) -> Result<(), ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._mark_setup_incomplete(&session).await?)
    }

    async fn update_triggers(
        &self,
        ctx: RequestContext,
        triggers: Vec<String>,
    ) -> Result<ProfileView, ResourceError> {
        let session = self.require_session(&ctx).await?;
        Ok(self._update_triggers(&session, triggers).await?)
    }
}
