//! Member service: the boundary to the identity provider.

use crate::services::actor::Actor;
use chrono::Utc;
use plebiscite_common::{AppError, AppResult, IdGenerator};
use plebiscite_db::{atomically, entities::member, repositories::MemberRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Member data as handed over by the identity provider after a login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    /// Opaque identifier issued by the identity provider.
    #[validate(length(min = 1, max = 255))]
    pub auid: String,

    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(max = 128))]
    pub public_id: Option<String>,

    #[validate(length(max = 2048))]
    pub profile: Option<String>,

    /// Whether the member is entitled to participate and vote.
    pub participant: bool,

    /// Groups the member belongs to.
    #[serde(default)]
    pub ngroup_ids: Vec<String>,
}

/// Member service for business logic.
#[derive(Clone)]
pub struct MemberService {
    member_repo: MemberRepository,
    id_gen: IdGenerator,
}

impl MemberService {
    /// Create a new member service.
    #[must_use]
    pub const fn new(member_repo: MemberRepository) -> Self {
        Self {
            member_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create or update a member from the identity provider and start a new session.
    ///
    /// The returned member carries a fresh bearer token. Administrative rights
    /// are never granted through the identity provider.
    pub async fn sync_member(&self, profile: MemberProfile) -> AppResult<member::Model> {
        profile.validate()?;
        let service = self.clone();
        let token = self.id_gen.generate_token();

        let member = atomically(self.member_repo.db(), move |txn| {
            Box::pin(async move {
                let taken = service
                    .member_repo
                    .find_by_username(txn, &profile.username)
                    .await?
                    .is_some_and(|holder| holder.auid != profile.auid);
                if taken {
                    return Err(AppError::Conflict(format!(
                        "Username {} is taken",
                        profile.username
                    )));
                }
                let member = match service.member_repo.find_by_auid(txn, &profile.auid).await? {
                    Some(existing) => {
                        let mut model: member::ActiveModel = existing.into();
                        model.username = Set(profile.username.clone());
                        model.public_id = Set(profile.public_id.clone());
                        model.profile = Set(profile.profile.clone());
                        model.participant = Set(profile.participant);
                        model.token = Set(Some(token));
                        service.member_repo.update(txn, model).await?
                    }
                    None => {
                        let model = member::ActiveModel {
                            id: Set(service.id_gen.generate()),
                            auid: Set(profile.auid.clone()),
                            username: Set(profile.username.clone()),
                            public_id: Set(profile.public_id.clone()),
                            profile: Set(profile.profile.clone()),
                            participant: Set(profile.participant),
                            is_admin: Set(false),
                            token: Set(Some(token)),
                            created_at: Set(Utc::now().into()),
                        };
                        service.member_repo.create(txn, model).await?
                    }
                };
                service
                    .member_repo
                    .replace_ngroups(txn, &member.id, &profile.ngroup_ids)
                    .await?;
                Ok(member)
            })
        })
        .await?;

        info!(
            member_id = %member.id,
            participant = member.participant,
            "Member synchronized"
        );
        Ok(member)
    }

    /// Resolve a bearer token to the acting member.
    pub async fn authenticate(&self, token: &str) -> AppResult<(member::Model, Actor)> {
        let member = self
            .member_repo
            .find_by_token(self.member_repo.db(), token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        let actor = if member.is_admin {
            Actor::Admin(member.id.clone())
        } else {
            Actor::Member(member.id.clone())
        };
        Ok((member, actor))
    }

    /// Get a member by ID.
    pub async fn get(&self, member_id: &str) -> AppResult<member::Model> {
        self.member_repo
            .get_by_id(self.member_repo.db(), member_id)
            .await
    }

    /// Group IDs of a member.
    pub async fn ngroup_ids(&self, member_id: &str) -> AppResult<Vec<String>> {
        self.member_repo
            .ngroup_ids(self.member_repo.db(), member_id)
            .await
    }
}
