// ============================================================================
// VOTES (LIKE / DISLIKE)
// ============================================================================
//
// Un votant = un compte, ou pour un anonyme le couple (cookie de session, IP).
// Un votant n'a qu'une ligne par film: revoter met à jour la ligne existante.
//
// Recherche d'un vote anonyme: session_key = clé OU ip_address = IP.
// Les index uniques (user_id, movie_id), (session_key, movie_id) et
// (ip_address, movie_id) rattrapent deux insertions concurrentes: la perdante
// relit la ligne gagnante et la met à jour.
//
// ============================================================================

use sea_orm::*;

use crate::error::{ApiError, ApiResult};
use crate::models::votes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoterIdentity {
    User(i32),
    Anonymous {
        session_key: Option<String>,
        ip: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTotals {
    pub like_count: u64,
    pub dislike_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Created,
    Updated,
}

impl VoteAction {
    pub fn message(&self) -> &'static str {
        match self {
            VoteAction::Created => "Vote created successfully",
            VoteAction::Updated => "Vote updated successfully",
        }
    }
}

pub struct VoteService;

impl VoteService {
    pub async fn totals(db: &impl ConnectionTrait, movie_id: i32) -> Result<VoteTotals, DbErr> {
        let count = |vote: bool| {
            votes::Entity::find()
                .filter(votes::Column::MovieId.eq(movie_id))
                .filter(votes::Column::Vote.eq(vote))
                .count(db)
        };

        let (like_count, dislike_count) = tokio::try_join!(count(true), count(false))?;
        Ok(VoteTotals { like_count, dislike_count })
    }

    /// None pour un anonyme sans cookie ni adresse: il n'a pas pu voter
    fn identity_condition(identity: &VoterIdentity) -> Option<Condition> {
        match identity {
            VoterIdentity::User(user_id) => Some(Condition::all().add(votes::Column::UserId.eq(*user_id))),
            VoterIdentity::Anonymous { session_key, ip } => {
                let mut any = Condition::any();
                if let Some(key) = session_key {
                    any = any.add(votes::Column::SessionKey.eq(key.as_str()));
                }
                if let Some(ip) = ip {
                    any = any.add(votes::Column::IpAddress.eq(ip.as_str()));
                }
                if any.is_empty() { None } else { Some(any) }
            }
        }
    }

    pub async fn find_vote(
        db: &impl ConnectionTrait,
        movie_id: i32,
        identity: &VoterIdentity,
    ) -> Result<Option<votes::Model>, DbErr> {
        let Some(condition) = Self::identity_condition(identity) else {
            return Ok(None);
        };

        votes::Entity::find()
            .filter(votes::Column::MovieId.eq(movie_id))
            .filter(condition)
            .order_by_asc(votes::Column::Id)
            .one(db)
            .await
    }

    /// Crée ou met à jour le vote, renvoie l'action et les totaux à jour
    pub async fn cast(
        db: &DatabaseConnection,
        movie_id: i32,
        identity: &VoterIdentity,
        vote: bool,
    ) -> ApiResult<(VoteAction, VoteTotals)> {
        let action = match Self::find_vote(db, movie_id, identity).await? {
            Some(existing) => {
                Self::overwrite(db, existing, vote).await?;
                VoteAction::Updated
            }
            None => Self::insert(db, movie_id, identity, vote).await?,
        };

        tracing::debug!(movie_id, ?identity, vote, ?action, "vote recorded");
        Ok((action, Self::totals(db, movie_id).await?))
    }

    async fn insert(
        db: &DatabaseConnection,
        movie_id: i32,
        identity: &VoterIdentity,
        vote: bool,
    ) -> ApiResult<VoteAction> {
        let (user_id, session_key, ip) = match identity {
            VoterIdentity::User(id) => (Some(*id), None, None),
            VoterIdentity::Anonymous { session_key, ip } => (None, session_key.clone(), ip.clone()),
        };

        let row = votes::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            vote: Set(vote),
            session_key: Set(session_key),
            ip_address: Set(ip),
            ..Default::default()
        };

        match row.insert(db).await {
            Ok(_) => Ok(VoteAction::Created),
            // Course perdue contre une autre requête du même votant
            Err(e) if is_unique_violation(&e) => {
                let winner = Self::find_vote(db, movie_id, identity)
                    .await?
                    .ok_or_else(|| ApiError::Database(e))?;
                Self::overwrite(db, winner, vote).await?;
                Ok(VoteAction::Updated)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn overwrite(db: &DatabaseConnection, existing: votes::Model, vote: bool) -> Result<(), DbErr> {
        if existing.vote == vote {
            return Ok(());
        }
        let mut active: votes::ActiveModel = existing.into();
        active.vote = Set(vote);
        active.update(db).await?;
        Ok(())
    }
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
