use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)] // Format: pbkdf2_sha256$iterations$salt$hash
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
    pub date_joined: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,

    #[sea_orm(has_many = "super::votes::Entity")]
    Votes,

    #[sea_orm(has_many = "super::saved_films::Entity")]
    SavedFilms,

    #[sea_orm(has_many = "super::password_reset_tokens::Entity")]
    PasswordResetTokens,

    #[sea_orm(has_many = "super::notification_reads::Entity")]
    NotificationReads,
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl Related<super::saved_films::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedFilms.def()
    }
}

impl Related<super::password_reset_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PasswordResetTokens.def()
    }
}

impl Related<super::notification_reads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NotificationReads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
