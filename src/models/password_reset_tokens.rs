// ============================================================================
// MODÈLE : PASSWORD RESET TOKENS
// ============================================================================
//
// Colonnes de la table password_reset_tokens:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - user_id (INTEGER, NOT NULL, FK vers users)
//   - token (VARCHAR(6), NOT NULL) - code numérique à 6 chiffres
//   - created_at (TIMESTAMPTZ)
//   - expires_at (TIMESTAMPTZ, NOT NULL) - created_at + 5 minutes
//   - is_used (BOOLEAN, DEFAULT FALSE, NOT NULL)
//
// Workflow:
//   1. User demande un code via POST /password-reset/request/
//   2. Les anciens codes du user sont supprimés, un nouveau est inséré
//   3. Le code part par email
//   4. POST /password-reset/verify/ vérifie email + code
//   5. POST /password-reset/confirm/ change le mot de passe et met is_used = true
//
// Points d'attention:
//   - Un code ne peut être utilisé qu'une fois (is_used = true)
//   - Les codes expirés ne sont jamais purgés, seulement ignorés
//   - ON DELETE CASCADE: si user supprimé, codes supprimés aussi
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "password_reset_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    #[serde(skip_serializing)]
    pub token: String,

    pub created_at: DateTimeUtc,

    pub expires_at: DateTimeUtc,

    pub is_used: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
