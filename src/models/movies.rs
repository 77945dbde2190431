// ============================================================================
// MODÈLE : MOVIES
// ============================================================================
//
// Colonnes de la table movies:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - department_id (INTEGER, NOT NULL, FK vers departments, ON DELETE CASCADE)
//   - name / description / country / year / genre / all_series (VARCHAR)
//   - preview_url, url (TEXT, NULL) - médias externes
//   - local_file (VARCHAR, NULL) - chemin dans le stockage de fichiers
//   - count (INTEGER, DEFAULT 0) - compteur de vues, ne diminue jamais
//   - created_at (TIMESTAMPTZ)
//   - is_possible (BOOLEAN, DEFAULT FALSE) - film soumis au filtrage régional
//
// Points d'attention:
//   - Les noms JSON publics (movies_name, add_departments, ...) sont posés
//     par les DTO de models::dto, pas ici
//   - L'ordre d'affichage ("récence") dépend aussi des épisodes, voir
//     services::catalog_service
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub department_id: i32,
    pub name: String,
    pub description: String,
    pub preview_url: Option<String>,
    pub url: Option<String>,
    pub local_file: Option<String>,
    pub country: String,
    pub count: i32,
    pub year: String,
    pub genre: String,
    pub all_series: String,
    pub created_at: DateTimeUtc,
    pub is_possible: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id",
        on_delete = "Cascade"
    )]
    Department,

    #[sea_orm(has_many = "super::movie_series::Entity")]
    Series,

    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,

    #[sea_orm(has_many = "super::votes::Entity")]
    Votes,

    #[sea_orm(has_many = "super::saved_films::Entity")]
    SavedFilms,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::movie_series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Series.def()
    }
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

impl ActiveModelBehavior for ActiveModel {}
