use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub created_at: DateTimeUtc,
    pub views_count: i32,
    // Tableau JSON des adresses des lecteurs anonymes: ["1.2.3.4", ...]
    pub read_by_ips: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification_reads::Entity")]
    Reads,
}

impl Related<super::notification_reads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reads.def()
    }
}

impl Model {
    /// Adresses anonymes déjà comptées (entrées non textuelles ignorées)
    pub fn reader_ips(&self) -> Vec<String> {
        self.read_by_ips
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn read_by_ip(&self, ip: &str) -> bool {
        self.reader_ips().iter().any(|known| known == ip)
    }
}

impl ActiveModelBehavior for ActiveModel {}
