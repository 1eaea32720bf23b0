use chrono::{DateTime, Utc};
use poem_openapi::Object;
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "profiles")]
#[oai(rename = "Profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::GeoRule::Entity")]
    GeoRules,
    #[sea_orm(has_many = "super::TeaserSession::Entity")]
    TeaserSessions,
    #[sea_orm(has_many = "super::BlockEntry::Entity")]
    BlockEntries,
}

impl Related<super::GeoRule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeoRules.def()
    }
}

impl Related<super::TeaserSession::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeaserSessions.def()
    }
}

impl Related<super::BlockEntry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlockEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
