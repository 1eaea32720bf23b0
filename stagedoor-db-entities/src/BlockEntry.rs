use chrono::{DateTime, Utc};
use poem_openapi::{Enum, Object};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Serialize, Clone, Enum, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[oai(rename_all = "snake_case")]
pub enum BlockReason {
    #[sea_orm(string_value = "harassment")]
    Harassment,
    #[sea_orm(string_value = "bad_language")]
    BadLanguage,
    #[sea_orm(string_value = "inappropriate_behavior")]
    InappropriateBehavior,
    #[sea_orm(string_value = "spam")]
    Spam,
    #[sea_orm(string_value = "other")]
    Other,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Harassment => "harassment",
            Self::BadLanguage => "bad language",
            Self::InappropriateBehavior => "inappropriate behavior",
            Self::Spam => "spam",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "block_entries")]
#[oai(rename = "BlockEntry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profile_id: Uuid,
    pub viewer_id: Option<Uuid>,
    pub viewer_ip: Option<String>,
    pub reason: BlockReason,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub created: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Profile::Entity",
        from = "Column::ProfileId",
        to = "super::Profile::Column::Id"
    )]
    Profile,
}

impl Related<super::Profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
