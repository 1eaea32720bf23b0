use chrono::{DateTime, Utc};
use poem_openapi::{Enum, Object};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// The access tier a matching geo rule grants.
#[derive(Debug, PartialEq, Eq, Serialize, Clone, Enum, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[oai(rename_all = "snake_case")]
pub enum Tier {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "teaser")]
    Teaser,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "per_visit")]
    PerVisit,
}

/// Which location field a rule's value is compared against.
#[derive(Debug, PartialEq, Eq, Serialize, Clone, Enum, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[oai(rename_all = "snake_case")]
pub enum RuleScope {
    #[sea_orm(string_value = "country")]
    Country,
    #[sea_orm(string_value = "state")]
    State,
    #[sea_orm(string_value = "city")]
    City,
    #[sea_orm(string_value = "zip")]
    Zip,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "geo_rules")]
#[oai(rename = "GeoRule")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profile_id: Uuid,
    pub scope: RuleScope,
    pub value: String,
    pub is_allowed: bool,
    pub tier: Tier,
    /// Monotonic insertion counter; rules are evaluated in ascending order.
    pub position: i32,
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
