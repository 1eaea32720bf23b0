use sea_orm::Schema;
use sea_orm_migration::prelude::*;

pub mod geo_rule {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "geo_rules")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub profile_id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(16))")]
        pub scope: String,
        pub value: String,
        pub is_allowed: bool,
        #[sea_orm(column_type = "String(StringLen::N(16))")]
        pub tier: String,
        pub position: i32,
        pub created: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m00002_create_geo_rule"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let builder = manager.get_database_backend();
        let schema = Schema::new(builder);

        manager
            .create_table(schema.create_table_from_entity(geo_rule::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_geo_rules_profile_position")
                    .table(geo_rule::Entity)
                    .col(geo_rule::Column::ProfileId)
                    .col(geo_rule::Column::Position)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(geo_rule::Entity).to_owned())
            .await
    }
}
