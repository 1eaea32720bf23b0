use sea_orm::Schema;
use sea_orm_migration::prelude::*;

pub mod block_entry {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "block_entries")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub profile_id: Uuid,
        pub viewer_id: Option<Uuid>,
        pub viewer_ip: Option<String>,
        #[sea_orm(column_type = "String(StringLen::N(32))")]
        pub reason: String,
        #[sea_orm(column_type = "Text")]
        pub notes: String,
        pub created: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m00005_create_block_entry"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let builder = manager.get_database_backend();
        let schema = Schema::new(builder);

        manager
            .create_table(schema.create_table_from_entity(block_entry::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_block_entries_profile")
                    .table(block_entry::Entity)
                    .col(block_entry::Column::ProfileId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(block_entry::Entity).to_owned())
            .await
    }
}
