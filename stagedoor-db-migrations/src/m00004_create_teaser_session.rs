use sea_orm::Schema;
use sea_orm_migration::prelude::*;

pub mod teaser_session {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "teaser_sessions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub profile_id: Uuid,
        pub viewer_id: Option<Uuid>,
        pub viewer_ip: String,
        pub viewer_key: String,
        pub started: DateTimeUtc,
        pub expires: DateTimeUtc,
        pub active: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m00004_create_teaser_session"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let builder = manager.get_database_backend();
        let schema = Schema::new(builder);

        manager
            .create_table(schema.create_table_from_entity(teaser_session::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_teaser_sessions_lookup")
                    .table(teaser_session::Entity)
                    .col(teaser_session::Column::ProfileId)
                    .col(teaser_session::Column::ViewerKey)
                    .col(teaser_session::Column::Active)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(teaser_session::Entity).to_owned())
            .await
    }
}
