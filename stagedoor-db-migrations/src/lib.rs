use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use sea_orm_migration::MigrationTrait;

mod m00001_create_profile;
mod m00002_create_geo_rule;
mod m00003_create_teaser_config;
mod m00004_create_teaser_session;
mod m00005_create_block_entry;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m00001_create_profile::Migration),
            Box::new(m00002_create_geo_rule::Migration),
            Box::new(m00003_create_teaser_config::Migration),
            Box::new(m00004_create_teaser_session::Migration),
            Box::new(m00005_create_block_entry::Migration),
        ]
    }
}

pub async fn migrate_database(connection: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(connection, None).await
}
