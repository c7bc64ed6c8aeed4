use sea_orm_migration::prelude::*;

mod m20261019_000001_create_codes;
mod m20261019_000002_create_users;
mod m20261019_000003_add_usage_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_codes::Migration),
            Box::new(m20261019_000002_create_users::Migration),
            Box::new(m20261019_000003_add_usage_indexes::Migration),
        ]
    }
}
