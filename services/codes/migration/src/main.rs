use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(codedrop_codes_migration::Migrator).await;
}
