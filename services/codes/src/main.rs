use tracing::info;

use codedrop_core::config::Config;
use codedrop_core::tracing::init_tracing;

use codedrop_codes::config::CodesConfig;
use codedrop_codes::infra::db::connect;
use codedrop_codes::router::build_router;
use codedrop_codes::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CodesConfig::from_env();
    let admin_ids = config.admin_id_set();
    if admin_ids.is_empty() {
        panic!("ADMIN_IDS is empty; provide comma-separated operator ids");
    }

    let db = connect(&config.database_url())
        .await
        .expect("failed to open database");

    let state = AppState::new(db, admin_ids);

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.codes_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(db_path = %config.db_path, "codes service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
