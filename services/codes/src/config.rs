use std::collections::HashSet;

use serde::Deserialize;

use codedrop_core::config::Config;

const DEFAULT_DB_PATH: &str = "codes.db";

/// Codes service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct CodesConfig {
    /// SQLite database file path (default `codes.db`). Env var: `DB_PATH`.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Comma-separated operator ids allowed to use the service. Env var: `ADMIN_IDS`.
    pub admin_ids: String,
    /// TCP port to listen on (default 3114). Env var: `CODES_PORT`.
    #[serde(default = "default_codes_port")]
    pub codes_port: u16,
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_owned()
}

fn default_codes_port() -> u16 {
    3114
}

impl Config for CodesConfig {}

impl CodesConfig {
    /// sqlx connection URL for `db_path`; the file is created when missing.
    pub fn database_url(&self) -> String {
        let path = match self.db_path.trim() {
            "" => DEFAULT_DB_PATH,
            path => path,
        };
        format!("sqlite://{path}?mode=rwc")
    }

    /// Parse `admin_ids`. Entries that are not integers are skipped with a warning.
    pub fn admin_id_set(&self) -> HashSet<i64> {
        parse_admin_ids(&self.admin_ids)
    }
}

pub fn parse_admin_ids(raw: &str) -> HashSet<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| match chunk.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(admin_id = chunk, "ignoring invalid admin id");
                None
            }
        })
        .collect()
}
