/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `db_path` is read from `DB_PATH`,
/// `admin_ids` from `ADMIN_IDS`, and so on.
pub trait Config: Sized + serde::de::DeserializeOwned {
    /// Load from the process environment.
    ///
    /// # Panics
    ///
    /// Panics if any required env var is missing or cannot be deserialized.
    fn from_env() -> Self {
        envy::from_env().expect("failed to load config from environment")
    }

    /// Load from an explicit set of `(NAME, value)` pairs instead of the process environment.
    fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
