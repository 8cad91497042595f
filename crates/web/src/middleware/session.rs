//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::PloomaConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "plooma_session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The session store was given an invalid schema or table name.
#[derive(Debug, thiserror::Error)]
#[error("invalid session store setting: {0}")]
pub struct SessionStoreError(String);

/// Create the `PostgreSQL` session store backed by `plooma.session`.
///
/// The table itself is created by the schema migrations.
///
/// # Errors
///
/// Returns `SessionStoreError` if the schema or table name is rejected.
pub fn create_session_store(pool: &PgPool) -> Result<PostgresStore, SessionStoreError> {
    PostgresStore::new(pool.clone())
        .with_schema_name("plooma")
        .map_err(|e| SessionStoreError(e.to_string()))?
        .with_table_name("session")
        .map_err(|e| SessionStoreError(e.to_string()))
}

/// Wrap a session store in the Plooma cookie settings.
///
/// The server passes the `PostgreSQL` store; handler tests pass an
/// in-memory one.
pub fn session_layer<Store: SessionStore>(
    store: Store,
    config: &PloomaConfig,
) -> SessionManagerLayer<Store> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
mod tests {
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::tests::test_config;

    #[tokio::test]
    async fn test_session_store_accepts_plooma_schema() {
        let pool = crate::db::create_lazy_pool(&test_config().database_url);
        let pool = pool.unwrap_or_else(|e| panic!("lazy pool: {e}"));
        assert!(create_session_store(&pool).is_ok());
    }

    #[test]
    fn test_session_layer_builds_for_any_store() {
        let _layer = session_layer(MemoryStore::default(), &test_config());
    }
}
