#![cfg(test)]
use tokio::sync::OnceCell;
use migration::MigratorTrait;
use configs::DatabaseConfig;
use models::db::connect_with_config;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// Live store settings, or `None` when live tests should be skipped:
/// `SKIP_DB_TESTS` is set, no `DATABASE_URL` exists, or the store cannot be
/// reached and migrated.
pub async fn live_config() -> Option<DatabaseConfig> {
    if common::env::env_flag("SKIP_DB_TESTS") {
        return None;
    }
    common::env::load_dotenv();
    common::logging::init_logging_for_tests();
    let mut cfg = DatabaseConfig::default();
    cfg.normalize_from_env();
    cfg.validate().ok()?;
    cfg.max_connections = cfg.max_connections.max(5);

    let migrated = MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&cfg).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skipping live store tests: {e}");
                    return false;
                }
            };
            match migration::Migrator::up(&db, None).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("skipping live store tests, migration failed: {e}");
                    false
                }
            }
        })
        .await;
    (*migrated).then_some(cfg)
}
