//! Database pool and schema migrations.
//!
//! Migrations are embedded from `./migrations` and applied before the API
//! starts serving requests.

use rocket_db_pools::sqlx::{self, PgPool, migrate::Migrator};
use rocket_db_pools::Database;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Database)]
#[database("contacts_db")]
pub struct ContactsDb(sqlx::PgPool);

/// Run database migrations.
///
/// This is idempotent: migrations already recorded in `_sqlx_migrations`
/// are skipped after their checksums are verified.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("checking database migration state");

    MIGRATOR.run(pool).await?;

    log::info!("database migrations up to date");
    Ok(())
}
