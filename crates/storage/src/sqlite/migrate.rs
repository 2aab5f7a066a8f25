use rusqlite::{Connection, Transaction};

use super::SqliteInitError;

const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Bring the schema up to `CURRENT_SCHEMA_VERSION`, tracked via `PRAGMA user_version`.
pub fn run_migrations(conn: &mut Connection) -> Result<(), SqliteInitError> {
    let mut version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(SqliteInitError::SchemaTooNew {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    while version < CURRENT_SCHEMA_VERSION {
        let next_version = version + 1;
        apply_migration(&tx, next_version)?;
        version = next_version;
    }
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    tx.commit()?;

    Ok(())
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> Result<(), SqliteInitError> {
    match version {
        1 => {
            tx.execute_batch(
                r"
                CREATE TABLE IF NOT EXISTS kv_entries (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                ",
            )?;
            Ok(())
        }
        other => Err(SqliteInitError::UnknownMigration(other)),
    }
}
