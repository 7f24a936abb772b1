//! Database schema initialization and migrations

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Get the current database version from vars table
async fn get_db_version(tx: &mut Transaction<'_, Sqlite>) -> i64 {
	sqlx::query_scalar::<_, String>("SELECT value FROM vars WHERE key = 'db_version'")
		.fetch_optional(&mut **tx)
		.await
		.ok()
		.flatten()
		.and_then(|v| v.parse().ok())
		.unwrap_or(0)
}

/// Set the database version in vars table
async fn set_db_version(tx: &mut Transaction<'_, Sqlite>, version: i64) {
	let _ = sqlx::query("INSERT OR REPLACE INTO vars (key, value) VALUES ('db_version', ?)")
		.bind(version.to_string())
		.execute(&mut **tx)
		.await;
}

// Current schema version - update this when adding new migrations
const CURRENT_DB_VERSION: i64 = 1;

/// Initialize the database schema and run migrations
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Create vars table first (needed for version tracking)
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS vars (
			key text NOT NULL,
			value text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(key)
		)",
	)
	.execute(&mut *tx)
	.await?;

	let version = get_db_version(&mut tx).await;

	// Schema creation - safe to run every time (uses IF NOT EXISTS)

	// Tenants
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS tenants (
			tn_id integer NOT NULL,
			slug text NOT NULL UNIQUE,
			name text NOT NULL,
			owner_id text NOT NULL,
			status char(1) NOT NULL DEFAULT 'A',
			has_immo integer NOT NULL DEFAULT 0,
			has_locative integer NOT NULL DEFAULT 0,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(tn_id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	// Identities
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS identities (
			user_id text NOT NULL,
			email text NOT NULL UNIQUE,
			password text NOT NULL,
			role text NOT NULL,
			must_change_password integer NOT NULL DEFAULT 0,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(user_id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	// Sessions
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS sessions (
			token text NOT NULL,
			user_id text NOT NULL,
			expires_at INTEGER NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(token)
		)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions (user_id)")
		.execute(&mut *tx)
		.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions (expires_at)")
		.execute(&mut *tx)
		.await?;

	if version < CURRENT_DB_VERSION {
		set_db_version(&mut tx, CURRENT_DB_VERSION).await;
	}

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
