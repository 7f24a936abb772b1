//! Session storage.
//!
//! Sessions are opaque random tokens resolved against the store on every
//! request, so sign-out revokes immediately. Expired rows are purged by
//! the server's janitor task.

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use immogest::{prelude::*, tenant_adapter::Identity};

/// Create a session and return its opaque token
pub(crate) async fn create_session(
	db: &SqlitePool,
	user_id: &str,
	ttl: i64,
) -> IgResult<Box<str>> {
	let token = random_token();
	let expires_at = Timestamp::from_now(ttl);

	sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)")
		.bind(token.as_ref())
		.bind(user_id)
		.bind(expires_at.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	Ok(token)
}

/// Resolve a token to its identity; expired tokens resolve to `NotFound`
pub(crate) async fn read_session(db: &SqlitePool, token: &str) -> IgResult<Identity> {
	let res = sqlx::query(
		"SELECT i.user_id, i.email, i.role, i.must_change_password
		FROM sessions s JOIN identities i ON i.user_id = s.user_id
		WHERE s.token = ?1 AND s.expires_at > unixepoch()",
	)
	.bind(token)
	.fetch_one(db)
	.await;

	let row = match res {
		Ok(row) => row,
		Err(sqlx::Error::RowNotFound) => return Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			return Err(Error::DbError);
		}
	};

	let role: String = row.try_get("role").inspect_err(inspect).map_err(|_| Error::DbError)?;
	Ok(Identity {
		user_id: row
			.try_get::<String, _>("user_id")
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?
			.into_boxed_str(),
		email: row
			.try_get::<Option<String>, _>("email")
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?
			.map(String::into_boxed_str),
		role: parse_role(&role)?,
		must_change_password: row
			.try_get::<i64, _>("must_change_password")
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?
			!= 0,
	})
}

pub(crate) async fn delete_session(db: &SqlitePool, token: &str) -> IgResult<()> {
	sqlx::query("DELETE FROM sessions WHERE token = ?1")
		.bind(token)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	Ok(())
}

/// Purge expired sessions, returns the number of rows removed
pub(crate) async fn delete_expired_sessions(db: &SqlitePool) -> IgResult<u32> {
	let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= unixepoch()")
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	Ok(res.rows_affected() as u32)
}

// vim: ts=4
