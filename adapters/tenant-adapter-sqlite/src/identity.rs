//! Identity management operations

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;
use std::sync::Arc;

use crate::crypto;
use crate::utils::*;
use immogest::{prelude::*, tenant_adapter::*, worker::WorkerPool};

fn identity_from_row(row: &SqliteRow) -> IgResult<Identity> {
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

/// Create a new identity with a hashed password
pub(crate) async fn create_identity(
	db: &SqlitePool,
	worker: &Arc<WorkerPool>,
	data: CreateIdentityData<'_>,
) -> IgResult<Identity> {
	if !data.email.contains('@') {
		return Err(Error::ValidationError("Invalid email address".into()));
	}
	if data.password.len() < 8 {
		return Err(Error::ValidationError("Password must be at least 8 characters".into()));
	}

	let user_id = uuid::Uuid::new_v4().to_string();
	let password_hash = crypto::generate_password_hash(worker, data.password.into()).await?;

	let res = sqlx::query(
		"INSERT INTO identities (user_id, email, password, role, must_change_password)
		VALUES (?1, ?2, ?3, ?4, ?5)",
	)
	.bind(&user_id)
	.bind(data.email)
	.bind(password_hash.as_ref())
	.bind(role_str(data.role))
	.bind(i64::from(data.must_change_password))
	.execute(db)
	.await;

	match res {
		Ok(_) => Ok(Identity {
			user_id: user_id.into_boxed_str(),
			email: Some(Box::from(data.email)),
			role: data.role,
			must_change_password: data.must_change_password,
		}),
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
			Err(Error::ValidationError("Email is already registered".into()))
		}
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

pub(crate) async fn read_identity(db: &SqlitePool, user_id: &str) -> IgResult<Identity> {
	let res = sqlx::query(
		"SELECT user_id, email, role, must_change_password FROM identities WHERE user_id = ?1",
	)
	.bind(user_id)
	.fetch_one(db)
	.await;

	match res {
		Ok(ref row) => identity_from_row(row),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

/// Delete an identity and its sessions (provisioning compensation)
pub(crate) async fn delete_identity(db: &SqlitePool, user_id: &str) -> IgResult<()> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	sqlx::query("DELETE FROM sessions WHERE user_id = ?1")
		.bind(user_id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	let res = sqlx::query("DELETE FROM identities WHERE user_id = ?1")
		.bind(user_id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;

	if res.rows_affected() == 0 { Err(Error::NotFound) } else { Ok(()) }
}

/// Verify credentials. Wrong password and unknown email surface the same.
pub(crate) async fn check_password(
	db: &SqlitePool,
	worker: &Arc<WorkerPool>,
	email: &str,
	password: &str,
) -> IgResult<Identity> {
	let res = sqlx::query(
		"SELECT user_id, email, password, role, must_change_password
		FROM identities WHERE email = ?1",
	)
	.bind(email)
	.fetch_one(db)
	.await;

	let row = match res {
		Ok(row) => row,
		Err(sqlx::Error::RowNotFound) => return Err(Error::PermissionDenied),
		Err(err) => {
			inspect(&err);
			return Err(Error::DbError);
		}
	};

	let password_hash: String =
		row.try_get("password").inspect_err(inspect).map_err(|_| Error::DbError)?;
	crypto::check_password(worker, password.into(), password_hash.into_boxed_str()).await?;

	identity_from_row(&row)
}

/// Store a new password hash and clear the forced-change flag
pub(crate) async fn update_password(
	db: &SqlitePool,
	worker: &Arc<WorkerPool>,
	user_id: &str,
	password: &str,
) -> IgResult<()> {
	if password.len() < 8 {
		return Err(Error::ValidationError("Password must be at least 8 characters".into()));
	}

	let password_hash = crypto::generate_password_hash(worker, password.into()).await?;

	let res = sqlx::query(
		"UPDATE identities SET password = ?1, must_change_password = 0,
			updated_at = unixepoch() WHERE user_id = ?2",
	)
	.bind(password_hash.as_ref())
	.bind(user_id)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 { Err(Error::NotFound) } else { Ok(()) }
}

/// Store an admin-issued temporary password and force a change on next login
pub(crate) async fn reset_password(
	db: &SqlitePool,
	worker: &Arc<WorkerPool>,
	user_id: &str,
	password: &str,
) -> IgResult<()> {
	let password_hash = crypto::generate_password_hash(worker, password.into()).await?;

	let res = sqlx::query(
		"UPDATE identities SET password = ?1, must_change_password = 1,
			updated_at = unixepoch() WHERE user_id = ?2",
	)
	.bind(password_hash.as_ref())
	.bind(user_id)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 { Err(Error::NotFound) } else { Ok(()) }
}

// vim: ts=4
