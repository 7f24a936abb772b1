//! Utility functions for database operations

use rand::RngExt;
use sqlx::sqlite::SqliteRow;

use immogest::prelude::*;
use immogest::tenant_adapter::Role;

pub(crate) const TOKEN_LENGTH: usize = 32;
const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
	'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
	'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Generate an opaque URL-safe session token
pub(crate) fn random_token() -> Box<str> {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(TOKEN_LENGTH);
	for _ in 0..TOKEN_LENGTH {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result.into_boxed_str()
}

/// Wire representation of a role
pub(crate) fn role_str(role: Role) -> &'static str {
	match role {
		Role::AgencyOwner => "AGENCY_OWNER",
		Role::Proprietor => "PROPRIETOR",
		Role::Client => "CLIENT",
		Role::Admin => "ADMIN",
	}
}

/// Parse a stored role string. Unknown values are a data error.
pub(crate) fn parse_role(s: &str) -> IgResult<Role> {
	match s {
		"AGENCY_OWNER" => Ok(Role::AgencyOwner),
		"PROPRIETOR" => Ok(Role::Proprietor),
		"CLIENT" => Ok(Role::Client),
		"ADMIN" => Ok(Role::Admin),
		_ => {
			warn!("Unknown role in database: {}", s);
			Err(Error::DbError)
		}
	}
}

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a query result to a value using a closure
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> IgResult<T>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(ref row) => f(row).inspect_err(inspect).map_err(|_| Error::DbError),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_role_round_trip() {
		for role in [Role::AgencyOwner, Role::Proprietor, Role::Client, Role::Admin] {
			assert_eq!(parse_role(role_str(role)).unwrap(), role);
		}
		assert!(parse_role("SUPERUSER").is_err());
	}

	#[test]
	fn test_random_token_shape() {
		let token = random_token();
		assert_eq!(token.len(), TOKEN_LENGTH);
		assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(random_token(), random_token());
	}
}

// vim: ts=4
