//! Small shared helpers.

use rand::RngExt;

use crate::prelude::*;

/// Length of generated temporary passwords
pub const TEMP_PASSWORD_LENGTH: usize = 24;

const ALPHABET: &[u8] = b"0123456789\
	abcdefghijklmnopqrstuvwxyz\
	ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates a URL-safe random string, used for provisioning-time
/// temporary passwords.
pub fn random_id() -> IgResult<String> {
	let mut rng = rand::rng();
	let id = (0..TEMP_PASSWORD_LENGTH)
		.map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
		.collect();

	Ok(id)
}


// vim: ts=4
