const BCRYPT_COST: u32 = 10;

use immogest::{prelude::*, worker::WorkerPool};

fn generate_password_hash_sync(password: Box<str>) -> IgResult<Box<str>> {
	let hash = bcrypt::hash(password.as_ref(), BCRYPT_COST).map_err(|_| Error::PermissionDenied)?;

	Ok(hash.into())
}

pub(crate) async fn generate_password_hash(
	worker: &WorkerPool,
	password: Box<str>,
) -> IgResult<Box<str>> {
	worker.try_run(move || generate_password_hash_sync(password)).await
}

fn check_password_sync(password: Box<str>, password_hash: Box<str>) -> IgResult<()> {
	let res =
		bcrypt::verify(password.as_ref(), &password_hash).map_err(|_| Error::PermissionDenied)?;
	if !res { Err(Error::PermissionDenied) } else { Ok(()) }
}

pub(crate) async fn check_password(
	worker: &WorkerPool,
	password: Box<str>,
	password_hash: Box<str>,
) -> IgResult<()> {
	worker.try_run(move || check_password_sync(password, password_hash)).await
}


// vim: ts=4
