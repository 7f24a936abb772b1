//! Bootstrap module for initial platform setup.

use immogest_types::tenant_adapter::{CreateIdentityData, Role};

use crate::prelude::*;

/// Create the super-admin identity from configured credentials if it does
/// not exist yet. Used on first start; a duplicate email means the admin
/// is already provisioned.
pub async fn ensure_admin(app: &App) -> IgResult<()> {
	let (Some(email), Some(password)) =
		(app.opts.admin_email.as_deref(), app.opts.admin_password.as_deref())
	else {
		debug!("No bootstrap admin credentials configured, skipping");
		return Ok(());
	};

	match app
		.tenant_adapter
		.create_identity(CreateIdentityData {
			email,
			password,
			role: Role::Admin,
			must_change_password: false,
		})
		.await
	{
		Ok(identity) => {
			info!("Bootstrap admin identity created: {}", identity.user_id);
			Ok(())
		}
		Err(Error::ValidationError(_)) => {
			debug!("Bootstrap admin already exists, skipping");
			Ok(())
		}
		Err(err) => {
			warn!("Failed to create bootstrap admin: {}", err);
			Err(err)
		}
	}
}

// vim: ts=4
