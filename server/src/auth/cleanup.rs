//! Periodic cleanup task for expired sessions.

use async_trait::async_trait;

use immogest_core::scheduler::Task;

use crate::prelude::*;

/// Removes expired session rows. Scheduled to run daily at 3 AM.
#[derive(Debug)]
pub struct SessionCleanupTask;

#[async_trait]
impl Task<App> for SessionCleanupTask {
	fn kind() -> &'static str {
		"auth.session_cleanup"
	}

	fn kind_of(&self) -> &'static str {
		Self::kind()
	}

	async fn run(&self, app: &App) -> IgResult<()> {
		info!("Running session cleanup task");

		match app.tenant_adapter.delete_expired_sessions().await {
			Ok(count) => {
				if count > 0 {
					info!("Cleaned up {} expired sessions", count);
				}
				Ok(())
			}
			Err(e) => {
				warn!("Failed to cleanup expired sessions: {}", e);
				Err(e)
			}
		}
	}
}

// vim: ts=4
