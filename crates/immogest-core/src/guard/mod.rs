//! The authorization guard.
//!
//! The guard mediates all access to tenant-scoped routes. It is a pure
//! decision function over three resolved inputs (tenant, session, path),
//! plus a reactive binding that re-evaluates it whenever any input changes.

pub mod classify;
pub mod decision;
pub mod watch;

pub use classify::{RouteClass, classify};
pub use decision::{
	ADMIN_AUTH_PATH, GuardOutcome, NOT_FOUND_PATH, ResolveState, evaluate, paths,
};
pub use watch::GuardBinding;

// vim: ts=4
