//! The guard decision table.
//!
//! Pure function of three resolved inputs. Evaluation order matters:
//! loading checks come before all data-dependent checks (no redirect
//! flicker on first paint), tenant existence before role checks (role
//! checks dereference the owner), and the public short-circuit before any
//! session requirement (listing pages stay anonymous-accessible).

use immogest_types::session::SessionState;
use immogest_types::tenant_adapter::{Role, TenantData};

use crate::guard::classify::{RouteClass, classify};

pub const NOT_FOUND_PATH: &str = "/404";
pub const ADMIN_AUTH_PATH: &str = "/admin/auth";

/// Resolution state of an asynchronously fetched value.
///
/// `Failed` covers both "no such row" and "fetch error": the two surface
/// identically at the guard boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveState<T> {
	Loading,
	Ready(T),
	Failed,
}

impl<T> ResolveState<T> {
	pub fn is_loading(&self) -> bool {
		matches!(self, ResolveState::Loading)
	}

	pub fn ready(&self) -> Option<&T> {
		match self {
			ResolveState::Ready(value) => Some(value),
			_ => None,
		}
	}
}

/// What the route composition should do with the current request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
	ShowLoading,
	RedirectTo(Box<str>),
	Render,
}

/// Redirect targets, slug-relative where applicable
pub mod paths {
	pub fn tenant_home(slug: &str) -> String {
		format!("/{slug}")
	}

	pub fn tenant_auth(slug: &str) -> String {
		format!("/{slug}/agency/auth")
	}

	pub fn agency_services(slug: &str) -> String {
		format!("/{slug}/agency/services")
	}

	pub fn proprietor_dashboard(slug: &str) -> String {
		format!("/{slug}/proprietaire/dashboard")
	}

	pub fn proprietor_change_password(slug: &str) -> String {
		format!("/{slug}/proprietaire/change-password")
	}
}

/// Evaluates the guard for one (tenant, session, path) triple.
///
/// First match wins; the function is total and never errors. Unauthorized
/// access is always a redirect, never an error surfaced to the page tree.
pub fn evaluate(
	tenant: &ResolveState<TenantData>,
	session: &SessionState,
	path: &str,
) -> GuardOutcome {
	// 1. Both resolutions must have settled at least once
	if tenant.is_loading() || session.is_loading() {
		return GuardOutcome::ShowLoading;
	}

	// 2. Unresolved tenant: lookup failure and missing tenant surface the same
	let Some(tenant) = tenant.ready() else {
		return GuardOutcome::RedirectTo(NOT_FOUND_PATH.into());
	};

	let class = classify(path, &tenant.slug);

	// 3. Public pages render for any session state
	if class == RouteClass::PublicTenantPage {
		return GuardOutcome::Render;
	}

	// 4. Classes that require a session bounce anonymous visitors to the
	// sign-in page; what remains without one is admin-scoped (rule 7)
	let Some(identity) = session.identity() else {
		return if class.requires_session() {
			GuardOutcome::RedirectTo(paths::tenant_auth(&tenant.slug).into())
		} else {
			GuardOutcome::RedirectTo(ADMIN_AUTH_PATH.into())
		};
	};

	match class {
		// 5. Agency back office is owner-only. The owner reference decides,
		// not the role field.
		RouteClass::AgencyScoped => {
			if identity.user_id != tenant.owner_id {
				if identity.role == Role::Proprietor {
					GuardOutcome::RedirectTo(paths::proprietor_dashboard(&tenant.slug).into())
				} else {
					GuardOutcome::RedirectTo(paths::tenant_home(&tenant.slug).into())
				}
			} else {
				GuardOutcome::Render
			}
		}

		// 6. Proprietor portal: role-gated, with a forced password change
		// before anything else renders.
		RouteClass::ProprietorScoped => {
			if identity.role != Role::Proprietor {
				if identity.user_id == tenant.owner_id {
					GuardOutcome::RedirectTo(paths::agency_services(&tenant.slug).into())
				} else {
					GuardOutcome::RedirectTo(paths::tenant_home(&tenant.slug).into())
				}
			} else if identity.must_change_password {
				GuardOutcome::RedirectTo(paths::proprietor_change_password(&tenant.slug).into())
			} else {
				GuardOutcome::Render
			}
		}

		// Password-change pages render for any authenticated identity;
		// anything stricter would cycle with rule 6.
		RouteClass::ChangePasswordScoped => GuardOutcome::Render,

		// 7. Default: the super-admin console lives outside the slug tree
		RouteClass::AdminScoped | RouteClass::PublicTenantPage => {
			GuardOutcome::RedirectTo(ADMIN_AUTH_PATH.into())
		}
	}
}


// vim: ts=4
