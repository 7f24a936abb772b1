//! Route classification.
//!
//! A path is classified purely from its prefix pattern relative to the
//! resolved tenant slug. Classification never touches session state; the
//! decision table in `decision.rs` combines the two.

/// Derived category of a URL path, used to select authorization rules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteClass {
	/// Marketing/listing pages; anonymous-accessible and crawlable
	PublicTenantPage,
	/// Owner-only agency back office
	AgencyScoped,
	/// Proprietor portal (copropriety fund calls, statements)
	ProprietorScoped,
	/// Super-admin console paths under a tenant slug
	AdminScoped,
	/// Password-change pages inside the authenticated prefixes, exempt
	/// from the owner/role checks
	ChangePasswordScoped,
}

impl RouteClass {
	/// Whether this class requires a non-null session before rendering
	pub fn requires_session(self) -> bool {
		matches!(
			self,
			RouteClass::AgencyScoped
				| RouteClass::ProprietorScoped
				| RouteClass::ChangePasswordScoped
		)
	}
}

/// Classifies `path` relative to the tenant `slug`.
///
/// The path is expected in the form `/{slug}/...`. Anything that does not
/// match a guarded prefix falls back to `PublicTenantPage` - the public
/// portal owns every unclaimed path under the slug.
pub fn classify(path: &str, slug: &str) -> RouteClass {
	let mut segments = path.trim_start_matches('/').split('/').filter(|s| !s.is_empty());

	if segments.next() != Some(slug) {
		return RouteClass::PublicTenantPage;
	}

	match (segments.next(), segments.next()) {
		// The sign-in screen must stay reachable without a session
		(Some("agency"), Some("auth")) => RouteClass::PublicTenantPage,
		(Some("agency"), Some("change-password")) => RouteClass::ChangePasswordScoped,
		(Some("agency"), _) => RouteClass::AgencyScoped,
		(Some("proprietaire"), Some("change-password")) => RouteClass::ChangePasswordScoped,
		(Some("proprietaire"), _) => RouteClass::ProprietorScoped,
		(Some("admin"), _) => RouteClass::AdminScoped,
		_ => RouteClass::PublicTenantPage,
	}
}


// vim: ts=4
