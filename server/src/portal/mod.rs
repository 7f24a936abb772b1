//! Guarded agency portal pages.
//!
//! Leaf pages are opaque to the guard: each handler only shapes the JSON
//! payload of an already-authorized request. Tenant and identity arrive
//! through request extensions set by the guard middleware.

pub mod handler;

// vim: ts=4
