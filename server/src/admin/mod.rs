//! Super-admin console API.

pub mod tenant;

// vim: ts=4
