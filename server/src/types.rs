//! Common API types.

use serde::Serialize;
use serde_with::skip_serializing_none;

/// Pagination metadata for list responses
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
	pub offset: usize,
	pub count: usize,
	pub total: usize,
}

/// Standard API envelope
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
	pub data: T,
	pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, pagination: None }
	}

	pub fn with_pagination(data: T, offset: usize, count: usize, total: usize) -> Self {
		Self { data, pagination: Some(Pagination { offset, count, total }) }
	}
}

// vim: ts=4
