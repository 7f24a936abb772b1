//! Tenant management operations

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use crate::utils::*;
use immogest::{prelude::*, tenant_adapter::*};

fn tenant_from_row(row: &SqliteRow) -> Result<TenantData, sqlx::Error> {
	let status: String = row.try_get("status")?;
	Ok(TenantData {
		tn_id: TnId(row.try_get("tn_id")?),
		slug: row.try_get::<String, _>("slug")?.into_boxed_str(),
		name: row.try_get::<String, _>("name")?.into_boxed_str(),
		owner_id: row.try_get::<String, _>("owner_id")?.into_boxed_str(),
		active: status == "A",
		features: TenantFeatures {
			immo: row.try_get::<i64, _>("has_immo")? != 0,
			locative: row.try_get::<i64, _>("has_locative")? != 0,
		},
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

const TENANT_COLUMNS: &str =
	"tn_id, slug, name, owner_id, status, has_immo, has_locative, created_at";

/// Read a tenant by its URL slug, active or not
pub(crate) async fn read_tenant_by_slug(db: &SqlitePool, slug: &str) -> IgResult<TenantData> {
	let res = sqlx::query(&format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE slug = ?1"))
		.bind(slug)
		.fetch_one(db)
		.await;

	map_res(res, tenant_from_row)
}

/// Read a tenant by its internal id
pub(crate) async fn read_tenant(db: &SqlitePool, tn_id: TnId) -> IgResult<TenantData> {
	let res = sqlx::query(&format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE tn_id = ?1"))
		.bind(tn_id.0)
		.fetch_one(db)
		.await;

	map_res(res, tenant_from_row)
}

/// Create a new tenant
pub(crate) async fn create_tenant(db: &SqlitePool, data: CreateTenantData<'_>) -> IgResult<TnId> {
	if data.slug.is_empty()
		|| !data.slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
	{
		return Err(Error::ValidationError(
			"Slug must be non-empty lowercase alphanumeric with dashes".into(),
		));
	}

	let res = sqlx::query(
		"INSERT INTO tenants (slug, name, owner_id, status, has_immo, has_locative)
		VALUES (?1, ?2, ?3, 'A', ?4, ?5) RETURNING tn_id",
	)
	.bind(data.slug)
	.bind(data.name)
	.bind(data.owner_id)
	.bind(i64::from(data.features.immo))
	.bind(i64::from(data.features.locative))
	.fetch_one(db)
	.await;

	match res {
		Ok(ref row) => {
			row.try_get("tn_id").map(TnId).inspect_err(inspect).map_err(|_| Error::DbError)
		}
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
			Err(Error::ValidationError(format!("Slug '{}' is already taken", data.slug)))
		}
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

/// Apply a partial update and return the new state
pub(crate) async fn update_tenant(
	db: &SqlitePool,
	tn_id: TnId,
	data: &UpdateTenantData<'_>,
) -> IgResult<TenantData> {
	let current = read_tenant(db, tn_id).await?;

	let name = data.name.unwrap_or(&current.name);
	let owner_id = data.owner_id.unwrap_or(&current.owner_id);
	let active = data.active.unwrap_or(current.active);
	let features = data.features.unwrap_or(current.features);

	sqlx::query(
		"UPDATE tenants SET name = ?1, owner_id = ?2, status = ?3, has_immo = ?4,
			has_locative = ?5, updated_at = unixepoch() WHERE tn_id = ?6",
	)
	.bind(name)
	.bind(owner_id)
	.bind(if active { "A" } else { "I" })
	.bind(i64::from(features.immo))
	.bind(i64::from(features.locative))
	.bind(tn_id.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	read_tenant(db, tn_id).await
}

/// List tenants for the admin console
pub(crate) async fn list_tenants(
	db: &SqlitePool,
	opts: &ListTenantsOptions<'_>,
) -> IgResult<Vec<TenantData>> {
	let mut sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE 1 = 1");
	if opts.active.is_some() {
		sql.push_str(" AND status = ?");
	}
	if opts.q.is_some() {
		sql.push_str(" AND (slug LIKE ? OR name LIKE ?)");
	}
	sql.push_str(" ORDER BY slug LIMIT ? OFFSET ?");

	let mut query = sqlx::query(&sql);
	if let Some(active) = opts.active {
		query = query.bind(if active { "A" } else { "I" });
	}
	if let Some(q) = opts.q {
		let like = format!("%{}%", q);
		query = query.bind(like.clone()).bind(like);
	}
	query = query.bind(i64::from(opts.limit.unwrap_or(100))).bind(i64::from(opts.offset.unwrap_or(0)));

	let rows = query.fetch_all(db).await.inspect_err(inspect).or(Err(Error::DbError))?;

	let mut tenants = Vec::with_capacity(rows.len());
	for row in &rows {
		tenants.push(tenant_from_row(row).inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(tenants)
}

/// Count tenants matching the filter, ignoring pagination
pub(crate) async fn count_tenants(
	db: &SqlitePool,
	opts: &ListTenantsOptions<'_>,
) -> IgResult<u32> {
	let mut sql = "SELECT COUNT(*) FROM tenants WHERE 1 = 1".to_string();
	if opts.active.is_some() {
		sql.push_str(" AND status = ?");
	}
	if opts.q.is_some() {
		sql.push_str(" AND (slug LIKE ? OR name LIKE ?)");
	}

	let mut query = sqlx::query_scalar::<_, i64>(&sql);
	if let Some(active) = opts.active {
		query = query.bind(if active { "A" } else { "I" });
	}
	if let Some(q) = opts.q {
		let like = format!("%{}%", q);
		query = query.bind(like.clone()).bind(like);
	}

	let count = query.fetch_one(db).await.inspect_err(inspect).or(Err(Error::DbError))?;
	Ok(count as u32)
}

// vim: ts=4
