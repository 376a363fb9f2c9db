use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{IpAddress, IpStats, IpStatus};

/// All addresses (optionally one status), in numeric address order
pub async fn list<'e, E: PgExecutor<'e>>(db: E, status: Option<IpStatus>) -> Result<Vec<IpAddress>, DatabaseError> {
    let rows = sqlx::query_as::<_, IpAddress>(
        r#"
        SELECT id, ip_address, status
        FROM ip_addresses
        WHERE $1::ip_status IS NULL OR status = $1
        ORDER BY ip_address::inet
        "#,
    )
    .bind(status)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> Result<Option<IpAddress>, DatabaseError> {
    let row = sqlx::query_as::<_, IpAddress>("SELECT id, ip_address, status FROM ip_addresses WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn stats<'e, E: PgExecutor<'e>>(db: E) -> Result<IpStats, DatabaseError> {
    let (total, assigned): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'Assigned')
        FROM ip_addresses
        "#,
    )
    .fetch_one(db)
    .await?;
    Ok(IpStats {
        total,
        assigned,
        available: total - assigned,
    })
}

/// Add addresses to the pool as Available; existing addresses are left untouched.
/// Returns how many rows were new.
pub async fn insert_many(conn: &mut PgConnection, addresses: &[String]) -> Result<u64, DatabaseError> {
    let mut inserted = 0;
    for address in addresses {
        let result = sqlx::query(
            r#"
            INSERT INTO ip_addresses (id, ip_address, status)
            VALUES ($1, $2, 'Available')
            ON CONFLICT (ip_address) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(address)
        .execute(&mut *conn)
        .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}
