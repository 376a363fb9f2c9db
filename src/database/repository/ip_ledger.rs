//! Assigned/Available bookkeeping for the IP pool.
//!
//! Every device write that touches `ip_address_id` goes through these calls on
//! the same connection as the device write, so the status column and the
//! device table change together or not at all.

use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::IpStatus;

/// Mark an Available address as Assigned.
///
/// The row is locked while checking, so two requests cannot claim the same
/// address.
pub async fn assign(conn: &mut PgConnection, ip_id: Uuid) -> Result<(), DatabaseError> {
    let current: Option<(String, IpStatus)> =
        sqlx::query_as("SELECT ip_address, status FROM ip_addresses WHERE id = $1 FOR UPDATE")
            .bind(ip_id)
            .fetch_optional(&mut *conn)
            .await?;

    match current {
        None => Err(DatabaseError::NotFound(format!("IP address {} not found", ip_id))),
        Some((address, IpStatus::Assigned)) => {
            Err(DatabaseError::Conflict(format!("ip_address {} is already assigned", address)))
        }
        Some((address, IpStatus::Available)) => {
            sqlx::query("UPDATE ip_addresses SET status = 'Assigned' WHERE id = $1")
                .bind(ip_id)
                .execute(&mut *conn)
                .await?;
            debug!("Assigned IP {}", address);
            Ok(())
        }
    }
}

/// Return an address to the pool. Releasing an unknown or already free address is a no-op.
pub async fn release(conn: &mut PgConnection, ip_id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE ip_addresses SET status = 'Available' WHERE id = $1")
        .bind(ip_id)
        .execute(&mut *conn)
        .await?;
    debug!("Released IP {} ({} row)", ip_id, result.rows_affected());
    Ok(())
}

/// Move a device from `old` to `new`: free the old address, claim the new one
pub async fn reassign(conn: &mut PgConnection, old: Uuid, new: Uuid) -> Result<(), DatabaseError> {
    if old == new {
        return Ok(());
    }
    release(&mut *conn, old).await?;
    assign(&mut *conn, new).await
}
