use chrono::NaiveDate;
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Asset, AssetRow, DeviceStatus};

/// Device joined with everything an asset view renders
pub const SELECT_ASSETS: &str = r#"
    SELECT
        d.id, d.ip_address_id, d.department_id, d.division_id, d.user_id,
        d.device_type, d.brand, d.model, d.service_tag, d.mac_address,
        d.date_received, d.status, d.notes, d.sn_monitor, d.sn_ups,
        d.color_sticker, d.created_at, d.updated_at,
        ip.ip_address, ip.status AS ip_status,
        u.username AS user_username, u.rank AS user_rank,
        u.first_name AS user_first_name, u.last_name AS user_last_name,
        u.contact_number AS user_contact_number,
        dep.name AS department_name, dep.special_ip_ranges AS department_special_ip_ranges,
        dv.name AS division_name, dv.department_id AS division_department_id
    FROM devices d
    JOIN ip_addresses ip ON ip.id = d.ip_address_id
    LEFT JOIN users u ON u.id = d.user_id
    LEFT JOIN departments dep ON dep.id = d.department_id
    LEFT JOIN divisions dv ON dv.id = d.division_id
"#;

/// Column values of one `devices` row
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceFields {
    pub ip_address_id: Uuid,
    pub department_id: Option<Uuid>,
    pub division_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub device_type: String,
    pub brand: String,
    pub model: Option<String>,
    pub service_tag: String,
    pub mac_address: Option<String>,
    pub date_received: NaiveDate,
    pub status: DeviceStatus,
    pub notes: Option<String>,
    pub sn_monitor: Option<String>,
    pub sn_ups: Option<String>,
    pub color_sticker: Option<String>,
}

impl From<&Asset> for DeviceFields {
    fn from(asset: &Asset) -> Self {
        Self {
            ip_address_id: asset.ip_address_id,
            department_id: asset.department_id,
            division_id: asset.division_id,
            user_id: asset.user_id,
            device_type: asset.device_type.clone(),
            brand: asset.brand.clone(),
            model: asset.model.clone(),
            service_tag: asset.service_tag.clone(),
            mac_address: asset.mac_address.clone(),
            date_received: asset.date_received,
            status: asset.status,
            notes: asset.notes.clone(),
            sn_monitor: asset.sn_monitor.clone(),
            sn_ups: asset.sn_ups.clone(),
            color_sticker: asset.color_sticker.clone(),
        }
    }
}

/// Devices ordered by address; `owner` restricts to one user's devices
pub async fn list<'e, E: PgExecutor<'e>>(db: E, owner: Option<Uuid>) -> Result<Vec<Asset>, DatabaseError> {
    let sql = format!(
        "{} WHERE $1::uuid IS NULL OR d.user_id = $1 ORDER BY ip.ip_address::inet",
        SELECT_ASSETS
    );
    let rows = sqlx::query_as::<_, AssetRow>(&sql).bind(owner).fetch_all(db).await?;
    Ok(rows.into_iter().map(Asset::from).collect())
}

pub async fn find<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> Result<Option<Asset>, DatabaseError> {
    let sql = format!("{} WHERE d.id = $1", SELECT_ASSETS);
    let row = sqlx::query_as::<_, AssetRow>(&sql).bind(id).fetch_optional(db).await?;
    Ok(row.map(Asset::from))
}

/// Same as [`find`] but locks the device row for the rest of the transaction
pub async fn find_for_update(conn: &mut PgConnection, id: Uuid) -> Result<Option<Asset>, DatabaseError> {
    let sql = format!("{} WHERE d.id = $1 FOR UPDATE OF d", SELECT_ASSETS);
    let row = sqlx::query_as::<_, AssetRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(Asset::from))
}

pub async fn insert(conn: &mut PgConnection, fields: &DeviceFields) -> Result<Uuid, DatabaseError> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO devices (
            id, ip_address_id, department_id, division_id, user_id,
            device_type, brand, model, service_tag, mac_address,
            date_received, status, notes, sn_monitor, sn_ups, color_sticker
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(fields.ip_address_id)
    .bind(fields.department_id)
    .bind(fields.division_id)
    .bind(fields.user_id)
    .bind(&fields.device_type)
    .bind(&fields.brand)
    .bind(&fields.model)
    .bind(&fields.service_tag)
    .bind(&fields.mac_address)
    .bind(fields.date_received)
    .bind(fields.status)
    .bind(&fields.notes)
    .bind(&fields.sn_monitor)
    .bind(&fields.sn_ups)
    .bind(&fields.color_sticker)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Overwrite every device column and bump `updated_at`
pub async fn update(conn: &mut PgConnection, id: Uuid, fields: &DeviceFields) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE devices SET
            ip_address_id = $2, department_id = $3, division_id = $4, user_id = $5,
            device_type = $6, brand = $7, model = $8, service_tag = $9, mac_address = $10,
            date_received = $11, status = $12, notes = $13, sn_monitor = $14, sn_ups = $15,
            color_sticker = $16, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(fields.ip_address_id)
    .bind(fields.department_id)
    .bind(fields.division_id)
    .bind(fields.user_id)
    .bind(&fields.device_type)
    .bind(&fields.brand)
    .bind(&fields.model)
    .bind(&fields.service_tag)
    .bind(&fields.mac_address)
    .bind(fields.date_received)
    .bind(fields.status)
    .bind(&fields.notes)
    .bind(&fields.sn_monitor)
    .bind(&fields.sn_ups)
    .bind(&fields.color_sticker)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Device {} not found", id)));
    }
    Ok(())
}

/// Remove a device row, returning its address and owner
pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<Option<(Uuid, Option<Uuid>)>, DatabaseError> {
    let row: Option<(Uuid, Option<Uuid>)> =
        sqlx::query_as("DELETE FROM devices WHERE id = $1 RETURNING ip_address_id, user_id")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row)
}
