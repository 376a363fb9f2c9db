use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Admin, User};

const USER_COLUMNS: &str = "id, username, password, rank, first_name, last_name, contact_number";

/// Fields for a new personnel account; `password` is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub rank: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: Option<String>,
}

/// Partial profile update; `None` leaves a column unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub rank: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_number: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.rank.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.contact_number.is_none()
    }
}

pub async fn find_admin_by_username<'e, E: PgExecutor<'e>>(
    db: E,
    username: &str,
) -> Result<Option<Admin>, DatabaseError> {
    let row = sqlx::query_as::<_, Admin>("SELECT id, username, password FROM admins WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_admin<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> Result<Option<Admin>, DatabaseError> {
    let row = sqlx::query_as::<_, Admin>("SELECT id, username, password FROM admins WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_user_by_username<'e, E: PgExecutor<'e>>(
    db: E,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    let row = sqlx::query_as::<_, User>(&sql).bind(username).fetch_optional(db).await?;
    Ok(row)
}

pub async fn find_user<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let row = sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(db).await?;
    Ok(row)
}

pub async fn create_admin<'e, E: PgExecutor<'e>>(
    db: E,
    username: &str,
    password_hash: &str,
) -> Result<Admin, DatabaseError> {
    let row = sqlx::query_as::<_, Admin>(
        "INSERT INTO admins (id, username, password) VALUES ($1, $2, $3) RETURNING id, username, password",
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn create_user<'e, E: PgExecutor<'e>>(db: E, user: &NewUser) -> Result<User, DatabaseError> {
    let sql = format!(
        r#"
        INSERT INTO users (id, username, password, rank, first_name, last_name, contact_number)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        USER_COLUMNS
    );
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.rank)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.contact_number)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update_profile<'e, E: PgExecutor<'e>>(
    db: E,
    id: Uuid,
    changes: &ProfileChanges,
) -> Result<Option<User>, DatabaseError> {
    let sql = format!(
        r#"
        UPDATE users SET
            username       = COALESCE($2, username),
            rank           = COALESCE($3, rank),
            first_name     = COALESCE($4, first_name),
            last_name      = COALESCE($5, last_name),
            contact_number = COALESCE($6, contact_number)
        WHERE id = $1
        RETURNING {}
        "#,
        USER_COLUMNS
    );
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.rank)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.contact_number)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Delete the user when they no longer own any device. Returns whether a row was removed.
pub async fn delete_if_deviceless(conn: &mut PgConnection, id: Uuid) -> Result<bool, DatabaseError> {
    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices WHERE user_id = $1")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if remaining > 0 {
        return Ok(false);
    }
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_changes() {
        assert!(ProfileChanges::default().is_empty());
        let changes = ProfileChanges { rank: Some("น.ท.".into()), ..Default::default() };
        assert!(!changes.is_empty());
    }
}
