use std::collections::HashMap;

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Department, DepartmentWithDivisions, Division};

pub async fn list_departments<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<Department>, DatabaseError> {
    let rows = sqlx::query_as::<_, Department>(
        "SELECT id, name, special_ip_ranges FROM departments ORDER BY name",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_divisions<'e, E: PgExecutor<'e>>(
    db: E,
    department_id: Option<Uuid>,
) -> Result<Vec<Division>, DatabaseError> {
    let rows = sqlx::query_as::<_, Division>(
        r#"
        SELECT id, name, department_id
        FROM divisions
        WHERE $1::uuid IS NULL OR department_id = $1
        ORDER BY name
        "#,
    )
    .bind(department_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Departments ordered by name, each with its divisions
pub fn group_divisions(departments: Vec<Department>, divisions: Vec<Division>) -> Vec<DepartmentWithDivisions> {
    let mut by_department: HashMap<Uuid, Vec<Division>> = HashMap::new();
    for division in divisions {
        by_department.entry(division.department_id).or_default().push(division);
    }
    departments
        .into_iter()
        .map(|department| DepartmentWithDivisions {
            divisions: by_department.remove(&department.id).unwrap_or_default(),
            department,
        })
        .collect()
}

pub async fn find_department<'e, E: PgExecutor<'e>>(
    db: E,
    id: Uuid,
) -> Result<Option<Department>, DatabaseError> {
    let row = sqlx::query_as::<_, Department>(
        "SELECT id, name, special_ip_ranges FROM departments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_division<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> Result<Option<Division>, DatabaseError> {
    let row = sqlx::query_as::<_, Division>("SELECT id, name, department_id FROM divisions WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Insert or refresh a department by name
pub async fn upsert_department<'e, E: PgExecutor<'e>>(
    db: E,
    name: &str,
    special_ip_ranges: Option<&str>,
) -> Result<Department, DatabaseError> {
    let row = sqlx::query_as::<_, Department>(
        r#"
        INSERT INTO departments (id, name, special_ip_ranges)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET special_ip_ranges = EXCLUDED.special_ip_ranges
        RETURNING id, name, special_ip_ranges
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(special_ip_ranges)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn upsert_division<'e, E: PgExecutor<'e>>(
    db: E,
    department_id: Uuid,
    name: &str,
) -> Result<Division, DatabaseError> {
    let row = sqlx::query_as::<_, Division>(
        r#"
        INSERT INTO divisions (id, name, department_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (department_id, name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name, department_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(department_id)
    .fetch_one(db)
    .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_divisions_under_departments() {
        let a = Department { id: Uuid::new_v4(), name: "A".into(), special_ip_ranges: None };
        let b = Department { id: Uuid::new_v4(), name: "B".into(), special_ip_ranges: None };
        let divisions = vec![
            Division { id: Uuid::new_v4(), name: "A1".into(), department_id: a.id },
            Division { id: Uuid::new_v4(), name: "A2".into(), department_id: a.id },
            Division { id: Uuid::new_v4(), name: "orphan".into(), department_id: Uuid::new_v4() },
        ];

        let grouped = group_divisions(vec![a.clone(), b.clone()], divisions);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].department.id, a.id);
        assert_eq!(grouped[0].divisions.len(), 2);
        assert_eq!(grouped[1].department.id, b.id);
        assert!(grouped[1].divisions.is_empty());
    }
}
