use async_trait::async_trait;
use assist_db::models::EmployeeModel;
use assist_db::repository::{DirectoryRepository, RepositoryError};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::utils::{get_heapless_string, TryFromRow};

/// Postgres-backed Employee Directory.
///
/// `search_ranked` expects the table to carry a generated `search_vector`
/// column:
///
/// ```sql
/// alter table employees add column search_vector tsvector
///     generated always as (
///         setweight(to_tsvector('simple', coalesce(full_name, '')), 'A') ||
///         setweight(to_tsvector('simple', coalesce(department, '')), 'B') ||
///         setweight(to_tsvector('simple', coalesce(designation, '')), 'B')
///     ) stored;
///
/// create index employees_search_idx on employees using gin (search_vector);
/// ```
///
/// Exact-match strategies (`find_by_email`, `find_by_mobile`,
/// `find_by_exact_name`) run ahead of `search_ranked` in the service layer
/// and don't need the index above.
pub struct DirectoryRepositoryImpl {
    pool: PgPool,
}

impl DirectoryRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFromRow<sqlx::postgres::PgRow> for EmployeeModel {
    fn try_from_row(row: &sqlx::postgres::PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(EmployeeModel {
            employee_id: row.try_get("employee_id")?,
            full_name: get_heapless_string(row, "full_name")?,
            email: get_heapless_string(row, "email")?,
            mobile: get_heapless_string(row, "mobile")?,
            department: get_heapless_string(row, "department")?,
            designation: get_heapless_string(row, "designation")?,
        })
    }
}

#[async_trait]
impl DirectoryRepository for DirectoryRepositoryImpl {
    async fn find_by_id(&self, employee_id: Uuid) -> Result<Option<EmployeeModel>, RepositoryError> {
        let row = sqlx::query(
            "SELECT employee_id, full_name, email, mobile, department, designation FROM employees WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        row.as_ref()
            .map(EmployeeModel::try_from_row)
            .transpose()
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<EmployeeModel>, RepositoryError> {
        let row = sqlx::query(
            "SELECT employee_id, full_name, email, mobile, department, designation FROM employees WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        row.as_ref()
            .map(EmployeeModel::try_from_row)
            .transpose()
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<EmployeeModel>, RepositoryError> {
        let row = sqlx::query(
            "SELECT employee_id, full_name, email, mobile, department, designation FROM employees WHERE mobile = $1",
        )
        .bind(mobile)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        row.as_ref()
            .map(EmployeeModel::try_from_row)
            .transpose()
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }

    async fn find_by_exact_name(&self, name: &str) -> Result<Vec<EmployeeModel>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT employee_id, full_name, email, mobile, department, designation FROM employees WHERE lower(full_name) = lower($1)",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        if rows.len() > 1 {
            tracing::debug!("exact-name lookup for {name:?} matched {} employees", rows.len());
        }

        rows.iter()
            .map(EmployeeModel::try_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }

    async fn search_ranked(&self, term: &str, limit: i64) -> Result<Vec<EmployeeModel>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT employee_id, full_name, email, mobile, department, designation
            FROM employees
            WHERE search_vector @@ websearch_to_tsquery('simple', $1)
            ORDER BY ts_rank(search_vector, websearch_to_tsquery('simple', $1)) DESC
            LIMIT $2
            "#,
        )
        .bind(term)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        rows.iter()
            .map(EmployeeModel::try_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }
}
