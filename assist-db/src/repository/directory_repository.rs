use async_trait::async_trait;
use uuid::Uuid;

use crate::models::EmployeeModel;
use crate::repository::errors::RepositoryError;

/// Backing table for the Directory Lookup service. Match strategies
/// are tried in a fixed order; each method here is one strategy so the
/// service layer controls the ordering and short-circuits on first hit.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn find_by_id(&self, employee_id: Uuid) -> Result<Option<EmployeeModel>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<EmployeeModel>, RepositoryError>;
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<EmployeeModel>, RepositoryError>;
    async fn find_by_exact_name(&self, name: &str) -> Result<Vec<EmployeeModel>, RepositoryError>;
    async fn search_ranked(&self, term: &str, limit: i64) -> Result<Vec<EmployeeModel>, RepositoryError>;
}
