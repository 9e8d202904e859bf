use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One employee directory row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Employee {
    pub employee_id: Uuid,
    #[validate(length(max = 200))]
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub department: String,
    pub designation: String,
}

/// Which match strategy produced a directory hit, in the order they are
/// tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectoryMatchKind {
    ExactId,
    ExactEmail,
    ExactMobile,
    ExactName,
    RankedFullText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryHit {
    pub employee: Employee,
    pub match_kind: DirectoryMatchKind,
}
