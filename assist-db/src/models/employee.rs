use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeModel {
    pub employee_id: Uuid,
    pub full_name: HeaplessString<200>,
    pub email: HeaplessString<120>,
    pub mobile: HeaplessString<20>,
    pub department: HeaplessString<100>,
    pub designation: HeaplessString<100>,
}
