use std::str::FromStr;

use assist_api::domain::directory::Employee;
use assist_api::error::{CoreError, CoreResult};
use assist_db::models::EmployeeModel;
use heapless::String as HeaplessString;
use validator::Validate;

pub struct DirectoryMapper;

impl DirectoryMapper {
    pub fn employee_from_model(model: &EmployeeModel) -> Employee {
        Employee {
            employee_id: model.employee_id,
            full_name: model.full_name.to_string(),
            email: model.email.to_string(),
            mobile: model.mobile.to_string(),
            department: model.department.to_string(),
            designation: model.designation.to_string(),
        }
    }

    /// Used by the (out-of-scope) admin write path only; the core never
    /// writes employee rows. Runs field validation before truncating into
    /// the bounded DB-model strings.
    pub fn employee_to_model(employee: Employee) -> CoreResult<EmployeeModel> {
        employee.validate().map_err(|e| CoreError::ValidationFailed(e.to_string()))?;
        Ok(EmployeeModel {
            employee_id: employee.employee_id,
            full_name: HeaplessString::from_str(&employee.full_name)
                .map_err(|_| CoreError::ValidationFailed("full_name too long".to_string()))?,
            email: HeaplessString::from_str(&employee.email)
                .map_err(|_| CoreError::ValidationFailed("email too long".to_string()))?,
            mobile: HeaplessString::from_str(&employee.mobile)
                .map_err(|_| CoreError::ValidationFailed("mobile too long".to_string()))?,
            department: HeaplessString::from_str(&employee.department)
                .map_err(|_| CoreError::ValidationFailed("department too long".to_string()))?,
            designation: HeaplessString::from_str(&employee.designation)
                .map_err(|_| CoreError::ValidationFailed("designation too long".to_string()))?,
        })
    }
}
