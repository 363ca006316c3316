use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPARTMENT: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Only set for employees created locally; fetched ones derive it from `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_rating: Option<u8>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The rating shown to the user and used by the rating filter.
    pub fn rating(&self) -> u8 {
        self.assigned_rating
            .unwrap_or_else(|| crate::filter::rating_for_id(self.id))
    }
}

/// Input for a locally created employee, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub rating: u8,
}

// --- Fetch boundary schema (dummyjson users) ---

#[derive(Debug, Deserialize)]
pub struct RemoteUserList {
    #[serde(default)]
    pub users: Vec<RemoteUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<RemoteCompany>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteCompany {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl From<RemoteUser> for Employee {
    fn from(user: RemoteUser) -> Self {
        let company = user.company.unwrap_or_default();
        let department = company
            .department
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string());

        Employee {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email.unwrap_or_default(),
            department,
            age: user.age,
            title: company.title,
            phone: user.phone,
            assigned_rating: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_user_missing_department_defaults_to_general() {
        let raw = r#"{"id": 4, "firstName": "Ada", "lastName": "Lovelace", "email": "ada@x.io"}"#;
        let user: RemoteUser = serde_json::from_str(raw).unwrap();
        let employee = Employee::from(user);
        assert_eq!(employee.department, DEFAULT_DEPARTMENT);
        assert_eq!(employee.title, None);
    }

    #[test]
    fn test_remote_user_maps_company_fields() {
        let raw = r#"{
            "id": 1, "firstName": "Emily", "lastName": "Johnson",
            "email": "emily.johnson@x.dummyjson.com", "age": 28, "phone": "+81 965-431-3024",
            "company": {"department": "Engineering", "name": "Dooley", "title": "Sales Manager"}
        }"#;
        let employee = Employee::from(serde_json::from_str::<RemoteUser>(raw).unwrap());
        assert_eq!(employee.full_name(), "Emily Johnson");
        assert_eq!(employee.department, "Engineering");
        assert_eq!(employee.age, Some(28));
        assert_eq!(employee.title.as_deref(), Some("Sales Manager"));
    }

    #[test]
    fn test_rating_prefers_assigned_value() {
        let raw = r#"{"id": 1, "firstName": "A", "lastName": "B"}"#;
        let mut employee = Employee::from(serde_json::from_str::<RemoteUser>(raw).unwrap());
        assert_eq!(employee.rating(), 2);
        employee.assigned_rating = Some(5);
        assert_eq!(employee.rating(), 5);
    }

    #[test]
    fn test_employee_serializes_camel_case() {
        let employee = Employee {
            id: 9,
            first_name: "Jo".into(),
            last_name: "Park".into(),
            email: "jo@park.dev".into(),
            department: "Sales".into(),
            age: None,
            title: None,
            phone: None,
            assigned_rating: None,
        };
        let json = serde_json::to_string(&employee).unwrap();
        assert!(json.contains("\"firstName\":\"Jo\""));
        assert!(!json.contains("assignedRating"));
    }
}
