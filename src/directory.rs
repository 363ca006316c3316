use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::filter;
use crate::models::{Employee, NewEmployee};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum DirectoryError {
    #[error("directory already initialized")]
    AlreadyInitialized,
    #[error("{0}")]
    Invalid(ValidationErrors),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Department,
    Rating,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "first name",
            Field::LastName => "last name",
            Field::Email => "email",
            Field::Department => "department",
            Field::Rating => "rating",
        }
    }
}

/// Per-field validation messages for a rejected `add`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(f, m)| (*f, *m))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.label(), msg))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

pub fn validate(input: &NewEmployee) -> ValidationErrors {
    let mut errors = BTreeMap::new();
    if input.first_name.trim().is_empty() {
        errors.insert(Field::FirstName, "Required");
    }
    if input.last_name.trim().is_empty() {
        errors.insert(Field::LastName, "Required");
    }
    if !EMAIL_RE.is_match(&input.email) {
        errors.insert(Field::Email, "Invalid email");
    }
    if input.department.trim().is_empty() {
        errors.insert(Field::Department, "Required");
    }
    if !(1..=5).contains(&input.rating) {
        errors.insert(Field::Rating, "Must be between 1 and 5");
    }
    ValidationErrors(errors)
}

/// In-memory employee directory for the current session.
#[derive(Debug, Default)]
pub struct Directory {
    employees: Vec<Employee>,
    initialized: bool,
    last_local_id: i64,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the directory. Only the first call is accepted.
    pub fn initialize(&mut self, records: Vec<Employee>) -> Result<(), DirectoryError> {
        if self.initialized {
            return Err(DirectoryError::AlreadyInitialized);
        }
        // Locally added employees (if any) stay in front of the fetched ones.
        self.employees.extend(records);
        self.initialized = true;
        Ok(())
    }

    pub fn list(&self) -> &[Employee] {
        &self.employees
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn departments(&self) -> Vec<String> {
        filter::departments(&self.employees)
    }

    /// Validates `input` and prepends a new employee with a fresh id.
    pub fn add(&mut self, input: NewEmployee) -> Result<&Employee, DirectoryError> {
        let errors = validate(&input);
        if !errors.is_empty() {
            return Err(DirectoryError::Invalid(errors));
        }

        let id = self.next_local_id(chrono::Utc::now().timestamp_millis());
        let employee = Employee {
            id,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            email: input.email.trim().to_string(),
            department: input.department.trim().to_string(),
            age: None,
            title: None,
            phone: None,
            assigned_rating: Some(input.rating),
        };
        log::info!("Added local employee #{} ({})", employee.id, employee.full_name());
        self.employees.insert(0, employee);
        Ok(&self.employees[0])
    }

    /// Millisecond clock ids, bumped so they never repeat or collide with an
    /// existing id even if the clock stalls.
    fn next_local_id(&mut self, now_millis: i64) -> i64 {
        let max_existing = self.employees.iter().map(|e| e.id).max().unwrap_or(0);
        let id = now_millis.max(self.last_local_id + 1).max(max_existing + 1);
        self.last_local_id = id;
        id
    }
}
