use anyhow::{Context, Result};
use thiserror::Error;

use crate::models::{Employee, RemoteUser, RemoteUserList};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("could not parse response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only client for the demo users API.
#[derive(Debug)]
pub struct DirectoryClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl DirectoryClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(concat!("staffdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn fetch_employees(&self, limit: usize) -> Result<Vec<Employee>, FetchError> {
        let url = format!("{}/users?limit={}", self.base_url, limit);
        let body = self.get(&url)?;
        let employees = parse_user_list(&body).map_err(|source| FetchError::Parse { url, source })?;
        log::info!("Fetched {} employees", employees.len());
        Ok(employees)
    }

    pub fn fetch_employee(&self, id: i64) -> Result<Employee, FetchError> {
        let url = format!("{}/users/{}", self.base_url, id);
        let body = self.get(&url)?;
        parse_user(&body).map_err(|source| FetchError::Parse { url, source })
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        response.text().map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

pub fn parse_user_list(body: &str) -> Result<Vec<Employee>, serde_json::Error> {
    let list: RemoteUserList = serde_json::from_str(body)?;
    Ok(list.users.into_iter().map(Employee::from).collect())
}

pub fn parse_user(body: &str) -> Result<Employee, serde_json::Error> {
    let user: RemoteUser = serde_json::from_str(body)?;
    Ok(Employee::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS_FIXTURE: &str = r#"{
        "users": [
            {"id": 1, "firstName": "Emily", "lastName": "Johnson", "email": "emily.johnson@x.dummyjson.com",
             "age": 28, "company": {"department": "Engineering", "title": "Sales Manager"}},
            {"id": 2, "firstName": "Michael", "lastName": "Williams", "email": "michael.williams@x.dummyjson.com",
             "company": {"department": "Support"}},
            {"id": 3, "firstName": "Sophia", "lastName": "Brown", "email": "sophia.brown@x.dummyjson.com"}
        ],
        "total": 208, "skip": 0, "limit": 3
    }"#;

    #[test]
    fn test_parse_user_list_keeps_fetch_order() {
        let employees = parse_user_list(USERS_FIXTURE).unwrap();
        let ids: Vec<i64> = employees.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(employees[1].department, "Support");
        assert_eq!(employees[2].department, "General");
    }

    #[test]
    fn test_parse_user_list_without_users_key_is_empty() {
        assert!(parse_user_list(r#"{"message": "rate limited"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_user_rejects_garbage() {
        assert!(parse_user("<html>").is_err());
        assert!(parse_user(r#"{"firstName": "No id"}"#).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = DirectoryClient::new("https://dummyjson.com/").unwrap();
        assert_eq!(client.base_url, "https://dummyjson.com");
    }

    #[test]
    #[ignore] // Ignore by default since it requires network
    fn test_fetch_employees_live() {
        let client = DirectoryClient::new("https://dummyjson.com").unwrap();
        let employees = client.fetch_employees(5).unwrap();
        assert_eq!(employees.len(), 5);
    }
}
