//! Zoho Books Client
//!
//! Main client for talking to Zoho Books, combining the resolved
//! credentials with the HTTP layer. Every call is scoped to the
//! organization in the credentials.

use super::auth::Credentials;
use super::http::ZohoHttpClient;
use crate::error::Result;
use serde_json::Value;

/// Main Zoho Books client
#[derive(Clone, Debug)]
pub struct ZohoClient {
    credentials: Credentials,
    http: ZohoHttpClient,
}

impl ZohoClient {
    /// Create a new client for the given credentials
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = ZohoHttpClient::new()?;
        Ok(Self { credentials, http })
    }

    /// Build an API URL from a path relative to `/books/v3`
    pub fn books_url(&self, path: &str) -> String {
        format!("{}/{}", self.credentials.base_url(), path.trim_start_matches('/'))
    }

    /// Build the URL of a single resource, escaping the id
    pub fn resource_url(&self, endpoint: &str, id: &str) -> String {
        self.books_url(&format!("{}/{}", endpoint, urlencoding::encode(id)))
    }

    /// `organization_id` plus any extra query parameters
    fn scoped_query<'a>(&self, extra: &[(&'a str, String)]) -> Vec<(&'a str, String)> {
        let mut query = Vec::with_capacity(extra.len() + 1);
        query.push(("organization_id", self.credentials.organization_id().to_string()));
        query.extend(extra.iter().cloned());
        query
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let auth = self.credentials.auth_header();
        self.http.get(url, &auth, &self.scoped_query(query)).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let auth = self.credentials.auth_header();
        self.http.post(url, &auth, &self.scoped_query(&[]), body).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let auth = self.credentials.auth_header();
        self.http.put(url, &auth, &self.scoped_query(&[]), body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<Value> {
        let auth = self.credentials.auth_header();
        self.http.delete(url, &auth, &self.scoped_query(&[])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ZohoClient {
        let creds = Credentials::new("123456789", "token", "https://www.zohoapis.com").unwrap();
        ZohoClient::new(creds).unwrap()
    }

    #[test]
    fn test_books_url() {
        let client = client();
        assert_eq!(
            client.books_url("chartofaccounts"),
            "https://www.zohoapis.com/books/v3/chartofaccounts"
        );
        assert_eq!(
            client.books_url("/items"),
            "https://www.zohoapis.com/books/v3/items"
        );
    }

    #[test]
    fn test_resource_url_escapes_id() {
        let client = client();
        assert_eq!(
            client.resource_url("items", "a/b"),
            "https://www.zohoapis.com/books/v3/items/a%2Fb"
        );
    }

    #[test]
    fn test_scoped_query_leads_with_organization() {
        let client = client();
        let query = client.scoped_query(&[("page", "2".to_string())]);
        assert_eq!(query[0], ("organization_id", "123456789".to_string()));
        assert_eq!(query[1], ("page", "2".to_string()));
    }
}
