//! Zoho Books API interaction module
//!
//! This module provides the core functionality for talking to the Zoho Books
//! v3 REST API: credential resolution, the HTTP layer, and the client that
//! scopes every call to one organization.
//!
//! # Module Structure
//!
//! - [`auth`] - Credential resolution (parameters, environment, config file)
//! - [`client`] - Main Zoho Books client for making API requests
//! - [`http`] - HTTP utilities and response envelope handling
//!
//! # Example
//!
//! ```ignore
//! use zohobooks::zoho::{auth, client::ZohoClient};
//!
//! async fn example() -> zohobooks::Result<()> {
//!     let creds = auth::Credentials::new("123456789", "token", auth::DEFAULT_API_DOMAIN)?;
//!     let client = ZohoClient::new(creds)?;
//!     let items = client.get(&client.books_url("items"), &[]).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
