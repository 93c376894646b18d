//! Resource Fetcher
//!
//! Read side of the resource client: listing (with pagination), exact-match
//! lookups, and fetching a single object by id.

use super::registry::ResourceDef;
use crate::error::{Error, Result};
use crate::zoho::client::ZohoClient;
use serde_json::Value;

/// Page size requested from list endpoints (the API maximum)
const PER_PAGE: u32 = 200;

/// Hard stop for runaway pagination
const MAX_PAGES: u32 = 500;

/// Exact-match filter on a remote field
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    pub field: String,
    pub value: String,
}

impl ResourceFilter {
    pub fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn matches(&self, item: &Value) -> bool {
        item.get(&self.field).and_then(Value::as_str) == Some(self.value.as_str())
    }
}

/// Result of paginated fetch
pub struct PaginatedResult {
    pub items: Vec<Value>,
    pub has_more: bool,
}

/// Client for one resource kind
#[derive(Clone, Copy)]
pub struct ResourceClient<'a> {
    pub(super) client: &'a ZohoClient,
    pub(super) def: &'a ResourceDef,
}

impl<'a> ResourceClient<'a> {
    pub fn new(client: &'a ZohoClient, def: &'a ResourceDef) -> Self {
        Self { client, def }
    }

    pub fn def(&self) -> &'a ResourceDef {
        self.def
    }

    /// Fetch all objects (auto-paginate)
    pub async fn list(&self, filter_by: Option<&str>) -> Result<Vec<Value>> {
        self.list_up_to(filter_by, MAX_PAGES).await
    }

    /// Fetch all objects, failing rather than returning a partial list
    async fn list_up_to(&self, filter_by: Option<&str>, max_pages: u32) -> Result<Vec<Value>> {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let result = self.list_page(filter_by, page).await?;
            all_items.extend(result.items);

            if !result.has_more {
                break;
            }
            if page >= max_pages {
                tracing::error!("{} still has more pages after {}", self.def.endpoint, max_pages);
                return Err(Error::remote(
                    None,
                    format!(
                        "Listing {} exceeded {} pages; refusing to use a partial result",
                        self.def.endpoint, max_pages
                    ),
                ));
            }
            page += 1;
        }

        tracing::debug!("Fetched {} {} objects", all_items.len(), self.def.noun());
        Ok(all_items)
    }

    /// Fetch one page of objects
    pub async fn list_page(&self, filter_by: Option<&str>, page: u32) -> Result<PaginatedResult> {
        let mut query: Vec<(&str, String)> = self
            .def
            .list_query
            .iter()
            .map(|(k, v)| (k.as_str(), scalar_to_query(v)))
            .collect();
        query.push(("page", page.to_string()));
        query.push(("per_page", PER_PAGE.to_string()));
        if let Some(filter_by) = filter_by {
            query.push(("filter_by", filter_by.to_string()));
        }

        let url = self.client.books_url(&self.def.endpoint);
        let response = self.client.get(&url, &query).await?;

        let items = response
            .get(&self.def.list_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let has_more = response
            .get("page_context")
            .and_then(|c| c.get("has_more_page"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(PaginatedResult { items, has_more })
    }

    /// All objects whose field matches exactly
    pub async fn find(&self, filter: &ResourceFilter, filter_by: Option<&str>) -> Result<Vec<Value>> {
        let items = self.list(filter_by).await?;
        Ok(items.into_iter().filter(|item| filter.matches(item)).collect())
    }

    /// First object whose name matches exactly
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Value>> {
        let filter = ResourceFilter::new(&self.def.name_field, name);
        let mut matches = self.find(&filter, None).await?;
        if matches.len() > 1 {
            tracing::warn!(
                "{} {} objects named '{}', using the first",
                matches.len(),
                self.def.noun(),
                name
            );
        }
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0))
        })
    }

    /// Fetch one object by id; not-found is `None`, not an error
    pub async fn get(&self, id: &str) -> Result<Option<Value>> {
        let url = self.client.resource_url(&self.def.endpoint, id);
        let response = match self.client.get(&url, &[]).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} not found", self.def.noun(), id);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(response
            .get(&self.def.single_key)
            .filter(|object| object.is_object() && self.def.matches_kind(object))
            .cloned())
    }

    /// Id of a remote object
    pub fn id_of(&self, object: &Value) -> Result<String> {
        match object.get(&self.def.id_field) {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(Error::remote(
                None,
                format!(
                    "{} object has no {}",
                    self.def.display_name, self.def.id_field
                ),
            )),
        }
    }
}

fn scalar_to_query(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
