//! Info modules (`zohobooks_account_info`, `zohobooks_item_info`,
//! `zohobooks_vendor_info`)
//!
//! Never change anything: look up by id, by exact field match, or list all.

use super::ModuleOutput;
use crate::config::Config;
use crate::error::Result;
use crate::params::{Params, Schema};
use crate::resource::{ResourceClient, ResourceDef, ResourceFilter};
use crate::zoho::auth;
use crate::zoho::client::ZohoClient;
use serde_json::{json, Map, Value};

pub async fn run(def: &ResourceDef, args: &Map<String, Value>, config: &Config) -> Result<ModuleOutput> {
    let params = Schema::for_info(def).validate(args)?;
    let credentials = auth::resolve(&params.credentials(), config)?;
    let client = ZohoClient::new(credentials)?;
    query(ResourceClient::new(&client, def), &params).await
}

/// Run the lookup selected by the parameters
pub async fn query(resources: ResourceClient<'_>, params: &Params) -> Result<ModuleOutput> {
    let def = resources.def();
    let filter_by = params.get_str("filter_by");

    let selected = def
        .info
        .lookups
        .iter()
        .find_map(|lookup| params.get_str(&lookup.param).map(|value| (lookup, value)));

    let objects = match selected {
        Some((lookup, id)) if lookup.by_id => resources.get(id).await?.into_iter().collect(),
        Some((lookup, value)) => {
            let field = lookup.field.as_deref().unwrap_or(&lookup.param);
            resources
                .find(&ResourceFilter::new(field, value), filter_by)
                .await?
        }
        None => resources.list(filter_by).await?,
    };

    let count = objects.len();
    Ok(ModuleOutput::new(false, format!("Found {} {}(s)", count, def.noun()))
        .with(&def.info.payload_key, Value::Array(objects))
        .with("count", json!(count)))
}
