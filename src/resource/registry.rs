//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads the Zoho Books resource descriptors (accounts, items,
//! vendors) from embedded JSON files and provides lookup functions for the
//! rest of the crate.

use crate::reconcile::State;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/account.json"),
    include_str!("../resources/item.json"),
    include_str!("../resources/vendor.json"),
];

/// Value type of a module parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Str,
    Float,
    Int,
    Bool,
    Dict,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Float => "float",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Dict => "dict",
        }
    }
}

/// How a field is shaped on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Sent as given
    #[default]
    Plain,
    /// Mapping sent as `[{"label": k, "value": v}, ...]`
    LabelValue,
}

/// Field definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub choices: Vec<String>,
    /// Allowed keys for `dict` fields (empty = free-form)
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub encode: Encoding,
    /// Sent when creating
    #[serde(default)]
    pub create: bool,
    /// Sent when updating
    #[serde(default)]
    pub update: bool,
    /// Compared against the remote object to detect drift
    #[serde(default)]
    pub compare: bool,
}

/// Conditional requirement: when `param == value`, all of `requires` must be set
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredIf {
    pub param: String,
    pub value: Value,
    pub requires: Vec<String>,
}

/// Field on remote objects that must hold a fixed value (e.g. contact_type)
#[derive(Debug, Clone, Deserialize)]
pub struct KindDef {
    pub key: String,
    pub value: String,
}

/// Management module definition
#[derive(Debug, Clone, Deserialize)]
pub struct ManageDef {
    pub module: String,
    pub payload_key: String,
}

/// One identifying parameter of an info module
#[derive(Debug, Clone, Deserialize)]
pub struct LookupDef {
    pub param: String,
    /// Remote field matched exactly, for list-and-filter lookups
    #[serde(default)]
    pub field: Option<String>,
    /// Fetch directly by id instead of listing
    #[serde(default)]
    pub by_id: bool,
}

/// Info (query) module definition
#[derive(Debug, Clone, Deserialize)]
pub struct InfoDef {
    pub module: String,
    pub payload_key: String,
    /// Mutually exclusive lookup parameters
    pub lookups: Vec<LookupDef>,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    pub endpoint: String,
    /// Envelope key of list responses
    pub list_key: String,
    /// Envelope key of single-object responses
    pub single_key: String,
    pub id_field: String,
    pub name_field: String,
    pub states: Vec<State>,
    #[serde(default)]
    pub supports_filter_by: bool,
    /// Query parameters sent with every list call
    #[serde(default)]
    pub list_query: Map<String, Value>,
    /// Fields always sent on create
    #[serde(default)]
    pub create_fixed: Map<String, Value>,
    #[serde(default)]
    pub kind: Option<KindDef>,
    #[serde(default)]
    pub required_if: Vec<RequiredIf>,
    pub fields: Vec<FieldDef>,
    pub manage: ManageDef,
    pub info: InfoDef,
}

impl ResourceDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn supports_state(&self, state: State) -> bool {
        self.states.contains(&state)
    }

    /// Whether a remote object is of this resource's kind
    pub fn matches_kind(&self, object: &Value) -> bool {
        match &self.kind {
            Some(kind) => object.get(&kind.key).and_then(Value::as_str) == Some(kind.value.as_str()),
            None => true,
        }
    }

    /// Lowercase display name for messages ("item", "vendor")
    pub fn noun(&self) -> String {
        self.display_name.to_lowercase()
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get all resource keys, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}
