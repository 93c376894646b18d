//! Parameter Schema
//!
//! Declares the parameters each module accepts and validates raw invocation
//! arguments against them: unknown keys, type coercion, choices, required
//! and conditionally required fields, defaults, and mutually exclusive
//! lookup keys. Validation never touches the network.

use crate::error::{Error, Result};
use crate::reconcile::State;
use crate::resource::{FieldType, RequiredIf, ResourceDef};
use crate::zoho::auth::CredentialParams;
use serde_json::{Map, Number, Value};

/// Status filters accepted by list endpoints
pub const FILTER_BY_CHOICES: &[&str] = &["Status.Active", "Status.Inactive", "Status.All"];

/// Declaration of a single parameter
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    pub choices: Vec<String>,
    /// Allowed sub-keys for dict parameters (empty = free-form)
    pub options: Vec<String>,
}

impl ParamSpec {
    pub fn new(name: &str, kind: FieldType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            choices: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn choices<S: AsRef<str>>(mut self, choices: &[S]) -> Self {
        self.choices = choices.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }
}

/// Full argument schema of one module
#[derive(Debug, Clone)]
pub struct Schema {
    module: String,
    specs: Vec<ParamSpec>,
    mutually_exclusive: Vec<Vec<String>>,
    required_if: Vec<RequiredIf>,
}

impl Schema {
    pub fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
            specs: Vec::new(),
            mutually_exclusive: Vec::new(),
            required_if: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn mutually_exclusive(mut self, group: &[&str]) -> Self {
        self.mutually_exclusive
            .push(group.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Add `organization_id`, `access_token` and `api_domain`
    pub fn with_credentials(self) -> Self {
        self.param(ParamSpec::new("organization_id", FieldType::Str))
            .param(ParamSpec::new("access_token", FieldType::Str))
            .param(ParamSpec::new("api_domain", FieldType::Str))
    }

    /// Schema of the management module for a resource
    pub fn for_manage(def: &ResourceDef) -> Self {
        let mut schema = Self::new(&def.manage.module).with_credentials();

        for field in &def.fields {
            schema = schema.param(ParamSpec {
                name: field.name.clone(),
                kind: field.kind,
                required: field.required,
                default: field.default.clone(),
                choices: field.choices.clone(),
                options: field.options.clone(),
            });
        }

        let states: Vec<&str> = def.states.iter().map(State::as_str).collect();
        schema = schema.param(
            ParamSpec::new("state", FieldType::Str)
                .choices(states.as_slice())
                .default_value(Value::String(State::Present.as_str().to_string())),
        );
        schema.required_if = def.required_if.clone();
        schema
    }

    /// Schema of the info module for a resource
    pub fn for_info(def: &ResourceDef) -> Self {
        let mut schema = Self::new(&def.info.module).with_credentials();

        for lookup in &def.info.lookups {
            schema = schema.param(ParamSpec::new(&lookup.param, FieldType::Str));
        }
        if def.supports_filter_by {
            schema = schema.param(ParamSpec::new("filter_by", FieldType::Str).choices(FILTER_BY_CHOICES));
        }

        let group: Vec<&str> = def.info.lookups.iter().map(|l| l.param.as_str()).collect();
        schema.mutually_exclusive(&group)
    }

    fn spec(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Validate raw arguments and produce normalized parameters
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<Params> {
        let mut unsupported: Vec<&str> = raw
            .keys()
            .filter(|k| self.spec(k).is_none())
            .map(String::as_str)
            .collect();
        if !unsupported.is_empty() {
            unsupported.sort_unstable();
            let mut supported: Vec<&str> = self.specs.iter().map(|s| s.name.as_str()).collect();
            supported.sort_unstable();
            return Err(Error::config(format!(
                "Unsupported parameters for ({}) module: {}. Supported parameters include: {}.",
                self.module,
                unsupported.join(", "),
                supported.join(", ")
            )));
        }

        let mut values = Map::new();
        for spec in &self.specs {
            match raw.get(&spec.name) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    values.insert(spec.name.clone(), coerce(spec, value)?);
                }
            }
        }

        for group in &self.mutually_exclusive {
            let set: Vec<&str> = group
                .iter()
                .filter(|name| values.contains_key(name.as_str()))
                .map(String::as_str)
                .collect();
            if set.len() > 1 {
                return Err(Error::config(format!(
                    "parameters are mutually exclusive: {}",
                    group.join("|")
                )));
            }
        }

        let missing: Vec<&str> = self
            .specs
            .iter()
            .filter(|s| s.required && !values.contains_key(&s.name))
            .map(|s| s.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "missing required arguments: {}",
                missing.join(", ")
            )));
        }

        for spec in &self.specs {
            if let Some(default) = &spec.default {
                values
                    .entry(spec.name.clone())
                    .or_insert_with(|| default.clone());
            }
        }

        for spec in self.specs.iter().filter(|s| !s.choices.is_empty()) {
            if let Some(value) = values.get(&spec.name).and_then(Value::as_str) {
                if !spec.choices.iter().any(|c| c == value) {
                    return Err(Error::config(format!(
                        "value of {} must be one of: {}, got: {}",
                        spec.name,
                        spec.choices.join(", "),
                        value
                    )));
                }
            }
        }

        for rule in &self.required_if {
            if values.get(&rule.param) != Some(&rule.value) {
                continue;
            }
            let missing: Vec<&str> = rule
                .requires
                .iter()
                .filter(|r| !values.contains_key(r.as_str()))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                return Err(Error::config(format!(
                    "{} is {} but all of the following are missing: {}",
                    rule.param,
                    display_scalar(&rule.value),
                    missing.join(", ")
                )));
            }
        }

        Ok(Params { values })
    }
}

/// Validated module parameters. Unset parameters without a default are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Map<String, Value>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Target state; management schemas always default it
    pub fn state(&self) -> Result<State> {
        match self.get_str("state") {
            Some(s) => State::parse(s),
            None => Ok(State::Present),
        }
    }

    pub fn credentials(&self) -> CredentialParams {
        CredentialParams {
            organization_id: self.get_str("organization_id").map(str::to_string),
            access_token: self.get_str("access_token").map(str::to_string),
            api_domain: self.get_str("api_domain").map(str::to_string),
        }
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn conversion_error(spec: &ParamSpec, value: &Value) -> Error {
    let found = match value {
        Value::String(_) => "str",
        Value::Number(_) => "number",
        Value::Bool(_) => "bool",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
        Value::Null => "null",
    };
    Error::config(format!(
        "argument '{}' is of type {} and we were unable to convert to {}: {}",
        spec.name,
        found,
        spec.kind.as_str(),
        value
    ))
}

/// Convert a raw value to the declared type, the way Ansible's loose typing does
fn coerce(spec: &ParamSpec, value: &Value) -> Result<Value> {
    let err = || conversion_error(spec, value);

    match spec.kind {
        FieldType::Str => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(err()),
        },
        FieldType::Float => {
            let f = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            f.and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(err)
        }
        FieldType::Int => {
            let i = match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            i.map(Value::from).ok_or_else(err)
        }
        FieldType::Bool => {
            let b = match value {
                Value::Bool(b) => Some(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(1) => Some(true),
                    Some(0) => Some(false),
                    _ => None,
                },
                Value::String(s) => parse_bool(s),
                _ => None,
            };
            b.map(Value::Bool).ok_or_else(err)
        }
        FieldType::Dict => {
            let object = match value {
                Value::Object(map) => map.clone(),
                Value::String(s) => match serde_json::from_str::<Value>(s) {
                    Ok(Value::Object(map)) => map,
                    _ => return Err(err()),
                },
                _ => return Err(err()),
            };
            coerce_dict(spec, object)
        }
    }
}

fn coerce_dict(spec: &ParamSpec, object: Map<String, Value>) -> Result<Value> {
    if spec.options.is_empty() {
        return Ok(Value::Object(object));
    }

    let mut unsupported: Vec<&str> = object
        .keys()
        .filter(|k| !spec.options.contains(k))
        .map(String::as_str)
        .collect();
    if !unsupported.is_empty() {
        unsupported.sort_unstable();
        return Err(Error::config(format!(
            "Unsupported parameters for {}: {}. Supported parameters include: {}.",
            spec.name,
            unsupported.join(", "),
            spec.options.join(", ")
        )));
    }

    // Declared sub-options are all strings; nulls mean "not given"
    let mut out = Map::new();
    for (key, value) in object {
        let sub = ParamSpec::new(&format!("{}.{}", spec.name, key), FieldType::Str);
        match value {
            Value::Null => {}
            other => {
                out.insert(key, coerce(&sub, &other)?);
            }
        }
    }
    Ok(Value::Object(out))
}

/// Ansible truthiness for strings
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "yes" | "on" | "true" | "1" | "y" | "t" => Some(true),
        "no" | "off" | "false" | "0" | "n" | "f" => Some(false),
        _ => None,
    }
}
