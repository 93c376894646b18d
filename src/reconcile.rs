//! Reconciler
//!
//! Compares the desired parameters of a management module against the
//! remote object (if any) and decides the minimal sequence of mutating
//! calls. Planning is pure: no I/O happens here, which is what makes
//! check mode trivial.

use crate::error::{Error, Result};
use crate::params::Params;
use crate::resource::{Encoding, FieldDef, FieldType, ResourceDef};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Remote field holding `active` / `inactive`
pub const STATUS_FIELD: &str = "status";

/// Tolerance for comparing rates and percentages
const FLOAT_EPSILON: f64 = 1e-9;

/// Target state selected by the `state` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Present,
    Absent,
    Active,
    Inactive,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(Error::config(format!("unknown state '{}'", other))),
        }
    }
}

/// One field whose desired value differs from the remote value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub before: Value,
    pub after: Value,
}

/// A single mutating call
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Create,
    Update(Vec<FieldChange>),
    Delete,
    Activate,
    Deactivate,
}

/// Ordered list of mutating calls; empty means nothing to do
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Field changes of the update step, if any
    pub fn changes(&self) -> &[FieldChange] {
        self.steps
            .iter()
            .find_map(|s| match s {
                Step::Update(changes) => Some(changes.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

/// Decide what has to happen to move `remote` to the desired state
pub fn plan(def: &ResourceDef, desired: &Params, remote: Option<&Value>) -> Result<Plan> {
    let state = desired.state()?;
    if !def.supports_state(state) {
        return Err(Error::config(format!(
            "state '{}' is not supported for {}",
            state.as_str(),
            def.noun()
        )));
    }

    let mut steps = Vec::new();
    match (state, remote) {
        (State::Absent, None) => {}
        (State::Absent, Some(_)) => steps.push(Step::Delete),
        (State::Inactive, None) => {
            return Err(Error::config(format!(
                "Cannot mark non-existent {} as inactive",
                def.noun()
            )));
        }
        (_, None) => steps.push(Step::Create),
        (_, Some(remote)) => {
            let changes = diff(def, desired, remote);
            if !changes.is_empty() {
                steps.push(Step::Update(changes));
            }

            let status = remote.get(STATUS_FIELD).and_then(Value::as_str);
            match state {
                State::Active if status != Some("active") => steps.push(Step::Activate),
                State::Inactive if status != Some("inactive") => steps.push(Step::Deactivate),
                _ => {}
            }
        }
    }

    Ok(Plan { steps })
}

/// Tracked fields the caller supplied whose value differs remotely
pub fn diff(def: &ResourceDef, desired: &Params, remote: &Value) -> Vec<FieldChange> {
    def.fields
        .iter()
        .filter(|f| f.compare)
        .filter_map(|field| {
            let wanted = desired.get(&field.name)?;
            let current = remote.get(&field.name);
            if values_match(field.kind, wanted, current) {
                return None;
            }
            Some(FieldChange {
                field: field.name.clone(),
                before: current.cloned().unwrap_or(Value::Null),
                after: wanted.clone(),
            })
        })
        .collect()
}

/// Compare a desired value with the remote one under the field's type rules
pub fn values_match(kind: FieldType, desired: &Value, remote: Option<&Value>) -> bool {
    let remote = remote.filter(|v| !v.is_null());

    match kind {
        FieldType::Str => as_text(remote) == as_text(Some(desired)),
        FieldType::Float | FieldType::Int => match (as_number(Some(desired)), as_number(remote)) {
            (Some(a), Some(b)) => (a - b).abs() < FLOAT_EPSILON,
            _ => false,
        },
        FieldType::Bool => match (desired.as_bool(), remote) {
            (Some(a), Some(Value::Bool(b))) => a == *b,
            _ => false,
        },
        FieldType::Dict => {
            // Only the keys the caller cares about are compared
            let Some(wanted) = desired.as_object() else {
                return false;
            };
            let current = remote.and_then(Value::as_object);
            wanted.iter().all(|(key, value)| {
                as_text(current.and_then(|c| c.get(key))) == as_text(Some(value))
            })
        }
    }
}

/// Text form of a scalar; missing and null read as empty
fn as_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Request body for creating the resource
pub fn create_body(def: &ResourceDef, desired: &Params) -> Value {
    let mut body = def.create_fixed.clone();
    for field in def.fields.iter().filter(|f| f.create) {
        let Some(value) = desired.get(&field.name) else {
            continue;
        };
        if is_blank(value) {
            continue;
        }
        body.insert(field.name.clone(), encode(field, value));
    }
    Value::Object(body)
}

/// Request body for updating the resource; blank strings clear remote values
pub fn update_body(def: &ResourceDef, desired: &Params) -> Value {
    let mut body = Map::new();
    for field in def.fields.iter().filter(|f| f.update) {
        if let Some(value) = desired.get(&field.name) {
            body.insert(field.name.clone(), encode(field, value));
        }
    }
    Value::Object(body)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn encode(field: &FieldDef, value: &Value) -> Value {
    match (field.encode, value) {
        (Encoding::LabelValue, Value::Object(map)) => Value::Array(
            map.iter()
                .map(|(label, value)| json!({"label": label, "value": value}))
                .collect(),
        ),
        _ => value.clone(),
    }
}
