//! Management modules (`zohobooks_account`, `zohobooks_item`, `zohobooks_vendor`)

use super::{ModuleOutput, RunOptions};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::params::{Params, Schema};
use crate::reconcile::{self, Plan, Step, STATUS_FIELD};
use crate::resource::{ResourceClient, ResourceDef, StatusChange};
use crate::zoho::auth;
use crate::zoho::client::ZohoClient;
use serde_json::{json, Map, Value};

/// Validate arguments, connect, and reconcile one object
pub async fn run(
    def: &ResourceDef,
    args: &Map<String, Value>,
    config: &Config,
    options: RunOptions,
) -> Result<ModuleOutput> {
    let params = Schema::for_manage(def).validate(args)?;
    let credentials = auth::resolve(&params.credentials(), config)?;
    let client = ZohoClient::new(credentials)?;
    execute(ResourceClient::new(&client, def), &params, options).await
}

/// Reconcile one object against validated parameters
pub async fn execute(
    resources: ResourceClient<'_>,
    params: &Params,
    options: RunOptions,
) -> Result<ModuleOutput> {
    let def = resources.def();
    let name = params
        .get_str(&def.name_field)
        .ok_or_else(|| Error::config(format!("missing required arguments: {}", def.name_field)))?;

    let remote = match resources.find_by_name(name).await? {
        Some(summary) => Some(detail_or_summary(resources, summary).await?),
        None => None,
    };
    let plan = reconcile::plan(def, params, remote.as_ref())?;
    tracing::debug!("Plan for {} '{}': {:?}", def.noun(), name, plan.steps);

    if plan.is_noop() {
        let msg = match remote {
            Some(_) => format!("{} already exists with correct parameters", def.display_name),
            None => format!("{} does not exist", def.display_name),
        };
        return Ok(with_payload(ModuleOutput::new(false, msg), def, remote));
    }

    let diff = options
        .diff_mode
        .then(|| plan_diff(def, params, &plan, remote.as_ref()));

    if options.check_mode {
        let fragments: Vec<&str> = plan.steps.iter().map(check_fragment).collect();
        let msg = format!("{} {}", def.display_name, fragments.join(" and "));
        let mut output = with_payload(ModuleOutput::new(true, msg), def, remote);
        output.diff = diff;
        return Ok(output);
    }

    let mut id = remote.as_ref().map(|r| resources.id_of(r)).transpose()?;
    let mut current = remote;
    let mut fragments = Vec::new();

    for step in &plan.steps {
        match step {
            Step::Create => {
                let created = resources
                    .create(&reconcile::create_body(def, params))
                    .await?;
                id = Some(resources.id_of(&created)?);
                current = Some(created);
            }
            Step::Update(_) => {
                let target = require_id(def, &id)?;
                let updated = resources
                    .update(target, &reconcile::update_body(def, params))
                    .await?;
                current = Some(updated);
            }
            Step::Delete => {
                let target = require_id(def, &id)?;
                resources.delete(target).await?;
                current = None;
            }
            Step::Activate | Step::Deactivate => {
                let status = if *step == Step::Activate {
                    StatusChange::Active
                } else {
                    StatusChange::Inactive
                };
                let target = require_id(def, &id)?;
                let returned = match status {
                    StatusChange::Active => resources.mark_active(target).await?,
                    StatusChange::Inactive => resources.mark_inactive(target).await?,
                };
                current = returned.or_else(|| {
                    current.take().map(|mut object| {
                        if let Some(fields) = object.as_object_mut() {
                            fields.insert(STATUS_FIELD.to_string(), json!(status.as_str()));
                        }
                        object
                    })
                });
            }
        }
        fragments.push(done_fragment(step));
    }

    let msg = format!("{} {}", def.display_name, fragments.join(" and "));
    let mut output = with_payload(ModuleOutput::new(true, msg), def, current);
    output.diff = diff;
    Ok(output)
}

/// List endpoints return summaries; compare against the full record
async fn detail_or_summary(resources: ResourceClient<'_>, summary: Value) -> Result<Value> {
    let id = resources.id_of(&summary)?;
    match resources.get(&id).await? {
        Some(detail) => Ok(detail),
        None => {
            tracing::debug!("No detail for {} {}, using list summary", resources.def().noun(), id);
            Ok(summary)
        }
    }
}

fn require_id<'a>(def: &ResourceDef, id: &'a Option<String>) -> Result<&'a str> {
    id.as_deref().ok_or_else(|| {
        Error::remote(
            None,
            format!("{} has no {}", def.display_name, def.id_field),
        )
    })
}

fn with_payload(output: ModuleOutput, def: &ResourceDef, object: Option<Value>) -> ModuleOutput {
    match object {
        Some(object) => output.with(&def.manage.payload_key, object),
        None => output,
    }
}

fn done_fragment(step: &Step) -> &'static str {
    match step {
        Step::Create => "created successfully",
        Step::Update(_) => "updated successfully",
        Step::Delete => "deleted successfully",
        Step::Activate => "marked as active",
        Step::Deactivate => "marked as inactive",
    }
}

fn check_fragment(step: &Step) -> &'static str {
    match step {
        Step::Create => "would be created",
        Step::Update(_) => "would be updated",
        Step::Delete => "would be deleted",
        Step::Activate => "would be marked as active",
        Step::Deactivate => "would be marked as inactive",
    }
}

/// Before/after view of what the plan changes
fn plan_diff(def: &ResourceDef, params: &Params, plan: &Plan, remote: Option<&Value>) -> Value {
    let mut before = Map::new();
    let mut after = Map::new();

    for step in &plan.steps {
        match step {
            Step::Create => {
                if let Value::Object(body) = reconcile::create_body(def, params) {
                    after.extend(body);
                }
            }
            Step::Update(changes) => {
                for change in changes {
                    before.insert(change.field.clone(), change.before.clone());
                    after.insert(change.field.clone(), change.after.clone());
                }
            }
            Step::Delete => {
                if let Some(Value::Object(object)) = remote {
                    before.extend(object.clone());
                }
            }
            Step::Activate | Step::Deactivate => {
                let status = if *step == Step::Activate { "active" } else { "inactive" };
                if let Some(current) = remote {
                    before.insert(
                        STATUS_FIELD.to_string(),
                        current.get(STATUS_FIELD).cloned().unwrap_or(Value::Null),
                    );
                }
                after.insert(STATUS_FIELD.to_string(), json!(status));
            }
        }
    }

    json!({ "before": before, "after": after })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::get_resource;

    fn item_params(args: Value) -> Params {
        let def = get_resource("item").unwrap();
        Schema::for_manage(def)
            .validate(args.as_object().unwrap())
            .unwrap()
    }

    #[test]
    fn test_diff_for_update_lists_changed_fields() {
        let def = get_resource("item").unwrap();
        let params = item_params(json!({"name": "Widget", "rate": 15.0, "unit": "pcs"}));
        let remote = json!({"item_id": "1", "name": "Widget", "rate": 10.0, "unit": "pcs", "status": "active"});
        let plan = reconcile::plan(def, &params, Some(&remote)).unwrap();

        let diff = plan_diff(def, &params, &plan, Some(&remote));
        assert_eq!(diff["before"], json!({"rate": 10.0}));
        assert_eq!(diff["after"], json!({"rate": 15.0}));
    }

    #[test]
    fn test_diff_for_create() {
        let def = get_resource("item").unwrap();
        let params = item_params(json!({"name": "Widget", "rate": 1, "state": "active"}));
        let plan = reconcile::plan(def, &params, None).unwrap();

        let diff = plan_diff(def, &params, &plan, None);
        assert_eq!(diff["before"], json!({}));
        assert_eq!(diff["after"]["name"], json!("Widget"));
        assert!(diff["after"].get("status").is_none());
    }

    #[test]
    fn test_diff_for_status_change() {
        let def = get_resource("item").unwrap();
        let params = item_params(json!({"name": "Widget", "state": "inactive"}));
        let remote = json!({"item_id": "1", "name": "Widget", "status": "active"});
        let plan = reconcile::plan(def, &params, Some(&remote)).unwrap();

        let diff = plan_diff(def, &params, &plan, Some(&remote));
        assert_eq!(diff["before"], json!({"status": "active"}));
        assert_eq!(diff["after"], json!({"status": "inactive"}));
    }

    #[test]
    fn test_fragments() {
        assert_eq!(done_fragment(&Step::Create), "created successfully");
        assert_eq!(check_fragment(&Step::Deactivate), "would be marked as inactive");
    }
}
