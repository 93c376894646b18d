//! Property-based tests using proptest
//!
//! These tests verify the comparison and planning rules of the reconciler
//! using randomized desired and remote objects.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use zohobooks::params::Schema;
use zohobooks::reconcile::{self, values_match, Step};
use zohobooks::resource::{get_resource, FieldType, ResourceFilter};

/// Generate arbitrary remote item data
fn arb_item() -> impl Strategy<Value = Value> {
    (
        "[A-Za-z][A-Za-z0-9 ]{0,30}",              // name
        0u32..100_000,                              // rate in cents
        "[a-z ]{0,40}",                             // description
        "[A-Z]{1,3}-[0-9]{1,4}",                    // sku
        prop_oneof!["goods", "service", "digital_service"],
        prop_oneof!["active", "inactive"],
    )
        .prop_map(|(name, cents, description, sku, product_type, status)| {
            json!({
                "item_id": "460000000027009",
                "name": name,
                "rate": f64::from(cents) / 100.0,
                "description": description,
                "sku": sku,
                "product_type": product_type,
                "status": status
            })
        })
}

/// Module arguments that describe the remote object exactly
fn args_from_remote(remote: &Value) -> Map<String, Value> {
    let mut args = Map::new();
    for key in ["name", "rate", "description", "sku", "product_type"] {
        args.insert(key.to_string(), remote[key].clone());
    }
    args.insert("state".into(), remote["status"].clone());
    args
}

proptest! {
    /// Every value matches itself under its own type rules
    #[test]
    fn string_match_is_reflexive(s in ".{0,50}") {
        let v = Value::String(s);
        prop_assert!(values_match(FieldType::Str, &v, Some(&v)));
    }

    /// Numbers compare numerically, whatever their JSON representation
    #[test]
    fn numbers_compare_numerically(n in -1_000_000i64..1_000_000) {
        let int = json!(n);
        let float = json!(n as f64);
        let text = json!(n.to_string());
        prop_assert!(values_match(FieldType::Float, &float, Some(&int)));
        prop_assert!(values_match(FieldType::Float, &int, Some(&text)));
        prop_assert!(values_match(FieldType::Int, &int, Some(&float)));
    }

    /// Distinct numbers never match
    #[test]
    fn distinct_numbers_differ(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        prop_assume!(a != b);
        prop_assert!(!values_match(FieldType::Float, &json!(a), Some(&json!(b))));
    }

    /// A missing remote string reads as empty
    #[test]
    fn missing_remote_string_is_empty(s in ".{0,20}") {
        let matches = values_match(FieldType::Str, &json!(s.clone()), None);
        prop_assert_eq!(matches, s.is_empty());
    }

    /// Nested objects compare only the keys the caller supplied
    #[test]
    fn dict_compares_supplied_keys_only(
        city in "[A-Za-z ]{1,20}",
        zip in "[0-9]{5}",
        street in "[A-Za-z0-9 ]{1,30}",
    ) {
        let remote = json!({"city": city, "zip": zip, "address": street});
        let wanted = json!({"city": remote["city"].clone()});
        prop_assert!(values_match(FieldType::Dict, &wanted, Some(&remote)));

        let moved = json!({"city": format!("{}x", city)});
        prop_assert!(!values_match(FieldType::Dict, &moved, Some(&remote)));
    }

    /// Parameters derived from the remote object plan nothing
    #[test]
    fn identical_state_is_noop(remote in arb_item()) {
        let def = get_resource("item").unwrap();
        let params = Schema::for_manage(def).validate(&args_from_remote(&remote)).unwrap();

        let plan = reconcile::plan(def, &params, Some(&remote)).unwrap();
        prop_assert!(plan.is_noop(), "unexpected steps: {:?}", plan.steps);
    }

    /// A desired object with no remote match always creates exactly once
    #[test]
    fn missing_remote_creates_once(
        remote in arb_item(),
        state in prop_oneof!["present", "active"],
    ) {
        let def = get_resource("item").unwrap();
        let mut args = args_from_remote(&remote);
        args.insert("state".into(), json!(state));
        let params = Schema::for_manage(def).validate(&args).unwrap();

        let plan = reconcile::plan(def, &params, None).unwrap();
        let creates = plan.steps.iter().filter(|s| **s == Step::Create).count();
        prop_assert_eq!(creates, 1);
    }

    /// Exact-match filtering never returns non-matching objects
    #[test]
    fn filter_returns_only_exact_matches(
        items in prop::collection::vec(arb_item(), 0..50),
        needle in "[A-Za-z][A-Za-z0-9 ]{0,30}",
    ) {
        let filter = ResourceFilter::new("name", &needle);
        let matched: Vec<&Value> = items.iter().filter(|i| filter.matches(i)).collect();
        for item in &matched {
            prop_assert_eq!(item["name"].as_str(), Some(needle.as_str()));
        }
        let expected = items.iter().filter(|i| i["name"] == json!(needle)).count();
        prop_assert_eq!(matched.len(), expected);
    }
}
