//! Normalizes legacy documents before typed deserialization.
//!
//! Early documents stored a single `investor`/`supervisor` object per
//! project; the current shape is the plural array form. Migration runs on
//! every load path (remote fetch, cache fallback, import, backup restore)
//! and is idempotent: after one pass the singular keys no longer exist.

use serde_json::Value;

/// Migrates the `projects` list of a raw bundle in place. Other top-level
/// keys are left untouched.
pub fn migrate_bundle(bundle: &mut Value) {
    if let Some(projects) = bundle.get_mut("projects").and_then(Value::as_array_mut) {
        for project in projects {
            migrate_project(project);
        }
    }
}

fn migrate_project(project: &mut Value) {
    migrate_contact_field(project, "investor", "investors");
    migrate_contact_field(project, "supervisor", "supervisors");
}

fn migrate_contact_field(project: &mut Value, singular: &str, plural: &str) {
    let Some(fields) = project.as_object_mut() else {
        return;
    };

    let is_legacy = matches!(
        fields.get(singular),
        Some(value) if !value.is_array() && !value.is_null()
    );

    if is_legacy {
        let legacy = fields.remove(singular).unwrap_or(Value::Null);
        let migrated = if has_contact_details(&legacy) {
            vec![legacy]
        } else {
            Vec::new()
        };
        fields.insert(plural.to_string(), Value::Array(migrated));
    } else if !fields.get(plural).is_some_and(Value::is_array) {
        fields.insert(plural.to_string(), Value::Array(Vec::new()));
    }
}

fn has_contact_details(contact: &Value) -> bool {
    ["name", "company", "email", "phone"].iter().any(|field| {
        contact
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle_with(projects: Value) -> Value {
        json!({"projects": projects, "architects": [], "contractors": []})
    }

    #[test]
    fn wraps_populated_singular_investor() {
        let mut bundle = bundle_with(json!([
            {"id": "1", "name": "Кула А", "investor": {"name": "Инвест ДОО", "company": "", "email": "", "phone": ""}}
        ]));
        migrate_bundle(&mut bundle);

        let project = &bundle["projects"][0];
        assert!(project.get("investor").is_none());
        assert_eq!(project["investors"], json!([{"name": "Инвест ДОО", "company": "", "email": "", "phone": ""}]));
    }

    #[test]
    fn drops_empty_singular_investor() {
        let mut bundle = bundle_with(json!([
            {"id": "1", "investor": {"name": "", "company": "", "email": "", "phone": ""}}
        ]));
        migrate_bundle(&mut bundle);

        let project = &bundle["projects"][0];
        assert!(project.get("investor").is_none());
        assert_eq!(project["investors"], json!([]));
    }

    #[test]
    fn supervisor_follows_same_rules() {
        let mut bundle = bundle_with(json!([
            {"id": "1", "supervisor": {"name": "Надзор Инж.", "phone": "070123456"}}
        ]));
        migrate_bundle(&mut bundle);

        let project = &bundle["projects"][0];
        assert!(project.get("supervisor").is_none());
        assert_eq!(project["supervisors"][0]["name"], "Надзор Инж.");
    }

    #[test]
    fn defaults_missing_plural_fields() {
        let mut bundle = bundle_with(json!([{"id": "1", "name": "no contacts"}]));
        migrate_bundle(&mut bundle);

        let project = &bundle["projects"][0];
        assert_eq!(project["investors"], json!([]));
        assert_eq!(project["supervisors"], json!([]));
    }

    #[test]
    fn leaves_existing_arrays_alone() {
        let mut bundle = bundle_with(json!([
            {"id": "1", "investors": [{"name": "Постоечки", "company": "", "email": "", "phone": ""}]}
        ]));
        migrate_bundle(&mut bundle);

        assert_eq!(bundle["projects"][0]["investors"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn is_idempotent() {
        let mut bundle = bundle_with(json!([
            {"id": "1", "investor": {"name": "Инвест ДОО"}, "supervisor": {}},
            {"id": "2", "supervisors": [{"name": "Веќе мигриран"}]}
        ]));
        migrate_bundle(&mut bundle);
        let once = bundle.clone();
        migrate_bundle(&mut bundle);

        assert_eq!(bundle, once);
    }

    #[test]
    fn ignores_bundle_without_projects() {
        let mut bundle = json!({"architects": []});
        migrate_bundle(&mut bundle);
        assert_eq!(bundle, json!({"architects": []}));
    }
}
