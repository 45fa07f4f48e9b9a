use serde::{Deserialize, Serialize};

use super::{Architect, Contractor, Project};

/// The root persisted object: the full entity arrays plus the export
/// timestamp. The whole bundle is the unit of persistence — there is no
/// per-entity remote granularity. All fields default so that a reader
/// tolerates whatever shape the last writer produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateBundle {
    pub projects: Vec<Project>,
    pub architects: Vec<Architect>,
    pub contractors: Vec<Contractor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
}

impl StateBundle {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.architects.is_empty() && self.contractors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_empty_object() {
        let bundle: StateBundle = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(bundle.is_empty());
        assert!(bundle.export_date.is_none());
    }

    #[test]
    fn export_date_is_omitted_when_unset() {
        let json = serde_json::to_value(StateBundle::default()).unwrap();
        assert!(json.get("exportDate").is_none());
    }
}
