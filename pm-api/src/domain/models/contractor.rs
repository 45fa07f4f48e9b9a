use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contractor {
    pub id: String,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    /// Trade tag, e.g. "electrical" or "plumbing".
    pub specialty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
