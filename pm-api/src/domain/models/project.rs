use serde::{Deserialize, Serialize};

use super::Contact;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Started,
    Finished,
    OnHold,
}

/// A construction project. Identified by a client-style string key
/// (millisecond timestamp); `architects`/`contractors` hold keys of the
/// respective entities. Referential integrity is not enforced — a dangling
/// reference is skipped by consumers, never repaired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_link: Option<String>,
    pub phases: Vec<Phase>,
    pub files: Vec<FileLink>,
    pub investors: Vec<Contact>,
    pub supervisors: Vec<Contact>,
    pub architects: Vec<String>,
    pub contractors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A project phase. Dates are the `YYYY-MM-DD` strings the date inputs
/// produce; the optional contractor reference is by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Phase {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contractor: Option<String>,
}

/// External file or document link attached to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileLink {
    pub name: String,
    pub url: String,
}
