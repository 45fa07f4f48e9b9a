use serde::{Deserialize, Serialize};

/// Free-form contact record attached to a project as investor or
/// supervisor. All fields are optional text; legacy documents routinely
/// leave any of them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    /// True if any contact field carries a value.
    pub fn has_details(&self) -> bool {
        !(self.name.is_empty()
            && self.company.is_empty()
            && self.email.is_empty()
            && self.phone.is_empty())
    }
}
