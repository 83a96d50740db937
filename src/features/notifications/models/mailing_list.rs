use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored as either "a@x, b@y" or a JSON array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmailField {
    Text(String),
    List(Vec<String>),
}

impl EmailField {
    pub fn addresses(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            EmailField::Text(text) => text.split(',').collect(),
            EmailField::List(list) => list.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMailingList {
    pub name: String,
    pub emails: EmailField,
}

/// Layout of the mailing list file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MailingListFile {
    #[serde(default)]
    pub lists: Vec<StoredMailingList>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MailingList {
    #[schema(example = "MAIL_LIST_DEFAULT")]
    pub name: String,
    pub emails: Vec<String>,
}

impl From<&StoredMailingList> for MailingList {
    fn from(list: &StoredMailingList) -> Self {
        Self {
            name: list.name.clone(),
            emails: list.emails.addresses(),
        }
    }
}
