use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Ordered list of short strings stored as a JSON array column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Labels(pub Vec<String>);

impl Labels {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Exact match; "grief" does not match "Grief".
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }
}

impl From<Vec<String>> for Labels {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

impl From<Labels> for Vec<String> {
    fn from(labels: Labels) -> Self {
        labels.0
    }
}
