use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a basic block.
///
/// Labels are only compared for equality; the text carries no meaning.
/// Jumps use `Option<CfgLabel>`, where `None` means "fall off the end of the
/// enclosing region".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CfgLabel(String);

impl CfgLabel {
    pub fn new(name: impl Into<String>) -> Self {
        CfgLabel(name.into())
    }

    /// A label no other call in this process will return.
    pub fn fresh() -> Self {
        CfgLabel(format!("l_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CfgLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CfgLabel {
    fn from(name: &str) -> Self {
        CfgLabel::new(name)
    }
}
