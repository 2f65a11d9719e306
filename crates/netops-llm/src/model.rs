//! Supported model identifiers

use netops_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Gpt4oMini, ModelId::Gpt35Turbo, ModelId::Gpt4o];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt4oMini => "gpt-4o-mini",
            ModelId::Gpt35Turbo => "gpt-3.5-turbo",
            ModelId::Gpt4o => "gpt-4o",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "unsupported model '{}', expected one of: {}",
                    s,
                    ModelId::ALL.map(|m| m.as_str()).join(", ")
                ))
            })
    }
}
