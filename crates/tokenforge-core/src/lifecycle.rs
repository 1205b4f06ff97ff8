use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Load state of a [`crate::TokenManager`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoadState::Unloaded => "unloaded",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
        };
        f.write_str(s)
    }
}

pub fn validate_transition(from: LoadState, to: LoadState) -> Result<(), CoreError> {
    let valid = matches!(
        (from, to),
        (LoadState::Unloaded, LoadState::Loading)
            | (LoadState::Loading, LoadState::Loaded | LoadState::Unloaded)
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
