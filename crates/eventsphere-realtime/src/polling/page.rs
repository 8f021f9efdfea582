//! Page visibility and focus signals from the host UI.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A visibility or focus change reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageEvent {
    /// The page went to the background.
    Hidden,
    /// The page became visible again.
    Visible,
    /// The window gained focus.
    Focus,
}

impl PageEvent {
    /// Whether the user re-engaged with the page.
    pub fn is_engagement(self) -> bool {
        matches!(self, Self::Visible | Self::Focus)
    }
}

impl FromStr for PageEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hidden" | "hide" | "blur" => Ok(Self::Hidden),
            "visible" | "show" => Ok(Self::Visible),
            "focus" => Ok(Self::Focus),
            other => Err(format!("unknown page event '{other}'")),
        }
    }
}
