//! External business context consumed by conditional constraints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of business signals supplied by the caller.
///
/// The engine never owns or mutates this; callers pass it explicitly to
/// every entry point that evaluates external conditions. The [`Default`]
/// value (zeros, empty strings, empty custom map) is the neutral context
/// under which only trivially-true conditions hold.
///
/// # Example
///
/// ```
/// use pathrule_core::ExternalContext;
///
/// let ctx = ExternalContext::default()
///     .with_inventory(25)
///     .with_user_level(3)
///     .with_custom_flag("beta", true);
/// assert_eq!(ctx.inventory, 25);
/// assert!(ctx.custom.contains_key("beta"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalContext {
    /// Current stock level.
    #[serde(default)]
    pub inventory: i64,
    /// Tier of the current user.
    #[serde(default)]
    pub user_level: i64,
    /// Calendar date, e.g. `"2026-08-07"`.
    #[serde(default)]
    pub date: String,
    /// Time of day, e.g. `"14:30"`.
    #[serde(default)]
    pub time: String,
    /// Free-form flags keyed by name.
    #[serde(default)]
    pub custom: BTreeMap<String, Value>,
}

impl ExternalContext {
    pub fn with_inventory(mut self, inventory: i64) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn with_user_level(mut self, user_level: i64) -> Self {
        self.user_level = user_level;
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn with_custom_flag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}
