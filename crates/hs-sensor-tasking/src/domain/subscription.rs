//! Per-sensor broadcast subscription set
//!
//! The apps allowed to receive unsolicited data from one sensor. Order of
//! first grant is kept; entries are distinct.

use serde::{Deserialize, Serialize};

/// Ordered set of distinct app ids authorized for a sensor's broadcasts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionSet(Vec<String>);

impl SubscriptionSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `app_id` if absent. Returns whether the set changed.
    pub fn grant(&mut self, app_id: &str) -> bool {
        if self.contains(app_id) {
            return false;
        }
        self.0.push(app_id.to_string());
        true
    }

    /// Remove `app_id` if present. Returns whether the set changed.
    pub fn revoke(&mut self, app_id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|a| a != app_id);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, app_id: &str) -> bool {
        self.0.iter().any(|a| a == app_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// App ids in grant order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SubscriptionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for app_id in iter {
            let app_id = app_id.into();
            set.grant(&app_id);
        }
        set
    }
}
