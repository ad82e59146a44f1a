//! Users and subscription tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier, derived from a user's subscription expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Subscribed,
    Unsubscribed,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Subscribed => write!(f, "subscribed"),
            Self::Unsubscribed => write!(f, "unsubscribed"),
        }
    }
}

/// A user of the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_end: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            subscription_end: None,
        }
    }

    pub fn with_subscription_end(mut self, end: DateTime<Utc>) -> Self {
        self.subscription_end = Some(end);
        self
    }

    /// Active iff an expiry is set and lies strictly after `now`.
    pub fn is_subscription_active_at(&self, now: DateTime<Utc>) -> bool {
        self.subscription_end.is_some_and(|end| end > now)
    }

    /// Evaluated against the wall clock on every call; never cached.
    pub fn is_subscription_active(&self) -> bool {
        self.is_subscription_active_at(Utc::now())
    }

    pub fn tier(&self) -> Tier {
        if self.is_subscription_active() {
            Tier::Subscribed
        } else {
            Tier::Unsubscribed
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User(id={}, name={:?})", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn no_expiry_means_unsubscribed() {
        let user = User::new(1, "alice");
        assert!(!user.is_subscription_active());
        assert_eq!(user.tier(), Tier::Unsubscribed);
    }

    #[test]
    fn future_expiry_is_active() {
        let user = User::new(1, "alice").with_subscription_end(Utc::now() + Duration::days(30));
        assert!(user.is_subscription_active());
        assert_eq!(user.tier(), Tier::Subscribed);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let user = User::new(1, "alice").with_subscription_end(now);
        assert!(!user.is_subscription_active_at(now));
        assert!(user.is_subscription_active_at(now - Duration::seconds(1)));
    }

    #[test]
    fn past_expiry_is_inactive() {
        let user = User::new(1, "alice").with_subscription_end(Utc::now() - Duration::days(1));
        assert_eq!(user.tier(), Tier::Unsubscribed);
    }
}
