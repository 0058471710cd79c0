//! # Status Resolution
//!
//! The presentational status of an item is derived, never stored. Rules,
//! first match wins:
//!
//! 1. `is_active == false` → `archived`
//! 2. `infinite == true` → `active`
//! 3. `start_date > today` → `scheduled`
//! 4. `expiry_date < today` → `expired`
//! 5. otherwise → `active`
//!
//! Deactivation always dominates the date window. `expired` stays distinct
//! from `archived` so "the window closed" and "an admin took it down" can be
//! told apart.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::item::MarketingItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Scheduled,
    Active,
    Expired,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Scheduled => "scheduled",
            Status::Active => "active",
            Status::Expired => "expired",
            Status::Archived => "archived",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Status::Scheduled),
            "active" => Ok(Status::Active),
            "expired" => Ok(Status::Expired),
            "archived" => Ok(Status::Archived),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Pure status derivation
pub struct StatusResolver;

impl StatusResolver {
    pub fn resolve(item: &MarketingItem, today: NaiveDate) -> Status {
        Self::resolve_fields(
            item.is_active,
            item.infinite,
            item.start_date,
            item.expiry_date,
            today,
        )
    }

    pub fn resolve_fields(
        is_active: bool,
        infinite: bool,
        start_date: Option<NaiveDate>,
        expiry_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Status {
        if !is_active {
            return Status::Archived;
        }
        if infinite {
            return Status::Active;
        }
        if matches!(start_date, Some(start) if start > today) {
            return Status::Scheduled;
        }
        if matches!(expiry_date, Some(expiry) if expiry < today) {
            return Status::Expired;
        }
        Status::Active
    }
}
