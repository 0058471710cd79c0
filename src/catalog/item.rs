//! # Marketing Items
//!
//! The stored item model plus the create/patch payloads that mutate it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::{CatalogError, CatalogResult};
use super::status::Status;

/// The two promotable item kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Brochure,
    Service,
}

impl ItemKind {
    pub const ALL: [ItemKind; 2] = [ItemKind::Brochure, ItemKind::Service];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Brochure => "brochure",
            ItemKind::Service => "service",
        }
    }

    /// Human label, also the audit target kind
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Brochure => "Brochure",
            ItemKind::Service => "Service",
        }
    }

    /// Type segment of generated codes
    pub fn default_code_tag(&self) -> &'static str {
        match self {
            ItemKind::Brochure => "BUN",
            ItemKind::Service => "SRV",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brochure" => Ok(ItemKind::Brochure),
            "service" => Ok(ItemKind::Service),
            other => Err(format!("unknown item kind '{}'", other)),
        }
    }
}

/// A stored brochure or service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingItem {
    pub id: u64,

    pub kind: ItemKind,

    /// Scoping key; None = global
    pub branch_id: Option<u64>,

    pub title: String,

    pub description: Option<String>,

    pub category: String,

    /// Unique per kind
    pub code: String,

    /// Unique per kind
    pub slug: String,

    pub price: Option<f64>,

    pub image_url: Option<String>,

    pub start_date: Option<NaiveDate>,

    pub expiry_date: Option<NaiveDate>,

    /// Ignore the date window entirely
    pub infinite: bool,

    /// Soft-delete flag; false = archived
    pub is_active: bool,

    /// Normalized, first-seen order
    pub tags: Vec<String>,

    pub contact_phone: Option<String>,

    /// Used verbatim as the CTA link when set
    pub cta_override: Option<String>,

    /// Derived from identity fields, kept for convenience
    pub cta_link: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// An item as returned to callers: stored fields plus derived status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: MarketingItem,

    pub status: Status,
}

/// Create payload
///
/// Dates arrive as `YYYY-MM-DD` strings and are validated by the lifecycle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateItem {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Option<f64>,
    pub code: Option<String>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<String>,
    #[serde(alias = "end_date")]
    pub expiry_date: Option<String>,
    pub infinite: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Vec<String>,
    pub branch_id: Option<u64>,
    #[serde(alias = "cta_phone")]
    pub contact_phone: Option<String>,
    pub cta_override: Option<String>,
    /// Advisory only; status is always derived
    pub status: Option<String>,
}

impl CreateItem {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Default::default()
        }
    }
}

/// Partial update payload
///
/// Absent fields keep their stored value. For clearable fields the outer
/// `Option` is "was it sent" and the inner one is the new value, so an
/// explicit JSON `null` clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub price: Option<Option<f64>>,
    pub code: Option<String>,
    pub slug: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub start_date: Option<Option<String>>,
    #[serde(alias = "end_date", deserialize_with = "nullable")]
    pub expiry_date: Option<Option<String>>,
    pub infinite: Option<bool>,
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub branch_id: Option<Option<u64>>,
    #[serde(alias = "cta_phone", deserialize_with = "nullable")]
    pub contact_phone: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub cta_override: Option<Option<String>>,
    /// Advisory only; status is always derived
    pub status: Option<String>,
}

impl ItemPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse an optional `YYYY-MM-DD` date; blank counts as absent
pub fn parse_date(label: &str, raw: Option<&str>) -> CatalogResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Some).map_err(|_| {
            CatalogError::validation(format!("Invalid {} format. Use YYYY-MM-DD", label))
        }),
    }
}

/// Trim an optional string; blank counts as absent
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ItemKind::Brochure.as_str(), "brochure");
        assert_eq!(ItemKind::Service.label(), "Service");
        assert_eq!("service".parse::<ItemKind>().unwrap(), ItemKind::Service);
        assert!("coupon".parse::<ItemKind>().is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("start date", None).unwrap(), None);
        assert_eq!(parse_date("start date", Some("  ")).unwrap(), None);
        assert_eq!(
            parse_date("start date", Some("2025-05-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 1)
        );

        let err = parse_date("end date", Some("01/05/2025")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid end date format. Use YYYY-MM-DD");
    }

    #[test]
    fn test_create_payload_accepts_field_aliases() {
        let json = r#"{"title":"Offer","category":"skin","end_date":"2025-06-01","cta_phone":"96512345678"}"#;
        let payload: CreateItem = serde_json::from_str(json).unwrap();
        assert_eq!(payload.expiry_date.as_deref(), Some("2025-06-01"));
        assert_eq!(payload.contact_phone.as_deref(), Some("96512345678"));
        assert!(payload.tags.is_empty());
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let patch: ItemPatch = serde_json::from_str(r#"{"price":null,"title":"New"}"#).unwrap();
        assert_eq!(patch.price, Some(None));
        assert_eq!(patch.description, None);
        assert_eq!(patch.title.as_deref(), Some("New"));

        let patch: ItemPatch = serde_json::from_str(r#"{"price":12.5}"#).unwrap();
        assert_eq!(patch.price, Some(Some(12.5)));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
