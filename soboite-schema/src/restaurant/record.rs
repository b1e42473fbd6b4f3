use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

use super::lax;

/// Row identifier as stored in the `restaurant_id` column.
///
/// Remote tables use either text or integer keys, so both are accepted and carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RestaurantId(String);

impl RestaurantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RestaurantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for RestaurantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            _ => Err(serde::de::Error::custom(
                "expected a string or a number for restaurant_id",
            )),
        }
    }
}

/// Visit bookkeeping kept under the `meta` JSON column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VisitMeta {
    #[serde(default, deserialize_with = "lax::opt_string")]
    pub first_visit: Option<String>,
    #[serde(default, deserialize_with = "lax::opt_string")]
    pub last_visit: Option<String>,
}

impl VisitMeta {
    pub fn first_visit_date(&self) -> Option<NaiveDate> {
        self.first_visit.as_deref().and_then(parse_visit_date)
    }

    pub fn last_visit_date(&self) -> Option<NaiveDate> {
        self.last_visit.as_deref().and_then(parse_visit_date)
    }
}

/// Accepts plain dates and full timestamps; only the date part is kept.
fn parse_visit_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// One row of the restaurants table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Restaurant {
    pub restaurant_id: RestaurantId,

    #[serde(default, deserialize_with = "lax::string")]
    pub name: String,

    #[serde(default, deserialize_with = "lax::opt_string")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "lax::opt_string")]
    pub area: Option<String>,

    #[serde(default, deserialize_with = "lax::opt_f64")]
    pub geo_lat: Option<f64>,

    #[serde(default, deserialize_with = "lax::opt_f64")]
    pub geo_lng: Option<f64>,

    #[serde(default, deserialize_with = "lax::string_list")]
    pub cuisines: Vec<String>,

    #[serde(default, deserialize_with = "lax::opt_bool")]
    pub visited: Option<bool>,

    #[serde(default, deserialize_with = "lax::opt_u32")]
    pub total_dishes_reviewed: Option<u32>,

    #[serde(default, deserialize_with = "lax::string_list")]
    pub top_picks: Vec<String>,

    #[serde(default, deserialize_with = "lax::opt_object")]
    pub meta: Option<VisitMeta>,

    #[serde(default, deserialize_with = "lax::opt_string")]
    pub hero_image_url: Option<String>,

    /// Numeric score used for ranking, higher is better.
    #[serde(default, deserialize_with = "lax::opt_f64")]
    pub rating: Option<f64>,

    /// Price tier, 1 (cheap) to 3 (expensive).
    #[serde(default, deserialize_with = "lax::opt_u8")]
    pub price_range: Option<u8>,

    /// Columns this schema does not name; kept so detail views can show every field.
    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Restaurant {
    /// A bare record with only an identifier and a name; everything else absent.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            restaurant_id: RestaurantId::new(id),
            name: name.into(),
            city: None,
            area: None,
            geo_lat: None,
            geo_lng: None,
            cuisines: Vec::new(),
            visited: None,
            total_dishes_reviewed: None,
            top_picks: Vec::new(),
            meta: None,
            hero_image_url: None,
            rating: None,
            price_range: None,
            extra: BTreeMap::new(),
        }
    }

    /// `(lat, lng)` when both coordinates are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.geo_lat.zip(self.geo_lng)
    }

    pub fn price_label(&self) -> &'static str {
        match self.price_range {
            Some(1) => "₹",
            Some(2) => "₹₹",
            Some(3) => "₹₹₹",
            _ => "—",
        }
    }

    /// Area if known, otherwise city, otherwise empty.
    pub fn locality(&self) -> &str {
        self.area
            .as_deref()
            .or(self.city.as_deref())
            .unwrap_or_default()
    }
}
