//! Catalog documents: a [`Watch`] and the [`Review`]s embedded in it.
//!
//! These are the validated, stored shapes. Incoming JSON is first parsed into
//! the draft types in [`crate::validation`] and only becomes a `Watch` once
//! every required field is present and in range.
//!
//! Documents are also the storage encoding (postcard), so no field uses
//! `skip_serializing_if`; absent optional values serialize as `null` in JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower bound for `rating` on watches and reviews.
pub const MIN_RATING: f64 = 0.0;
/// Upper bound for `rating` on watches and reviews.
pub const MAX_RATING: f64 = 5.0;

/// Target audience of a watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Men, Gender::Women, Gender::Unisex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
            Gender::Unisex => "Unisex",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("`{}` is not a valid enum value for path `gender`.", s))
    }
}

/// Movement and case details.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalSpecs {
    pub dial_size: Option<String>,
    pub strap_material: Option<String>,
    pub water_resistance: Option<String>,
    pub movement_type: Option<String>,
    pub battery_life: Option<String>,
    pub features: Vec<String>,
}

/// Stock level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub quantity_in_stock: u32,
    pub restock_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipping {
    pub options: Vec<String>,
    pub charges: f64,
    pub delivery_time: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Promotion {
    pub promotion_id: Option<String>,
    pub description: Option<String>,
}

/// One customer's rating of a watch. Owned by exactly one [`Watch`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user_name: String,
    pub user_comment: Option<String>,
    /// In `[MIN_RATING, MAX_RATING]`.
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog listing.
///
/// `id` is the business identifier clients address the watch by; it is set
/// once at creation and never changes. `sku` is unique across the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub images: Vec<String>,
    pub categories: Vec<String>,
    pub gender: Gender,
    pub availability: bool,
    pub sku: String,
    pub technical_specs: Option<TechnicalSpecs>,
    /// In `[MIN_RATING, MAX_RATING]`.
    pub rating: f64,
    pub reviews: Vec<Review>,
    pub inventory: Inventory,
    pub manufacturer: Option<String>,
    pub country_of_origin: Option<String>,
    pub warranty_period: Option<String>,
    pub shipping: Option<Shipping>,
    pub wishlist_count: u64,
    pub purchase_count: u64,
    pub promotion: Option<Promotion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
