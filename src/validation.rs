//! Parsing and validation of incoming watch payloads.
//!
//! Request bodies are parsed into a [`WatchDraft`] where every field is
//! optional, then [`WatchDraft::validate`] checks required fields and bounds
//! and builds the stored [`Watch`]. All problems found in one payload are
//! reported together, in field order.

use crate::error::{Result, StoreError};
use crate::model::{
    Gender, Inventory, Promotion, Review, Shipping, TechnicalSpecs, Watch, MAX_RATING, MIN_RATING,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Server-managed values applied when a draft becomes a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Stamp {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Reviews already stored on the document; their timestamps carry over.
    pub reviews: Vec<Review>,
}

impl Stamp {
    /// Stamp for a document written for the first time.
    pub fn created(id: String, now: DateTime<Utc>) -> Self {
        Stamp {
            id,
            created_at: now,
            updated_at: now,
            reviews: Vec::new(),
        }
    }

    /// Stamp for a rewrite of `existing` at `now`.
    pub fn updated(existing: &Watch, now: DateTime<Utc>) -> Self {
        Stamp {
            id: existing.id.clone(),
            created_at: existing.created_at,
            updated_at: now,
            reviews: existing.reviews.clone(),
        }
    }
}

/// A review as submitted inside a watch payload.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewDraft {
    pub user_name: Option<String>,
    pub user_comment: Option<String>,
    pub rating: Option<f64>,
}

/// A watch as submitted by a client, before validation.
///
/// Unknown fields are ignored. `created_at`/`updated_at` are not part of the
/// draft: clients cannot set them.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct WatchDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub images: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub gender: Option<String>,
    pub availability: Option<bool>,
    pub sku: Option<String>,
    pub technical_specs: Option<TechnicalSpecs>,
    pub rating: Option<f64>,
    pub reviews: Option<Vec<ReviewDraft>>,
    pub inventory: Option<Inventory>,
    pub manufacturer: Option<String>,
    pub country_of_origin: Option<String>,
    pub warranty_period: Option<String>,
    pub shipping: Option<Shipping>,
    pub wishlist_count: Option<u64>,
    pub purchase_count: Option<u64>,
    pub promotion: Option<Promotion>,
}

fn failed(errors: &[String]) -> StoreError {
    StoreError::Validation(format!("Watch validation failed: {}", errors.join(", ")))
}

fn required_message(path: &str) -> String {
    format!("{0}: Path `{0}` is required.", path)
}

/// Empty strings count as missing.
fn required_text(errors: &mut Vec<String>, path: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            errors.push(required_message(path));
            None
        }
    }
}

/// Empty lists count as missing.
fn required_list(
    errors: &mut Vec<String>,
    path: &str,
    value: Option<Vec<String>>,
) -> Option<Vec<String>> {
    match value {
        Some(items) if !items.is_empty() => Some(items),
        _ => {
            errors.push(required_message(path));
            None
        }
    }
}

fn check_rating(errors: &mut Vec<String>, path: &str, rating: f64) -> bool {
    if rating < MIN_RATING {
        errors.push(format!(
            "{0}: Path `{0}` ({1}) is less than minimum allowed value ({2}).",
            path, rating, MIN_RATING
        ));
        false
    } else if rating > MAX_RATING {
        errors.push(format!(
            "{0}: Path `{0}` ({1}) is more than maximum allowed value ({2}).",
            path, rating, MAX_RATING
        ));
        false
    } else {
        true
    }
}

impl ReviewDraft {
    fn validate(self, index: usize, now: DateTime<Utc>, errors: &mut Vec<String>) -> Option<Review> {
        let user_name = required_text(errors, &format!("reviews.{}.user_name", index), self.user_name);

        let rating_path = format!("reviews.{}.rating", index);
        let rating = match self.rating {
            Some(rating) if check_rating(errors, &rating_path, rating) => Some(rating),
            Some(_) => None,
            None => {
                errors.push(required_message(&rating_path));
                None
            }
        };

        Some(Review {
            user_name: user_name?,
            user_comment: self.user_comment,
            rating: rating?,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Take timestamps for `review` from the stored review it continues.
///
/// An unchanged review keeps both timestamps. A changed review by the same
/// `user_name` keeps `created_at`. Each stored review is used at most once.
fn carry_over(review: &mut Review, prior: &mut Vec<Review>) {
    let unchanged = prior.iter().position(|p| {
        p.user_name == review.user_name
            && p.user_comment == review.user_comment
            && p.rating == review.rating
    });

    if let Some(index) = unchanged {
        let previous = prior.remove(index);
        review.created_at = previous.created_at;
        review.updated_at = previous.updated_at;
    } else if let Some(index) = prior.iter().position(|p| p.user_name == review.user_name) {
        review.created_at = prior.remove(index).created_at;
    }
}

impl WatchDraft {
    /// Parse a JSON request body into a draft.
    ///
    /// # Errors
    ///
    /// `StoreError::Validation` if the body is not an object or a field has
    /// the wrong JSON type.
    pub fn from_payload(payload: Value) -> Result<Self> {
        if !payload.is_object() {
            return Err(StoreError::Validation(
                "Watch payload must be a JSON object".to_string(),
            ));
        }

        serde_json::from_value(payload)
            .map_err(|e| StoreError::Validation(format!("Watch validation failed: {}", e)))
    }

    /// Identifier supplied by the client, if any.
    pub fn requested_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Check required fields and bounds and build the document.
    ///
    /// `stamp` supplies `id` and timestamps; any `id` in the draft itself is
    /// ignored here. Review timestamps are never taken from the payload: new
    /// reviews get `stamp.updated_at`, reviews matching one in
    /// `stamp.reviews` keep its timestamps (see [`carry_over`]).
    ///
    /// # Errors
    ///
    /// `StoreError::Validation` listing every failing path.
    pub fn validate(self, stamp: Stamp) -> Result<Watch> {
        let mut errors = Vec::new();

        let title = required_text(&mut errors, "title", self.title);
        let brand = required_text(&mut errors, "brand", self.brand);

        let price = self.price;
        if price.is_none() {
            errors.push(required_message("price"));
        }

        let images = required_list(&mut errors, "images", self.images);
        let categories = required_list(&mut errors, "categories", self.categories);

        let gender = match self.gender.as_deref().map(str::parse::<Gender>) {
            Some(Ok(gender)) => Some(gender),
            Some(Err(message)) => {
                errors.push(format!("gender: {}", message));
                None
            }
            None => {
                errors.push(required_message("gender"));
                None
            }
        };

        let sku = required_text(&mut errors, "sku", self.sku);

        let rating = self.rating.unwrap_or(MIN_RATING);
        check_rating(&mut errors, "rating", rating);

        let mut prior = stamp.reviews;
        let reviews: Option<Vec<Review>> = self
            .reviews
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, review)| {
                let mut review = review.validate(index, stamp.updated_at, &mut errors)?;
                carry_over(&mut review, &mut prior);
                Some(review)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        match (title, brand, price, images, categories, gender, sku, reviews) {
            (
                Some(title),
                Some(brand),
                Some(price),
                Some(images),
                Some(categories),
                Some(gender),
                Some(sku),
                Some(reviews),
            ) if errors.is_empty() => Ok(Watch {
                id: stamp.id,
                title,
                brand,
                description: self.description,
                price,
                discount: self.discount.unwrap_or(0.0),
                images,
                categories,
                gender,
                availability: self.availability.unwrap_or(true),
                sku,
                technical_specs: self.technical_specs,
                rating,
                reviews,
                inventory: self.inventory.unwrap_or_default(),
                manufacturer: self.manufacturer,
                country_of_origin: self.country_of_origin,
                warranty_period: self.warranty_period,
                shipping: self.shipping,
                wishlist_count: self.wishlist_count.unwrap_or(0),
                purchase_count: self.purchase_count.unwrap_or(0),
                promotion: self.promotion,
                created_at: stamp.created_at,
                updated_at: stamp.updated_at,
            }),
            _ => Err(failed(&errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn stamp() -> Stamp {
        Stamp::created("w-1".to_string(), now())
    }

    fn minimal() -> Value {
        json!({
            "title": "Chrono X",
            "brand": "Acme",
            "price": 199.99,
            "images": ["a.jpg"],
            "categories": ["sport"],
            "gender": "Unisex",
            "sku": "ACME-001"
        })
    }

    fn validation_message(result: Result<Watch>) -> String {
        match result {
            Err(StoreError::Validation(message)) => message,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_payload_gets_defaults() {
        let watch = WatchDraft::from_payload(minimal())
            .unwrap()
            .validate(stamp())
            .unwrap();

        assert_eq!(watch.id, "w-1");
        assert_eq!(watch.gender, Gender::Unisex);
        assert_eq!(watch.rating, 0.0);
        assert_eq!(watch.discount, 0.0);
        assert!(watch.availability);
        assert!(watch.reviews.is_empty());
        assert_eq!(watch.inventory.quantity_in_stock, 0);
        assert_eq!(watch.wishlist_count, 0);
        assert_eq!(watch.purchase_count, 0);
        assert_eq!(watch.created_at, now());
        assert_eq!(watch.updated_at, now());
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let message = validation_message(
            WatchDraft::from_payload(json!({ "price": 10.0 }))
                .unwrap()
                .validate(stamp()),
        );

        for path in ["title", "brand", "images", "categories", "gender", "sku"] {
            assert!(
                message.contains(&format!("Path `{}` is required.", path)),
                "missing {} in {}",
                path,
                message
            );
        }
        assert!(!message.contains("`price`"));
    }

    #[test]
    fn test_empty_strings_and_lists_are_missing() {
        let mut payload = minimal();
        payload["title"] = json!("");
        payload["images"] = json!([]);

        let message = validation_message(WatchDraft::from_payload(payload).unwrap().validate(stamp()));
        assert!(message.contains("Path `title` is required."));
        assert!(message.contains("Path `images` is required."));
    }

    #[test]
    fn test_rating_bounds() {
        let mut payload = minimal();
        payload["rating"] = json!(7);

        let message = validation_message(WatchDraft::from_payload(payload).unwrap().validate(stamp()));
        assert_eq!(
            message,
            "Watch validation failed: rating: Path `rating` (7) is more than maximum allowed value (5)."
        );

        let mut payload = minimal();
        payload["rating"] = json!(5);
        assert!(WatchDraft::from_payload(payload).unwrap().validate(stamp()).is_ok());
    }

    #[test]
    fn test_invalid_gender() {
        let mut payload = minimal();
        payload["gender"] = json!("Kids");

        let message = validation_message(WatchDraft::from_payload(payload).unwrap().validate(stamp()));
        assert!(message.contains("`Kids` is not a valid enum value for path `gender`."));
    }

    #[test]
    fn test_reviews_validated_and_stamped() {
        let mut payload = minimal();
        payload["reviews"] = json!([
            { "user_name": "ana", "rating": 4.5, "user_comment": "lovely" },
            { "rating": 9 }
        ]);

        let message = validation_message(WatchDraft::from_payload(payload).unwrap().validate(stamp()));
        assert!(message.contains("reviews.1.user_name: Path `reviews.1.user_name` is required."));
        assert!(message.contains("reviews.1.rating"));
        assert!(!message.contains("reviews.0"));

        let mut payload = minimal();
        payload["reviews"] = json!([{ "user_name": "ana", "rating": 4.5 }]);
        let watch = WatchDraft::from_payload(payload).unwrap().validate(stamp()).unwrap();
        assert_eq!(watch.reviews.len(), 1);
        assert_eq!(watch.reviews[0].created_at, now());
        assert_eq!(watch.reviews[0].updated_at, now());
    }

    #[test]
    fn test_review_timestamps_from_payload_ignored() {
        let backdated = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        let mut payload = minimal();
        payload["reviews"] = json!([{
            "user_name": "ana",
            "rating": 3,
            "created_at": backdated,
            "updated_at": backdated
        }]);

        let watch = WatchDraft::from_payload(payload).unwrap().validate(stamp()).unwrap();
        assert_eq!(watch.reviews[0].created_at, now());
        assert_eq!(watch.reviews[0].updated_at, now());
    }

    #[test]
    fn test_stored_review_timestamps_carry_over() {
        let earlier = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let mut payload = minimal();
        payload["reviews"] = json!([{ "user_name": "ana", "rating": 3 }]);
        let existing = WatchDraft::from_payload(payload)
            .unwrap()
            .validate(Stamp::created("w-1".to_string(), earlier))
            .unwrap();

        // Submitted back unchanged, plus one new review
        let mut payload = minimal();
        payload["reviews"] = json!([
            { "user_name": "bo", "rating": 5 },
            { "user_name": "ana", "rating": 3 }
        ]);
        let watch = WatchDraft::from_payload(payload)
            .unwrap()
            .validate(Stamp::updated(&existing, now()))
            .unwrap();
        assert_eq!(watch.reviews[0].created_at, now());
        assert_eq!(watch.reviews[1].created_at, earlier);
        assert_eq!(watch.reviews[1].updated_at, earlier);

        // Edited by the same user
        let mut payload = minimal();
        payload["reviews"] = json!([{ "user_name": "ana", "rating": 1, "user_comment": "stopped" }]);
        let watch = WatchDraft::from_payload(payload)
            .unwrap()
            .validate(Stamp::updated(&existing, now()))
            .unwrap();
        assert_eq!(watch.reviews[0].created_at, earlier);
        assert_eq!(watch.reviews[0].updated_at, now());
    }

    #[test]
    fn test_wrong_json_type_is_validation() {
        let mut payload = minimal();
        payload["price"] = json!("cheap");
        assert!(matches!(
            WatchDraft::from_payload(payload),
            Err(StoreError::Validation(_))
        ));

        assert!(matches!(
            WatchDraft::from_payload(json!(["not", "an", "object"])),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_requested_id() {
        let mut payload = minimal();
        payload["id"] = json!("");
        assert_eq!(WatchDraft::from_payload(payload).unwrap().requested_id(), None);

        let mut payload = minimal();
        payload["id"] = json!("custom-1");
        assert_eq!(
            WatchDraft::from_payload(payload).unwrap().requested_id(),
            Some("custom-1")
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut payload = minimal();
        payload["_id"] = json!("64f0c0ffee");
        payload["createdAt"] = json!("whenever");
        assert!(WatchDraft::from_payload(payload).unwrap().validate(stamp()).is_ok());
    }
}
