use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProductId, UserId, MAX_QUANTITY};

/// A customer review embedded in a product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub user_id: UserId,
    /// Star rating between 1 and 5; fractional ratings are allowed
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Validates the raw rating and comment, returning a review stamped with the current time
    pub fn new(user_id: UserId, rating: f64, comment: &str) -> Result<Self, String> {
        if !(1.0..=5.0).contains(&rating) {
            return Err("Rating must be between 1 and 5.".to_string());
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err("Comment cannot be empty.".to_string());
        }

        Ok(Self {
            user_id,
            rating,
            comment: comment.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    /// Units in stock
    pub quantity: u32,
    pub category: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Body of a product creation request
///
/// Absent fields deserialize to empty values so `validate` can report them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub quantity: i64,
    pub category: String,
}

/// Body of a partial product update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub quantity: Option<i64>,
    pub category: Option<String>,
}

impl NewProduct {
    /// Collects every validation failure rather than stopping at the first
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if self.price.is_nan() || self.price <= 0.0 {
            errors.push("Price must be greater than 0".to_string());
        }
        if self.description.trim().is_empty() {
            errors.push("Description is required".to_string());
        }
        if !is_http_url(&self.image_url) {
            errors.push("Invalid image URL".to_string());
        }
        if self.quantity <= 0 {
            errors.push("Quantity must be greater than 0".to_string());
        } else if self.quantity > i64::from(MAX_QUANTITY) {
            errors.push(format!("Quantity must be at most {}", MAX_QUANTITY));
        }
        if self.category.trim().is_empty() {
            errors.push("Category is required".to_string());
        }
        errors
    }

    /// Builds a product with a fresh ID, or the list of validation errors
    pub fn into_product(self) -> Result<Product, Vec<String>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Product {
            id: ProductId::new(),
            name: self.name,
            price: self.price,
            description: self.description,
            image_url: self.image_url,
            quantity: self.quantity as u32,
            category: self.category,
            reviews: Vec::new(),
        })
    }
}

impl Product {
    /// Applies a partial update, validating the merged result
    ///
    /// The product is left untouched when validation fails.
    pub fn apply(&mut self, patch: ProductPatch) -> Result<(), Vec<String>> {
        let merged = NewProduct {
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            price: patch.price.unwrap_or(self.price),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            image_url: patch.image_url.unwrap_or_else(|| self.image_url.clone()),
            quantity: patch.quantity.unwrap_or(i64::from(self.quantity)),
            category: patch.category.unwrap_or_else(|| self.category.clone()),
        };

        let errors = merged.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        self.name = merged.name;
        self.price = merged.price;
        self.description = merged.description;
        self.image_url = merged.image_url;
        self.quantity = merged.quantity as u32;
        self.category = merged.category;
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewProduct {
        NewProduct {
            name: "Desk Lamp".to_string(),
            price: 24.5,
            description: "Adjustable LED lamp".to_string(),
            image_url: "https://cdn.example.com/lamp.png".to_string(),
            quantity: 12,
            category: "Home".to_string(),
        }
    }

    #[test]
    fn test_valid_product_has_no_errors() {
        let product = sample().into_product().unwrap();
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.quantity, 12);
        assert!(product.reviews.is_empty());
    }

    #[test]
    fn test_invalid_product_collects_all_errors() {
        let product = NewProduct {
            name: " ".to_string(),
            price: 0.0,
            image_url: "lamp.png".to_string(),
            quantity: 0,
            ..sample()
        };
        let errors = product.validate();
        assert_eq!(
            errors,
            vec![
                "Name is required",
                "Price must be greater than 0",
                "Invalid image URL",
                "Quantity must be greater than 0",
            ]
        );
    }

    #[test]
    fn test_nan_price_is_rejected() {
        let product = NewProduct {
            price: f64::NAN,
            ..sample()
        };
        assert_eq!(product.validate(), vec!["Price must be greater than 0"]);
    }

    #[test]
    fn test_apply_patch_updates_only_given_fields() {
        let mut product = sample().into_product().unwrap();
        product
            .apply(ProductPatch {
                price: Some(19.99),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(product.price, 19.99);
        assert_eq!(product.name, "Desk Lamp");
    }

    #[test]
    fn test_rejected_patch_leaves_product_unchanged() {
        let mut product = sample().into_product().unwrap();
        let before = product.clone();
        let errors = product
            .apply(ProductPatch {
                name: Some("Bigger Lamp".to_string()),
                quantity: Some(-3),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(errors, vec!["Quantity must be greater than 0"]);
        assert_eq!(product, before);
    }

    #[test]
    fn test_review_validation() {
        let user = UserId::new();
        assert!(Review::new(user, 0.0, "meh").is_err());
        assert!(Review::new(user, 5.5, "wow").is_err());
        assert!(Review::new(user, f64::NAN, "what").is_err());
        assert!(Review::new(user, 4.0, "   ").is_err());

        let review = Review::new(user, 5.0, "  Great lamp ").unwrap();
        assert_eq!(review.rating, 5.0);
        assert_eq!(review.comment, "Great lamp");
    }

    #[test]
    fn test_fractional_rating_is_accepted() {
        let review = Review::new(UserId::new(), 4.5, "Almost perfect").unwrap();
        assert_eq!(review.rating, 4.5);
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let product: NewProduct = serde_json::from_str(r#"{"price": 10.0}"#).unwrap();
        assert_eq!(
            product.validate(),
            vec![
                "Name is required",
                "Description is required",
                "Invalid image URL",
                "Quantity must be greater than 0",
                "Category is required",
            ]
        );
    }

    #[test]
    fn test_quantity_must_fit_storage() {
        let product = NewProduct {
            quantity: i64::from(MAX_QUANTITY) + 1,
            ..sample()
        };
        assert_eq!(
            product.validate(),
            vec![format!("Quantity must be at most {}", MAX_QUANTITY)]
        );

        let product = NewProduct {
            quantity: i64::from(MAX_QUANTITY),
            ..sample()
        };
        assert!(product.validate().is_empty());
    }
}
