use serde::{Deserialize, Serialize};

/// Slimmed-down product embedded in cart items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub price: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub product: CartProduct,
    pub quantity: u32,
    /// Computed server-side: price * quantity, as a JSON number.
    pub subtotal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub total: f64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line items.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cart_with_items() {
        let json = r#"{
            "id": 3,
            "created_at": "2025-05-10T08:00:00Z",
            "items": [
                {
                    "id": 11,
                    "product": {"id": 7, "name": "Wireless Mouse", "slug": "wireless-mouse", "price": "1299.00", "image_url": ""},
                    "quantity": 2,
                    "subtotal": 2598.0
                }
            ],
            "total": 2598.0
        }"#;

        let cart: Cart = serde_json::from_str(json).expect("cart should parse");
        assert!(!cart.is_empty());
        assert_eq!(cart.unit_count(), 2);
        assert_eq!(cart.total, 2598.0);
        assert_eq!(cart.items[0].product.slug, "wireless-mouse");
    }

    #[test]
    fn parses_empty_cart() {
        let json = r#"{"id": 3, "created_at": null, "items": [], "total": 0.0}"#;
        let cart: Cart = serde_json::from_str(json).expect("empty cart should parse");
        assert!(cart.is_empty());
        assert_eq!(cart.unit_count(), 0);
    }
}
