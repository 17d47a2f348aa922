use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A storefront product as served by the catalog endpoints.
/// `price` is a decimal string on the wire (e.g. `"1299.00"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    pub stock: u32,
    #[serde(default)]
    pub image_url: String,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub category: Category,
}

impl Product {
    /// Parse the decimal price string for display math.
    pub fn price_value(&self) -> Option<f64> {
        self.price.parse().ok()
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Filters for the product list endpoint.
/// Both map to query params; `None` means no filter.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Category slug to filter by.
    pub category: Option<String>,
    /// Case-insensitive name search.
    pub q: Option<String>,
}

impl ProductQuery {
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(ref category) = self.category {
            params.push(("category".to_string(), category.clone()));
        }
        if let Some(ref q) = self.q {
            params.push(("q".to_string(), q.clone()));
        }
        params
    }
}

/// Payload for seller product create/update.
/// The slug is assigned server-side from the name.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWrite {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: u32,
    pub image_url: String,
    pub is_active: bool,
    pub category_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_product_with_nested_category() {
        let json = r#"{
            "id": 7,
            "name": "Wireless Mouse",
            "slug": "wireless-mouse",
            "description": "2.4GHz, USB receiver",
            "price": "1299.00",
            "stock": 42,
            "image_url": "https://cdn.example.com/mouse.jpg",
            "is_active": true,
            "created_at": "2025-04-02T10:15:00Z",
            "category": {"id": 2, "name": "Electronics", "slug": "electronics", "created_at": null}
        }"#;

        let product: Product = serde_json::from_str(json).expect("product should parse");
        assert_eq!(product.slug, "wireless-mouse");
        assert_eq!(product.category.slug, "electronics");
        assert_eq!(product.price_value(), Some(1299.0));
        assert!(product.in_stock());
    }

    #[test]
    fn product_query_params() {
        let query = ProductQuery {
            category: Some("books".to_string()),
            q: None,
        };
        assert_eq!(
            query.to_params(),
            vec![("category".to_string(), "books".to_string())]
        );
        assert!(ProductQuery::default().to_params().is_empty());
    }
}
