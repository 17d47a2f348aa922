use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

/// A line item snapshot taken at purchase time.
/// `product` may be null if the catalog entry was since removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub product: Option<i64>,
    pub product_name: String,
    pub price: String,
    pub quantity: u32,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_address: String,
    pub total: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn total_value(&self) -> Option<f64> {
        self.total.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_history_entry() {
        let json = r#"{
            "id": 21,
            "status": "PAID",
            "shipping_address": "221B Baker Street",
            "total": "2598.00",
            "created_at": "2025-05-11T12:00:00Z",
            "items": [
                {"id": 30, "product": 7, "product_name": "Wireless Mouse", "price": "1299.00", "quantity": 2, "subtotal": 2598.0}
            ]
        }"#;

        let order: Order = serde_json::from_str(json).expect("order should parse");
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.total_value(), Some(2598.0));
        assert_eq!(order.items[0].product_name, "Wireless Mouse");
    }

    #[test]
    fn parses_item_with_deleted_product() {
        let json = r#"{"id": 30, "product": null, "product_name": "Gone", "price": "10.00", "quantity": 1, "subtotal": 10.0}"#;
        let item: OrderItem = serde_json::from_str(json).expect("item should parse");
        assert!(item.product.is_none());
    }
}
