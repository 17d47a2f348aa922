use serde::{Deserialize, Serialize};

/// Gateway order handed to the hosted checkout widget.
/// `amount` is in the currency's minor unit (paise for INR).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    /// Publishable gateway key for the widget.
    pub key: String,
    pub prefill: CheckoutPrefill,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutPrefill {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Signature triple the widget produces on success, sent back for
/// server-side verification together with the shipping address.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentProof {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub shipping_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_checkout_order() {
        let json = r#"{
            "order_id": "order_NXhPzE1",
            "amount": 259800,
            "currency": "INR",
            "key": "rzp_test_abc",
            "prefill": {"name": "asha", "email": "asha@example.com"},
            "description": "RuhCart Checkout"
        }"#;

        let order: CheckoutOrder = serde_json::from_str(json).expect("checkout order should parse");
        assert_eq!(order.amount, 259800);
        assert_eq!(order.prefill.name, "asha");
    }
}
