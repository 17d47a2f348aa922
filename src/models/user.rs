use serde::{Deserialize, Serialize};

/// The authenticated user as returned by `/auth/me/`.
/// Registration responses omit `role`; it defaults to empty there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl UserProfile {
    pub fn is_seller(&self) -> bool {
        self.role.eq_ignore_ascii_case("seller")
    }
}

/// Customer registration payload. The API requires the password twice.
#[derive(Debug, Clone, Serialize)]
pub struct NewCustomer {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl NewCustomer {
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password2: password.to_string(),
        }
    }
}

/// Seller registration payload: customer fields plus a shop name.
#[derive(Debug, Clone, Serialize)]
pub struct NewSeller {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub shop_name: String,
}

impl NewSeller {
    pub fn new(username: &str, email: &str, password: &str, shop_name: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password2: password.to_string(),
            shop_name: shop_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_and_role() {
        let json = r#"{"id": 5, "username": "asha", "email": "asha@example.com", "role": "SELLER"}"#;
        let profile: UserProfile = serde_json::from_str(json).expect("profile should parse");
        assert!(profile.is_seller());

        let json = r#"{"id": 6, "username": "ravi", "email": "", "role": "customer"}"#;
        let profile: UserProfile = serde_json::from_str(json).expect("profile should parse");
        assert!(!profile.is_seller());
    }

    #[test]
    fn registration_duplicates_password() {
        let reg = NewCustomer::new("asha", "asha@example.com", "hunter22");
        assert_eq!(reg.password, reg.password2);
    }
}
