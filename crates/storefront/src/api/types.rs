//! Request and response bodies for the upstream REST API.

use serde::{Deserialize, Serialize};

use eshop_core::{AddressId, ProductId, User, UserId};

/// `POST /api/auth/signin` body.
#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    /// The API calls the login email `username`.
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /api/auth/signup` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub contact_number: String,
}

/// `POST /api/orders` body. One request per ordered product.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    pub product: ProductId,
    pub address: AddressId,
}

/// Result of a successful sign in.
pub struct SignedIn {
    /// Value of the `x-auth-token` response header.
    pub token: secrecy::SecretString,
    /// Response body.
    pub user: User,
}

/// Error payload the API returns alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

/// Body of a create call: either the stored record or its bare id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Created {
    Record {
        #[serde(alias = "_id")]
        id: String,
    },
    Id(String),
}

impl Created {
    pub(crate) fn into_id(self) -> String {
        match self {
            Self::Record { id } | Self::Id(id) => id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_created_accepts_record_or_id() {
        let record: Created = serde_json::from_str(r#"{"_id":"a1","name":"Home"}"#).unwrap();
        assert_eq!(record.into_id(), "a1");

        let bare: Created = serde_json::from_str(r#""a2""#).unwrap();
        assert_eq!(bare.into_id(), "a2");
    }

    #[test]
    fn test_order_request_body() {
        let body = OrderRequest {
            quantity: 2,
            user: None,
            product: ProductId::new("p1"),
            address: AddressId::new("a1"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"quantity": 2, "product": "p1", "address": "a1"})
        );
    }

    #[test]
    fn test_signup_body_is_camel_case() {
        let body = SignUpRequest {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            password: "Secret1!".to_string(),
            contact_number: "9876543210".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["firstName"], "Asha");
        assert_eq!(json["contactNumber"], "9876543210");
        assert!(json.get("confirmPassword").is_none());
    }
}
