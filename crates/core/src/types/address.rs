//! Delivery addresses.

use serde::{Deserialize, Deserializer, Serialize};

use super::id::AddressId;

/// Error returned when an address form is incomplete.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Please fill in all required fields.")]
pub struct AddressError {
    /// Names of the empty required fields, in form order.
    pub missing: Vec<&'static str>,
}

/// A saved delivery address.
///
/// Older records store `contactNumber` and `zipcode` as JSON numbers, so both
/// are accepted as strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(alias = "_id")]
    pub id: AddressId,
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub contact_number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub zipcode: String,
}

impl Address {
    /// Dropdown label: `name - street, city`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} - {}, {}", self.name, self.street, self.city)
    }

    /// Single-line location: `street, city, state - zipcode`.
    #[must_use]
    pub fn location_line(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.street, self.city, self.state, self.zipcode
        )
    }

    /// Landmark if one was given.
    #[must_use]
    pub fn landmark(&self) -> Option<&str> {
        self.landmark.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Form values for editing this address.
    #[must_use]
    pub fn to_input(&self) -> AddressInput {
        AddressInput {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            contact_number: self.contact_number.clone(),
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            landmark: self.landmark.clone(),
            zipcode: self.zipcode.clone(),
        }
    }
}

/// Body for creating or updating an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    pub name: String,
    pub contact_number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub zipcode: String,
}

impl AddressInput {
    /// Check that every field except the landmark is filled in.
    ///
    /// # Errors
    ///
    /// Returns `AddressError` listing the empty fields.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("name", &self.name),
            ("contactNumber", &self.contact_number),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipcode", &self.zipcode),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AddressError { missing })
        }
    }

    /// Trim all fields and drop an empty landmark.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            id: self.id,
            name: self.name.trim().to_owned(),
            contact_number: self.contact_number.trim().to_owned(),
            street: self.street.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            landmark: self
                .landmark
                .map(|l| l.trim().to_owned())
                .filter(|l| !l.is_empty()),
            zipcode: self.zipcode.trim().to_owned(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}
