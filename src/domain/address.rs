use crate::error::{Result, SyncError};

/// A postal address submitted for shipping or billing.
///
/// Shipping and billing are independent values; "billing same as shipping"
/// is a copy, never a shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    pub city: String,
    /// State, province or other region.
    pub country_area: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 code, e.g. "IN".
    pub country_code: String,
}

impl Address {
    /// Checks that every required field is non-blank.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("street_address", &self.street_address),
            ("city", &self.city),
            ("country_area", &self.country_area),
            ("postal_code", &self.postal_code),
            ("country_code", &self.country_code),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(SyncError::InvalidAddress { field: *field }),
            None => Ok(()),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
