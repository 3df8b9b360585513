//! Opaque, gateway-issued identifiers.
//!
//! Each kind of identifier gets its own newtype so a line id can never be
//! passed where a variant id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id!(
    /// Identifies a checkout session on the gateway.
    CheckoutId
);
define_id!(
    /// Identifies one line of a checkout.
    LineId
);
define_id!(
    /// Identifies a purchasable product variant.
    VariantId
);
define_id!(ProductId);
define_id!(ShippingMethodId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trips_as_plain_string() {
        let id = CheckoutId::new("Q2hlY2tvdXQ6MQ==");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""Q2hlY2tvdXQ6MQ==""#);
        let back: CheckoutId = serde_json::from_str(r#""Q2hlY2tvdXQ6MQ==""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_display() {
        let id = VariantId::from("UHJvZHVjdFZhcmlhbnQ6MQ==");
        assert_eq!(id.to_string(), "UHJvZHVjdFZhcmlhbnQ6MQ==");
    }
}
