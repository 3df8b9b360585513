//! Library-level settings with the storefront's defaults.
//!
//! The binary fills these from CLI flags and environment variables; library
//! users construct them directly.

pub const DEFAULT_CHANNEL: &str = "online-inr";
pub const DEFAULT_CUSTOMER_EMAIL: &str = "user@example.com";
pub const DEFAULT_PAYMENT_GATEWAY: &str = "mirumee.payments.dummy";
pub const DEFAULT_PAYMENT_TOKEN: &str = "dummy-token";

/// Where new checkouts are opened and on whose behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontSettings {
    pub channel: String,
    pub customer_email: String,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            customer_email: DEFAULT_CUSTOMER_EMAIL.to_string(),
        }
    }
}

/// Payment gateway and token used when attaching a payment to a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSettings {
    pub gateway: String,
    pub token: String,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_PAYMENT_GATEWAY.to_string(),
            token: DEFAULT_PAYMENT_TOKEN.to_string(),
        }
    }
}
