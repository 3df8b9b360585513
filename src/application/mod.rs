//! Orchestration of gateway calls on behalf of the storefront.
//!
//! `CartSync` owns the cart and its persisted session, `CheckoutWorkflow`
//! drives a session to a placed order, and `Authenticator` manages the
//! login token. All three talk to the gateway only through the ports in
//! [`crate::domain::ports`].

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::Authenticator;
pub use cart::{CartState, CartSync};
pub use checkout::{
    BillingAddress, CheckoutStage, CheckoutWorkflow, CompletionRequest, OrderConfirmation,
};
