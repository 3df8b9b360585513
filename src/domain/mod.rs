//! Domain layer: value types for carts, checkouts and catalog entries, plus
//! the ports the application layer talks through.

pub mod address;
pub mod catalog;
pub mod checkout;
pub mod ids;
pub mod money;
pub mod ports;
