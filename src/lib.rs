//! Keeps a storefront cart in step with a remote GraphQL checkout and
//! drives it to a placed order.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
