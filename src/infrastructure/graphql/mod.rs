//! Gateway adapter for a GraphQL storefront API.

mod client;
pub mod documents;
mod wire;

pub use client::GraphQlGateway;
