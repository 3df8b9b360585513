//! The `cartsync` command tree.

use crate::error::Result;
use clap::{Parser, Subcommand};

mod account;
mod cart;
mod checkout;
mod products;
pub mod render;
pub mod settings;
pub mod telemetry;

pub use settings::{Context, GlobalArgs, StoreKind};

#[derive(Debug, Parser)]
#[command(
    name = "cartsync",
    version,
    about = "Cart and checkout client for a GraphQL storefront",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the catalog
    Products(products::ProductsCommand),
    /// Inspect and edit the cart
    Cart(cart::CartCommand),
    /// Submit addresses, pay and place the order
    Checkout(checkout::CheckoutArgs),
    /// Obtain and store a login token
    Login(account::LoginArgs),
    /// Forget the stored login token
    Logout,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let context = self.global.context().await?;
        match self.command {
            Commands::Products(command) => products::run(command, &context).await,
            Commands::Cart(command) => cart::run(command, &context).await,
            Commands::Checkout(args) => checkout::run(args, &context).await,
            Commands::Login(args) => account::login(args, &context).await,
            Commands::Logout => account::logout(&context).await,
        }
    }
}
