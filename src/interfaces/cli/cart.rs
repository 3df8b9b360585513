use super::render;
use super::settings::Context;
use crate::application::CartSync;
use crate::domain::checkout::{LineId, VariantId};
use crate::error::{Result, SyncError};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart, refreshed from the gateway
    Show,
    /// Add a product variant, opening a checkout if needed
    Add {
        /// Variant id
        variant: String,

        #[arg(long, short, default_value_t = 1)]
        quantity: i32,
    },
    /// Set the quantity of a line; zero or less removes it
    Update {
        /// Line id
        line: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i32,
    },
    /// Remove a line
    Remove {
        /// Line id
        line: String,
    },
    /// Forget the checkout session
    Clear,
}

pub(crate) async fn open(context: &Context) -> Result<CartSync> {
    CartSync::open(
        context.gateway.clone(),
        context.store.clone(),
        context.storefront.clone(),
    )
    .await
}

/// Treats a missing session as nothing to do.
fn unless_empty(result: Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(SyncError::NoSession) => {
            println!("cart is empty; nothing to do");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

pub(crate) async fn run(command: CartCommand, context: &Context) -> Result<()> {
    let mut cart = open(context).await?;

    match command.command {
        CartSubcommand::Show => {
            if cart.checkout_id().is_none() {
                println!("{}", render::cart(cart.state()));
                return Ok(());
            }
            let snapshot = cart.load_checkout().await?;
            println!("{}", render::cart(cart.state()));
            println!("{}", render::checkout_summary(&snapshot));
        }
        CartSubcommand::Add { variant, quantity } => {
            cart.add_item(VariantId::new(variant), quantity).await?;
            println!("{}", render::cart(cart.state()));
        }
        CartSubcommand::Update { line, quantity } => {
            let line = LineId::new(line);
            let result = if quantity <= 0 {
                cart.remove_item(&line).await
            } else {
                cart.update_item(&line, quantity).await
            };
            if unless_empty(result)? {
                println!("{}", render::cart(cart.state()));
            }
        }
        CartSubcommand::Remove { line } => {
            if unless_empty(cart.remove_item(&LineId::new(line)).await)? {
                println!("{}", render::cart(cart.state()));
            }
        }
        CartSubcommand::Clear => {
            cart.clear_cart().await?;
            println!("cart cleared");
        }
    }
    Ok(())
}
