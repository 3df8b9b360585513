use super::settings::Context;
use crate::application::Authenticator;
use crate::error::Result;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Account email
    #[arg(value_name = "EMAIL")]
    login: String,

    /// Account password
    #[arg(long, env = "CARTSYNC_PASSWORD", hide_env_values = true)]
    password: String,
}

fn authenticator(context: &Context) -> Authenticator {
    Authenticator::new(context.gateway.clone(), context.store.clone())
}

pub(crate) async fn login(args: LoginArgs, context: &Context) -> Result<()> {
    let email = authenticator(context)
        .login(&args.login, &args.password)
        .await?;
    println!("logged in as {email}");
    Ok(())
}

pub(crate) async fn logout(context: &Context) -> Result<()> {
    authenticator(context).logout().await?;
    println!("logged out");
    Ok(())
}
