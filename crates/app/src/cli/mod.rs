use bakehouse_app::{config::AppConfig, observability::init_subscriber};
use clap::{Parser, Subcommand};

mod checkout;
mod methods;
mod vendors;

#[derive(Debug, Parser)]
#[command(name = "bakehouse", about = "Bakehouse till", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the active payment methods
    Methods,

    /// Ring up a sale
    Checkout(checkout::CheckoutArgs),

    /// Manage the recent vendors list
    Vendors(vendors::VendorsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        init_subscriber(&self.config.logging).map_err(|error| error.to_string())?;

        match self.command {
            Commands::Methods => methods::run(&self.config).await,
            Commands::Checkout(args) => checkout::run(&self.config, args).await,
            Commands::Vendors(command) => vendors::run(&self.config, command),
        }
    }
}
