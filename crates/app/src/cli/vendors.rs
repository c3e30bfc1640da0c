use bakehouse_app::{config::AppConfig, vendors::VendorStore};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub(crate) struct VendorsCommand {
    #[command(subcommand)]
    command: VendorsSubcommand,
}

#[derive(Debug, Subcommand)]
enum VendorsSubcommand {
    /// Show remembered vendors, newest first
    List,

    /// Remember a vendor
    Add {
        /// Vendor name
        name: String,
    },

    /// Forget a vendor (exact spelling)
    Remove {
        /// Vendor name
        name: String,
    },
}

#[expect(clippy::print_stdout, reason = "Command output to user")]
pub(crate) fn run(config: &AppConfig, command: VendorsCommand) -> Result<(), String> {
    let store = VendorStore::new(config.store.recent_vendors_path());

    let vendors = match command.command {
        VendorsSubcommand::List => store.load(),
        VendorsSubcommand::Add { name } => store
            .record(&name)
            .map_err(|error| format!("failed to save recent vendors: {error}"))?,
        VendorsSubcommand::Remove { name } => store
            .remove(&name)
            .map_err(|error| format!("failed to save recent vendors: {error}"))?,
    };

    for name in vendors.iter() {
        println!("{name}");
    }

    Ok(())
}
