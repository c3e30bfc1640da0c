use bakehouse_app::{config::AppConfig, context::AppContext};

#[expect(clippy::print_stdout, reason = "Command output to user")]
pub(crate) async fn run(config: &AppConfig) -> Result<(), String> {
    let context = AppContext::from_config(&config.api)
        .map_err(|error| format!("failed to initialise API client: {error}"))?;

    let methods = context
        .payment_methods
        .list_active()
        .await
        .map_err(|error| format!("failed to list payment methods: {error}"))?;

    if methods.is_empty() {
        println!("no active payment methods");
    }

    for method in methods {
        println!("{}\t{}", method.id, method.name);
    }

    Ok(())
}
