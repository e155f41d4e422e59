use crate::context::Context;
use crate::utils;
use colored::Colorize;

pub async fn handle(
    ctx: &Context,
    product_id: &str,
    artifact_id: &str,
    launch_path_id: &str,
) -> anyhow::Result<()> {
    let params = ctx
        .service
        .describe_provisioning_parameters(
            product_id,
            artifact_id,
            launch_path_id,
            &ctx.credentials,
            ctx.region(),
        )
        .await?;

    if ctx.json {
        return utils::print_json(&params);
    }

    println!(
        "Parameters for {} / {} / {}",
        product_id.cyan(),
        artifact_id.cyan(),
        launch_path_id.cyan()
    );
    println!();

    if params.is_empty() {
        println!("{}", "No parameters required".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:<28} {:<24} {:<16} {:<50}",
            "KEY", "DEFAULT", "TYPE", "DESCRIPTION"
        )
        .bold()
    );
    println!("{}", "─".repeat(118).dimmed());

    for param in &params {
        // NoEcho defaults are secrets
        let default = match (&param.default_value, param.is_no_echo) {
            (Some(_), true) => "****".to_string(),
            (Some(value), false) => value.clone(),
            (None, _) => "-".to_string(),
        };
        println!(
            "{:<28} {:<24} {:<16} {:<50}",
            param.parameter_key.cyan(),
            default,
            param.parameter_type.as_deref().unwrap_or("String"),
            param.description.as_deref().unwrap_or_default().dimmed()
        );
    }

    Ok(())
}
