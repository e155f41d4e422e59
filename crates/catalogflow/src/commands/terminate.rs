use crate::context::Context;
use crate::utils;
use colored::Colorize;

pub async fn handle(ctx: &Context, name: &str, token: &str) -> anyhow::Result<()> {
    if !ctx.json {
        println!("{}", format!("Terminating '{}'...", name).yellow());
    }

    let record = ctx
        .service
        .terminate_provisioned_product(name, token, &ctx.credentials, ctx.region())
        .await?;

    if ctx.json {
        return utils::print_json(&record);
    }

    println!();
    println!("{}", format!("✓ Termination of '{}' accepted", name).green().bold());
    utils::print_record_detail(&record);
    Ok(())
}
