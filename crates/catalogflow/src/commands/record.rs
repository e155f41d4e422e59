use crate::context::Context;
use crate::utils;
use colored::Colorize;

pub async fn handle(ctx: &Context, record_id: &str) -> anyhow::Result<()> {
    let record = ctx
        .service
        .describe_record_details(record_id, &ctx.credentials, ctx.region())
        .await?;

    if ctx.json {
        return utils::print_json(&record);
    }

    utils::print_record_detail(&record.record_detail);

    println!();
    if record.record_outputs.is_empty() {
        println!("{}", "No outputs".dimmed());
        return Ok(());
    }

    println!("{}", format!("{:<30} {:<60}", "OUTPUT", "VALUE").bold());
    println!("{}", "─".repeat(90).dimmed());
    for output in &record.record_outputs {
        println!(
            "{:<30} {:<60}",
            output.output_key.as_deref().unwrap_or("-").cyan(),
            output.output_value.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}
