use crate::context::Context;
use crate::utils;
use colored::Colorize;

pub async fn handle(ctx: &Context) -> anyhow::Result<()> {
    if !ctx.json {
        println!(
            "{}",
            format!("Searching products in {}...", ctx.effective_region()).blue()
        );
    }

    let listings = ctx
        .service
        .search_products(&ctx.credentials, ctx.region())
        .await?;

    if ctx.json {
        return utils::print_json(&listings);
    }

    println!();
    if listings.is_empty() {
        println!("{}", "No products available".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:<22} {:<30} {:<20} {:<30} {:<30}",
            "PRODUCT ID", "NAME", "OWNER", "ARTIFACTS", "LAUNCH PATHS"
        )
        .bold()
    );
    println!("{}", "─".repeat(132).dimmed());

    for listing in &listings {
        let product = &listing.product;
        let artifacts = listing
            .artifacts
            .iter()
            .map(|a| a.name.as_deref().unwrap_or(&a.id))
            .collect::<Vec<_>>()
            .join(", ");
        let launch_paths = listing
            .launch_paths
            .iter()
            .map(|p| p.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        println!(
            "{:<22} {:<30} {:<20} {:<30} {:<30}",
            product.product_id.cyan(),
            product.name.as_deref().unwrap_or("N/A"),
            product.owner.as_deref().unwrap_or("N/A"),
            artifacts,
            launch_paths.dimmed()
        );
    }

    println!();
    println!("{} product(s)", listings.len());
    Ok(())
}
