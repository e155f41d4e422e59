use crate::context::Context;
use crate::utils;
use catalogflow_catalog::ProvisionedProductAttribute;
use colored::Colorize;

pub async fn handle(ctx: &Context, page_token: Option<&str>) -> anyhow::Result<()> {
    let (products, next_page_token) = match page_token {
        Some(token) => {
            let page = ctx
                .service
                .search_provisioned_products_page(Some(token), &ctx.credentials, ctx.region())
                .await?;
            (page.items, page.next_page_token)
        }
        None => {
            let products = ctx
                .service
                .search_provisioned_products(&ctx.credentials, ctx.region())
                .await?;
            (products, None)
        }
    };

    if ctx.json {
        return utils::print_json(&serde_json::json!({
            "provisionedProducts": products,
            "nextPageToken": next_page_token,
        }));
    }

    if products.is_empty() {
        println!("{}", "No provisioned products".dimmed());
    } else {
        print_table(&products);
    }

    if let Some(token) = next_page_token {
        println!();
        println!(
            "More results: catalog provisioned --page-token {}",
            token.cyan()
        );
    }
    Ok(())
}

fn print_table(products: &[ProvisionedProductAttribute]) {
    println!(
        "{}",
        format!(
            "{:<28} {:<24} {:<18} {:<26} {:<20}",
            "NAME", "ID", "STATUS", "TYPE", "LAST RECORD"
        )
        .bold()
    );
    println!("{}", "─".repeat(120).dimmed());

    for product in products {
        println!(
            "{:<28} {:<24} {:<18} {:<26} {:<20}",
            product.name.cyan(),
            product.id,
            utils::color_provisioned_status(product.status.as_ref()),
            product.product_type.as_deref().unwrap_or("N/A"),
            product.last_record_id.as_deref().unwrap_or("-").dimmed()
        );
        if let Some(message) = product
            .status_message
            .as_deref()
            .filter(|_| product.status.as_ref().is_some_and(|s| s.is_error()))
        {
            println!("  {} {}", "↳".red(), message.red());
        }
    }
}
