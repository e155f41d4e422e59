use crate::context::Context;
use crate::utils;
use catalogflow_catalog::{ProvisionRequest, ProvisioningParameterValue};
use colored::Colorize;

pub async fn handle(
    ctx: &Context,
    product_id: String,
    artifact_id: String,
    launch_path_id: String,
    name: String,
    params: Vec<ProvisioningParameterValue>,
    token: Option<String>,
) -> anyhow::Result<()> {
    if !ctx.json {
        println!(
            "{}",
            format!("Provisioning '{}' from product {}...", name, product_id).yellow()
        );
    }

    let mut request =
        ProvisionRequest::new(product_id, artifact_id, launch_path_id, name).with_params(params);
    if let Some(token) = token {
        request = request.with_provision_token(token);
    }

    let record = ctx
        .service
        .provision_product(request, &ctx.credentials, ctx.region())
        .await?;

    if ctx.json {
        return utils::print_json(&record);
    }

    println!();
    println!("{}", "✓ Provisioning request accepted".green().bold());
    utils::print_record_detail(&record);
    println!();
    println!("Follow progress with: catalog record {}", record.record_id);
    Ok(())
}
