use catalogflow_catalog::{ProvisionedProductStatus, ProvisioningParameterValue, RecordDetail, RecordStatus};
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Parse a `KEY=VALUE` provisioning parameter. The value may contain `=`.
pub fn parse_param(s: &str) -> Result<ProvisioningParameterValue, String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok(ProvisioningParameterValue::new(key.trim(), value))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn color_provisioned_status(status: Option<&ProvisionedProductStatus>) -> ColoredString {
    match status {
        Some(s) if s.is_available() => s.as_str().green(),
        Some(s) if s.is_error() => s.as_str().red(),
        Some(s) if s.is_in_progress() => s.as_str().yellow(),
        Some(s) => s.as_str().normal(),
        None => "N/A".dimmed(),
    }
}

pub fn color_record_status(status: Option<&RecordStatus>) -> ColoredString {
    match status {
        Some(RecordStatus::Succeeded) => "SUCCEEDED".green(),
        Some(s @ (RecordStatus::Failed | RecordStatus::InProgressInError)) => s.as_str().red(),
        Some(s @ (RecordStatus::Created | RecordStatus::InProgress)) => s.as_str().yellow(),
        Some(s) => s.as_str().normal(),
        None => "N/A".dimmed(),
    }
}

/// Print the fields of a record returned by provision / terminate / record
pub fn print_record_detail(record: &RecordDetail) {
    println!("  Record ID:  {}", record.record_id.cyan());
    println!("  Status:     {}", color_record_status(record.status.as_ref()));
    if let Some(record_type) = &record.record_type {
        println!("  Type:       {}", record_type);
    }
    if let Some(name) = &record.provisioned_product_name {
        println!("  Name:       {}", name);
    }
    if let Some(id) = &record.provisioned_product_id {
        println!("  Instance:   {}", id);
    }
    if let Some(created) = &record.created_time {
        println!("  Created:    {}", created.to_rfc3339());
    }
    for error in &record.record_errors {
        println!(
            "  {} {}: {}",
            "✗".red(),
            error.code.as_deref().unwrap_or("Error").red(),
            error.description.as_deref().unwrap_or_default()
        );
    }
}
