mod commands;
mod context;
mod utils;

use catalogflow_catalog::ProvisioningParameterValue;
use clap::{Parser, Subcommand};
use context::Context;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Browse and provision AWS Service Catalog products", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Region to talk to (overrides config and environment)
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with their artifacts and launch paths
    Products,
    /// Show the parameters needed to provision a product
    Params {
        /// Product ID
        product: String,
        /// Provisioning artifact ID
        artifact: String,
        /// Launch path ID
        path: String,
    },
    /// Provision a product
    Provision {
        /// Product ID
        product: String,
        /// Provisioning artifact ID
        artifact: String,
        /// Launch path ID
        path: String,
        /// Name of the provisioned product
        name: String,
        /// Provisioning parameter (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = utils::parse_param)]
        params: Vec<ProvisioningParameterValue>,
        /// Idempotency token (a fresh one is generated when omitted)
        #[arg(long)]
        token: Option<String>,
    },
    /// List provisioned products
    Provisioned {
        /// Fetch a single page starting at this token
        #[arg(long)]
        page_token: Option<String>,
    },
    /// Terminate a provisioned product
    Terminate {
        /// Name of the provisioned product
        name: String,
        /// Idempotency token for the termination
        token: String,
    },
    /// Show a provisioning record and its outputs
    Record {
        /// Record ID
        id: String,
    },
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "catalogflow=debug,catalogflow_catalog=debug,catalogflow_config=debug,warn"
    } else {
        "error"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries command output, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Version needs neither config nor credentials
    if matches!(cli.command, Commands::Version) {
        println!("catalogflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let ctx = Context::load(cli.region, cli.json).await?;

    match cli.command {
        Commands::Products => {
            commands::products::handle(&ctx).await?;
        }
        Commands::Params {
            product,
            artifact,
            path,
        } => {
            commands::params::handle(&ctx, &product, &artifact, &path).await?;
        }
        Commands::Provision {
            product,
            artifact,
            path,
            name,
            params,
            token,
        } => {
            commands::provision::handle(&ctx, product, artifact, path, name, params, token)
                .await?;
        }
        Commands::Provisioned { page_token } => {
            commands::provisioned::handle(&ctx, page_token.as_deref()).await?;
        }
        Commands::Terminate { name, token } => {
            commands::terminate::handle(&ctx, &name, &token).await?;
        }
        Commands::Record { id } => {
            commands::record::handle(&ctx, &id).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_provision_with_params() {
        let cli = Cli::try_parse_from([
            "catalog", "provision", "p1", "a1", "lp1", "web", "-p", "Size=small", "--param",
            "Env=dev", "--token", "tok-1", "--region", "eu-west-1",
        ])
        .unwrap();

        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        match cli.command {
            Commands::Provision {
                name,
                params,
                token,
                ..
            } => {
                assert_eq!(name, "web");
                assert_eq!(
                    params,
                    vec![
                        ProvisioningParameterValue::new("Size", "small"),
                        ProvisioningParameterValue::new("Env", "dev"),
                    ]
                );
                assert_eq!(token.as_deref(), Some("tok-1"));
            }
            _ => panic!("expected provision"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["catalog", "products", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Products));
    }

    #[test]
    fn test_terminate_requires_token() {
        assert!(Cli::try_parse_from(["catalog", "terminate", "web"]).is_err());
    }
}
