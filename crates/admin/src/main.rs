//! `sampleshop-admin`: back-office command line.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use sampleshop_admin::{Model, ProductResource, changelist, prepare, site};
use sampleshop_infra::{Shop, ShopConfig, schema};

#[derive(Parser)]
#[command(name = "sampleshop-admin")]
#[command(about = "Back-office tool for the sample shop catalog")]
#[command(version)]
struct Cli {
    /// JSON fixture to load through the validating write path first
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered models and their list layout
    Models,

    /// Print the Postgres schema
    Schema,

    /// Create missing tables in the configured database
    Migrate,

    /// Print a model's changelist
    Changelist {
        #[arg(value_enum)]
        model: Model,
    },

    /// Export products as CSV
    ExportProducts {
        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    sampleshop_observability::init();

    let cli = Cli::parse();

    if let Commands::Schema = cli.command {
        println!("{}", schema::ddl());
        return Ok(());
    }
    if let Commands::Models = cli.command {
        print_models();
        return Ok(());
    }

    let config = ShopConfig::from_env()?;
    let shop = Shop::connect(&config)
        .await
        .context("failed to open the shop backend")?;

    let migrate = matches!(cli.command, Commands::Migrate);
    prepare(&shop, migrate, cli.fixture.as_deref())
        .await
        .context("failed to prepare the shop backend")?;

    match cli.command {
        Commands::Changelist { model } => {
            let list = changelist(&shop, model).await?;
            println!("{}", list.to_table());
        }
        Commands::ExportProducts { out } => {
            let count = match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    ProductResource::export(&shop, file).await?
                }
                None => ProductResource::export(&shop, io::stdout().lock()).await?,
            };
            tracing::info!(count, "export finished");
        }
        Commands::Models | Commands::Schema | Commands::Migrate => {}
    }

    Ok(())
}

fn print_models() {
    let mut stdout = io::stdout().lock();
    for admin in site().models() {
        let cli_name = admin
            .model
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_else(|| admin.model.name().to_string());
        let _ = writeln!(
            stdout,
            "{cli_name}\tdisplay={}\teditable={}\tordering={}",
            admin.list_display.join(","),
            admin.list_editable.join(","),
            admin.ordering.join(","),
        );
    }
}
