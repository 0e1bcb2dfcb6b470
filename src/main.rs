mod cli;
mod commands;
mod mcp;
mod page_set;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output and the MCP transport, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Select {
            expr,
            pages,
            file,
            json,
        } => {
            let total = match (pages, file) {
                (Some(total), _) => total,
                (None, Some(path)) => pdf::PdfDocument::open(&path)?.page_count(),
                (None, None) => anyhow::bail!("Either --pages or --file is required"),
            };
            commands::select::run(&expr, total, json)?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Extract {
            path,
            pages,
            output,
        } => {
            commands::extract::run(&path, &pages, &output, commands::extract::Mode::Keep)?;
        }
        Commands::Remove {
            path,
            pages,
            output,
        } => {
            commands::extract::run(&path, &pages, &output, commands::extract::Mode::Remove)?;
        }
        Commands::Rotate {
            path,
            pages,
            direction,
            output,
        } => {
            commands::rotate::run(&path, &pages, direction, &output)?;
        }
        Commands::Merge {
            inputs,
            omit,
            exclude,
            output,
        } => {
            commands::merge::run(&inputs, &omit, &exclude, &output)?;
        }
        Commands::Text { path, pages } => {
            commands::text::run(&path, pages.as_deref())?;
        }
    }

    Ok(())
}
