// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_relay::config::CommandLineInput;
use notion_relay::search::{format_listing, list_databases};
use notion_relay::webhook::server;
use notion_relay::{
    AppConfig, AppError, Command, CopyReport, DatabaseCopier, NotionHttpClient, NotionRepository,
    WebhookDispatcher,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("notion_relay.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)
        .with_context(|| format!("cannot open log file {}", log_file_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        // connection-level chatter from the HTTP stack
        .logger(Logger::builder().build("hyper", LevelFilter::Warn))
        .logger(Logger::builder().build("reqwest", LevelFilter::Warn))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Runs the resolved command against the live API.
async fn execute(config: AppConfig) -> Result<(), AppError> {
    let repo: Arc<dyn NotionRepository> = Arc::new(NotionHttpClient::new(&config.api_key)?);

    match config.command {
        Command::Copy(copy) => {
            log::info!(
                "Copying database {} into {} ({} mapped properties)",
                copy.source,
                copy.target,
                copy.mapping.len()
            );
            let report = DatabaseCopier::new(repo, copy).copy_database().await?;
            report_copy(&report);
        }
        Command::Serve { relay, server: serve_config } => {
            let dispatcher = Arc::new(WebhookDispatcher::new(repo, relay));
            server::serve(dispatcher, &serve_config).await?;
        }
        Command::Databases => {
            let databases = list_databases(repo.as_ref()).await?;
            if databases.is_empty() {
                println!("No databases are shared with this integration.");
            } else {
                println!("{}", format_listing(&databases));
            }
        }
    }

    Ok(())
}

fn report_copy(report: &CopyReport) {
    println!(
        "📄 {} page(s) read: {} copied, {} skipped, {} failed. {} block(s) copied, {} skipped.",
        report.pages_seen,
        report.created.len(),
        report.skipped.len(),
        report.failed.len(),
        report.blocks_copied,
        report.blocks_skipped
    );
    for (page, reason) in &report.failed {
        eprintln!("❌ {}: {}", page, reason);
    }
    if report.truncated {
        eprintln!("⚠️  The source database has more rows than one query returns; the rest were not copied.");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).context("Failed to initialise logging")?;

    let config = AppConfig::resolve(cli).context("Invalid configuration")?;

    execute(config).await?;

    Ok(())
}
