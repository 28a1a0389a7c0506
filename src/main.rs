use clap::{Parser, Subcommand};
use liqpay_gateway::application::provider::{LiqPayProvider, ProviderDeps};
use liqpay_gateway::config::LiqPayConfig;
use liqpay_gateway::domain::envelope::{Fields, PayloadCodec};
use liqpay_gateway::infrastructure::http::ReqwestTransport;
use liqpay_gateway::infrastructure::in_memory::{
    InMemoryTransactionManager, InMemoryTransactionRegistrar,
};
use liqpay_gateway::interfaces::csv::callback_reader::CallbackReader;
use liqpay_gateway::interfaces::csv::invoice_writer::InvoiceWriter;
use liqpay_gateway::interfaces::order_file::OrderDocument;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Merchant configuration (TOML)
    #[arg(long, short)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a JSON field map and print the envelope
    Sign { fields: PathBuf },
    /// Build a checkout action for a JSON order document
    Checkout { order: PathBuf },
    /// Authenticate one URL-encoded callback body and print its invoices
    Callback { body: PathBuf },
    /// Replay captured callbacks (CSV with data,signature) and print invoices as CSV
    Replay { input: PathBuf },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = LiqPayConfig::from_path(&cli.config).into_diagnostic()?;

    let registrar = InMemoryTransactionRegistrar::new();
    let manager = InMemoryTransactionManager::with_registrar(registrar.clone());
    let provider = LiqPayProvider::new(
        config,
        ProviderDeps {
            registrar: Arc::new(registrar),
            manager: Arc::new(manager.clone()),
            transport: Arc::new(ReqwestTransport::new().into_diagnostic()?),
            observer: None,
        },
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Sign { fields } => {
            let source = std::fs::read_to_string(fields).into_diagnostic()?;
            let fields: Fields = serde_json::from_str(&source).into_diagnostic()?;
            let envelope = PayloadCodec::new(provider.config().private_key.clone())
                .encode(&fields)
                .into_diagnostic()?;
            serde_json::to_writer_pretty(&mut out, &envelope).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
        }
        Command::Checkout { order } => {
            let order = OrderDocument::from_path(order).into_diagnostic()?;
            let action = provider
                .create_payment(&order, order.options(), None)
                .await
                .into_diagnostic()?;
            serde_json::to_writer_pretty(&mut out, &action).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
        }
        Command::Callback { body } => {
            let body = std::fs::read(body).into_diagnostic()?;
            let invoices = provider.callbacks().handle(body.trim_ascii()).into_diagnostic()?;
            for invoice in invoices {
                serde_json::to_writer(&mut out, &invoice).into_diagnostic()?;
                writeln!(out).into_diagnostic()?;
            }
        }
        Command::Replay { input } => {
            let file = File::open(input).into_diagnostic()?;
            let reader = CallbackReader::new(file);
            for callback in reader.callbacks() {
                match callback {
                    Ok(cb) => {
                        if let Err(e) = provider.callback_envelope(&cb.data, &cb.signature).await
                            && !e.is_rejection()
                        {
                            warn!(error = %e, "callback not processed");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "error reading callback");
                    }
                }
            }

            let invoices = manager.into_invoices().await;
            let mut writer = InvoiceWriter::new(out);
            writer.write_invoices(invoices).into_diagnostic()?;
        }
    }

    Ok(())
}
