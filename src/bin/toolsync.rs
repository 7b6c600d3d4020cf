//! Run one tool sync from the command line.
//!
//! Usage:
//!   toolsync <TENANT_ID> <USER_ID>
//!   RUST_LOG=toolsync=info toolsync acme user_123 --pretty
//!
//! Credentials and endpoints come from the environment (see `Settings`).

use clap::Parser;
use toolsync::{Settings, ToolSync};

#[derive(Parser)]
#[command(name = "toolsync", about = "Sync connected-integration tools into the voice platform")]
struct Cli {
    /// Tenant that owns the integrations
    tenant_id: String,

    /// User whose connections are synced
    user_id: String,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let sync = match Settings::from_env().and_then(|s| ToolSync::from_settings(&s)) {
        Ok(sync) => sync,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let result = sync.sync(&cli.tenant_id, &cli.user_id).await;

    let printed = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };
    match printed {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: failed to encode result: {e}");
            std::process::exit(1);
        }
    }
}
