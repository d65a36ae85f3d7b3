// # azdnsctl - Azure DNS AAAA record host
//
// Thin host around `azdns-core`: it reads settings, initializes logging and
// the runtime, and runs exactly one lifecycle operation against a JSON state
// file. All reconciliation logic lives in `azdns-core`.
//
// ## Configuration
//
// Every setting is a flag with an environment fallback:
//
// ### Azure
// - `ARM_SUBSCRIPTION_ID`: Subscription containing the DNS zone (required)
// - `ARM_ACCESS_TOKEN`: Pre-acquired bearer token
// - `ARM_TENANT_ID` / `ARM_CLIENT_ID` / `ARM_CLIENT_SECRET`: Service principal
// - `ARM_ENDPOINT`: Resource Manager endpoint (default: public cloud)
//
// ### Behaviour
// - `AZDNS_IMPORT_GUARD`: Refuse to adopt existing record sets on create (default: true)
// - `AZDNS_TIMEOUT_{CREATE,READ,UPDATE,DELETE}_SECS`: Operation deadlines
// - `AZDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export ARM_SUBSCRIPTION_ID=11111111-2222-3333-4444-555555555555
// export ARM_ACCESS_TOKEN=$(az account get-access-token --query accessToken -o tsv)
//
// cat > www.json <<'JSON'
// {"name": "www", "zone_name": "example.com", "resource_group_name": "rg1",
//  "ttl": 300, "records": ["2001:db8::1"]}
// JSON
//
// azdnsctl apply www.json
// azdnsctl read www.json
// azdnsctl delete www.json
// ```

mod commands;
mod settings;
mod state_file;

use anyhow::Result;
use azdns_core::config::ReconcilerConfig;
use azdns_core::AaaaRecordReconciler;
use azdns_provider_azure::AzureRecordSetsClient;
use clap::{Parser, Subcommand};
use settings::SettingsArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum AzdnsExitCode {
    /// Operation completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The lifecycle operation failed
    OperationError = 2,
}

impl From<AzdnsExitCode> for ExitCode {
    fn from(code: AzdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "azdnsctl")]
#[command(about = "Manage an Azure DNS AAAA record set from a JSON state file", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the record set (no ID in the state yet) or update it
    Apply {
        /// State file; rewritten with the observed state
        state: PathBuf,
    },

    /// Refresh the state file from the remote record set
    Read {
        /// State file; its ID is removed if the record set is gone
        state: PathBuf,
    },

    /// Delete the remote record set
    Delete {
        /// State file; its ID is cleared on success
        state: PathBuf,
    },

    /// Adopt an existing record set by resource ID
    Import {
        /// ARM resource ID of the AAAA record set
        id: String,

        /// Write the state here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                AzdnsExitCode::ConfigError.into()
            } else {
                AzdnsExitCode::Success.into()
            };
        }
    };

    let log_level = match cli.settings.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return AzdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AzdnsExitCode::ConfigError.into();
    }

    let config = match cli.settings.reconciler_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration validation error: {:#}", e);
            return AzdnsExitCode::ConfigError.into();
        }
    };

    let reconciler = match build_reconciler(&config) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            error!("Failed to initialize Azure client: {:#}", e);
            return AzdnsExitCode::ConfigError.into();
        }
    };

    debug!(
        "Using Resource Manager endpoint {}",
        cli.settings.effective_endpoint()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AzdnsExitCode::OperationError.into();
        }
    };

    let import_guard = config.features.import_existing_guard;
    rt.block_on(async {
        match run(cli.command, &reconciler, import_guard).await {
            Ok(()) => AzdnsExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                AzdnsExitCode::OperationError
            }
        }
    })
    .into()
}

fn build_reconciler(config: &ReconcilerConfig) -> Result<AaaaRecordReconciler> {
    let client = AzureRecordSetsClient::new(&config.azure)?;
    Ok(AaaaRecordReconciler::new(Arc::new(client), config.timeouts))
}

/// Run one subcommand
async fn run(command: Commands, reconciler: &AaaaRecordReconciler, import_guard: bool) -> Result<()> {
    match command {
        Commands::Apply { state } => commands::apply(reconciler, &state, import_guard).await,
        Commands::Read { state } => commands::read(reconciler, &state).await,
        Commands::Delete { state } => commands::delete(reconciler, &state).await,
        Commands::Import { id, out } => commands::import(reconciler, &id, out.as_deref()).await,
    }
}
