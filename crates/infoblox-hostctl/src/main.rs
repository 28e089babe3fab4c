// # infoblox-hostctl - Infoblox host record lifecycle runner
//
// A THIN integration layer over infoblox-core: no WAPI, mapping or
// classification logic lives here.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Building the HTTP transport, state store and lifecycle engine
// 4. Running one action and mapping the result to an exit code
//
// ## Usage
//
// ```bash
// infoblox-hostctl <plan|apply|refresh|destroy>
// ```
//
// ## Configuration
//
// ### Connection
// - `INFOBLOX_USER`, `INFOBLOX_PASSWORD`, `INFOBLOX_SERVER`: required
// - `INFOBLOX_PROTOCOL`: https (default) or http
// - `INFOBLOX_VERSION`: WAPI version, at least 1.2.1 (default 1.2.1)
// - `INFOBLOX_ALLOW_UNVERIFIED_SSL`: skip TLS verification (default false)
// - `INFOBLOX_TIMEOUT`: per-request timeout in seconds (default 30)
//
// ### Record
// - `INFOBLOX_RECORD_DOMAIN`: zone, e.g. example.com (plan/apply)
// - `INFOBLOX_RECORD_NAME`: subdomain, empty for the zone apex
// - `INFOBLOX_RECORD_IPV4`: address or `func:nextavailableip:<cidr>` (plan/apply)
// - `INFOBLOX_RECORD_TTL`: TTL in seconds (default 600)
// - `INFOBLOX_RECORD_ADDRESS`: state key (default: the record's fqdn, or the
//   domain for the zone apex)
//
// ### Runner
// - `INFOBLOX_STATE_PATH`: state file (default infoblox-state.json)
// - `INFOBLOX_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export INFOBLOX_USER=admin
// export INFOBLOX_PASSWORD=secret
// export INFOBLOX_SERVER=gm.example.com
// export INFOBLOX_VERSION=2.7.0
// export INFOBLOX_RECORD_DOMAIN=example.com
// export INFOBLOX_RECORD_NAME=www
// export INFOBLOX_RECORD_IPV4=10.0.0.5
//
// infoblox-hostctl apply
// ```

use anyhow::{Context, Result};
use infoblox_core::host_record::{DEFAULT_TTL, join_fqdn};
use infoblox_core::{
    ApplyOutcome, ClientConfig, DesiredRecord, FileStateStore, HostRecordResource,
    LifecycleEngine, ProviderConfig,
};
use infoblox_wapi_http::HttpTransport;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const ENV_RECORD_DOMAIN: &str = "INFOBLOX_RECORD_DOMAIN";
const ENV_RECORD_NAME: &str = "INFOBLOX_RECORD_NAME";
const ENV_RECORD_IPV4: &str = "INFOBLOX_RECORD_IPV4";
const ENV_RECORD_TTL: &str = "INFOBLOX_RECORD_TTL";
const ENV_RECORD_ADDRESS: &str = "INFOBLOX_RECORD_ADDRESS";
const ENV_STATE_PATH: &str = "INFOBLOX_STATE_PATH";
const ENV_LOG_LEVEL: &str = "INFOBLOX_LOG_LEVEL";

const DEFAULT_STATE_PATH: &str = "infoblox-state.json";

/// Exit codes for different termination scenarios
///
/// - 0: Action completed
/// - 1: Usage or configuration error (nothing was sent to the server)
/// - 2: Runtime error (the action failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostctlExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<HostctlExitCode> for ExitCode {
    fn from(code: HostctlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// The lifecycle action to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Plan,
    Apply,
    Refresh,
    Destroy,
}

impl Action {
    /// Whether the action needs the full record declaration
    fn needs_record(&self) -> bool {
        matches!(self, Action::Plan | Action::Apply)
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plan" => Ok(Action::Plan),
            "apply" => Ok(Action::Apply),
            "refresh" => Ok(Action::Refresh),
            "destroy" => Ok(Action::Destroy),
            other => anyhow::bail!(
                "Unknown action '{}'. Valid actions: plan, apply, refresh, destroy",
                other
            ),
        }
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    provider: ProviderConfig,
    record: Option<DesiredRecord>,
    address: String,
    state_path: PathBuf,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env(action: Action) -> Result<Self> {
        Self::from_lookup(action, |key| env::var(key).ok())
    }

    fn from_lookup<F>(action: Action, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = ProviderConfig::from_lookup(&lookup)?;

        let domain = lookup(ENV_RECORD_DOMAIN).filter(|v| !v.is_empty());
        let name = lookup(ENV_RECORD_NAME).unwrap_or_default();

        let record = match (action.needs_record(), domain.as_deref()) {
            (false, _) => None,
            (true, None) => anyhow::bail!(
                "{} is required for {:?}. Set it via: export {}=example.com",
                ENV_RECORD_DOMAIN,
                action,
                ENV_RECORD_DOMAIN
            ),
            (true, Some(domain)) => {
                let ipv4 = lookup(ENV_RECORD_IPV4)
                    .filter(|v| !v.is_empty())
                    .with_context(|| format!("{} is required for {:?}", ENV_RECORD_IPV4, action))?;
                let ttl = match lookup(ENV_RECORD_TTL) {
                    Some(raw) => raw.trim().parse().with_context(|| {
                        format!("{} must be a whole number of seconds. Got: {}", ENV_RECORD_TTL, raw)
                    })?,
                    None => DEFAULT_TTL,
                };
                Some(DesiredRecord::new(domain, name.clone(), ipv4).with_ttl(ttl))
            }
        };

        let address = match lookup(ENV_RECORD_ADDRESS).filter(|v| !v.is_empty()) {
            Some(address) => address,
            None => match domain.as_deref() {
                Some(domain) if name.is_empty() => domain.to_string(),
                Some(domain) => join_fqdn(&name, domain),
                None => anyhow::bail!(
                    "{} or {} is required to identify the record",
                    ENV_RECORD_ADDRESS,
                    ENV_RECORD_DOMAIN
                ),
            },
        };

        Ok(Self {
            provider,
            record,
            address,
            state_path: lookup(ENV_STATE_PATH)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string())
                .into(),
            log_level: lookup(ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.provider.validate()?;

        if let Some(record) = &self.record {
            record.validate()?;
        }

        parse_log_level(&self.log_level)?;

        Ok(())
    }
}

fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            ENV_LOG_LEVEL,
            raw
        ),
    }
}

fn main() -> ExitCode {
    let action = match env::args().nth(1) {
        Some(raw) => match raw.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("Usage: infoblox-hostctl <plan|apply|refresh|destroy>");
                return HostctlExitCode::ConfigError.into();
            }
        },
        None => {
            eprintln!("Usage: infoblox-hostctl <plan|apply|refresh|destroy>");
            return HostctlExitCode::ConfigError.into();
        }
    };

    // Load configuration from environment
    let config = match Config::from_env(action) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HostctlExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return HostctlExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HostctlExitCode::ConfigError.into();
    }

    // Version gate and client configuration
    let client = match config.provider.configure() {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return HostctlExitCode::ConfigError.into();
        }
    };

    info!("infoblox-hostctl {:?} {} via {}", action, config.address, client.endpoint);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HostctlExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(action, &config, &client).await {
            Ok(()) => HostctlExitCode::Success,
            Err(e) => {
                error!("{:?} failed: {:#}", action, e);
                HostctlExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run one action against the server
async fn run(action: Action, config: &Config, client: &ClientConfig) -> Result<()> {
    let transport = HttpTransport::new(client)?;
    let store = FileStateStore::new(&config.state_path)
        .await
        .with_context(|| format!("opening state file {}", config.state_path.display()))?;
    let engine = LifecycleEngine::new(
        HostRecordResource::new(Arc::new(transport)),
        Box::new(store),
    );

    let address = config.address.as_str();
    match (action, &config.record) {
        (Action::Plan, Some(record)) => {
            let plan = engine.plan(address, record).await?;
            println!("{}: {}", address, plan);
        }
        (Action::Apply, Some(record)) => {
            let outcome = engine.apply(address, record).await?;
            let verb = match &outcome {
                ApplyOutcome::Created(_) => "created",
                ApplyOutcome::Updated(_) => "updated",
                ApplyOutcome::Replaced(_) => "replaced",
                ApplyOutcome::Unchanged(_) => "unchanged",
            };
            let state = outcome.state();
            println!(
                "{}: {} {} -> {} (ttl {}, ref {})",
                address, verb, state.fqdn, state.ipv4, state.ttl, state.id
            );
        }
        (Action::Refresh, _) => match engine.refresh(address).await? {
            Some(state) => println!(
                "{}: {} -> {} (ttl {}, view {}, ref {})",
                address, state.fqdn, state.ipv4, state.ttl, state.view, state.id
            ),
            None => println!("{}: not tracked", address),
        },
        (Action::Destroy, _) => {
            if engine.destroy(address).await? {
                println!("{}: destroyed", address);
            } else {
                println!("{}: not tracked", address);
            }
        }
        (Action::Plan | Action::Apply, None) => {
            anyhow::bail!("{:?} requires a record declaration", action)
        }
    }

    Ok(())
}
