// # ipsyncd - IP sync daemon
//
// Thin integration layer only: reads configuration from environment
// variables, wires up the OVH zone client and the HTTP resolver, and runs
// the reconciliation loop from ipsync-core. No sync logic lives here.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Required
// - `DOMAIN`: the managed domain (apex records are created under it)
// - `OVH_APP_KEY` / `OVH_APP_SECRET` / `OVH_CONSUMER_KEY`: OVH credentials
// - `TIME_INTERVAL`: seconds between reconciliation ticks
//
// ### Optional
// - `OVH_ENDPOINT`: endpoint alias or base URL (default: ovh-eu)
// - `IPSYNC_LOG_LEVEL`: trace|debug|info|warn|error (default: info)
// - `IPSYNC_IPV4_URL` / `IPSYNC_IPV6_URL`: echo-service URL overrides
//
// ## Example
//
// ```bash
// export DOMAIN=example.com
// export OVH_ENDPOINT=ovh-eu
// export OVH_APP_KEY=...
// export OVH_APP_SECRET=...
// export OVH_CONSUMER_KEY=...
// export TIME_INTERVAL=300
//
// ipsyncd
// ```

use anyhow::Result;
use ipsync_core::{Driver, ProviderConfig, Reconciler, ResolverConfig, SyncConfig, ZoneClient};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    domain: String,
    interval_secs: u64,
    ovh_endpoint: String,
    ovh_app_key: String,
    ovh_app_secret: String,
    ovh_consumer_key: String,
    ipv4_url: Option<String>,
    ipv6_url: Option<String>,
    log_level: String,
}

/// Read a required environment variable, rejecting empty values
fn require_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("{} environment variable is required", key),
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let interval = require_env("TIME_INTERVAL")?;
        let interval_secs: u64 = interval
            .parse()
            .map_err(|_| anyhow::anyhow!("TIME_INTERVAL must be an integer number of seconds, got '{}'", interval))?;

        Ok(Self {
            domain: require_env("DOMAIN")?,
            interval_secs,
            ovh_endpoint: env::var("OVH_ENDPOINT").unwrap_or_else(|_| "ovh-eu".to_string()),
            ovh_app_key: require_env("OVH_APP_KEY")?,
            ovh_app_secret: require_env("OVH_APP_SECRET")?,
            ovh_consumer_key: require_env("OVH_CONSUMER_KEY")?,
            ipv4_url: env::var("IPSYNC_IPV4_URL").ok(),
            ipv6_url: env::var("IPSYNC_IPV6_URL").ok(),
            log_level: env::var("IPSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain)?;

        if self.interval_secs == 0 {
            anyhow::bail!("TIME_INTERVAL must be at least 1 second");
        }
        if self.interval_secs > 86_400 {
            anyhow::bail!(
                "TIME_INTERVAL must be at most 86400 seconds (one day). Got: {}",
                self.interval_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "IPSYNC_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        for url in [&self.ipv4_url, &self.ipv6_url].into_iter().flatten() {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                anyhow::bail!("echo-service URL must use HTTP or HTTPS scheme. Got: {}", url);
            }
        }

        Ok(())
    }

    /// Build the core sync configuration
    fn to_sync_config(&self) -> SyncConfig {
        let ResolverConfig::Http {
            ipv4_url: default_v4,
            ipv6_url: default_v6,
        } = ResolverConfig::default();

        SyncConfig {
            domain: self.domain.clone(),
            interval_secs: self.interval_secs,
            families: ipsync_core::AddressFamily::ALL.to_vec(),
            provider: ProviderConfig::Ovh {
                endpoint: self.ovh_endpoint.clone(),
                application_key: self.ovh_app_key.clone(),
                application_secret: self.ovh_app_secret.clone(),
                consumer_key: self.ovh_consumer_key.clone(),
            },
            resolver: ResolverConfig::Http {
                ipv4_url: self.ipv4_url.clone().unwrap_or(default_v4),
                ipv6_url: self.ipv6_url.clone().unwrap_or(default_v6),
            },
        }
    }
}

/// Validate that a string is a valid domain name
///
/// Basic DNS domain name validation per RFC 1035. Not comprehensive, but
/// catches common mistakes before the first API call does.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("DOMAIN cannot be empty");
    }

    if domain.len() > 253 {
        anyhow::bail!("domain name too long: {} chars (max 253)", domain.len());
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("domain name has empty label: '{}'", domain);
        }
        if label.len() > 63 {
            anyhow::bail!("domain label too long: {} chars (max 63). Label: '{}'", label.len(), label);
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            anyhow::bail!(
                "domain label contains invalid characters. Label: '{}'. Valid: alphanumeric and hyphen only.",
                label
            );
        }
        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!("domain label cannot start or end with hyphen. Label: '{}'", label);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    info!("Starting ipsyncd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => SyncExitCode::CleanShutdown,
            Err(DaemonError::Startup(e)) => {
                error!("Startup error: {}", e);
                SyncExitCode::ConfigError
            }
            Err(DaemonError::Runtime(e)) => {
                error!("Daemon error: {}", e);
                SyncExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Distinguishes startup-time failures (bad config, unreachable provider)
/// from unexpected runtime failures, for exit-code mapping.
enum DaemonError {
    Startup(anyhow::Error),
    Runtime(anyhow::Error),
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<(), DaemonError> {
    let sync_config = config.to_sync_config();
    sync_config
        .validate()
        .map_err(|e| DaemonError::Startup(e.into()))?;

    // Build the OVH zone client and fail fast on bad credentials
    let client = ipsync_provider_ovh::OvhZoneClient::from_config(&sync_config.provider)
        .map_err(|e| DaemonError::Startup(e.into()))?;
    client
        .check_connectivity()
        .await
        .map_err(|e| DaemonError::Startup(anyhow::anyhow!("OVH connectivity check failed: {}", e)))?;
    info!("Successfully established connection to the OVH API");

    let resolver = ipsync_resolver_http::HttpAddressResolver::from_config(&sync_config.resolver)
        .map_err(|e| DaemonError::Startup(e.into()))?;

    let reconciler = Reconciler::new(Arc::new(client), sync_config.domain.clone());
    let mut driver = Driver::with_families(
        Arc::new(resolver),
        reconciler,
        sync_config.families.clone(),
        Duration::from_secs(sync_config.interval_secs),
    );

    // Route SIGTERM/SIGINT into the driver's tick-boundary shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let signal_name = wait_for_shutdown_signal().await;
        info!("Received termination signal: {}", signal_name);
        let _ = shutdown_tx.send(());
    });

    driver
        .run_with_shutdown(shutdown_rx)
        .await
        .map_err(|e| DaemonError::Runtime(e.into()))?;

    info!("Closing program");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> &'static str {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGTERM handler: {}", e);
            // Fall back to ctrl-c only
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGINT handler: {}", e);
            let _ = sigterm.recv().await;
            return "SIGTERM";
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
