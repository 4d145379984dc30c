//! Observability (logging and tracing)
//!
//! Every attachment operation emits `tracing` events (`table`, `disk` and
//! `path` fields). This module installs a subscriber for applications that
//! do not bring their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the defaults for the current build
///
/// Sets up:
/// - Structured logging with JSON formatting (release) or pretty formatting (debug)
/// - Environment-based log level filtering (`RUST_LOG`)
///
/// # Example
///
/// ```rust,no_run
/// use acton_files::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    init_with(&ObservabilityConfig::default())
}

/// Initialize logging with explicit settings
///
/// `RUST_LOG` still wins over the configured default filter.
pub fn init_with(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).try_init()?;
    }

    Ok(())
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self {
                default_filter: "debug,acton_files=trace".to_string(),
                json: false,
            }
        } else {
            Self {
                default_filter: "info".to_string(),
                json: true,
            }
        }
    }
}

impl ObservabilityConfig {
    /// Create config with a default filter directive
    pub fn new(default_filter: impl Into<String>) -> Self {
        Self {
            default_filter: default_filter.into(),
            ..Default::default()
        }
    }

    /// Emit JSON lines
    #[must_use]
    pub const fn with_json(mut self) -> Self {
        self.json = true;
        self
    }
}
