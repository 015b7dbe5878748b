//! # Node Configuration
//!
//! Defaults overridden by `TL_*` environment variables. The listen address
//! may also be given as the first command-line argument.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tl_02_sequencer::SequencerConfig;
use tl_04_block_cache::CacheConfig;
use tl_05_ledger_service::LedgerConfig;

pub const DEFAULT_LISTEN_ADDR: &str = "localhost:9090";

pub const DEFAULT_ETCD_ENDPOINTS: [&str; 3] =
    ["127.0.0.1:2379", "127.0.0.1:22379", "127.0.0.1:32379"];

/// Which coordination store to run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Etcd { endpoints: Vec<String> },
    /// Process-local store; replicas cannot share it.
    Memory,
}

impl Default for StoreBackend {
    fn default() -> Self {
        if cfg!(feature = "etcd") {
            Self::Etcd {
                endpoints: DEFAULT_ETCD_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            }
        } else {
            Self::Memory
        }
    }
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// HTTP endpoint, `host:port`.
    pub listen_addr: String,
    pub store: StoreBackend,
    /// Deadline for every store operation.
    pub store_timeout: Duration,
    pub ledger: LedgerConfig,
    /// If set, the block cache is written here on shutdown.
    pub dump_dir: Option<PathBuf>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            store: StoreBackend::default(),
            store_timeout: tl_01_coordination_store::DEFAULT_OPERATION_TIMEOUT,
            ledger: LedgerConfig::default(),
            dump_dir: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not valid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Ledger(#[from] tl_05_ledger_service::LedgerError),
}

impl NodeConfig {
    /// Load configuration from the process environment and arguments.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(std::env::args().nth(1), |var| std::env::var(var).ok())
    }

    /// Build a configuration from an optional listen address argument and an
    /// environment lookup.
    pub fn load(
        listen_arg: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = listen_arg.or_else(|| env("TL_LISTEN_ADDR")) {
            config.listen_addr = addr;
        }

        if let Some(backend) = env("TL_STORE") {
            config.store = match backend.as_str() {
                "etcd" => StoreBackend::Etcd {
                    endpoints: DEFAULT_ETCD_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
                },
                "memory" => StoreBackend::Memory,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "TL_STORE",
                        value: backend,
                        reason: "expected `etcd` or `memory`".into(),
                    })
                }
            };
        }
        if let Some(list) = env("TL_ETCD_ENDPOINTS") {
            let endpoints: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if endpoints.is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: "TL_ETCD_ENDPOINTS",
                    value: list,
                    reason: "no endpoints given".into(),
                });
            }
            match &mut config.store {
                StoreBackend::Etcd { endpoints: current } => *current = endpoints,
                StoreBackend::Memory => {
                    return Err(ConfigError::InvalidValue {
                        var: "TL_ETCD_ENDPOINTS",
                        value: list,
                        reason: "only used with TL_STORE=etcd".into(),
                    })
                }
            }
        }

        if let Some(ms) = parse::<u64>(&env, "TL_STORE_TIMEOUT_MS")? {
            config.store_timeout = Duration::from_millis(ms);
        }
        if let Some(prefix) = env("TL_PREFIX") {
            config.ledger.key_prefix = prefix;
        }
        if let Some(size) = parse::<u64>(&env, "TL_BLOCK_SIZE")? {
            config.ledger.block_size = size;
        }

        let mut sequencer = SequencerConfig::default();
        if let Some(attempts) = parse::<u32>(&env, "TL_MAX_ATTEMPTS")? {
            sequencer.max_attempts = attempts;
        }
        if let Some(ms) = parse::<u64>(&env, "TL_INITIAL_BACKOFF_MS")? {
            sequencer.initial_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(&env, "TL_MAX_BACKOFF_MS")? {
            sequencer.max_backoff = Duration::from_millis(ms);
        }
        config.ledger.sequencer = sequencer;

        let mut cache = CacheConfig::default();
        if let Some(blocks) = parse::<u64>(&env, "TL_REFRESH_BATCH_BLOCKS")? {
            cache.refresh_batch_blocks = blocks;
        }
        config.ledger.cache = cache;

        config.dump_dir = env("TL_DUMP_DIR").map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                var: "TL_STORE_TIMEOUT_MS",
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }
        self.ledger.validate()?;
        Ok(())
    }
}

fn parse<T>(env: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env(var) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => Err(ConfigError::InvalidValue {
                var,
                value,
                reason: e.to_string(),
            }),
        },
    }
}
