use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Redis,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" | "in-process" => Ok(BackendKind::Memory),
            "redis" => Ok(BackendKind::Redis),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Settings for building the process-wide default backend
#[derive(Clone, Debug)]
pub struct Settings {
    pub backend: BackendKind,
    pub redis_url: String,
    pub memory_default_ttl: Duration, // used when a caller stores with a zero TTL
    pub memory_sweep_interval: Duration,
    pub memory_max_entries: Option<u64>, // None = unbounded
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            redis_url: Self::DEFAULT_REDIS_URL.to_string(),
            memory_default_ttl: Duration::from_millis(Self::DEFAULT_MEMORY_TTL_MS),
            memory_sweep_interval: Duration::from_millis(Self::DEFAULT_MEMORY_SWEEP_MS),
            memory_max_entries: None,
        }
    }
}

impl Settings {
    const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
    const DEFAULT_MEMORY_TTL_MS: u64 = 10 * 60 * 1000;
    const DEFAULT_MEMORY_SWEEP_MS: u64 = 1000;

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup. Unparsable values
    /// fall back to the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup("REMEMBER_BACKEND") {
            Some(raw) => raw.parse::<BackendKind>().unwrap_or_else(|e| {
                warn!("REMEMBER_BACKEND: {}, using in-process memory", e);
                BackendKind::Memory
            }),
            None => defaults.backend,
        };

        let memory_max_entries = lookup("REMEMBER_MEMORY_MAX_ENTRIES").and_then(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| warn!("REMEMBER_MEMORY_MAX_ENTRIES='{}' is not a number, ignoring", raw))
                .ok()
        });

        Self {
            backend,
            redis_url: lookup("REMEMBER_REDIS_URL").unwrap_or(defaults.redis_url),
            memory_default_ttl: millis(
                &lookup,
                "REMEMBER_MEMORY_TTL_MS",
                Self::DEFAULT_MEMORY_TTL_MS,
            ),
            memory_sweep_interval: millis(
                &lookup,
                "REMEMBER_MEMORY_SWEEP_MS",
                Self::DEFAULT_MEMORY_SWEEP_MS,
            ),
            memory_max_entries,
        }
    }
}

fn millis<F>(lookup: &F, name: &str, default_ms: u64) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let ms = match lookup(name) {
        Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
            warn!("{}='{}' is not a number of milliseconds, using {}", name, raw, default_ms);
            default_ms
        }),
        None => default_ms,
    };
    Duration::from_millis(ms)
}
