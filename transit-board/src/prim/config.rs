//! PRIM client configuration, endpoints and refresh cadences.

use std::fmt;

use tracing::warn;

/// Default base URL of the PRIM marketplace.
pub const DEFAULT_BASE_URL: &str = "https://prim.iledefrance-mobilites.fr/marketplace";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the PRIM client.
#[derive(Debug, Clone)]
pub struct PrimConfig {
    /// API key sent in the `apiKey` header
    pub api_key: String,
    /// Base URL for the API (defaults to production PRIM)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl PrimConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `PRIM_API_KEY` and the optional `PRIM_BASE_URL`,
    /// `PRIM_MAX_CONCURRENT` and `PRIM_TIMEOUT_SECS`.
    ///
    /// A missing key is not fatal: the server still starts and every upstream
    /// call fails with the upstream's own authentication error.
    pub fn from_env() -> Self {
        let api_key = std::env::var("PRIM_API_KEY").unwrap_or_else(|_| {
            warn!("PRIM_API_KEY not set, upstream calls will fail");
            String::new()
        });

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("PRIM_BASE_URL") {
            if !url.trim().is_empty() {
                config = config.with_base_url(url.trim());
            }
        }
        if let Some(n) = env_number::<usize>("PRIM_MAX_CONCURRENT").filter(|n| *n > 0) {
            config = config.with_max_concurrent(n);
        }
        if let Some(secs) = env_number::<u64>("PRIM_TIMEOUT_SECS").filter(|s| *s > 0) {
            config = config.with_timeout(secs);
        }
        config
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// A numeric environment variable; unparseable values are logged and ignored.
fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(name, value = %raw, "ignoring non-numeric setting");
            None
        }
    }
}

/// Upstream capability an URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// SIRI Lite next passages, by stop or by line.
    StopMonitoring,
    /// SIRI Lite messages shown on station screens.
    GeneralMessage,
    /// Navitia line reports, global, per mode or per line.
    LineReports,
    /// Every current disruption at once.
    DisruptionsBulk,
    /// Navitia stop points of one line.
    LineStops,
    /// Place search.
    Places,
}

impl Endpoint {
    /// Stable name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::StopMonitoring => "stop-monitoring",
            Endpoint::GeneralMessage => "general-message",
            Endpoint::LineReports => "line_reports",
            Endpoint::DisruptionsBulk => "disruptions_bulk",
            Endpoint::LineStops => "stop_points",
            Endpoint::Places => "places",
        }
    }

    /// Classify a request URL back to its endpoint.
    pub fn from_url(url: &str) -> Option<Self> {
        // Path only; query strings may contain anything
        let path = url.split('?').next().unwrap_or(url);
        if path.ends_with("/stop-monitoring") {
            Some(Endpoint::StopMonitoring)
        } else if path.ends_with("/general-message") {
            Some(Endpoint::GeneralMessage)
        } else if path.ends_with("/line_reports") {
            Some(Endpoint::LineReports)
        } else if path.ends_with("/disruptions_bulk") {
            Some(Endpoint::DisruptionsBulk)
        } else if path.ends_with("/stop_points") {
            Some(Endpoint::LineStops)
        } else if path.ends_with("/places") {
            Some(Endpoint::Places)
        } else {
            None
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How long a response stays fresh, then how long it may be served stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh {
    /// Seconds a response is considered fresh.
    pub server_revalidate: u64,
    /// Seconds a stale response may still be served while refreshing.
    pub swr: u64,
}

impl Refresh {
    pub const fn new(server_revalidate: u64, swr: u64) -> Self {
        Self {
            server_revalidate,
            swr,
        }
    }

    /// `Cache-Control` header value for responses built from this endpoint.
    pub fn cache_control(self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.server_revalidate, self.swr
        )
    }
}

/// Refresh cadence of every endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshIntervals {
    pub stop_monitoring: Refresh,
    pub line_reports: Refresh,
    pub general_message: Refresh,
    pub disruptions_bulk: Refresh,
    pub line_stops: Refresh,
    pub search: Refresh,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            stop_monitoring: Refresh::new(30, 15),
            line_reports: Refresh::new(60, 30),
            general_message: Refresh::new(60, 30),
            disruptions_bulk: Refresh::new(120, 60),
            line_stops: Refresh::new(86_400, 3_600),
            search: Refresh::new(300, 60),
        }
    }
}

impl RefreshIntervals {
    pub fn for_endpoint(&self, endpoint: Endpoint) -> Refresh {
        match endpoint {
            Endpoint::StopMonitoring => self.stop_monitoring,
            Endpoint::GeneralMessage => self.general_message,
            Endpoint::LineReports => self.line_reports,
            Endpoint::DisruptionsBulk => self.disruptions_bulk,
            Endpoint::LineStops => self.line_stops,
            Endpoint::Places => self.search,
        }
    }
}
