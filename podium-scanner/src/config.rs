use crate::error::{Result, ScanError};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
pub const DEFAULT_ROOT: &str = "/wiki/Summer_Olympic_Games";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_WORKERS: usize = 8;

fn default_user_agent() -> String {
    format!(
        "Podium/{} (https://github.com/trapdoorsec/podium)",
        env!("CARGO_PKG_VERSION")
    )
}

/// How long fetched documents are kept around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheScope {
    /// Every fetch goes to the network.
    Disabled,
    /// Documents are shared within one query and dropped afterwards.
    Query,
    /// Documents live as long as the source does.
    #[default]
    Session,
}

impl CacheScope {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" | "disabled" => Some(CacheScope::Disabled),
            "query" => Some(CacheScope::Query),
            "session" => Some(CacheScope::Session),
            _ => None,
        }
    }
}

/// Where pages come from and how hard we hit the server.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: Url,
    pub root: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub workers: usize,
    pub cache: CacheScope,
}

impl SourceConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            base_url,
            root: DEFAULT_ROOT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            workers: DEFAULT_WORKERS,
            cache: CacheScope::default(),
        })
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_cache(mut self, cache: CacheScope) -> Self {
        self.cache = cache;
        self
    }

    /// Absolute locator of the page every query starts from.
    pub fn root_locator(&self) -> Result<String> {
        self.resolve(&self.root)
            .ok_or_else(|| ScanError::InvalidUrl(format!("Invalid root page: {}", self.root)))
    }

    /// Resolve an href found in a page against the base URL.
    ///
    /// Returns `None` for hrefs that can never name a document: empty,
    /// fragment-only, `javascript:`, `mailto:` and `tel:` links.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty()
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with('#')
        {
            return None;
        }

        let mut url = self.base_url.join(href).ok()?;
        url.set_fragment(None);

        Some(url.to_string())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            root: DEFAULT_ROOT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            workers: DEFAULT_WORKERS,
            cache: CacheScope::default(),
        }
    }
}
