use crate::config::SourceConfig;
use crate::document::Document;
use crate::error::{Result, ScanError};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Anything that can turn a locator into a parsed page.
#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    async fn fetch(&self, locator: &str) -> Result<Arc<Document>>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for Arc<S> {
    async fn fetch(&self, locator: &str) -> Result<Arc<Document>> {
        (**self).fetch(locator).await
    }
}

/// Fetch a document, logging and swallowing any failure.
pub async fn fetch_or_none<S: DocumentSource + ?Sized>(source: &S, locator: &str) -> Option<Arc<Document>> {
    match source.fetch(locator).await {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!("Couldn't fetch {}: {}", locator, e);
            None
        }
    }
}

/// Pages over HTTP(S).
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .pool_max_idle_per_host(config.workers.max(1))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

impl DocumentSource for HttpSource {
    async fn fetch(&self, locator: &str) -> Result<Arc<Document>> {
        debug!("Fetching {}", locator);

        let start = Instant::now();
        let response = self.client.get(locator).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ScanError::StatusError {
                url: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);
        if !is_html {
            debug!("{} is not labelled text/html, parsing anyway", locator);
        }

        let body = response.text().await?;
        debug!("Fetched {} ({} bytes, {:?})", locator, body.len(), start.elapsed());

        Ok(Arc::new(Document::parse(locator, &body)))
    }
}

/// Pages held in memory, keyed by locator.
#[derive(Default)]
pub struct MemorySource {
    pages: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, locator: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(locator.into(), html.into());
        self
    }

    pub fn insert(&mut self, locator: impl Into<String>, html: impl Into<String>) {
        self.pages.insert(locator.into(), html.into());
    }

    /// How many fetches have been attempted, found or not.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl DocumentSource for MemorySource {
    async fn fetch(&self, locator: &str) -> Result<Arc<Document>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.pages
            .get(locator)
            .map(|html| Arc::new(Document::parse(locator, html)))
            .ok_or_else(|| ScanError::StatusError {
                url: locator.to_string(),
                status: 404,
            })
    }
}

/// Keeps every document fetched through it until [`CachedSource::clear`].
///
/// Failures are not cached. Two concurrent fetches of the same locator may
/// both reach the inner source.
pub struct CachedSource<S> {
    inner: S,
    documents: Mutex<HashMap<String, Arc<Document>>>,
    enabled: bool,
}

impl<S: DocumentSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            documents: Mutex::new(HashMap::new()),
            enabled: true,
        }
    }

    /// A pass-through wrapper that never stores anything.
    pub fn disabled(inner: S) -> Self {
        Self {
            enabled: false,
            ..Self::new(inner)
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn clear(&self) {
        self.documents.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.lock().await.is_empty()
    }
}

impl<S: DocumentSource> DocumentSource for CachedSource<S> {
    async fn fetch(&self, locator: &str) -> Result<Arc<Document>> {
        if !self.enabled {
            return self.inner.fetch(locator).await;
        }

        if let Some(doc) = self.documents.lock().await.get(locator) {
            debug!("Cache hit for {}", locator);
            return Ok(doc.clone());
        }

        let doc = self.inner.fetch(locator).await?;
        self.documents
            .lock()
            .await
            .insert(locator.to_string(), doc.clone());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[tokio::test]
    async fn test_http_source_parses_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/wiki/Judo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(b"<html><body><h2>Medal table</h2></body></html>".as_slice()),
            )
            .mount(&mock_server)
            .await;

        let config = SourceConfig::new(&mock_server.uri()).unwrap();
        let source = HttpSource::new(&config).unwrap();
        let locator = format!("{}/wiki/Judo", mock_server.uri());
        let doc = source.fetch(&locator).await.unwrap();

        assert_eq!(doc.locator(), locator);
        assert_eq!(doc.elements_by_tag("h2").count(), 1);
    }

    #[tokio::test]
    async fn test_http_source_reports_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/wiki/Missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let config = SourceConfig::new(&mock_server.uri()).unwrap();
        let source = HttpSource::new(&config).unwrap();
        let err = source
            .fetch(&format!("{}/wiki/Missing", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::StatusError { status: 404, .. }));
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_fetch_or_none_swallows_failures() {
        let source = MemorySource::new();
        assert!(fetch_or_none(&source, "mem://missing").await.is_none());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_fetches_once() {
        let inner = MemorySource::new().with_page("mem://a", "<html><body>A</body></html>");
        let cached = CachedSource::new(inner);

        let first = cached.fetch("mem://a").await.unwrap();
        let second = cached.fetch("mem://a").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cached.inner().fetch_count(), 1);
        assert_eq!(cached.len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_clear_refetches() {
        let inner = MemorySource::new().with_page("mem://a", "<html><body>A</body></html>");
        let cached = CachedSource::new(inner);

        cached.fetch("mem://a").await.unwrap();
        cached.clear().await;
        assert!(cached.is_empty().await);
        cached.fetch("mem://a").await.unwrap();

        assert_eq!(cached.inner().fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_does_not_keep_failures() {
        let cached = CachedSource::new(MemorySource::new());

        assert!(cached.fetch("mem://missing").await.is_err());
        assert!(cached.fetch("mem://missing").await.is_err());

        assert_eq!(cached.inner().fetch_count(), 2);
        assert!(cached.is_empty().await);
    }

    #[tokio::test]
    async fn test_disabled_cache_passes_through() {
        let inner = MemorySource::new().with_page("mem://a", "<html><body>A</body></html>");
        let cached = CachedSource::disabled(inner);

        cached.fetch("mem://a").await.unwrap();
        cached.fetch("mem://a").await.unwrap();

        assert_eq!(cached.inner().fetch_count(), 2);
    }
}
