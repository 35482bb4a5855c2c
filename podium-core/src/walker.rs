//! Multi-hop traversal over linked pages.
//!
//! A [`Walker`] pairs a [`DocumentSource`] with the [`SourceConfig`] used to
//! resolve hrefs. Every hop goes through [`Walker::fetch`], which turns fetch
//! failures into `None` so that one dead link costs one branch of a query,
//! never the whole query.

use futures::stream::{self, StreamExt};
use podium_scanner::document::{
    Document, Link, attr, descendant_elements, descendants_by_tag, has_class, text_of,
};
use podium_scanner::table::{RowSelection, Table};
use podium_scanner::{
    CacheScope, CachedSource, DocumentSource, HttpSource, Result, SourceConfig, fetch_or_none,
};
use scraper::ElementRef;
use std::future::ready;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Walker<S> {
    source: S,
    config: SourceConfig,
}

/// The walker the command line uses: HTTP behind a cache.
pub type HttpWalker = Walker<CachedSource<HttpSource>>;

impl HttpWalker {
    pub fn http(config: SourceConfig) -> Result<Self> {
        let http = HttpSource::new(&config)?;
        let source = match config.cache {
            CacheScope::Disabled => CachedSource::disabled(http),
            CacheScope::Query | CacheScope::Session => CachedSource::new(http),
        };
        Ok(Walker::new(source, config))
    }
}

impl<S: DocumentSource> Walker<CachedSource<S>> {
    /// Drop cached pages if the cache only lives for one query.
    pub async fn end_query(&self) {
        if self.config.cache == CacheScope::Query {
            debug!("Clearing per-query document cache");
            self.source.clear().await;
        }
    }
}

impl<S: DocumentSource> Walker<S> {
    pub fn new(source: S, config: SourceConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// The page every query starts from.
    pub async fn root(&self) -> Option<Arc<Document>> {
        match self.config.root_locator() {
            Ok(locator) => self.fetch(&locator).await,
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    pub async fn fetch(&self, locator: &str) -> Option<Arc<Document>> {
        fetch_or_none(&self.source, locator).await
    }

    /// Resolve an href against the base URL and fetch it.
    pub async fn follow_href(&self, href: &str) -> Option<Arc<Document>> {
        let Some(locator) = self.config.resolve(href) else {
            debug!("Not following unusable href '{}'", href);
            return None;
        };
        self.fetch(&locator).await
    }

    pub async fn follow(&self, link: &Link<'_>) -> Option<Arc<Document>> {
        debug!("Following '{}' -> {}", link.text, link.href);
        self.follow_href(link.href).await
    }

    /// Fetch every target and map each page through `per_page`.
    ///
    /// At most `workers` fetches are in flight at once. Results arrive in
    /// completion order, so callers either reduce commutatively or carry an
    /// ordering key in `K`. Targets that fail to fetch, or for which
    /// `per_page` returns `None`, contribute nothing.
    pub async fn fan_out<K, T, F>(&self, targets: Vec<(K, String)>, per_page: F) -> Vec<T>
    where
        F: Fn(&K, &Document) -> Option<T>,
    {
        let total = targets.len();
        let per_page = &per_page;

        let results: Vec<T> = stream::iter(targets)
            .map(|(key, locator)| async move {
                let doc = self.fetch(&locator).await?;
                per_page(&key, &doc)
            })
            .buffer_unordered(self.config.workers.max(1))
            .filter_map(ready)
            .collect()
            .await;

        info!("Fan-out over {} pages yielded {} results", total, results.len());
        results
    }

    /// [`Walker::fan_out`] without a key.
    pub async fn fan_out_locators<T, F, I>(&self, locators: I, per_page: F) -> Vec<T>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&Document) -> Option<T>,
    {
        let targets = locators.into_iter().map(|locator| ((), locator)).collect();
        self.fan_out(targets, |_, doc| per_page(doc)).await
    }

    /// The page for the Games held in `year`, found from the root page.
    pub async fn edition_page(&self, root: &Document, year: &str) -> Option<Arc<Document>> {
        for (name, strategy) in EDITION_STRATEGIES {
            if let Some(href) = strategy(root, year) {
                debug!("Edition page for {} found via {}", year, name);
                return self.follow_href(&href).await;
            }
        }

        info!("No edition page for {}", year);
        None
    }
}

pub type EditionStrategy = fn(&Document, &str) -> Option<String>;

/// Ways of finding an edition page, tried in order.
pub const EDITION_STRATEGIES: [(&str, EditionStrategy); 2] = [
    ("games table", edition_from_games_table),
    ("navigation list", edition_from_navigation_list),
];

/// Fourth `wikitable` on the page, last row, the `.plainlist` list.
pub fn edition_from_games_table(root: &Document, year: &str) -> Option<String> {
    let table = root.elements_with_classes(Some("table"), &["wikitable"]).nth(3)?;
    let last_row = Table::new(table).rows(RowSelection::All).pop()?;
    let plainlist = descendant_elements(last_row.element()).find(|el| has_class(*el, "plainlist"))?;
    let list = descendants_by_tag(plainlist, "ul").next()?;

    year_item_href(list, year)
}

/// Sixth `.hlist` navigation list on the page.
pub fn edition_from_navigation_list(root: &Document, year: &str) -> Option<String> {
    let list = root.elements_with_classes(None, &["hlist"]).nth(5)?;
    year_item_href(list, year)
}

fn year_item_href(list: ElementRef<'_>, year: &str) -> Option<String> {
    descendants_by_tag(list, "li").find_map(|li| {
        let anchor = descendants_by_tag(li, "a").next()?;
        if text_of(anchor) != year.trim() {
            return None;
        }
        attr(anchor, "href").map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_scanner::MemorySource;

    const BASE: &str = "http://wiki.test";

    fn config() -> SourceConfig {
        SourceConfig::new(BASE).unwrap().with_root("/wiki/Root").with_workers(2)
    }

    fn page(body: &str) -> String {
        format!("<html><body>{}</body></html>", body)
    }

    #[tokio::test]
    async fn test_root_and_follow() {
        let source = MemorySource::new()
            .with_page(format!("{}/wiki/Root", BASE), page(r#"<a href="/wiki/Judo#Rules">Judo</a>"#))
            .with_page(format!("{}/wiki/Judo", BASE), page("<h2>Judo</h2>"));
        let walker = Walker::new(source, config());

        let root = walker.root().await.unwrap();
        let links = root.links();
        let judo = walker.follow(&links[0]).await.unwrap();

        assert_eq!(judo.locator(), "http://wiki.test/wiki/Judo");
    }

    #[tokio::test]
    async fn test_missing_pages_are_none() {
        let walker = Walker::new(MemorySource::new(), config());
        assert!(walker.root().await.is_none());
        assert!(walker.follow_href("#top").await.is_none());
        // The fragment-only href is rejected before any fetch.
        assert_eq!(walker.source().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_fan_out_skips_failures() {
        let source = MemorySource::new()
            .with_page("mem://a", page("<h1>A</h1>"))
            .with_page("mem://b", page("<h1>B</h1>"));
        let walker = Walker::new(source, config());

        let locators = ["mem://a", "mem://b", "mem://gone"].map(String::from);
        let mut titles = walker
            .fan_out_locators(locators, |doc| doc.elements_by_tag("h1").next().map(text_of))
            .await;
        titles.sort();

        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(walker.source().fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_fan_out_keeps_keys() {
        let source = MemorySource::new()
            .with_page("mem://a", page("<h1>A</h1>"))
            .with_page("mem://b", page("<h1>B</h1>"));
        let walker = Walker::new(source, config());

        let targets = vec![(1, "mem://b".to_string()), (0, "mem://a".to_string())];
        let mut keyed = walker
            .fan_out(targets, |key, doc| {
                doc.elements_by_tag("h1").next().map(|h| (*key, text_of(h)))
            })
            .await;
        keyed.sort();

        assert_eq!(keyed, vec![(0, "A".to_string()), (1, "B".to_string())]);
    }

    #[test]
    fn test_edition_from_games_table() {
        let filler = "<table class='wikitable'><tr><td>x</td></tr></table>".repeat(3);
        let html = page(&format!(
            r#"{}<table class="wikitable">
                <tr><td>header</td></tr>
                <tr><td><div class="plainlist"><ul>
                    <li><a href="/wiki/1896_Summer_Olympics">1896</a></li>
                    <li><a href="/wiki/2012_Summer_Olympics">2012</a></li>
                </ul></div></td></tr>
            </table>"#,
            filler
        ));
        let doc = Document::parse("mem://root", &html);

        assert_eq!(
            edition_from_games_table(&doc, "2012"),
            Some("/wiki/2012_Summer_Olympics".to_string())
        );
        assert_eq!(edition_from_games_table(&doc, "2013"), None);
    }

    #[test]
    fn test_edition_from_navigation_list() {
        let mut html = String::new();
        for _ in 0..5 {
            html.push_str("<div class='hlist'><ul><li><a href='/x'>x</a></li></ul></div>");
        }
        html.push_str("<div class='hlist'><ul><li><a href='/wiki/1900_Summer_Olympics'>1900</a></li></ul></div>");
        let doc = Document::parse("mem://root", &page(&html));

        assert_eq!(edition_from_games_table(&doc, "1900"), None);
        assert_eq!(
            edition_from_navigation_list(&doc, "1900"),
            Some("/wiki/1900_Summer_Olympics".to_string())
        );
    }

    #[tokio::test]
    async fn test_query_scoped_cache_is_cleared() {
        let source = CachedSource::new(MemorySource::new().with_page("mem://a", page("A")));
        let walker = Walker::new(source, config().with_cache(CacheScope::Query));

        walker.fetch("mem://a").await.unwrap();
        walker.end_query().await;
        walker.fetch("mem://a").await.unwrap();

        assert_eq!(walker.source().inner().fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_session_cache_survives_queries() {
        let source = CachedSource::new(MemorySource::new().with_page("mem://a", page("A")));
        let walker = Walker::new(source, config());

        walker.fetch("mem://a").await.unwrap();
        walker.end_query().await;
        walker.fetch("mem://a").await.unwrap();

        assert_eq!(walker.source().inner().fetch_count(), 1);
    }
}
