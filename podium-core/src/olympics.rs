//! The Olympic questions, each a walk over the encyclopedia's page graph.
//!
//! Every query starts at the root page. A page, section, row or link that is
//! missing ends its branch quietly; only malformed numbers and years escape
//! as errors.

use crate::artifacts::MedalRow;
use crate::input::parse_year;
use crate::query::MedalColour;
use crate::walker::Walker;
use podium_scanner::document::{
    Document, Node, attr, child_elements, children, descendant_elements, descendants_by_tag,
    has_class, is_tag, links_in, next_element_siblings, own_text, text_of,
};
use podium_scanner::locate::{
    HeadingMatch, find_table_after, is_table_or_class, locate_section, section_table,
};
use podium_scanner::table::{
    Row, RowSelection, Table, collect_by_predicate, filter_by_threshold, sum_by_key_and_column,
};
use podium_scanner::{DocumentSource, Result, ScanError, SourceConfig, render_mixed, resolve_country};
use scraper::ElementRef;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

pub const PARTICIPATING_NATIONS_TITLE: &str =
    "List of participating nations at the Summer Olympic Games";
pub const TORCH_RELAYS_TITLE: &str = "List of Olympic torch relays";
pub const NO_FLAG_BEARERS: &str = "No flagbearers known!";

/// Smallest answer the torch relay query gives once any relay qualifies.
pub const TORCH_RELAY_FLOOR: usize = 2;

const MEDAL_TABLE: HeadingMatch<'static> = HeadingMatch::Exact("Medal table");

/// Sports whose name starts with `prefix`, compared in lowercase.
pub async fn sports_starting_with<S: DocumentSource>(walker: &Walker<S>, prefix: &str) -> BTreeSet<String> {
    let Some(root) = walker.root().await else {
        return BTreeSet::new();
    };
    let Some(table) = sports_table(&root) else {
        info!("No sports table on {}", root.locator());
        return BTreeSet::new();
    };

    let prefix = prefix.to_lowercase();
    collect_by_predicate(&table, RowSelection::SkipHeader, |row| {
        let first = child_elements(row.element()).next().filter(|c| is_tag(*c, "td"))?;
        let name = text_of(first).to_lowercase();
        name.starts_with(&prefix).then_some(name)
    })
    .into_iter()
    .collect()
}

/// Nations that once competed but no longer exist. The list of participating
/// nations greys out their first cell.
pub async fn obsolete_nations<S: DocumentSource>(walker: &Walker<S>) -> BTreeSet<String> {
    let Some(root) = walker.root().await else {
        return BTreeSet::new();
    };

    let href = root
        .elements_by_tag("a")
        .filter(|a| attr(*a, "title") == Some(PARTICIPATING_NATIONS_TITLE))
        .last()
        .and_then(|a| attr(a, "href"))
        .map(str::to_string);
    let Some(href) = href else {
        info!("No link to the participating nations list");
        return BTreeSet::new();
    };

    let Some(nations) = walker.follow_href(&href).await else {
        return BTreeSet::new();
    };
    let Some(table) = first_wikitable(&nations) else {
        return BTreeSet::new();
    };

    collect_by_predicate(&table, RowSelection::All, |row| {
        let first = child_elements(row.element()).next()?;
        let greyed = is_tag(first, "td")
            && attr(first, "bgcolor").is_some_and(|c| c.eq_ignore_ascii_case("#e0e0e0"));
        if !greyed {
            return None;
        }
        descendants_by_tag(first, "a").next().map(text_of)
    })
    .into_iter()
    .collect()
}

/// Nations that won at least `threshold` medals of `colour` in `year`.
pub async fn medal_nations<S: DocumentSource>(
    walker: &Walker<S>,
    threshold: i64,
    colour: MedalColour,
    year: &str,
) -> Result<BTreeSet<String>> {
    let Some(edition) = edition_for(walker, year).await else {
        return Ok(BTreeSet::new());
    };
    let Some(table) = first_wikitable(&edition) else {
        info!("No medal table on {}", edition.locator());
        return Ok(BTreeSet::new());
    };

    filter_by_threshold(&table, colour.column_from_end(), threshold)
}

/// Nations that took gold, silver and bronze in one event in `year`.
pub async fn podium_sweeps<S: DocumentSource>(walker: &Walker<S>, year: &str) -> BTreeSet<String> {
    let Some(edition) = edition_for(walker, year).await else {
        return BTreeSet::new();
    };
    let Some(table) = section_table(&edition, HeadingMatch::Exact("Podium sweeps")) else {
        info!("No podium sweeps on {}", edition.locator());
        return BTreeSet::new();
    };

    // The fourth data cell names the sweeping nation.
    collect_by_predicate(&table, RowSelection::SkipHeader, |row| {
        let cell = row.data_cells().get(3).copied()?;
        descendants_by_tag(cell, "a").next().map(text_of)
    })
    .into_iter()
    .collect()
}

/// Every medal `country` has won in `sport`, summed over the sport's all-time
/// medal table.
pub async fn total_medals<S: DocumentSource>(walker: &Walker<S>, country: &str, sport: &str) -> Result<i64> {
    let Some(root) = walker.root().await else {
        return Ok(0);
    };

    let href = sports_table(&root).and_then(|table| {
        table.rows(RowSelection::All).iter().find_map(|row| {
            let link = row.first_link()?;
            (link.text == sport).then(|| link.href.to_string())
        })
    });
    let Some(href) = href else {
        info!("No sport named '{}'", sport);
        return Ok(0);
    };

    let Some(page) = walker.follow_href(&href).await else {
        return Ok(0);
    };
    let Some(table) = section_table(&page, MEDAL_TABLE) else {
        info!("No medal table on {}", page.locator());
        return Ok(0);
    };

    sum_by_key_and_column(&table, country, 1)
}

/// How many sports have their governing body in `country`. A body that
/// governs several sports counts once per sport; its page is fetched once.
pub async fn headquartered<S: DocumentSource>(walker: &Walker<S>, country: &str) -> usize {
    let Some(root) = walker.root().await else {
        return 0;
    };

    let sport_pages: Vec<String> = sports_table(&root)
        .map(|table| {
            table
                .rows(RowSelection::All)
                .iter()
                .filter_map(Row::first_link)
                .filter_map(|link| walker.config().resolve(link.href))
                .collect()
        })
        .unwrap_or_default();
    debug!("Checking {} sport pages for governing bodies", sport_pages.len());

    let bodies: Vec<String> = walker
        .fan_out_locators(sport_pages, governing_body_href)
        .await
        .into_iter()
        .filter_map(|href| walker.config().resolve(&href))
        .collect();

    let distinct: BTreeSet<String> = bodies.iter().cloned().collect();
    debug!("Found {} distinct governing bodies", distinct.len());
    let targets = distinct.into_iter().map(|locator| (locator.clone(), locator)).collect();
    let based_there: HashSet<String> = walker
        .fan_out(targets, |locator, doc| {
            is_headquartered_in(doc, country).then(|| locator.clone())
        })
        .await
        .into_iter()
        .collect();

    bodies.iter().filter(|body| based_there.contains(*body)).count()
}

/// Href of the "Governing body" row in a sport page's infobox.
pub fn governing_body_href(doc: &Document) -> Option<String> {
    let infobox = doc.infobox()?;
    Table::new(infobox)
        .rows(RowSelection::All)
        .iter()
        .find(|row| row_label(row).is_some_and(|label| label == "Governing body"))
        .and_then(Row::first_link)
        .map(|link| link.href.to_string())
}

/// Does the infobox "Headquarters" field of `doc` name `country`?
///
/// The field is rendered, stripped of commas and split into words; the
/// country's words must appear together and in order, ignoring case.
pub fn is_headquartered_in(doc: &Document, country: &str) -> bool {
    let wanted: Vec<String> = country.split_whitespace().map(str::to_lowercase).collect();
    if wanted.is_empty() {
        return false;
    }
    let Some(infobox) = doc.infobox() else {
        return false;
    };

    Table::new(infobox).rows(RowSelection::All).iter().any(|row| {
        if row_label(row).as_deref() != Some("Headquarters") {
            return false;
        }
        let Some(cell) = row.data_cells().first().copied() else {
            return false;
        };
        let tokens: Vec<String> = render_mixed(cell)
            .replace(',', "")
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        tokens.windows(wanted.len()).any(|window| window == wanted.as_slice())
    })
}

/// Among relays of Games hosted by `country` in or after `since`, the most
/// countries any one relay passed through.
///
/// Returns 0 only when the root page cannot be fetched. Past that point the
/// answer never drops below [`TORCH_RELAY_FLOOR`], even when no relay
/// qualifies.
pub async fn torch_relay<S: DocumentSource>(walker: &Walker<S>, country: &str, since: &str) -> Result<usize> {
    let since: i32 = since
        .trim()
        .parse()
        .map_err(|_| ScanError::InvalidYear(since.to_string()))?;

    let Some(root) = walker.root().await else {
        return Ok(0);
    };
    let href = root
        .elements_with_classes(Some("table"), &["sidebar"])
        .next()
        .and_then(|sidebar| {
            descendants_by_tag(sidebar, "a").find(|a| attr(*a, "title") == Some(TORCH_RELAYS_TITLE))
        })
        .and_then(|a| attr(a, "href"))
        .map(str::to_string);
    let Some(href) = href else {
        info!("No link to the torch relay list");
        return Ok(TORCH_RELAY_FLOOR);
    };

    let Some(relays) = walker.follow_href(&href).await else {
        return Ok(TORCH_RELAY_FLOOR);
    };
    let Some(table) = relays
        .elements_with_classes(Some("table"), &["sortable", "wikitable"])
        .next()
        .map(Table::new)
    else {
        return Ok(TORCH_RELAY_FLOOR);
    };

    let legs: Vec<BTreeSet<String>> = collect_by_predicate(&table, RowSelection::All, |row| {
        relay_targets(row, country, since, walker.config())
    });
    if legs.is_empty() {
        info!("No torch relay in {} since {}", country, since);
        return Ok(TORCH_RELAY_FLOOR);
    }

    let mut longest = TORCH_RELAY_FLOOR;
    for cities in legs {
        let countries: BTreeSet<String> = walker
            .fan_out_locators(cities, resolve_country)
            .await
            .into_iter()
            .collect();
        debug!("Relay passed through {:?}", countries);
        longest = longest.max(countries.len());
    }

    Ok(longest)
}

/// City locators of a relay row, if the row belongs to `country` and to a
/// year no earlier than `since`.
fn relay_targets(row: &Row<'_>, country: &str, since: i32, config: &SourceConfig) -> Option<BTreeSet<String>> {
    let cells = row.data_cells();
    let first = cells.first().copied()?;

    let flag = descendant_elements(first).find(|el| is_tag(*el, "span") && has_class(*el, "flagicon"))?;
    let flag_anchor = descendants_by_tag(flag, "a").next()?;
    if attr(flag_anchor, "title") != Some(country) {
        return None;
    }

    let games = descendants_by_tag(first, "a").last()?;
    let recent = text_of(games)
        .split_whitespace()
        .filter_map(parse_year)
        .any(|year| year >= since);
    if !recent {
        return None;
    }

    let last = cells.last().copied()?;
    Some(
        leg_hrefs(last)
            .into_iter()
            .filter_map(|href| config.resolve(href))
            .collect(),
    )
}

/// Hrefs of the direct anchors of `cell` and of anchors directly inside its
/// direct `<i>` children.
fn leg_hrefs(cell: ElementRef<'_>) -> Vec<&str> {
    let mut hrefs = Vec::new();

    for node in children(cell) {
        match node {
            Node::Element(el) if is_tag(el, "a") => hrefs.extend(attr(el, "href")),
            Node::Element(el) if is_tag(el, "i") => {
                hrefs.extend(
                    child_elements(el)
                        .filter(|inner| is_tag(*inner, "a"))
                        .filter_map(|inner| attr(inner, "href")),
                );
            }
            Node::Element(_) | Node::Text(_) => {}
        }
    }

    hrefs.retain(|href| !href.is_empty());
    hrefs
}

/// Whether the flag bearers `country` sent to the Games of `year` are alive.
pub async fn flag_bearer<S: DocumentSource>(walker: &Walker<S>, country: &str, year: &str) -> String {
    let bearers = match nation_page(walker, country, year).await {
        Some(nation) => flag_bearers(&nation),
        None => Vec::new(),
    };
    if bearers.is_empty() {
        return NO_FLAG_BEARERS.to_string();
    }

    let targets: Vec<((usize, String), String)> = bearers
        .into_iter()
        .enumerate()
        .filter_map(|(i, (name, href))| walker.config().resolve(&href).map(|loc| ((i, name), loc)))
        .collect();

    let mut lines = walker
        .fan_out(targets, |(i, name), doc| bearer_status(name, doc).map(|line| (*i, line)))
        .await;
    lines.sort_by_key(|(i, _)| *i);

    lines
        .into_iter()
        .map(|(_, line)| format!("\n{}\n", line))
        .collect()
}

/// The nation's own page for one edition, reached through the edition's
/// medal table.
async fn nation_page<S: DocumentSource>(walker: &Walker<S>, country: &str, year: &str) -> Option<Arc<Document>> {
    let edition = edition_for(walker, year).await?;
    let href = section_table(&edition, MEDAL_TABLE).and_then(|table| {
        table.rows(RowSelection::All).iter().find_map(|row| {
            let link = row.first_link()?;
            (link.text == country).then(|| link.href.to_string())
        })
    });

    match href {
        Some(href) => walker.follow_href(&href).await,
        None => {
            info!("{} is not in the {} medal table", country, year);
            None
        }
    }
}

/// `(name, href)` of every flag bearer in the first infobox, in page order,
/// each name once.
pub fn flag_bearers(doc: &Document) -> Vec<(String, String)> {
    let Some(infobox) = doc.infobox() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut bearers = Vec::new();

    for row in Table::new(infobox).rows(RowSelection::All) {
        let Some(header) = row.header_cells().first().copied() else {
            continue;
        };
        let labelled = text_of(header).contains("Flag bearer")
            || row.first_anchor_text().is_some_and(|t| t.contains("Flag bearer"));
        if !labelled {
            continue;
        }
        let Some(cell) = row.data_cells().first().copied() else {
            continue;
        };

        for link in links_in(cell) {
            if link.href.is_empty() || link.href.starts_with('#') {
                continue;
            }
            if seen.insert(link.text.clone()) {
                bearers.push((link.text, link.href.to_string()));
            }
        }
    }

    bearers
}

/// One status line for a person page, or `None` if it has no infobox.
///
/// Infoboxes are checked in order. One without a "Died" header means the
/// person is alive; a "Died" header without a value moves on to the next.
pub fn bearer_status(name: &str, doc: &Document) -> Option<String> {
    for infobox in doc.infoboxes() {
        let Some(died) = descendants_by_tag(infobox, "th").find(|th| own_text(*th) == "Died") else {
            return Some(format!("{} is still alive.", name));
        };
        if let Some(value) = next_element_siblings(died).find(|el| is_tag(*el, "td")) {
            return Some(format!("{} passed away: {}", name, render_mixed(value)));
        }
    }

    None
}

/// Image URLs of every participating nation's flag in `year`.
pub async fn flag_sources<S: DocumentSource>(walker: &Walker<S>, year: &str) -> Vec<String> {
    let Some(edition) = edition_for(walker, year).await else {
        return Vec::new();
    };

    let words = ["participating", "nation"];
    let Some(heading) = locate_section(&edition, HeadingMatch::AllWords(&words)) else {
        info!("No participating nations section on {}", edition.locator());
        return Vec::new();
    };
    let Some(table) = find_table_after(heading.element, is_table_or_class("wikitable")) else {
        return Vec::new();
    };

    let mut sources = Vec::new();
    for row in table.rows(RowSelection::All) {
        for item in descendants_by_tag(row.element(), "li") {
            if let Some(img) = descendants_by_tag(item, "img").next()
                && let Some(src) = attr(img, "src")
                && let Some(url) = image_url(src, walker.config())
            {
                sources.push(url);
            }
        }
    }

    sources
}

fn image_url(src: &str, config: &SourceConfig) -> Option<String> {
    if src.starts_with("//") {
        Some(format!("https:{}", src))
    } else {
        config.resolve(src)
    }
}

/// Every row of the `year` medal table with enough cells to hold gold,
/// silver and bronze counts.
pub async fn medal_rows<S: DocumentSource>(walker: &Walker<S>, year: &str) -> Vec<MedalRow> {
    let Some(edition) = edition_for(walker, year).await else {
        return Vec::new();
    };
    let Some(table) = first_wikitable(&edition) else {
        return Vec::new();
    };

    collect_by_predicate(&table, RowSelection::All, |row| {
        let cells = row.data_cells();
        if cells.len() < 4 {
            return None;
        }
        let count = |offset: usize| text_of(cells[cells.len() - offset]);
        Some(MedalRow {
            country: row.first_anchor_text().unwrap_or_else(|| "Unknown".to_string()),
            gold: count(4),
            silver: count(3),
            bronze: count(2),
        })
    })
}

async fn edition_for<S: DocumentSource>(walker: &Walker<S>, year: &str) -> Option<Arc<Document>> {
    let root = walker.root().await?;
    walker.edition_page(&root, year).await
}

fn sports_table(root: &Document) -> Option<Table<'_>> {
    root.elements_with_classes(Some("table"), &["sortable", "wikitable"])
        .next()
        .map(Table::new)
}

fn first_wikitable(doc: &Document) -> Option<Table<'_>> {
    doc.elements_with_classes(Some("table"), &["wikitable"])
        .next()
        .map(Table::new)
}

/// Text of a row's first header cell.
fn row_label(row: &Row<'_>) -> Option<String> {
    row.header_cells().first().map(|th| text_of(*th))
}
