// src/scrape/landing.rs
// The regatta landing page: event-result links plus the descriptive header
// block. Race data itself lives behind the per-event JSON endpoint.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};

const EVENT_LINK_SELECTOR: &str = r#"a[href^="/regatta/results2/eventResults.jsp"]"#;

/// Anything the site recognizes as a race style; everything else leaves
/// `race_type` empty.
const RACE_TYPES: &[&str] = &["sprint", "head", "dual"];

/// Marker phrase in the secondary details block.
const SANCTION_MARKER: &str = "usrowing sanctioned";

/// Descriptive regatta attributes from the landing page. Read-only snapshot,
/// independent of race data; absent markup regions leave fields empty/false.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegattaMetadata {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub venue: String,
    pub location: String,
    pub host: String,
    pub race_type: String,
    pub sanctioned: bool,
    pub entries: String,
    pub clubs: String,
}

/// Event-result endpoints linked from the landing page, in document order.
/// Root-relative hrefs are resolved against `origin`. Duplicates are kept;
/// the job/event-id match downstream is idempotent against repeats.
pub fn extract_event_links(html_doc: &str, origin: &str) -> Vec<String> {
    let doc = Html::parse_document(html_doc);
    let sel = Selector::parse(EVENT_LINK_SELECTOR).expect("event link selector");

    let mut links = Vec::new();
    for a in doc.select(&sel) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let url = if href.starts_with('/') {
            format!("{origin}{href}")
        } else {
            s!(href)
        };
        log::debug!("event link: {url}");
        links.push(url);
    }
    links
}

/// Regatta header attributes. Never fails: a page with none of the expected
/// regions yields the all-empty default.
pub fn extract_metadata(html_doc: &str) -> RegattaMetadata {
    let doc = Html::parse_document(html_doc);
    let mut meta = RegattaMetadata {
        name: select_text(&doc, "div.regatta-header h3"),
        venue: select_text(&doc, "span.regatta-venue"),
        location: select_text(&doc, "span.regatta-location"),
        host: select_text(&doc, "span.regatta-host"),
        ..RegattaMetadata::default()
    };

    // Dates render as one "start - end" span; single-day regattas omit the end.
    let dates = select_text(&doc, "span.regatta-dates");
    match dates.split_once(" - ") {
        Some((start, end)) => {
            meta.start_date = s!(start.trim());
            meta.end_date = s!(end.trim());
        }
        None => meta.start_date = dates,
    }

    let details = select_text(&doc, "div.regatta-details");
    let details_lc = details.to_lowercase();
    // Whole-word match so "head" doesn't fire on "ahead"; punctuation glued
    // to a word ("Sprint.") doesn't hide it.
    let words: Vec<&str> = details_lc
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .collect();
    meta.race_type = RACE_TYPES
        .iter()
        .find(|t| words.iter().any(|w| w == *t))
        .map(|t| s!(*t))
        .unwrap_or_default();
    meta.sanctioned = details_lc.contains(SANCTION_MARKER);
    for cap in count_re().captures_iter(&details) {
        match cap[2].to_ascii_lowercase().as_str() {
            "entries" => meta.entries = s!(&cap[1]),
            "clubs" => meta.clubs = s!(&cap[1]),
            _ => {}
        }
    }
    meta
}

fn select_text(doc: &Html, selector: &str) -> String {
    let sel = Selector::parse(selector).expect("metadata selector");
    doc.select(&sel)
        .next()
        .map(|el| {
            let text: Vec<&str> = el.text().collect();
            // Squash the whitespace nested markup leaves behind.
            text.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .unwrap_or_default()
}

static COUNT_RE: OnceLock<Regex> = OnceLock::new();
fn count_re() -> &'static Regex {
    COUNT_RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s+(entries|clubs)").expect("count pattern"))
}
