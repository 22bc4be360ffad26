// src/scrape/lineup.rs
// Boat rosters come back from the lineup servlet as loose HTML whose visible
// text carries one athlete per line: "1: John Doe - 18 (Rowing Club)".

use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;

use crate::net::Client;
use crate::params::{self, LINEUP_TIMEOUT};

/// One seat in a boat, scoped to a single lineup fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Athlete {
    pub seat: String,
    /// Raw, unnormalized spelling as the site prints it.
    pub name: String,
    pub age: String,
    pub club: String,
}

/// Fetch and parse one boat's roster. A failed or non-200 fetch degrades to
/// an empty roster — one dead lineup endpoint must not sink the whole event.
pub fn fetch_lineup(client: &Client, origin: &str, job_id: &str, boat_id: &str) -> Vec<Athlete> {
    let url = params::lineup_url(origin, job_id, boat_id);
    match client.get(&url, LINEUP_TIMEOUT) {
        Ok(body) => parse_lineup_html(&body),
        Err(e) => {
            log::warn!("lineup fetch failed for job_id={job_id} boat_id={boat_id}: {e}");
            Vec::new()
        }
    }
}

/// Split out for unit tests: visible text, line by line, against the seat
/// pattern. Lines that don't match are skipped silently.
pub fn parse_lineup_html(html_doc: &str) -> Vec<Athlete> {
    let doc = Html::parse_document(html_doc);
    let text = doc.root_element().text().collect::<Vec<_>>().join("\n");

    let mut athletes = Vec::new();
    for line in text.lines() {
        if let Some(cap) = seat_re().captures(line.trim()) {
            athletes.push(Athlete {
                seat: s!(&cap[1]),
                name: s!(cap[2].trim()),
                age: s!(&cap[3]),
                club: s!(cap[4].trim()),
            });
        }
    }
    athletes
}

static SEAT_RE: OnceLock<Regex> = OnceLock::new();
fn seat_re() -> &'static Regex {
    // seat: name - age (club)
    SEAT_RE.get_or_init(|| {
        Regex::new(r"^(\d+):\s*(.+?)\s*-\s*(\d+)\s*\((.+?)\)").expect("seat pattern")
    })
}
