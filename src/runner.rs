// src/runner.rs
// Top-level pipeline: landing page → event links → per-event results → lineup
// join → one aggregation pass. Events run sequentially on purpose; the retry
// budget and inter-event pause are a courtesy to the source site, and the only
// fan-out is the lineup stage inside each event.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use regex::Regex;

use crate::aggregate::{self, AthleteAggregate};
use crate::net::{self, Client};
use crate::params::{self, Params};
use crate::scrape::join::{self, LineupSource, ResultRecord};
use crate::scrape::lineup::{self, Athlete};
use crate::scrape::{landing, results};

/// Live roster lookup for the join stage.
struct HttpLineups<'a> {
    client: &'a Client,
    origin: String,
}

impl LineupSource for HttpLineups<'_> {
    fn lineup(&self, job_id: &str, boat_id: &str) -> Vec<Athlete> {
        lineup::fetch_lineup(self.client, &self.origin, job_id, boat_id)
    }
}

/// Run the whole pipeline for one landing URL and return the per-athlete
/// aggregates. The landing-page fetch is the only fatal failure; every
/// per-event or per-boat problem degrades and is logged.
pub fn scrape_athletes(params: &Params) -> Result<BTreeMap<String, AthleteAggregate>, Box<dyn Error>> {
    let client = Client::new()?;
    let origin = net::origin_of(&params.url);

    let html = client.get(&params.url, params::LANDING_TIMEOUT)?;

    let meta = landing::extract_metadata(&html);
    if !meta.name.is_empty() {
        log::info!(
            "regatta: {} ({} - {}), {} at {}",
            meta.name, meta.start_date, meta.end_date, meta.race_type, meta.venue
        );
    }

    let links = landing::extract_event_links(&html, &origin);
    log::info!("found {} event links", links.len());

    let source = HttpLineups { client: &client, origin: origin.clone() };
    let records = collect_records(
        &links,
        |job_id, event_id| fetch_event_results(&client, &origin, job_id, event_id),
        params::EVENT_PAUSE,
        &source,
    );

    Ok(aggregate::aggregate(&records))
}

/// Per-event loop, split from the transport: `fetch` already owns the retry
/// budget and answers `None` once an event is a lost cause. A failed event is
/// skipped with a warning and never aborts the batch.
fn collect_records<F>(
    links: &[String],
    mut fetch: F,
    pause: Duration,
    source: &dyn LineupSource,
) -> Vec<ResultRecord>
where
    F: FnMut(&str, &str) -> Option<String>,
{
    let mut records: Vec<ResultRecord> = Vec::new();
    let mut skipped = 0usize;

    for link in links {
        let Some((job_id, event_id)) = parse_job_event(link) else {
            log::debug!("ignoring non-event link: {link}");
            continue;
        };

        let Some(payload) = fetch(&job_id, &event_id) else {
            log::warn!("skipping event job_id={job_id} event_id={event_id}: no data returned");
            skipped += 1;
            continue;
        };
        thread::sleep(pause); // be polite

        let (rows, boats) = match results::parse_event_results(&payload, &job_id, None) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("skipping event job_id={job_id} event_id={event_id}: bad payload: {e}");
                skipped += 1;
                continue;
            }
        };
        log::info!(
            "event {event_id}: {} result rows, {} boats to look up",
            rows.len(),
            boats.len()
        );
        records.extend(join::join(rows, &boats, source));
    }

    if skipped > 0 {
        log::warn!("{skipped} event(s) skipped; athlete data is incomplete");
    }
    log::info!("{} joined records total", records.len());

    records
}

/// Event-results JSON with a small retry budget. `None` after the last
/// attempt means the caller skips the event.
fn fetch_event_results(client: &Client, origin: &str, job_id: &str, event_id: &str) -> Option<String> {
    let url = params::event_results_url(origin, job_id, event_id);
    retry(params::EVENT_ATTEMPTS, params::RETRY_PAUSE, || {
        client.get(&url, params::EVENT_TIMEOUT)
    })
}

/// Bounded retry with a fixed pause between attempts. No pause after the
/// last failure; no backoff curve — the budget is a politeness measure, not
/// a resilience layer.
fn retry<F>(attempts: u32, pause: Duration, mut f: F) -> Option<String>
where
    F: FnMut() -> Result<String, Box<dyn Error>>,
{
    for attempt in 1..=attempts {
        match f() {
            Ok(body) => return Some(body),
            Err(e) => {
                log::warn!("attempt {attempt}/{attempts} failed: {e}");
                if attempt < attempts {
                    thread::sleep(pause);
                }
            }
        }
    }
    None
}

/// `job_id` and `event_id` from an event link. Links without both are not
/// event results and get skipped.
pub fn parse_job_event(link: &str) -> Option<(String, String)> {
    let cap = job_event_re().captures(link)?;
    Some((s!(&cap[1]), s!(&cap[2])))
}

static JOB_EVENT_RE: OnceLock<Regex> = OnceLock::new();
fn job_event_re() -> &'static Regex {
    JOB_EVENT_RE.get_or_init(|| {
        Regex::new(r"job_id=(\d+)&?.*&event_id=(\d+)").expect("job/event pattern")
    })
}
