// src/params.rs
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RESULTS_URL: &str =
    "https://www.regattacentral.com/regatta/results2?job_id=9168";
pub const DEFAULT_OUT_FILE: &str = "athletes.csv";

/// Lineup fetch fan-out width. Per-event only; events themselves are
/// processed sequentially as a courtesy to the site.
pub const WORKERS: usize = 8;

/// Event-results fetches get a small retry budget; lineups do not.
pub const EVENT_ATTEMPTS: u32 = 3;
pub const RETRY_PAUSE: Duration = Duration::from_secs(2);
pub const EVENT_PAUSE: Duration = Duration::from_secs(1);

pub const LANDING_TIMEOUT: Duration = Duration::from_secs(20);
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(15);
pub const LINEUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Event results JSON endpoint, same origin as the landing page.
pub fn event_results_url(origin: &str, job_id: &str, event_id: &str) -> String {
    format!(
        "{origin}/servlet/DisplayRacesResults?Method=getResults&job_id={job_id}&event_id={event_id}"
    )
}

/// Boat lineup HTML endpoint.
pub fn lineup_url(origin: &str, job_id: &str, boat_id: &str) -> String {
    format!("{origin}/servlet/LineupServlet?Method=getLineupHtml&job_id={job_id}&boat_id={boat_id}")
}

#[derive(Clone)]
pub struct Params {
    pub url: String,   // landing page with the event links
    pub out: PathBuf,  // CSV output path
    pub quiet: bool,   // skip the per-athlete console summary
}

impl Params {
    pub fn new() -> Self {
        Self {
            url: s!(DEFAULT_RESULTS_URL),
            out: PathBuf::from(DEFAULT_OUT_FILE),
            quiet: false,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}
