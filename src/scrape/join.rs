// src/scrape/join.rs
// Fan out lineup fetches for a batch of race rows, then join each row with
// the athletes that actually rowed it. Concurrency lives entirely in here:
// the pool is created and fully drained before the stage returns.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::params::WORKERS;

use super::lineup::Athlete;
use super::results::RaceRow;

/// A race row plus its resolved crew (1..n). Rows that resolve to nobody are
/// dropped before this type is ever built.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub row: RaceRow,
    pub athletes: Vec<Athlete>,
}

/// Roster lookup seam for the join stage. The HTTP client implements this;
/// tests substitute canned rosters. Implementations must not fail: no roster
/// is expressed as an empty vec.
pub trait LineupSource: Sync {
    fn lineup(&self, job_id: &str, boat_id: &str) -> Vec<Athlete>;
}

/// Join race rows with their boats' rosters. Output order follows `rows`
/// order; only the lineup fetches themselves run concurrently.
pub fn join(
    rows: Vec<RaceRow>,
    boats: &BTreeSet<(String, String)>,
    source: &dyn LineupSource,
) -> Vec<ResultRecord> {
    let lineups = fetch_all(boats, source);

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let athletes = resolve_athletes(&row, &lineups);
        if athletes.is_empty() {
            log::debug!("no athlete data for {} / {} (bow {}), dropping row", row.event, row.race, row.bow);
            continue;
        }
        records.push(ResultRecord { row, athletes });
    }
    records
}

/// Scatter-gather over the deduplicated boat set, `WORKERS` threads wide.
/// Each boat is written into the map exactly once, by the one worker that
/// claimed it off the shared cursor.
fn fetch_all(
    boats: &BTreeSet<(String, String)>,
    source: &dyn LineupSource,
) -> HashMap<String, Vec<Athlete>> {
    let ids: Vec<&(String, String)> = boats.iter().collect();
    let mut lineups = HashMap::with_capacity(ids.len());
    if ids.is_empty() {
        return lineups;
    }

    let workers = WORKERS.min(ids.len());
    let cursor = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    thread::scope(|s| {
        for _ in 0..workers {
            let tx = tx.clone();
            let ids = &ids;
            let cursor = &cursor;
            s.spawn(move || {
                loop {
                    let i = cursor.fetch_add(1, Ordering::Relaxed);
                    if i >= ids.len() {
                        break;
                    }
                    let (job_id, boat_id) = ids[i];
                    let _ = tx.send((boat_id.clone(), source.lineup(job_id, boat_id)));
                }
            });
        }
        drop(tx); // this thread is sole receiver now

        for (boat_id, athletes) in rx {
            lineups.insert(boat_id, athletes);
        }
    });

    lineups
}

/// The fallback ladder for one row:
/// roster filtered by club → full roster → synthetic athlete from the boat
/// label → nobody (row gets dropped by the caller).
fn resolve_athletes(row: &RaceRow, lineups: &HashMap<String, Vec<Athlete>>) -> Vec<Athlete> {
    let roster = row
        .boat_id
        .as_ref()
        .and_then(|id| lineups.get(id))
        .filter(|r| !r.is_empty());

    if let Some(roster) = roster {
        // Boats may race under a club name the roster only abbreviates, so
        // the match is one-way containment: row club within athlete club.
        let club_lc = row.club.to_lowercase();
        let matched: Vec<Athlete> = roster
            .iter()
            .filter(|a| club_lc.is_empty() || a.club.to_lowercase().contains(&club_lc))
            .cloned()
            .collect();
        if !matched.is_empty() {
            return matched;
        }
        log::debug!("no club match for '{}' in boat {:?}, keeping full roster", row.club, row.boat_id);
        return roster.clone();
    }

    if !row.boat_label.is_empty() {
        log::debug!("no lineup for boat {:?}, synthesizing entry from label '{}'", row.boat_id, row.boat_label);
        return vec![Athlete {
            seat: s!(),
            name: row.boat_label.clone(),
            age: s!(),
            club: row.club.clone(),
        }];
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubSource {
        rosters: HashMap<String, Vec<Athlete>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(rosters: &[(&str, Vec<Athlete>)]) -> Self {
            Self {
                rosters: rosters
                    .iter()
                    .map(|(id, r)| (s!(*id), r.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl LineupSource for StubSource {
        fn lineup(&self, _job_id: &str, boat_id: &str) -> Vec<Athlete> {
            self.calls.lock().unwrap().push(s!(boat_id));
            self.rosters.get(boat_id).cloned().unwrap_or_default()
        }
    }

    fn athlete(name: &str, club: &str) -> Athlete {
        Athlete { seat: s!("1"), name: s!(name), age: s!("17"), club: s!(club) }
    }

    fn row(boat_id: Option<&str>, club: &str, label: &str) -> RaceRow {
        RaceRow {
            event: s!("Mens 8+"),
            race: s!("Final"),
            place: s!("1"),
            bow: s!("3"),
            club: s!(club),
            finish: s!("6:00.0"),
            margin: s!(),
            boat_id: boat_id.map(String::from),
            boat_label: s!(label),
            num_boats: 2,
        }
    }

    fn boat_set(ids: &[&str]) -> BTreeSet<(String, String)> {
        ids.iter().map(|id| (s!("9168"), s!(*id))).collect()
    }

    #[test]
    fn club_match_is_one_way_containment() {
        // Row club "Lake RC" must match roster club "Lake RC Juniors",
        // but an athlete under a different club is filtered out.
        let source = StubSource::new(&[(
            "11",
            vec![athlete("A One", "Lake RC Juniors"), athlete("B Two", "Bay Crew")],
        )]);
        let records = join(vec![row(Some("11"), "Lake RC", "")], &boat_set(&["11"]), &source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].athletes.len(), 1);
        assert_eq!(records[0].athletes[0].name, "A One");
    }

    #[test]
    fn empty_row_club_keeps_everyone() {
        let source = StubSource::new(&[(
            "11",
            vec![athlete("A One", "Lake RC"), athlete("B Two", "Bay Crew")],
        )]);
        let records = join(vec![row(Some("11"), "", "")], &boat_set(&["11"]), &source);
        assert_eq!(records[0].athletes.len(), 2);
    }

    #[test]
    fn club_filter_miss_falls_back_to_full_roster() {
        let source = StubSource::new(&[("11", vec![athlete("A One", "Bay Crew")])]);
        let records = join(
            vec![row(Some("11"), "Lake RC", "")],
            &boat_set(&["11"]),
            &source,
        );
        assert_eq!(records[0].athletes.len(), 1);
        assert_eq!(records[0].athletes[0].name, "A One");
    }

    #[test]
    fn missing_lineup_synthesizes_from_boat_label() {
        let source = StubSource::new(&[]);
        let records = join(
            vec![row(Some("99"), "Lake RC", "Lake RC A")],
            &boat_set(&["99"]),
            &source,
        );
        assert_eq!(records.len(), 1);
        let a = &records[0].athletes[0];
        assert_eq!(a.name, "Lake RC A");
        assert_eq!(a.seat, "");
        assert_eq!(a.age, "");
        assert_eq!(a.club, "Lake RC");
    }

    #[test]
    fn rows_with_no_fallback_at_all_are_dropped() {
        let source = StubSource::new(&[]);
        let records = join(vec![row(None, "Lake RC", "")], &BTreeSet::new(), &source);
        assert!(records.is_empty());
    }

    #[test]
    fn output_preserves_input_row_order() {
        let source = StubSource::new(&[
            ("1", vec![athlete("A One", "Lake RC")]),
            ("2", vec![athlete("B Two", "Bay Crew")]),
            ("3", vec![athlete("C Three", "Thames RC")]),
        ]);
        let rows = vec![
            row(Some("3"), "Thames RC", ""),
            row(Some("1"), "Lake RC", ""),
            row(Some("2"), "Bay Crew", ""),
        ];
        let records = join(rows, &boat_set(&["1", "2", "3"]), &source);
        let names: Vec<_> = records.iter().map(|r| r.athletes[0].name.as_str()).collect();
        assert_eq!(names, vec!["C Three", "A One", "B Two"]);
    }

    #[test]
    fn each_distinct_boat_is_fetched_once() {
        let source = StubSource::new(&[("1", vec![athlete("A One", "Lake RC")])]);
        // Two rows referencing the same boat; the set is already deduplicated.
        let rows = vec![row(Some("1"), "Lake RC", ""), row(Some("1"), "Lake RC", "")];
        let records = join(rows, &boat_set(&["1"]), &source);
        assert_eq!(records.len(), 2);
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }
}
