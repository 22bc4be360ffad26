// src/aggregate.rs
// Fold joined race records into one entry per athlete. Keys are normalized
// names, so spelling variants land on the same entry; distinct people who
// share a name collapse too — accepted, and the raw-name set makes it
// auditable after the fact.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::names;
use crate::scrape::join::ResultRecord;

/// Place sentinel for Did-Not-Start / Did-Not-Finish.
pub const DNS_PLACE: &str = "999";

/// One race appearance by one athlete.
#[derive(Debug, Clone, PartialEq)]
pub struct Participation {
    pub event: String,
    pub race: String,
    pub place: String,
    pub bow: String,
    pub club: String,
    pub finish: String,
    pub margin: String,
    pub seat: String,
    pub num_boats: usize,
}

/// Everything seen for one normalized name. Grows monotonically; never merged
/// or deleted once created.
#[derive(Debug, Default, Clone)]
pub struct AthleteAggregate {
    pub races: Vec<Participation>,
    pub clubs: BTreeSet<String>,
    /// Every raw spelling that normalized onto this key.
    pub names: BTreeSet<String>,
    /// Most recently observed age; last write wins.
    pub age: String,
}

/// Aggregate joined records per athlete. Records with no finish time or with
/// the DNS/DNF place sentinel contribute nothing. A `(key, race-identity)`
/// pair produces at most one participation entry across the whole batch,
/// which guards against the club-fallback logic surfacing the same person
/// twice for one result.
pub fn aggregate(records: &[ResultRecord]) -> BTreeMap<String, AthleteAggregate> {
    let mut athletes: BTreeMap<String, AthleteAggregate> = BTreeMap::new();
    let mut seen: HashSet<(String, [String; 6])> = HashSet::new();

    for record in records {
        let row = &record.row;
        if row.finish.is_empty() || row.place.trim() == DNS_PLACE {
            log::debug!("skipping unraced row: {} / {} place={:?}", row.event, row.race, row.place);
            continue;
        }

        for athlete in &record.athletes {
            let key = names::normalize(&athlete.name);
            let race_id = [
                row.event.clone(),
                row.race.clone(),
                row.place.clone(),
                row.bow.clone(),
                row.club.clone(),
                row.finish.clone(),
            ];
            if !seen.insert((key.clone(), race_id)) {
                continue;
            }

            let entry = athletes.entry(key).or_default();
            entry.names.insert(athlete.name.clone());
            if !athlete.club.is_empty() {
                entry.clubs.insert(athlete.club.clone());
            }
            entry.age = athlete.age.clone();
            entry.races.push(Participation {
                event: row.event.clone(),
                race: row.race.clone(),
                place: row.place.clone(),
                bow: row.bow.clone(),
                club: row.club.clone(),
                finish: row.finish.clone(),
                margin: row.margin.clone(),
                seat: athlete.seat.clone(),
                num_boats: row.num_boats,
            });
        }
    }

    athletes
}
