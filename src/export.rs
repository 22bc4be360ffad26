// src/export.rs
// Flatten the per-athlete aggregates into a CSV with one row per race
// appearance. Column order is a contract with the downstream spreadsheets.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::aggregate::AthleteAggregate;

pub const HEADER: [&str; 11] = [
    "athlete_name",
    "age",
    "club",
    "seat",
    "event",
    "race",
    "place",
    "bow",
    "finish",
    "margin",
    "num_boats",
];

/// Write the header plus one row per (athlete, participation). Athletes with
/// no participations emit nothing.
pub fn write_csv<W: Write>(
    athletes: &BTreeMap<String, AthleteAggregate>,
    out: W,
) -> Result<(), Box<dyn Error>> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(HEADER)?;

    for (name, info) in athletes {
        let clubs = info.clubs.iter().cloned().collect::<Vec<_>>().join(", ");
        for race in &info.races {
            let num_boats = race.num_boats.to_string();
            w.write_record([
                name.as_str(),
                info.age.as_str(),
                clubs.as_str(),
                race.seat.as_str(),
                race.event.as_str(),
                race.race.as_str(),
                race.place.as_str(),
                race.bow.as_str(),
                race.finish.as_str(),
                race.margin.as_str(),
                num_boats.as_str(),
            ])?;
        }
    }

    w.flush()?;
    Ok(())
}

/// File convenience wrapper: creates parent directories, truncates, writes.
pub fn write_csv_file(
    athletes: &BTreeMap<String, AthleteAggregate>,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let out = BufWriter::new(File::create(path)?);
    write_csv(athletes, out)
}
