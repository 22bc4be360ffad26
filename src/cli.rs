// src/cli.rs
use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::path::PathBuf;

use crate::aggregate::AthleteAggregate;
use crate::export;
use crate::params::Params;
use crate::runner;

const HELP: &str = "\
Usage: rc_scrape [OPTIONS]

Scrape a regatta's results and write per-athlete race data to CSV.

Options:
  -u, --url <URL>    Landing page with the event links
                     (default: the RegattaCentral results2 page)
  -o, --out <FILE>   Output CSV path (default: athletes.csv)
  -q, --quiet        Skip the per-athlete console summary
  -h, --help         Show this help";

pub fn run() -> Result<(), Box<dyn Error>> {
    let params = parse_cli()?;

    let athletes = runner::scrape_athletes(&params)?;
    if !params.quiet {
        print_summary(&athletes);
    }

    export::write_csv_file(&athletes, &params.out)?;
    println!("Wrote athlete data to {}", params.out.display());
    Ok(())
}

fn parse_cli() -> Result<Params, Box<dyn Error>> {
    let mut params = Params::new();

    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "-u" | "--url" => params.url = args.next().ok_or("Missing value for --url")?,
            "-o" | "--out" => {
                params.out = PathBuf::from(args.next().ok_or("Missing output path")?)
            }
            "-q" | "--quiet" => params.quiet = true,
            "-h" | "--help" => {
                eprintln!("{HELP}");
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown arg: {}", a).into()),
        }
    }

    Ok(params)
}

fn print_summary(athletes: &BTreeMap<String, AthleteAggregate>) {
    for (name, info) in athletes {
        println!("Athlete: {name}");
        println!("  Clubs: {}", info.clubs.iter().cloned().collect::<Vec<_>>().join(", "));
        println!("  Races:");
        for race in &info.races {
            println!(
                "    - Event: {}, Race: {}, Place: {}, Club: {}, Finish: {}, Seat: {}, Boat Count: {}",
                race.event, race.race, race.place, race.club, race.finish, race.seat, race.num_boats
            );
        }
        println!();
    }
}
