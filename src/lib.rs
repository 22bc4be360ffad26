// src/lib.rs

#[macro_use]
pub mod macros;

pub mod cli;
pub mod params;

pub mod aggregate;
pub mod export;
pub mod names;
pub mod net;
pub mod runner;
pub mod scrape;
