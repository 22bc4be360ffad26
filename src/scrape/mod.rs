// src/scrape/mod.rs
pub mod join;
pub mod landing;
pub mod lineup;
pub mod results;

pub use join::{LineupSource, ResultRecord};
pub use landing::RegattaMetadata;
pub use lineup::Athlete;
pub use results::RaceRow;
