//! A football match diary: a browsable catalog, star ratings and reviews,
//! favorites, a watched log, custom lists, and trending and top-rated
//! rankings, all kept in named JSON slots that live views stay in sync with.

pub use admin::{CatalogStats, MatchDraft};
pub use catalog::{CatalogQuery, MatchSort};
pub use client::Matchday;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{MatchdayError, Result};
pub use keys::SlotKey;
pub use model::*;
pub use store::{Binding, FileStorage, MemoryStorage, SlotBus, SlotChange, SlotStorage, Store};

pub mod catalog;
pub mod clock;
pub mod config;
pub mod keys;
pub mod ranking;
pub mod seed;
pub mod store;

mod accounts;
mod activity;
mod admin;
mod client;
mod error;
mod model;
mod reviews;
