pub mod audit;
pub mod cleaner;
pub mod collector;
pub mod config;
pub mod dates;
pub mod extractor;
pub mod ledger;
pub mod outcome;
pub mod paths;
pub mod pipeline;
pub mod relocator;
pub mod sweeper;
pub mod transcribe;
pub mod util;
pub mod warn;
