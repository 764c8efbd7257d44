pub mod cli;
pub mod config;
pub mod fetch;
pub mod grid;
pub mod ics;
pub mod link;
pub mod months;
pub mod parser;
pub mod sync;
pub mod week;
pub mod year;

mod structs;

pub use structs::Event;
