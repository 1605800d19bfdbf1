#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

#[macro_use]
extern crate tracing;

pub mod config;
pub mod data;
pub mod error;
pub mod roster;

pub use config::RosterConfig;
pub use data::student::Student;
pub use error::{GinghamError, GinghamResult};
pub use roster::{fetch_students, students_from_csv};
