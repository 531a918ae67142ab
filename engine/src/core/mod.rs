//! Core time primitives shared by every stage of a run

pub mod time;

pub use time::{Day, DayIndex, Stage, TimeAxis, TimeAxisError};
