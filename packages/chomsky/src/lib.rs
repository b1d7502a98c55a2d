#[macro_use]
extern crate log;

pub mod error;
pub mod grammar;
pub mod grammars;
pub mod language;
pub mod parser;
