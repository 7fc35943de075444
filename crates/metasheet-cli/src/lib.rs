#![deny(unsafe_code)]

//! Library side of the `metasheet` command-line tool.

pub mod input;
pub mod logging;
pub mod report;
