//! Statistics acquisition from `systemd-resolve --statistics` output.
//!
//! Parsing is split from process handling so the parser stays a pure
//! function over text.

mod parser;
mod reader;

pub use parser::{parse_stat_line, parse_statistics};
pub use reader::{DEFAULT_ARGS, DEFAULT_COMMAND, TextStatsReader};
