use clap::error::ErrorKind;
use std::fmt::Display;

mod flag_override;
pub use flag_override::FlagOverrideValueParser;

pub fn simple_error(err: impl Display) -> clap::Error {
    clap::Error::raw(ErrorKind::InvalidValue, format!("{}\n", err.to_string()))
}
