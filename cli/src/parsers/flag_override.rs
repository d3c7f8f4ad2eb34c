use clap::builder::{NonEmptyStringValueParser, TypedValueParser};
use lazy_static::lazy_static;
use regex::Regex;

use crate::parsers::simple_error;
use uxengine::config::FlagValue;

lazy_static! {
    static ref FLAG_OVERRIDE: Regex =
        Regex::new(r"^([a-z0-9_]+)=(.*)$").expect("invalid regex");
}

/// Parses `key=value` flag overrides, `true` and `false` are booleans and
/// anything else is a string
#[derive(Clone)]
pub struct FlagOverrideValueParser;

impl TypedValueParser for FlagOverrideValueParser {
    type Value = (String, FlagValue);

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let parser = NonEmptyStringValueParser::new();
        let val = parser.parse_ref(cmd, arg, value)?;
        parse_override(&val).ok_or_else(|| {
            simple_error(format!(
                "invalid flag override `{}` (expected key=value, e.g. ga_ux_enabled=true)",
                val
            ))
        })
    }
}

fn parse_override(raw: &str) -> Option<(String, FlagValue)> {
    let caps = FLAG_OVERRIDE.captures(raw)?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2)?.as_str();
    Some((key.into(), FlagValue::parse_override(value)))
}
