use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::utils::{path_must_str, read_file};

/// A flag value as it appears in the `[flags]` table
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
}

impl Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl FlagValue {
    /// Parse a raw override string, `true` and `false` are booleans and
    /// everything else is kept as a string
    pub fn parse_override(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            s => Self::Str(s.into()),
        }
    }
}

/// Parsed `uxengine.toml`
///
/// ```toml
/// [flags]
/// adservice_enabled = true
/// consent_notification_reset_token = "b7f1"
///
/// [store]
/// path = "state/consent.json"
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    path: PathBuf,
    flags: HashMap<String, FlagValue>,
    store_path: Option<PathBuf>,
}

/// View over one table of the config file that remembers where it lives so
/// errors can name the full dotted key.
struct ConfigMap<'c> {
    path: &'c Path,
    name: Option<&'c str>,
    table: &'c Table,
}

impl<'c> ConfigMap<'c> {
    fn key_path<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self.name {
            None => Cow::Borrowed(key),
            Some(v) => Cow::Owned(format!("{}.{}", v, key)),
        }
    }

    fn invalid_key(&self, key: &str, expected: &str) -> crate::Error {
        crate::Error::InvalidConfig(
            path_must_str(self.path).into(),
            format!(
                "invalid value for key: {} (expected type: {})",
                self.key_path(key),
                expected
            ),
        )
    }

    fn maybe_get_map(&self, key: &'c str) -> crate::Result<Option<ConfigMap<'c>>> {
        match self.table.get(key) {
            None => Ok(None),
            Some(Value::Table(table)) => Ok(Some(ConfigMap {
                path: self.path,
                name: Some(key),
                table,
            })),
            Some(_) => Err(self.invalid_key(key, "table")),
        }
    }

    fn maybe_get_str(&self, key: &str) -> crate::Result<Option<&'c str>> {
        match self.table.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| self.invalid_key(key, "string")),
        }
    }
}

impl Config {
    pub const FLAGS_TABLE: &'static str = "flags";
    pub const STORE_TABLE: &'static str = "store";

    pub fn parse(source: &Path) -> crate::Result<Self> {
        let as_str = read_file(source)?;
        Self::parse_str(source, &as_str)
    }

    /// Parse config content, `source` is only used for error messages and
    /// resolving relative paths
    pub fn parse_str(source: &Path, content: &str) -> crate::Result<Self> {
        let base: Table = match toml::from_str(content) {
            Ok(v) => v,
            Err(e) => return Err(crate::Error::new_cfg(source, &e)),
        };

        let root = ConfigMap {
            path: source,
            name: None,
            table: &base,
        };

        let mut flags = HashMap::new();
        if let Some(map) = root.maybe_get_map(Self::FLAGS_TABLE)? {
            for (key, value) in map.table.iter() {
                let parsed = match value {
                    Value::Boolean(b) => FlagValue::Bool(*b),
                    Value::String(s) => FlagValue::Str(s.clone()),
                    _ => return Err(map.invalid_key(key, "bool or string")),
                };
                flags.insert(key.clone(), parsed);
            }
        }

        let store_path = match root.maybe_get_map(Self::STORE_TABLE)? {
            Some(map) => map.maybe_get_str("path")?.map(|p| {
                let p = PathBuf::from(p);
                match (p.is_absolute(), source.parent()) {
                    (false, Some(parent)) => parent.join(p),
                    _ => p,
                }
            }),
            None => None,
        };

        Ok(Self {
            path: PathBuf::from(source),
            flags,
            store_path,
        })
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    pub fn get_flags(&self) -> &HashMap<String, FlagValue> {
        &self.flags
    }

    pub fn get_flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// The consent state file, relative paths are resolved against the
    /// directory holding the config file
    pub fn get_store_path(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }
}
