//! Feature flags consulted while selecting a UX and an enrollment channel.
//!
//! The engine only ever sees the [FlagState] trait. [UxFlags] is the
//! sessionized implementation: each key is resolved once from the layered
//! sources (built in defaults, the `[flags]` config table, environment and
//! explicit overrides) and then cached for the lifetime of the session.

use std::collections::HashMap;
use std::sync::Mutex;

use blanket::blanket;
use lazy_static::lazy_static;

use crate::config::FlagValue;
use crate::consent::Region;
use crate::Context;

pub const KEY_ADSERVICES_ENABLED: &'static str = "adservice_enabled";
pub const KEY_U18_UX_ENABLED: &'static str = "u18_ux_enabled";
pub const KEY_RVC_UX_ENABLED: &'static str = "rvc_ux_enabled";
pub const KEY_GA_UX_FEATURE_ENABLED: &'static str = "ga_ux_enabled";
pub const KEY_IS_U18_UX_DETENTION_CHANNEL_ENABLED: &'static str =
    "is_u18_ux_detention_channel_enabled";
pub const KEY_RVC_NOTIFICATION_ENABLED: &'static str = "rvc_post_ota_notification_enabled";
pub const KEY_GA_GRADUATION_CHANNEL_ENABLED: &'static str = "ga_graduation_channel_enabled";
pub const KEY_PAS_UX_ENABLED: &'static str = "pas_ux_enabled";
pub const KEY_EEA_PAS_UX_ENABLED: &'static str = "eea_pas_ux_enabled";
pub const KEY_IS_EEA_DEVICE_FEATURE_ENABLED: &'static str = "is_eea_device_feature_enabled";
pub const KEY_IS_EEA_DEVICE: &'static str = "is_eea_device";
pub const KEY_CONSENT_NOTIFICATION_DEBUG_MODE: &'static str = "consent_notification_debug_mode";
pub const KEY_CONSENT_NOTIFICATION_RESET_TOKEN: &'static str =
    "consent_notification_reset_token";

/// Prefix for environment overrides, `UXENGINE_FLAG_GA_UX_ENABLED=true`
pub const FLAG_ENV_PREFIX: &'static str = "UXENGINE_FLAG_";

lazy_static! {
    static ref DEFAULT_FLAGS: Vec<(&'static str, bool)> = vec![
        (KEY_ADSERVICES_ENABLED, false),
        (KEY_U18_UX_ENABLED, false),
        (KEY_RVC_UX_ENABLED, false),
        (KEY_GA_UX_FEATURE_ENABLED, false),
        (KEY_IS_U18_UX_DETENTION_CHANNEL_ENABLED, true),
        (KEY_RVC_NOTIFICATION_ENABLED, false),
        (KEY_GA_GRADUATION_CHANNEL_ENABLED, false),
        (KEY_PAS_UX_ENABLED, false),
        (KEY_EEA_PAS_UX_ENABLED, false),
        (KEY_IS_EEA_DEVICE_FEATURE_ENABLED, false),
        (KEY_IS_EEA_DEVICE, false),
        (KEY_CONSENT_NOTIFICATION_DEBUG_MODE, false),
    ];
}

/// Default value for a boolean flag, unknown keys are off
pub fn default_flag(key: &str) -> bool {
    DEFAULT_FLAGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(false)
}

/// All known boolean flag keys in display order
pub fn known_flags() -> impl Iterator<Item = &'static str> {
    DEFAULT_FLAGS.iter().map(|(k, _)| *k)
}

/// Read only view of the flags relevant to UX selection
#[blanket(derive(Ref, Box))]
pub trait FlagState: Send + Sync {
    fn get_flag(&self, key: &str) -> bool;

    /// String valued flags, `None` when unset
    fn get_string(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Classify the device region from the flags.
///
/// `is_eea_device` is used as is. With `is_eea_device_feature_enabled` off it
/// stands in for the device's own region lookup and the result is not
/// trusted, which [pas_ux_enabled] accounts for.
pub fn region_from_flags(flags: &dyn FlagState) -> Region {
    if flags.get_flag(KEY_IS_EEA_DEVICE) {
        Region::Eu
    } else {
        Region::Row
    }
}

/// Whether the PAS notification applies to a device in the given region.
///
/// When the EEA PAS rollout is on, EU devices always get it (as does any
/// device whose region classification isn't trusted) and ROW devices follow
/// the ROW flag. Otherwise only trusted ROW devices with the ROW flag get it.
pub fn pas_ux_enabled(flags: &dyn FlagState, region: Region) -> bool {
    let region_trusted = flags.get_flag(KEY_IS_EEA_DEVICE_FEATURE_ENABLED);
    if flags.get_flag(KEY_EEA_PAS_UX_ENABLED) {
        if !region_trusted || region == Region::Eu {
            return true;
        }
        return flags.get_flag(KEY_PAS_UX_ENABLED);
    }
    region_trusted && region == Region::Row && flags.get_flag(KEY_PAS_UX_ENABLED)
}

/// Sessionized flags, every key is resolved once and then cached.
///
/// Resolution order is explicit overrides, then `UXENGINE_FLAG_<KEY>`
/// environment variables, then the config file, then the built in defaults.
pub struct UxFlags {
    config: HashMap<String, FlagValue>,
    env: HashMap<String, String>,
    overrides: HashMap<String, FlagValue>,
    cache: Mutex<HashMap<String, FlagValue>>,
}

impl UxFlags {
    /// Build the flags from the context's config file and environment
    pub fn from_context(ctx: &dyn Context) -> crate::Result<Self> {
        let mut flags = Self::empty();
        if let Some(cfg) = ctx.get_config()? {
            flags.config = cfg.get_flags().clone();
        }
        for key in known_flags().chain(std::iter::once(KEY_CONSENT_NOTIFICATION_RESET_TOKEN)) {
            if let Some(v) = ctx.maybe_get_env(&env_key(key)) {
                flags.env.insert(key.into(), v);
            }
        }
        Ok(flags)
    }

    /// Flags with nothing but the defaults
    pub fn empty() -> Self {
        Self {
            config: HashMap::new(),
            env: HashMap::new(),
            overrides: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Add overrides that take precedence over everything else
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, FlagValue)>,
    {
        self.overrides.extend(overrides);
        self
    }

    fn resolve(&self, key: &str) -> Option<FlagValue> {
        if let Some(v) = self.overrides.get(key) {
            return Some(v.clone());
        }
        if let Some(raw) = self.env.get(key) {
            return Some(FlagValue::parse_override(raw));
        }
        self.config.get(key).cloned()
    }

    fn cached(&self, key: &str) -> Option<FlagValue> {
        let mut cache = self.cache.lock().expect("failed to lock");
        if let Some(v) = cache.get(key) {
            return Some(v.clone());
        }
        let resolved = self.resolve(key)?;
        log::trace!("resolved flag {} = {}", key, resolved);
        cache.insert(key.into(), resolved.clone());
        Some(resolved)
    }
}

impl FlagState for UxFlags {
    fn get_flag(&self, key: &str) -> bool {
        match self.cached(key) {
            Some(FlagValue::Bool(b)) => b,
            Some(FlagValue::Str(s)) => {
                log::warn!("flag {} has non boolean value {:?}, using default", key, s);
                default_flag(key)
            }
            None => default_flag(key),
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.cached(key)? {
            FlagValue::Str(s) => Some(s),
            FlagValue::Bool(b) => Some(b.to_string()),
        }
    }
}

fn env_key(key: &str) -> String {
    format!("{}{}", FLAG_ENV_PREFIX, key.to_ascii_uppercase())
}

/// Plain in memory flags, anything not set falls back to the defaults
#[derive(Default, Clone, Debug)]
pub struct StaticFlags {
    values: HashMap<String, FlagValue>,
}

impl StaticFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: bool) -> &mut Self {
        self.values.insert(key.into(), FlagValue::Bool(value));
        self
    }

    pub fn set_string(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.into(), FlagValue::Str(value.into()));
        self
    }
}

impl FlagState for StaticFlags {
    fn get_flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(FlagValue::Bool(b)) => *b,
            _ => default_flag(key),
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            FlagValue::Str(s) => Some(s.clone()),
            FlagValue::Bool(b) => Some(b.to_string()),
        }
    }
}
