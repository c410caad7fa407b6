//! Plugin activation.
//!
//! A plugin turns its configuration section into verification methods and
//! registers them. Enabling happens once at startup; any error is fatal so a
//! half-configured gate never serves traffic.

use std::collections::BTreeMap;

use tracing::info;

use crate::error::ConfigError;
use crate::recaptcha::Captcha2Plugin;
use crate::registry::VerificationRegistry;

/// Static plugin metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginDescription {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

/// A verification plugin.
pub trait Plugin: Send + Sync {
    fn describe(&self) -> PluginDescription;

    /// Validate `config` and register the plugin's methods.
    ///
    /// `None` means the host has no section for this plugin.
    fn on_enable(
        &self,
        config: Option<&PluginConfig>,
        registry: &mut VerificationRegistry,
    ) -> Result<(), ConfigError>;
}

/// One plugin's configuration section (key -> value).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    values: BTreeMap<String, String>,
}

impl PluginConfig {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Read a section from environment variables named `<PLUGIN>_<KEY>`.
    ///
    /// For `captcha2`, `CAPTCHA2_SITEKEY` becomes the `sitekey` key. Returns
    /// `None` when no variable carries the prefix.
    pub fn from_env(plugin: &str) -> Option<Self> {
        Self::from_vars(plugin, std::env::vars())
    }

    /// Same as [`PluginConfig::from_env`] over an explicit variable list.
    pub fn from_vars(
        plugin: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Option<Self> {
        let prefix = format!("{}_", plugin.to_uppercase());
        let values: BTreeMap<_, _> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .filter(|k| !k.is_empty())
                    .map(|k| (k.to_lowercase(), value))
            })
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(Self { values })
        }
    }

    /// Builder-style helper to set a key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of `key` if present and not empty.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keys only: sections routinely carry secrets.
        f.debug_struct("PluginConfig")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Look up a built-in plugin by name.
pub fn builtin_plugin(name: &str) -> Option<Box<dyn Plugin>> {
    match name {
        Captcha2Plugin::NAME => Some(Box::new(Captcha2Plugin)),
        _ => None,
    }
}

/// Enable the named plugins in order, registering their methods.
///
/// `config_for` supplies each plugin's section. Stops at the first error.
pub fn enable_plugins<'a, I, F>(
    names: I,
    mut config_for: F,
    registry: &mut VerificationRegistry,
) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = &'a str>,
    F: FnMut(&str) -> Option<PluginConfig>,
{
    for name in names {
        let plugin =
            builtin_plugin(name).ok_or_else(|| ConfigError::UnknownPlugin(name.to_string()))?;
        let description = plugin.describe();
        let config = config_for(name);

        plugin.on_enable(config.as_ref(), registry)?;
        info!(
            plugin = description.name,
            version = description.version,
            "Enabled plugin"
        );
    }
    Ok(())
}
