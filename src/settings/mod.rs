//! Settings store holding the resolved tool locations.
//!
//! [`SettingsStore`] is a plain value that can be built and passed around
//! explicitly. The process-wide instance used by [`get_setting`] and
//! [`change_settings`] starts out empty and is filled by [`init`] during
//! startup, so a lookup before that fails with
//! [`SettingsError::UnknownSetting`].

mod value;

pub use value::SettingValue;

use crate::config::Config;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use toolforged_av::{Resolution, Resolver, SystemLauncher, ToolKind, ToolSpec};

/// Settings key holding the platform tag.
pub const PLATFORM: &str = "PLATFORM";

/// Errors raised by the settings store.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The name was never registered.
    #[error("Unknown setting {0}")]
    UnknownSetting(String),

    /// A settings file held a value that is not a scalar.
    #[error("Unsupported value for setting {key} in {path}: only strings, numbers and booleans are allowed")]
    UnsupportedValue { key: String, path: String },

    /// A settings file could not be read.
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A settings file is not valid TOML.
    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A configured tool override is broken.
    #[error(transparent)]
    Resolution(#[from] toolforged_av::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Mapping from setting name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    values: BTreeMap<String, SettingValue>,
}

impl SettingsStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Resolve both tools on the host platform and seed a store.
    ///
    /// # Errors
    ///
    /// Fails when a configured override is broken.
    pub fn initialize(config: &Config) -> Result<Self> {
        let launcher = SystemLauncher::with_timeout(config.tools.probe_timeout());
        let resolver = Resolver::system()
            .with_launcher(Arc::new(launcher))
            .with_resources_dir(config.tools.resources_dir());
        Self::initialize_with(config, &resolver)
    }

    /// Seed a store using `resolver`.
    ///
    /// Static constants from `[settings]` go in first; the platform tag and
    /// the two tool entries are written last.
    pub fn initialize_with(config: &Config, resolver: &Resolver) -> Result<Self> {
        let mut store = Self::new();
        store.values.extend(
            config
                .settings
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        store.set(PLATFORM, resolver.platform().as_str());

        for kind in ToolKind::ALL {
            let spec = ToolSpec::for_kind(kind).with_override(config.tools.override_for(kind));
            let resolution = resolver.resolve(&spec)?;
            store.set(&spec.name, resolution.as_setting());
        }

        Ok(store)
    }

    /// Value of `name`.
    ///
    /// # Errors
    ///
    /// [`SettingsError::UnknownSetting`] if `name` was never set.
    pub fn get(&self, name: &str) -> Result<&SettingValue> {
        self.values
            .get(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set a single value, replacing any previous one.
    pub fn set(&mut self, name: &str, value: impl Into<SettingValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Merge `overrides` into the store.
    ///
    /// When `source_file` is given it is read as a flat TOML table and merged
    /// first, so `overrides` win on collisions. Values are not validated.
    pub fn update<I, K, V>(&mut self, overrides: I, source_file: Option<&Path>) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SettingValue>,
    {
        if let Some(path) = source_file {
            let from_file = read_settings_file(path)?;
            self.values.extend(from_file);
        }

        self.values
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        Ok(())
    }

    /// Resolved location of `kind`.
    pub fn tool(&self, kind: ToolKind) -> Result<Resolution> {
        let value = self.get(kind.setting_name())?;
        Ok(Resolution::from_setting(&value.to_string()))
    }

    /// All settings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_settings_file(path: &Path) -> Result<BTreeMap<String, SettingValue>> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: display.clone(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: display.clone(),
        source,
    })?;

    table
        .into_iter()
        .map(|(key, value)| match SettingValue::from_toml(value) {
            Some(value) => Ok((key, value)),
            None => Err(SettingsError::UnsupportedValue {
                key,
                path: display.clone(),
            }),
        })
        .collect()
}

static GLOBAL: RwLock<SettingsStore> = RwLock::new(SettingsStore::new());

/// Resolve both tools and install the result as the process-wide store.
///
/// # Errors
///
/// Fails when a configured override is broken; the previous store is kept.
pub fn init(config: &Config) -> Result<()> {
    install(SettingsStore::initialize(config)?);
    Ok(())
}

/// Replace the process-wide store.
pub fn install(store: SettingsStore) {
    *GLOBAL.write() = store;
}

/// Copy of the process-wide store.
pub fn snapshot() -> SettingsStore {
    GLOBAL.read().clone()
}

/// Value of `name` in the process-wide store.
pub fn get_setting(name: &str) -> Result<SettingValue> {
    GLOBAL.read().get(name).cloned()
}

/// Merge overrides (and optionally a settings file) into the process-wide
/// store. See [`SettingsStore::update`].
pub fn change_settings<I, K, V>(overrides: I, filename: Option<&Path>) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<SettingValue>,
{
    GLOBAL.write().update(overrides, filename)
}
