use std::fmt;
use std::path::{Path, PathBuf};

use crate::KeystoreProperties;

/// A named build profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildVariant {
    /// Debug build, signed with the build tool's debug key.
    Debug,
    /// Release build, signed with the release [`SigningConfig`].
    Release,
    /// Any other flavor or build type.
    Other(String),
}

impl BuildVariant {
    /// Whether this is the release variant.
    #[must_use]
    pub const fn is_release(&self) -> bool {
        matches!(self, Self::Release)
    }

    /// The variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for BuildVariant {
    fn from(name: &str) -> Self {
        if name.eq_ignore_ascii_case("release") {
            Self::Release
        } else if name.eq_ignore_ascii_case("debug") {
            Self::Debug
        } else {
            Self::Other(name.to_string())
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A signing slot as the native build tool sees it.
///
/// Every field starts unset and is filled by [`SigningConfig::assign`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningConfig {
    name: String,
    store_file: Option<PathBuf>,
    store_password: Option<String>,
    key_alias: Option<String>,
    key_password: Option<String>,
}

impl SigningConfig {
    /// Create an empty slot.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create the empty `release` slot.
    #[must_use]
    pub fn release() -> Self {
        Self::new("release")
    }

    /// Copy resolved credentials into this slot.
    ///
    /// With `None` the slot is left untouched and `false` is returned, so the
    /// release artifact is produced unsigned instead of failing here. The
    /// keystore path is resolved against `module_dir`.
    pub fn assign(&mut self, keystore: Option<&KeystoreProperties>, module_dir: &Path) -> bool {
        let Some(keystore) = keystore else {
            log::warn!(
                "No keystore properties, leaving signing config `{}` empty",
                self.name
            );
            return false;
        };

        // An empty path would otherwise resolve to the module directory itself.
        self.store_file = (!keystore.store_file_path().is_empty())
            .then(|| keystore.store_file_in(module_dir));
        self.store_password = Some(keystore.store_password().to_owned());
        self.key_alias = Some(keystore.key_alias().to_owned());
        self.key_password = Some(keystore.key_password().to_owned());
        log::debug!(
            "Signing config `{}` uses key `{}` from {}",
            self.name,
            keystore.key_alias(),
            keystore.store_file_path()
        );
        true
    }

    /// Whether all four fields are set and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.store_file.is_some()
            && [&self.store_password, &self.key_alias, &self.key_password]
                .into_iter()
                .all(|v| v.as_ref().is_some_and(|s| !s.is_empty()))
    }

    /// The slot name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved keystore file.
    #[must_use]
    pub fn store_file(&self) -> Option<&Path> {
        self.store_file.as_deref()
    }

    /// The keystore password.
    #[must_use]
    pub fn store_password(&self) -> Option<&str> {
        self.store_password.as_deref()
    }

    /// The key alias.
    #[must_use]
    pub fn key_alias(&self) -> Option<&str> {
        self.key_alias.as_deref()
    }

    /// The key password.
    #[must_use]
    pub fn key_password(&self) -> Option<&str> {
        self.key_password.as_deref()
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("SigningConfig")
            .field("name", &self.name)
            .field("store_file", &self.store_file)
            .field("store_password", &mask(&self.store_password))
            .field("key_alias", &self.key_alias)
            .field("key_password", &mask(&self.key_password))
            .finish()
    }
}

/// The signing config a variant should be built with.
///
/// Only the release variant takes `config`, and only once it is complete.
/// Every other case returns `None` and the build tool falls back to its own
/// behavior (debug key, or an unsigned release artifact).
#[must_use]
pub fn signing_for_variant<'a>(
    variant: &BuildVariant,
    config: &'a SigningConfig,
) -> Option<&'a SigningConfig> {
    if !variant.is_release() {
        return None;
    }
    if config.is_complete() {
        Some(config)
    } else {
        log::warn!("Release build has no complete signing config, it will not be signed");
        None
    }
}
