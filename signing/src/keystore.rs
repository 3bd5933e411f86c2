use std::fmt;
use std::path::{Path, PathBuf};

use signkit_properties::Properties;

/// Keys read from `key.properties`.
pub mod keys {
    /// Path to the keystore file.
    pub const STORE_FILE: &str = "storeFile";
    /// Password of the keystore.
    pub const STORE_PASSWORD: &str = "storePassword";
    /// Alias of the signing key inside the keystore.
    pub const KEY_ALIAS: &str = "keyAlias";
    /// Password of the signing key.
    pub const KEY_PASSWORD: &str = "keyPassword";

    /// All required keys, in the order they are checked.
    pub const ALL: [&str; 4] = [STORE_FILE, STORE_PASSWORD, KEY_ALIAS, KEY_PASSWORD];
}

/// What to do when a required key is absent from the properties file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingFieldPolicy {
    /// Fail with [`MissingField`].
    #[default]
    Error,
    /// Substitute an empty string, as older build scripts silently did.
    Empty,
}

/// A required key was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing required key `{key}`")]
pub struct MissingField {
    /// The missing key.
    pub key: &'static str,
}

/// Signing credentials for a release build.
///
/// A value of this type is always fully populated; the absence of signing
/// material is expressed as `Option<KeystoreProperties>` instead. Passwords
/// are masked in the `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct KeystoreProperties {
    store_file_path: String,
    store_password: String,
    key_alias: String,
    key_password: String,
}

impl KeystoreProperties {
    /// Create a record from its four fields.
    #[must_use]
    pub fn new(
        store_file_path: impl Into<String>,
        store_password: impl Into<String>,
        key_alias: impl Into<String>,
        key_password: impl Into<String>,
    ) -> Self {
        Self {
            store_file_path: store_file_path.into(),
            store_password: store_password.into(),
            key_alias: key_alias.into(),
            key_password: key_password.into(),
        }
    }

    /// Build a record by looking up the four [`keys`] in parsed properties.
    ///
    /// Values are copied verbatim. Extra keys are ignored.
    ///
    /// # Errors
    /// Returns [`MissingField`] for the first absent key when `policy` is
    /// [`MissingFieldPolicy::Error`].
    pub fn from_properties(
        props: &Properties,
        policy: MissingFieldPolicy,
    ) -> Result<Self, MissingField> {
        let field = |key: &'static str| match (props.get(key), policy) {
            (Some(value), _) => Ok(value.to_owned()),
            (None, MissingFieldPolicy::Empty) => {
                log::warn!("Signing key `{key}` is missing, using an empty value");
                Ok(String::new())
            }
            (None, MissingFieldPolicy::Error) => Err(MissingField { key }),
        };

        Ok(Self {
            store_file_path: field(keys::STORE_FILE)?,
            store_password: field(keys::STORE_PASSWORD)?,
            key_alias: field(keys::KEY_ALIAS)?,
            key_password: field(keys::KEY_PASSWORD)?,
        })
    }

    /// The keystore path as written in the file.
    #[must_use]
    pub fn store_file_path(&self) -> &str {
        &self.store_file_path
    }

    /// The keystore password.
    #[must_use]
    pub fn store_password(&self) -> &str {
        &self.store_password
    }

    /// The key alias.
    #[must_use]
    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }

    /// The key password.
    #[must_use]
    pub fn key_password(&self) -> &str {
        &self.key_password
    }

    /// Resolve the keystore path against the app module directory.
    ///
    /// Absolute paths are returned unchanged. Relative paths are relative to
    /// the module that is being signed, not to the directory holding
    /// `key.properties`.
    #[must_use]
    pub fn store_file_in(&self, module_dir: &Path) -> PathBuf {
        module_dir.join(&self.store_file_path)
    }

    /// Render the record back into properties, in [`keys::ALL`] order.
    #[must_use]
    pub fn to_properties(&self) -> Properties {
        keys::ALL
            .into_iter()
            .zip([
                &self.store_file_path,
                &self.store_password,
                &self.key_alias,
                &self.key_password,
            ])
            .map(|(k, v)| (k, v.as_str()))
            .collect()
    }
}

impl fmt::Debug for KeystoreProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreProperties")
            .field("store_file_path", &self.store_file_path)
            .field("store_password", &"***")
            .field("key_alias", &self.key_alias)
            .field("key_password", &"***")
            .finish()
    }
}
