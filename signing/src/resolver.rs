use std::fs;
use std::path::{Path, PathBuf};

use crate::{KeystoreProperties, MissingFieldPolicy, SigningError};

/// File name looked up under the project root.
pub const DEFAULT_PROPERTIES_FILE: &str = "key.properties";

/// Read-only settings for [`SigningConfigResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Properties file, relative to the project root. Defaults to
    /// [`DEFAULT_PROPERTIES_FILE`].
    pub file_name: PathBuf,
    /// Handling of absent keys. Defaults to [`MissingFieldPolicy::Error`].
    pub missing_fields: MissingFieldPolicy,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            file_name: PathBuf::from(DEFAULT_PROPERTIES_FILE),
            missing_fields: MissingFieldPolicy::default(),
        }
    }
}

impl ResolverOptions {
    /// Use a different properties file name.
    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<PathBuf>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Set the missing key policy.
    #[must_use]
    pub fn missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }
}

/// Resolves the signing credentials of a project.
#[derive(Debug, Clone, Default)]
pub struct SigningConfigResolver {
    options: ResolverOptions,
}

impl SigningConfigResolver {
    /// Create a resolver with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with the given options.
    #[must_use]
    pub const fn with_options(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// The options this resolver was built with.
    #[must_use]
    pub const fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Where the properties file is expected for `project_root`.
    #[must_use]
    pub fn properties_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.options.file_name)
    }

    /// Resolve the signing credentials for `project_root`.
    ///
    /// Returns `Ok(None)` when the properties file does not exist. Otherwise
    /// the file is read once and either yields a complete record or an error;
    /// a partially populated record is never returned.
    ///
    /// # Errors
    /// - [`SigningError::Io`] if the file exists but cannot be read.
    /// - [`SigningError::Parse`] if the content is not `key=value` text.
    /// - [`SigningError::MissingField`] if a key is absent and the policy is
    ///   [`MissingFieldPolicy::Error`].
    pub fn resolve(&self, project_root: &Path) -> Result<Option<KeystoreProperties>, SigningError> {
        let path = self.properties_path(project_root);
        log::debug!("Looking for signing properties at {}", path.display());

        let exists = path.try_exists().map_err(|source| SigningError::Io {
            path: path.clone(),
            source,
        })?;
        if !exists {
            log::info!(
                "No {} found, release signing is not configured",
                path.display()
            );
            return Ok(None);
        }

        // The file may vanish or turn out unreadable after the check; that is
        // an I/O failure, not absence.
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(SigningError::Io { path, source }),
        };
        let text = decode(&bytes);

        let props = match signkit_properties::parse(&text) {
            Ok(props) => props,
            Err(source) => return Err(SigningError::Parse { path, source }),
        };
        log::debug!("Parsed {} keys from {}", props.len(), path.display());

        KeystoreProperties::from_properties(&props, self.options.missing_fields)
            .map(Some)
            .map_err(|missing| SigningError::MissingField {
                path,
                key: missing.key,
            })
    }
}

/// ISO-8859-1, one char per byte, as the native build tool reads the file.
/// Non-ASCII text must be written as `\uXXXX` escapes to survive.
fn decode(bytes: &[u8]) -> String {
    if !bytes.is_ascii() {
        log::warn!("Signing properties contain non-ASCII bytes, reading them as ISO-8859-1");
    }
    bytes.iter().copied().map(char::from).collect()
}
