//! Release signing configuration.
//!
//! A native release build is signed with credentials read from an optional
//! `key.properties` file at the project root. This crate turns that file into
//! a [`KeystoreProperties`] record, or into `None` when the file is absent, and
//! copies the record into the release [`SigningConfig`] consumed by the build
//! tool.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use signkit_signing::{BuildVariant, SigningConfig, SigningConfigResolver, signing_for_variant};
//!
//! # fn main() -> Result<(), signkit_signing::SigningError> {
//! let keystore = SigningConfigResolver::new().resolve(Path::new("android"))?;
//!
//! let mut release = SigningConfig::release();
//! release.assign(keystore.as_ref(), Path::new("android/app"));
//!
//! if signing_for_variant(&BuildVariant::Release, &release).is_none() {
//!     println!("release build will be unsigned");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod keystore;
mod resolver;

pub use config::{BuildVariant, SigningConfig, signing_for_variant};
pub use keystore::{KeystoreProperties, MissingField, MissingFieldPolicy, keys};
pub use resolver::{DEFAULT_PROPERTIES_FILE, ResolverOptions, SigningConfigResolver};

pub use signkit_properties::ParseError;

use std::path::PathBuf;

/// Errors that can occur when resolving signing configuration.
///
/// Every variant is fatal to the step that asked for signing; an absent
/// properties file is not an error.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The properties file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The properties file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The properties file is not valid `key=value` text.
    #[error("malformed {}: {source}", .path.display())]
    Parse {
        /// The properties file.
        path: PathBuf,
        /// The offending line and what was wrong with it.
        source: ParseError,
    },
    /// A required key is absent from an otherwise well-formed file.
    #[error("{} is missing required key `{key}`", .path.display())]
    MissingField {
        /// The properties file.
        path: PathBuf,
        /// The missing key.
        key: &'static str,
    },
}

impl SigningError {
    /// The properties file the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::MissingField { path, .. } => {
                path
            }
        }
    }
}
