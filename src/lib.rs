//! # Signkit
//!
//! Release signing configuration for native mobile builds.
//!
//! A release build reads its signing credentials from an optional
//! `key.properties` file that lives next to the native project and is kept
//! out of source control. Signkit resolves that file into a typed record, or
//! into an explicit "absent" value that the signing step knows how to skip.
//!
//! ## Features
//!
//! - `properties`: Parser for flat `key=value` properties files.
//! - `signing`: Keystore resolution and the release signing slot (default).
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! signkit = { version = "0.1", features = ["signing"] }
//! ```
//!
//! ```rust,no_run
//! use std::path::Path;
//! use signkit::signing::{SigningConfig, SigningConfigResolver};
//!
//! # fn main() -> Result<(), signkit::signing::SigningError> {
//! let root = Path::new("android");
//! let keystore = SigningConfigResolver::new().resolve(root)?;
//!
//! let mut release = SigningConfig::release();
//! release.assign(keystore.as_ref(), &root.join("app"));
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "properties")]
pub use signkit_properties as properties;

#[cfg(feature = "signing")]
pub use signkit_signing as signing;
