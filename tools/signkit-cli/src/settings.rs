//! Optional `signkit.toml` next to `key.properties`.
//!
//! ```toml
//! [signing]
//! properties-file = "key.properties"
//! missing-fields = "error" # or "empty"
//! ```

use anyhow::{Context, Result};
use signkit_signing::{MissingFieldPolicy, ResolverOptions};
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item};

pub const SETTINGS_FILE: &str = "signkit.toml";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub properties_file: Option<PathBuf>,
    pub missing_fields: Option<MissingFieldPolicy>,
}

impl Settings {
    /// Read `signkit.toml` from `project_root`, or defaults if there is none.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        log::debug!("Reading settings from {}", path.display());

        let toml_str = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&toml_str).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn parse(toml_str: &str) -> Result<Self> {
        let doc = toml_str.parse::<DocumentMut>().context("Parse settings toml")?;

        let Some(signing) = doc.get("signing") else {
            return Ok(Self::default());
        };
        let signing = signing
            .as_table_like()
            .ok_or_else(|| anyhow::anyhow!("`signing` must be a table"))?;

        let properties_file = signing
            .get("properties-file")
            .map(|item| string_value(item, "properties-file"))
            .transpose()?
            .map(PathBuf::from);

        let missing_fields = signing
            .get("missing-fields")
            .map(|item| string_value(item, "missing-fields").and_then(parse_policy))
            .transpose()?;

        Ok(Self {
            properties_file,
            missing_fields,
        })
    }

    /// Combine file settings with command-line overrides.
    pub fn resolver_options(
        &self,
        properties_file: Option<&Path>,
        allow_missing_fields: bool,
    ) -> ResolverOptions {
        let mut options = ResolverOptions::default();
        if let Some(file) = properties_file.or(self.properties_file.as_deref()) {
            options = options.file_name(file);
        }
        if allow_missing_fields {
            options = options.missing_fields(MissingFieldPolicy::Empty);
        } else if let Some(policy) = self.missing_fields {
            options = options.missing_fields(policy);
        }
        options
    }
}

fn string_value<'a>(item: &'a Item, key: &str) -> Result<&'a str> {
    item.as_str()
        .ok_or_else(|| anyhow::anyhow!("`signing.{key}` must be a string"))
}

fn parse_policy(value: &str) -> Result<MissingFieldPolicy> {
    match value {
        "error" => Ok(MissingFieldPolicy::Error),
        "empty" => Ok(MissingFieldPolicy::Empty),
        other => anyhow::bail!(
            "`signing.missing-fields` must be \"error\" or \"empty\", found {other:?}"
        ),
    }
}
