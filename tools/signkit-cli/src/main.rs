mod settings;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use signkit_signing::{
    BuildVariant, KeystoreProperties, SigningConfig, SigningConfigResolver, signing_for_variant,
};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use settings::Settings;

/// Conventional app module of a native Android project.
const DEFAULT_MODULE_DIR: &str = "app";

const KEY_PROPERTIES_HEADER: &str =
    "# Release signing credentials. Keep this file out of version control.\n";

#[derive(Parser)]
#[command(name = "signkit")]
#[command(about = "Resolve release signing configuration for native builds", long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ResolveArgs {
    /// Native project root holding key.properties
    project_root: PathBuf,
    /// App module the keystore path is relative to (default: <PROJECT_ROOT>/app)
    #[arg(long)]
    module_dir: Option<PathBuf>,
    /// Properties file name, overriding signkit.toml
    #[arg(long)]
    properties_file: Option<PathBuf>,
    /// Use empty values for missing keys instead of failing
    #[arg(long)]
    allow_missing_fields: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signing credentials a release build would use
    Resolve {
        #[command(flatten)]
        args: ResolveArgs,
    },
    /// Fail if a build variant would be produced without signing
    Check {
        #[command(flatten)]
        args: ResolveArgs,
        /// Build variant to check
        #[arg(long, default_value = "release")]
        variant: String,
    },
    /// Write a key.properties file
    Init {
        /// Native project root to write key.properties into
        project_root: PathBuf,
        /// Keystore path, relative to the app module or absolute
        #[arg(long)]
        store_file: String,
        /// Keystore password
        #[arg(long)]
        store_password: String,
        /// Alias of the signing key
        #[arg(long)]
        key_alias: String,
        /// Password of the signing key
        #[arg(long)]
        key_password: String,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Resolve { args } => run_resolve(&args),
        Commands::Check { args, variant } => run_check(&args, &BuildVariant::from(variant.as_str())),
        Commands::Init {
            project_root,
            store_file,
            store_password,
            key_alias,
            key_password,
            force,
        } => {
            let keystore =
                KeystoreProperties::new(store_file, store_password, key_alias, key_password);
            run_init(&project_root, &keystore, force)
        }
    }
}

fn resolver_for(args: &ResolveArgs) -> Result<SigningConfigResolver> {
    let settings = Settings::load(&args.project_root)?;
    let options =
        settings.resolver_options(args.properties_file.as_deref(), args.allow_missing_fields);
    Ok(SigningConfigResolver::with_options(options))
}

fn module_dir(args: &ResolveArgs) -> PathBuf {
    args.module_dir
        .clone()
        .unwrap_or_else(|| args.project_root.join(DEFAULT_MODULE_DIR))
}

/// Resolve and fill the release slot. `None` when there is no properties file.
fn release_config(args: &ResolveArgs) -> Result<Option<(KeystoreProperties, SigningConfig)>> {
    let resolver = resolver_for(args)?;
    let keystore = resolver
        .resolve(&args.project_root)
        .context("Failed to resolve signing configuration")?;

    let mut release = SigningConfig::release();
    if !release.assign(keystore.as_ref(), &module_dir(args)) {
        println!(
            "{}",
            format!(
                "⚠️ No {} found, release builds will not be signed.",
                resolver.properties_path(&args.project_root).display()
            )
            .yellow()
        );
        return Ok(None);
    }
    Ok(keystore.map(|keystore| (keystore, release)))
}

fn run_resolve(args: &ResolveArgs) -> Result<()> {
    let Some((keystore, release)) = release_config(args)? else {
        return Ok(());
    };

    println!("{}", "🔑 Release signing configured".green().bold());
    let store_file = release.store_file().map_or_else(
        || "<empty>".to_string(),
        |path| path.display().to_string(),
    );
    println!("  storeFile:     {} ({store_file})", keystore.store_file_path());
    println!("  storePassword: {}", mask(keystore.store_password()));
    println!("  keyAlias:      {}", keystore.key_alias());
    println!("  keyPassword:   {}", mask(keystore.key_password()));

    if let Some(path) = release.store_file().filter(|path| !path.exists()) {
        println!(
            "{}",
            format!("⚠️ Keystore {} does not exist.", path.display()).yellow()
        );
    }
    if !release.is_complete() {
        println!(
            "{}",
            "⚠️ Some fields are empty, release builds will not be signed.".yellow()
        );
    }

    Ok(())
}

fn run_check(args: &ResolveArgs, variant: &BuildVariant) -> Result<()> {
    if !variant.is_release() {
        println!(
            "{}",
            format!("✅ Variant `{variant}` does not use release signing.").green()
        );
        return Ok(());
    }

    let release = release_config(args)?
        .map_or_else(SigningConfig::release, |(_, release)| release);
    if signing_for_variant(variant, &release).is_none() {
        anyhow::bail!("Variant `{variant}` would be built without signing");
    }

    println!(
        "{}",
        format!("✅ Variant `{variant}` will be signed.").green().bold()
    );
    Ok(())
}

fn run_init(project_root: &Path, keystore: &KeystoreProperties, force: bool) -> Result<()> {
    let settings = Settings::load(project_root)?;
    let resolver = SigningConfigResolver::with_options(settings.resolver_options(None, false));
    let path = resolver.properties_path(project_root);

    write_key_properties(&path, keystore, force)?;

    println!(
        "{}",
        format!("✅ Wrote {}", path.display()).green().bold()
    );
    println!("Make sure it is listed in .gitignore.");
    Ok(())
}

fn write_key_properties(path: &Path, keystore: &KeystoreProperties, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to replace it",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let contents = format!("{KEY_PROPERTIES_HEADER}{}", keystore.to_properties());
    let mut file = open_private(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Wrote signing properties to {}", path.display());
    Ok(())
}

/// Create or truncate `path`, readable by the owner only on unix.
fn open_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let file = options.open(path)?;
        // `mode` only applies to new files; an overwritten one keeps its bits.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        Ok(file)
    }
    #[cfg(not(unix))]
    {
        options.open(path)
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "<empty>" } else { "********" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(root: &Path) -> ResolveArgs {
        ResolveArgs {
            project_root: root.to_path_buf(),
            module_dir: None,
            properties_file: None,
            allow_missing_fields: false,
        }
    }

    #[test]
    fn parses_check_command() {
        let cli = Cli::try_parse_from(["signkit", "check", "android", "--variant", "debug"]).unwrap();
        match cli.command {
            Commands::Check { args, variant } => {
                assert_eq!(args.project_root, Path::new("android"));
                assert_eq!(variant, "debug");
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn init_requires_all_credentials() {
        assert!(
            Cli::try_parse_from(["signkit", "init", "android", "--store-file", "release.jks"])
                .is_err()
        );
    }

    #[test]
    fn init_output_resolves_back() {
        let dir = tempfile::tempdir().unwrap();
        let keystore = KeystoreProperties::new(
            "keys\\release.jks",
            " p\u{e4}ss",
            "upload",
            "\u{e9}t\u{e9}=",
        );
        let path = dir.path().join("key.properties");

        write_key_properties(&path, &keystore, false).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert!(written.is_ascii());
        assert!(String::from_utf8(written).unwrap().contains("keyPassword=\\u00E9t\\u00E9=\n"));

        let resolved = SigningConfigResolver::new().resolve(dir.path()).unwrap();
        assert_eq!(resolved, Some(keystore.clone()));

        assert!(write_key_properties(&path, &keystore, false).is_err());
        write_key_properties(&path, &keystore, true).unwrap();
    }

    #[test]
    fn release_config_uses_app_module() {
        let dir = tempfile::tempdir().unwrap();
        write_key_properties(
            &dir.path().join("key.properties"),
            &KeystoreProperties::new("release.jks", "s", "upload", "k"),
            false,
        )
        .unwrap();

        let (_, release) = release_config(&args(dir.path())).unwrap().unwrap();
        assert_eq!(
            release.store_file(),
            Some(dir.path().join("app/release.jks").as_path())
        );
    }

    #[test]
    fn check_fails_without_properties() {
        let dir = tempfile::tempdir().unwrap();
        assert!(release_config(&args(dir.path())).unwrap().is_none());
        assert!(run_check(&args(dir.path()), &BuildVariant::Release).is_err());
        assert!(run_check(&args(dir.path()), &BuildVariant::Debug).is_ok());
    }

    #[test]
    fn debug_check_ignores_broken_release_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("key.properties"), "not a property line\n").unwrap();

        assert!(run_check(&args(dir.path()), &BuildVariant::Debug).is_ok());
        assert!(run_check(&args(dir.path()), &BuildVariant::Release).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn key_properties_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.properties");
        let keystore = KeystoreProperties::new("release.jks", "s", "upload", "k");

        std::fs::write(&path, "old=1\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        write_key_properties(&path, &keystore, true).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let fresh = dir.path().join("fresh/key.properties");
        write_key_properties(&fresh, &keystore, false).unwrap();
        let mode = std::fs::metadata(&fresh).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn check_honors_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(settings::SETTINGS_FILE),
            "[signing]\nproperties-file = \"upload.properties\"\n",
        )
        .unwrap();
        write_key_properties(
            &dir.path().join("upload.properties"),
            &KeystoreProperties::new("release.jks", "s", "upload", "k"),
            false,
        )
        .unwrap();

        assert!(run_check(&args(dir.path()), &BuildVariant::Release).is_ok());
    }

    #[test]
    fn masks_secrets() {
        assert_eq!(mask(""), "<empty>");
        assert_eq!(mask("abc123"), "********");
    }
}
