use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::core::catalog::{read_manifest, ManifestEntry};
use crate::core::error::{JarJarError, JarJarResult};
use crate::core::maven::ArtifactIdentity;
use crate::core::package::{discover_jars, JarPackage, PackageHandle};
use crate::core::resolver::{resolve_with_settings, JsonRenderer, ReportRenderer, TextRenderer};
use crate::core::settings::{default_cache_root, default_settings_path, ResolverSettings};

/// Everything resolved (or nothing to resolve).
pub const EXIT_OK: u8 = 0;
/// Environment failure: I/O, unreadable archive, bad settings.
pub const EXIT_ENVIRONMENT: u8 = 1;
/// At least one embedded dependency could not be resolved.
pub const EXIT_UNRESOLVED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "jarjar", version, about = "Resolve jars embedded in mod files")]
pub struct Cli {
    /// Log everything (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (JSON)
    #[arg(long, global = true, env = "JARJAR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve embedded dependencies and extract the selected jars
    Resolve(ResolveArgs),
    /// List the embedded jars and ranges a mod file declares
    Inspect(InspectArgs),
    /// Print the effective settings
    Settings(SettingsArgs),
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Mod jars, or directories whose jars are all used
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Cache root for extracted jars
    #[arg(long, env = "JARJAR_CACHE_ROOT")]
    pub cache_root: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    pub jar: PathBuf,

    /// Only show entries for this `group:artifact`
    #[arg(long)]
    pub identity: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Also save them to the settings file, creating it if needed
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Run one CLI invocation, writing results to `out`. Returns the exit code.
pub fn execute(cli: Cli, out: &mut dyn Write) -> JarJarResult<u8> {
    let settings_path = cli.config.clone().unwrap_or_else(default_settings_path);
    let settings = ResolverSettings::load(&settings_path)?;

    match cli.command {
        Command::Resolve(args) => resolve(args, &settings, out),
        Command::Inspect(args) => inspect(args, &settings, out),
        Command::Settings(args) => {
            if args.write {
                settings.save(&settings_path)?;
                info!("Saved settings to {:?}", settings_path);
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&settings)?)?;
            Ok(EXIT_OK)
        }
    }
}

pub fn resolve(args: ResolveArgs, settings: &ResolverSettings, out: &mut dyn Write) -> JarJarResult<u8> {
    let cache_root = args.cache_root.unwrap_or_else(default_cache_root);
    std::fs::create_dir_all(&cache_root).map_err(|source| JarJarError::Io {
        path: cache_root.clone(),
        source,
    })?;

    let packages: Vec<PackageHandle> = discover_jars(&args.paths)?
        .into_iter()
        .map(|jar| Arc::new(jar) as PackageHandle)
        .collect();
    info!(
        "Resolving embedded dependencies of {} packages into {:?}",
        packages.len(),
        cache_root
    );

    match resolve_with_settings(&packages, &cache_root, settings) {
        Ok(artifacts) => {
            match args.format {
                OutputFormat::Json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&artifacts)?)?;
                }
                OutputFormat::Text => {
                    for artifact in &artifacts {
                        writeln!(
                            out,
                            "{}@{} -> {} ({:?}, from {})",
                            artifact.identity,
                            artifact.version,
                            artifact.path().display(),
                            artifact.cache.status,
                            artifact.origin
                        )?;
                    }
                }
            }
            Ok(EXIT_OK)
        }
        Err(JarJarError::Resolution(failure)) => {
            let report = failure.report();
            match args.format {
                OutputFormat::Json => {
                    writeln!(out, "{}", JsonRenderer { pretty: true }.render(&report))?;
                }
                OutputFormat::Text => {
                    write!(out, "{}", TextRenderer.render(&report))?;
                    for conflict in &report.conflicts {
                        writeln!(out, "# {}: {}", conflict.identity, conflict.guidance)?;
                    }
                }
            }
            Ok(EXIT_UNRESOLVED)
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Serialize)]
struct InspectLine<'a> {
    identity: String,
    requests: Option<String>,
    embeds: Option<String>,
    path: Option<&'a str>,
}

fn inspect_line(entry: &ManifestEntry) -> InspectLine<'_> {
    InspectLine {
        identity: entry.identifier.to_string(),
        requests: entry.version.range.as_ref().map(|r| r.to_string()),
        embeds: entry.embedded().map(|(_, v)| v.to_string()),
        path: entry.path.as_deref(),
    }
}

pub fn inspect(args: InspectArgs, settings: &ResolverSettings, out: &mut dyn Write) -> JarJarResult<u8> {
    let filter = args
        .identity
        .as_deref()
        .map(ArtifactIdentity::parse)
        .transpose()?;
    let package = JarPackage::new(&args.jar);

    let Some(manifest) = read_manifest(&package, &settings.manifest_path)? else {
        writeln!(out, "{} declares no embedded jars", args.jar.display())?;
        return Ok(EXIT_OK);
    };

    let lines: Vec<InspectLine<'_>> = manifest
        .jars
        .iter()
        .filter(|e| filter.as_ref().map_or(true, |id| &e.identifier == id))
        .map(inspect_line)
        .collect();

    match args.format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&lines)?)?;
        }
        OutputFormat::Text => {
            for line in &lines {
                writeln!(
                    out,
                    "{} requests={} embeds={} path={}",
                    line.identity,
                    line.requests.as_deref().unwrap_or("-"),
                    line.embeds.as_deref().unwrap_or("-"),
                    line.path.unwrap_or("-")
                )?;
            }
        }
    }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_resolve_arguments() {
        let cli = Cli::try_parse_from([
            "jarjar",
            "resolve",
            "mods",
            "extra.jar",
            "--cache-root",
            "/tmp/cache",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.paths, vec![PathBuf::from("mods"), PathBuf::from("extra.jar")]);
                assert_eq!(args.cache_root, Some(PathBuf::from("/tmp/cache")));
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn resolve_requires_paths() {
        assert!(Cli::try_parse_from(["jarjar", "resolve"]).is_err());
    }
}
