use std::path::PathBuf;

use clap::Parser;

use crate::model::ScopeType;

/// Resolves Maven dependencies from the local repository and file repositories.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// User settings.xml [default: $HOME/.m2/settings.xml, if present]
    #[clap(short, long, global = true, env = "SHRINKWRAP_SETTINGS_USER")]
    pub settings: Option<PathBuf>,
    /// Global settings.xml, overridden by the user settings
    #[clap(long, global = true, env = "SHRINKWRAP_SETTINGS_GLOBAL")]
    pub global_settings: Option<PathBuf>,
    /// Profiles to activate, in settings and POM files
    #[clap(long = "profile", global = true)]
    pub profiles: Vec<String>,
    #[clap(long, global = true)]
    pub offline: bool,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Resolves the given coordinates and prints the paths of the resolved artifacts
    Resolve {
        /// POM file providing dependency management and, with --import-pom-dependencies, the
        /// dependencies to resolve
        #[clap(short, long)]
        pom: Option<PathBuf>,
        /// Local repository [default: from settings, or $HOME/.m2/repository]
        #[clap(long, env = "SHRINKWRAP_REPOSITORY_LOCAL")]
        local_repository: Option<PathBuf>,
        /// Additional file repository, as id=url
        #[clap(short, long = "repository", value_parser = parse_key_value)]
        repositories: Vec<(String, String)>,
        /// Resolves only the dependencies given, not their dependencies
        #[clap(long)]
        without_transitivity: bool,
        /// Keeps only artifacts in these scopes; compile implies runtime
        #[clap(long = "scope")]
        scopes: Vec<ScopeType>,
        /// Resolves the dependencies declared by --pom
        #[clap(long, requires = "pom")]
        import_pom_dependencies: bool,
        /// Writes the resolved artifacts to this lock file
        #[clap(long)]
        lock_file: Option<PathBuf>,
        /// groupId:artifactId[:packaging[:classifier]]:version, with `?` taking the version from
        /// dependency management
        coordinates: Vec<String>,
    },
    /// Builds a project with mvn
    Build {
        /// Project directory
        #[clap(short, long, default_value = ".")]
        directory: PathBuf,
        /// Goals to run [default: package]
        #[clap(short, long = "goal")]
        goals: Vec<String>,
        /// Build property, as key=value
        #[clap(short = 'D', value_parser = parse_key_value)]
        properties: Vec<(String, String)>,
        /// Reports a failed build without failing
        #[clap(long)]
        ignore_failure: bool,
        /// Build executable [default: $MAVEN_HOME/bin/mvn, or mvn]
        #[clap(long)]
        executable: Option<PathBuf>,
    },
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected key=value, got `{}`", value)),
    }
}
