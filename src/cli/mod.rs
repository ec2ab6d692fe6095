pub mod args;
pub mod command_handlers;

use args::{CliArgs, Command};
use command_handlers::{BuildOptions, CommonOptions, ResolveOptions};

/// Runs a parsed command line.
pub fn run(args: CliArgs) -> anyhow::Result<()> {
    let common = CommonOptions {
        settings: args.settings,
        global_settings: args.global_settings,
        profiles: args.profiles,
        offline: args.offline,
    };
    match args.cmd {
        Command::Resolve {
            pom,
            local_repository,
            repositories,
            without_transitivity,
            scopes,
            import_pom_dependencies,
            lock_file,
            coordinates,
        } => {
            let options = ResolveOptions {
                pom,
                local_repository,
                repositories,
                without_transitivity,
                scopes,
                import_pom_dependencies,
                lock_file,
                coordinates,
            };
            for file in command_handlers::do_resolve(&common, &options)? {
                println!("{}", file.display());
            }
            Ok(())
        }
        Command::Build {
            directory,
            goals,
            properties,
            ignore_failure,
            executable,
        } => {
            let options = BuildOptions {
                directory,
                goals,
                properties,
                ignore_failure,
                executable,
            };
            if let Some(archive) = command_handlers::do_build(&common, &options)? {
                println!("{}", archive.display());
            }
            Ok(())
        }
    }
}
