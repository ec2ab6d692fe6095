pub mod api;
pub mod cli;
pub mod config;
pub mod embedded;
pub mod filter;
pub mod model;
pub mod pom;
pub mod resolver;
pub mod session;
pub mod settings;

mod xml;

pub use api::{
    ConfigurationStage, FormatStage, ResolveStage, ResolverError, Resolvers, StrategyStage,
};
pub use config::ResolverConfig;
