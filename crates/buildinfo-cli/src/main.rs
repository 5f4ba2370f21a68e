//! Build-info CLI
//!
//! The `buildinfo` command assembles build-info records and deploy
//! properties from a build context exported by the CI server.
//!
//! ## Commands
//!
//! - `extract`: print the build-info record for a finished build
//! - `properties`: print the properties to attach to each deployed artifact

use anyhow::{Context, Result};
use buildinfo_core::{BuildContext, BuildInfoHelper, DeployDetails, ExtractorConfig, StaticHost};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "buildinfo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assemble build-info records for deployed CI artifacts", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Extractor configuration file (TOML)
    #[arg(long, global = true, env = "BUILDINFO_CONFIG")]
    config: Option<PathBuf>,

    /// CI server base URL (overrides the configuration file)
    #[arg(long, global = true, env = "BUILDINFO_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BuildArgs {
    /// Build context exported by the CI server (JSON)
    #[arg(long)]
    context: PathBuf,

    /// VCS revision the build was made from
    #[arg(long)]
    vcs_revision: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the build-info record for a finished build
    Extract {
        #[command(flatten)]
        build: BuildArgs,

        /// Deploy details of the uploaded artifacts (JSON array)
        #[arg(long)]
        deployed: PathBuf,

        /// Repository user the artifacts were deployed as
        #[arg(short, long)]
        username: String,

        /// Build environment variables (JSON object)
        #[arg(long, conflicts_with = "inherit_env")]
        env_file: Option<PathBuf>,

        /// Use this process's environment as the build environment
        #[arg(long)]
        inherit_env: bool,

        /// Write the record here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the properties to attach to each deployed artifact
    Properties {
        #[command(flatten)]
        build: BuildArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    buildinfo_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref(), cli.base_url)?;

    match cli.command {
        Commands::Extract {
            build,
            deployed,
            username,
            env_file,
            inherit_env,
            output,
        } => {
            let env = load_env(env_file.as_deref(), inherit_env)?;
            cmd_extract(
                config,
                env,
                &build,
                &deployed,
                &username,
                output.as_deref(),
            )
        }
        Commands::Properties { build } => cmd_properties(config, &build),
    }
}

fn load_config(path: Option<&Path>, base_url: Option<String>) -> Result<ExtractorConfig> {
    let mut config = match path {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => ExtractorConfig::default(),
    };
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    Ok(config)
}

fn load_env(env_file: Option<&Path>, inherit_env: bool) -> Result<BTreeMap<String, String>> {
    if let Some(path) = env_file {
        return read_json(path);
    }
    if inherit_env {
        return Ok(std::env::vars().collect());
    }
    Ok(BTreeMap::new())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn helper_for(
    config: ExtractorConfig,
    env: BTreeMap<String, String>,
    build: &BuildArgs,
) -> Result<(BuildInfoHelper<StaticHost>, BuildContext)> {
    let context: BuildContext = read_json(&build.context)?;
    debug!(
        "Loaded build context {} (trigger: {})",
        context.build_result_key,
        context.trigger_reason.kind()
    );
    let helper = BuildInfoHelper::from_config(env, build.vcs_revision.clone(), config);
    Ok((helper, context))
}

fn cmd_extract(
    config: ExtractorConfig,
    env: BTreeMap<String, String>,
    build: &BuildArgs,
    deployed: &Path,
    username: &str,
    output: Option<&Path>,
) -> Result<()> {
    let (helper, context) = helper_for(config, env, build)?;
    let details: Vec<DeployDetails> = read_json(deployed)?;

    let build_info = helper
        .extract_build_info(&context, &details, username)
        .context("Failed to extract build info")?;
    let json = build_info.to_json_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("Failed to write {:?}", path))?;
            info!("Wrote build info for {} to {:?}", context.build_result_key, path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_properties(config: ExtractorConfig, build: &BuildArgs) -> Result<()> {
    let (helper, context) = helper_for(config, BTreeMap::new(), build)?;
    let props = helper.add_common_properties(&context);
    println!("{}", serde_json::to_string_pretty(&props)?);
    Ok(())
}
