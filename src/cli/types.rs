use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use stagectl::commands::common::GlobalArgs;

const HELP_TEMPLATE: &str = "
   ┌─┐┌┬┐┌─┐┌─┐┌─┐┌─┐┌┬┐┬
   └─┐ │ ├─┤│ ┬├┤ │   │ │
   └─┘ ┴ ┴ ┴└─┘└─┘└─┘ ┴ ┴─┘

{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}";

#[derive(Parser)]
#[command(name = "stagectl")]
#[command(about = "Staging repository lifecycle CLI", long_about = None)]
#[command(version)]
#[command(help_template = HELP_TEMPLATE)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Path to a config file (default: ./stagectl.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the staging REST API
    #[arg(long, global = true, value_name = "URL")]
    pub repository: Option<String>,

    /// Staging profile name or id
    #[arg(short, long, global = true)]
    pub profile: Option<String>,
}

impl From<GlobalOpts> for GlobalArgs {
    fn from(opts: GlobalOpts) -> Self {
        GlobalArgs {
            config: opts.config,
            repository: opts.repository,
            profile: opts.profile,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List staging profiles of the account
    Profiles,

    /// List repositories of the profile
    List,

    /// Create a new staging repository
    Create {
        /// Repository description
        description: String,
    },

    /// Reuse the open repository with this description, or create one
    Open {
        /// Repository description
        description: String,
    },

    /// Drop repositories with this description, then create a fresh one
    Prepare {
        /// Repository description
        description: String,
    },

    /// Upload a local bundle directory into a repository
    Upload {
        /// Staging repository id
        repository_id: String,

        /// Directory laid out as a Maven repository
        bundle_dir: PathBuf,
    },

    /// Close a repository and wait for the rules to pass
    Close {
        /// Staging repository id
        repository_id: String,
    },

    /// Promote a closed repository and wait for the release
    Promote {
        /// Staging repository id
        repository_id: String,
    },

    /// Close and promote a repository
    Release {
        /// Staging repository id
        repository_id: String,
    },

    /// Drop a repository
    Drop {
        /// Staging repository id
        repository_id: String,
    },

    /// Prepare, upload, close and promote in one go
    BundleRelease {
        /// Repository description
        description: String,

        /// Directory laid out as a Maven repository
        bundle_dir: PathBuf,
    },

    /// Close and promote every open or closed repository
    ReleaseAll {
        /// Only repositories whose description contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Drop every open or closed repository
    DropAll {
        /// Only repositories whose description contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show the activity log of a repository
    Log {
        /// Staging repository id
        repository_id: String,
    },
}
