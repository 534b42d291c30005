use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fdmkit_core::ResourceOperation;

#[derive(Parser)]
#[command(name = "fdmkit")]
#[command(about = "fdmkit: idempotent configuration of Firepower Device Manager appliances")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Appliance URL (overrides config and FDMKIT_URL env var)
    #[arg(short, long, global = true, env = "FDMKIT_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "FDMKIT_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level or filter directive, e.g. debug or fdmkit_core=trace
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    pub fn parse_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to an appliance and store the session
    Login(LoginArgs),
    /// Logout (remove stored session)
    Logout,
    /// Show current session info
    Whoami,
    /// Run a named API operation, e.g. addNetworkObject
    Run(RunArgs),
    /// Run an operation on a typed resource
    Resource(ResourceArgs),
    /// List known operation names
    Operations,
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Username
    #[arg(short, long, env = "FDMKIT_USERNAME")]
    pub username: Option<String>,
    /// Password
    #[arg(long, env = "FDMKIT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Operation name (e.g. addNetworkObject, getNetworkObjectList)
    pub operation: String,
    /// Path to a JSON file with the object payload ("-" reads stdin)
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Path parameter as key=value (e.g. objId=...)
    #[arg(long = "path-param", value_name = "KEY=VALUE")]
    pub path_params: Vec<String>,
    /// Query parameter as key=value (e.g. filter=name:web)
    #[arg(long = "query-param", value_name = "KEY=VALUE")]
    pub query_params: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ResourceKind {
    NetworkObject,
    RadiusIdentitySource,
    InternalCertificate,
    SecurityIntelligenceNetworkPolicy,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ResourceOp {
    Add,
    Delete,
    Edit,
    Get,
    GetList,
    GetByName,
    Upsert,
    EditByName,
    DeleteByName,
}

impl From<ResourceOp> for ResourceOperation {
    fn from(op: ResourceOp) -> Self {
        match op {
            ResourceOp::Add => Self::Add,
            ResourceOp::Delete => Self::Delete,
            ResourceOp::Edit => Self::Edit,
            ResourceOp::Get => Self::Get,
            ResourceOp::GetList => Self::GetList,
            ResourceOp::GetByName => Self::GetByName,
            ResourceOp::Upsert => Self::Upsert,
            ResourceOp::EditByName => Self::EditByName,
            ResourceOp::DeleteByName => Self::DeleteByName,
        }
    }
}

#[derive(clap::Args)]
pub struct ResourceArgs {
    /// Resource type
    pub kind: ResourceKind,
    /// Operation to run
    pub operation: ResourceOp,
    /// Path to a JSON file with the object payload ("-" reads stdin)
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Parameter as key=value (objId, name, offset, limit, filter, sort)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, base_path, verify_tls, timeout_secs, format)
    pub key: String,
    /// Value
    pub value: String,
}
