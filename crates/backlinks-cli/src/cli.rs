use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "backlinks")]
#[command(about = "Keep issue tracker backlinks in step with document mentions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the canonical backlink URL for an entity path
    Url {
        /// Entity path, e.g. /doc/roadmap-a1b2c3
        path: String,
        /// Workspace base URL (defaults to BACKLINKS_BASE_URL)
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },
    /// Reconcile backlinks for one document or collection
    Sync(SyncArgs),
}

#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["document", "collection"])
))]
pub struct SyncArgs {
    /// Document id (wins over --collection when both are given)
    #[arg(long, value_name = "ID")]
    pub document: Option<String>,
    /// Collection id
    #[arg(long, value_name = "ID")]
    pub collection: Option<String>,
    /// Tenant (team) id
    #[arg(long, value_name = "ID", default_value = "default")]
    pub tenant: String,
    /// Entity title shown on the backlink
    #[arg(long, default_value = "")]
    pub title: String,
    /// Entity path below the base URL; omit for an unpublished entity
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,
    /// Issue identifier mentioned in the entity (repeatable)
    #[arg(long = "issue", value_name = "IDENTIFIER")]
    pub issues: Vec<String>,
    /// Workspace base URL (defaults to BACKLINKS_BASE_URL)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// Run a single attempt instead of the task's retry policy
    #[arg(long)]
    pub no_retry: bool,
    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}
