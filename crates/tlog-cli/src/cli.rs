use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tlog-tuf",
    about = "Transparency log inclusion proofs for TUF root metadata",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the OLPC canonical JSON form of a TUF root
    Canonicalize(CanonicalizeArgs),
    /// Embed an inclusion proof into a TUF root, rewriting it in place
    Issue(IssueArgs),
    /// Verify the inclusion proof embedded in a TUF root
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct CanonicalizeArgs {
    /// Path to the TUF root file
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the canonical form
    #[arg(long)]
    pub output: PathBuf,

    /// Leave out any embedded proof, producing the log leaf contents
    #[arg(long)]
    pub strip_proof: bool,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("log")
        .required(true)
        .args(["log_path", "log_url"])
))]
pub struct IssueArgs {
    /// Path to the TUF root file
    #[arg(long)]
    pub root_path: PathBuf,

    /// Directory holding the log checkpoint and tiles
    #[arg(long)]
    pub log_path: Option<PathBuf>,

    /// Base URL of the log checkpoint and tiles
    #[arg(long)]
    pub log_url: Option<String>,

    /// Log verifier key; when given the checkpoint signature is checked
    #[arg(long)]
    pub log_key: Option<PathBuf>,

    /// Tile fetches in flight at once
    #[arg(long, default_value_t = tlog_tiles::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds for --log-url
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Path to the TUF root file
    #[arg(long)]
    pub root_path: PathBuf,

    /// Path to the log verifier key
    #[arg(long)]
    pub verifier_path: PathBuf,

    /// Path to a witness policy the checkpoint must satisfy
    #[arg(long)]
    pub witness_policy_path: Option<PathBuf>,
}
