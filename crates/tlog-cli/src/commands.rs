use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tlog_crypto::NoteVerifier;
use tlog_tiles::{FileSystemTiles, HttpTiles, TileFetcher};
use tlog_tuf::TrustDocument;
use tlog_verify::{issue_proof, IssueOptions, Verifier, PROOF_FIELD};
use tracing::info;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Canonicalize(args) => cmd_canonicalize(args),
        Command::Issue(args) => cmd_issue(args).await,
        Command::Verify(args) => cmd_verify(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<TrustDocument> {
    TrustDocument::from_file(path).with_context(|| format!("reading {}", path.display()))
}

fn read_verifier(path: &Path) -> anyhow::Result<NoteVerifier> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading verifier key {}", path.display()))?;
    NoteVerifier::parse(&text).with_context(|| format!("parsing verifier key {}", path.display()))
}

fn cmd_canonicalize(args: CanonicalizeArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.input)?;
    let canonical = if args.strip_proof {
        doc.canonical_bytes_without(PROOF_FIELD)?
    } else {
        doc.canonical_bytes()?
    };
    std::fs::write(&args.output, canonical)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}

async fn cmd_issue(args: IssueArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.root_path)?;

    let fetcher: Box<dyn TileFetcher> = match (&args.log_path, &args.log_url) {
        (Some(path), _) => Box::new(FileSystemTiles::new(path)),
        (None, Some(url)) => Box::new(
            HttpTiles::new(url)?.with_timeout(Duration::from_secs(args.timeout))?,
        ),
        (None, None) => anyhow::bail!("--log-path or --log-url must be set"),
    };

    let mut options = IssueOptions::default().with_concurrency(args.concurrency);
    if let Some(path) = &args.log_key {
        options = options.with_log_key(read_verifier(path)?);
    }

    let issued = issue_proof(&doc, &*fetcher, &options)
        .await
        .context("issuing inclusion proof")?;
    issued
        .to_file(&args.root_path)
        .with_context(|| format!("writing {}", args.root_path.display()))?;
    info!(path = %args.root_path.display(), "wrote trust root with inclusion proof");
    Ok(())
}

fn cmd_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.root_path)?;
    let mut verifier = Verifier::new(read_verifier(&args.verifier_path)?);

    if let Some(path) = &args.witness_policy_path {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading witness policy {}", path.display()))?;
        verifier = verifier
            .with_witness_policy_text(&text)
            .with_context(|| format!("loading witness policy {}", path.display()))?;
    }

    let verified = verifier
        .verify(&doc)
        .context("trust root could not be verified")?;
    println!(
        "Verified {} at index {} of {} (root {})",
        args.root_path.display(),
        verified.index,
        verified.tree_size,
        verified.root_hash
    );
    if !verified.witnesses.is_empty() {
        println!("Cosigned by {}", verified.witnesses.join(", "));
    }
    Ok(())
}
