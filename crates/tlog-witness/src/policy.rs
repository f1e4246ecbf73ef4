//! Witness policy text format and evaluation
//!
//! Each non-empty line is one of:
//!
//! - `log <vkey> [url]`
//! - `witness <name> <vkey> [url]`
//! - `group <name> <all|any|N> <member>...`
//! - `quorum <name|none>`
//!
//! Lines starting with `#` are comments. Witnesses and groups share one
//! namespace, must be defined before they are referenced, and exactly one
//! `quorum` line is required. A policy with no lines other than blanks and
//! comments is the same as `quorum none`.

use crate::error::{Error, Result};
use crate::quorum::PolicyNode;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use tlog_crypto::{KeyLookup, Keyring, NoteVerifier};
use tlog_types::SignedCheckpoint;
use tracing::debug;
use url::Url;

const NO_QUORUM: &str = "none";

/// A log the policy applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLog {
    pub verifier: NoteVerifier,
    pub url: Option<Url>,
}

/// A trusted witness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyWitness {
    /// Policy-local name used by groups and the quorum
    pub name: String,
    pub verifier: NoteVerifier,
    pub url: Option<Url>,
}

/// A parsed witness policy
#[derive(Debug, Clone, Default)]
pub struct WitnessPolicy {
    logs: Vec<PolicyLog>,
    witnesses: BTreeMap<String, PolicyWitness>,
    keyring: Keyring,
    quorum: Option<PolicyNode>,
}

impl WitnessPolicy {
    /// A policy with no witnesses and `quorum none`
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse policy text
    pub fn parse(text: &str) -> Result<Self> {
        let mut policy = WitnessPolicy::default();
        let mut nodes: HashMap<String, PolicyNode> = HashMap::new();
        let mut quorum: Option<Option<PolicyNode>> = None;
        let mut empty = true;

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let content = raw.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            empty = false;
            let syntax = |message: String| Error::Syntax { line, message };
            let fields: Vec<&str> = content.split_whitespace().collect();
            match fields[0] {
                "log" => {
                    let (vkey, url) = match &fields[1..] {
                        [vkey] => (*vkey, None),
                        [vkey, url] => (*vkey, Some(*url)),
                        _ => return Err(syntax("expected: log <vkey> [url]".to_string())),
                    };
                    policy.logs.push(PolicyLog {
                        verifier: parse_key(line, vkey)?,
                        url: url.map(|u| parse_url(line, u)).transpose()?,
                    });
                }
                "witness" => {
                    let (name, vkey, url) = match &fields[1..] {
                        [name, vkey] => (*name, *vkey, None),
                        [name, vkey, url] => (*name, *vkey, Some(*url)),
                        _ => {
                            return Err(syntax(
                                "expected: witness <name> <vkey> [url]".to_string(),
                            ))
                        }
                    };
                    check_new_name(line, name, &nodes)?;
                    let verifier = parse_key(line, vkey)?;
                    let url = url.map(|u| parse_url(line, u)).transpose()?;
                    if policy.keyring.add(verifier.clone()).is_some() {
                        return Err(syntax(format!(
                            "witness key {} is listed more than once",
                            verifier.name()
                        )));
                    }
                    nodes.insert(name.to_string(), PolicyNode::witness(name));
                    policy.witnesses.insert(
                        name.to_string(),
                        PolicyWitness {
                            name: name.to_string(),
                            verifier,
                            url,
                        },
                    );
                }
                "group" => {
                    let (name, threshold, members) = match &fields[1..] {
                        [name, threshold, members @ ..] if !members.is_empty() => {
                            (*name, *threshold, members)
                        }
                        _ => {
                            return Err(syntax(
                                "expected: group <name> <all|any|N> <member>...".to_string(),
                            ))
                        }
                    };
                    check_new_name(line, name, &nodes)?;

                    let required = match threshold {
                        "all" => members.len(),
                        "any" => 1,
                        n => n
                            .parse::<usize>()
                            .ok()
                            .filter(|n| (1..=members.len()).contains(n))
                            .ok_or_else(|| {
                                syntax(format!(
                                    "threshold {} must be all, any or between 1 and {}",
                                    n,
                                    members.len()
                                ))
                            })?,
                    };

                    let mut seen = HashSet::new();
                    let mut children = Vec::with_capacity(members.len());
                    for member in members {
                        if !seen.insert(*member) {
                            return Err(syntax(format!("duplicate group member {}", member)));
                        }
                        let node = nodes
                            .get(*member)
                            .ok_or_else(|| syntax(format!("undefined group member {}", member)))?;
                        children.push(node.clone());
                    }
                    nodes.insert(
                        name.to_string(),
                        PolicyNode::threshold(name, required, children),
                    );
                }
                "quorum" => {
                    let name = match &fields[1..] {
                        [name] => *name,
                        _ => return Err(syntax("expected: quorum <name|none>".to_string())),
                    };
                    if quorum.is_some() {
                        return Err(syntax("quorum is defined more than once".to_string()));
                    }
                    quorum = Some(if name == NO_QUORUM {
                        None
                    } else {
                        Some(
                            nodes
                                .get(name)
                                .cloned()
                                .ok_or_else(|| syntax(format!("undefined quorum {}", name)))?,
                        )
                    });
                }
                other => return Err(syntax(format!("unknown keyword {}", other))),
            }
        }

        if empty {
            return Ok(Self::none());
        }
        policy.quorum =
            quorum.ok_or_else(|| Error::Invalid("policy has no quorum line".to_string()))?;
        Ok(policy)
    }

    pub fn logs(&self) -> &[PolicyLog] {
        &self.logs
    }

    pub fn witnesses(&self) -> impl Iterator<Item = &PolicyWitness> {
        self.witnesses.values()
    }

    pub fn witness(&self, name: &str) -> Option<&PolicyWitness> {
        self.witnesses.get(name)
    }

    /// The quorum expression, `None` for `quorum none`
    pub fn quorum(&self) -> Option<&PolicyNode> {
        self.quorum.as_ref()
    }

    /// Keys of every witness in the policy
    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    /// Names of the witnesses with a verified cosignature on the note.
    ///
    /// Signatures are checked through `keys`; a signature the lookup does not
    /// know, or one that fails verification, is ignored. A witness is counted
    /// once no matter how many of its signatures appear.
    pub fn verified_witnesses<'a, K: KeyLookup + ?Sized>(
        &'a self,
        note: &SignedCheckpoint,
        keys: &K,
    ) -> HashSet<&'a str> {
        let mut verified = HashSet::new();
        for signature in &note.signatures {
            let verifier = match keys.verify(&note.checkpoint, signature) {
                Ok(verifier) => verifier,
                Err(e) => {
                    debug!(signer = %signature.name, error = %e, "ignoring signature");
                    continue;
                }
            };
            for witness in self.witnesses.values() {
                if &witness.verifier == verifier {
                    verified.insert(witness.name.as_str());
                }
            }
        }
        verified
    }

    /// Whether the note's cosignatures satisfy the quorum, using this
    /// policy's own witness keys
    pub fn satisfied(&self, note: &SignedCheckpoint) -> bool {
        self.satisfied_with(note, &self.keyring)
    }

    /// Whether the note's cosignatures satisfy the quorum, resolving
    /// witness keys through `keys`
    pub fn satisfied_with<K: KeyLookup + ?Sized>(&self, note: &SignedCheckpoint, keys: &K) -> bool {
        let Some(quorum) = &self.quorum else {
            return true;
        };
        let verified = self.verified_witnesses(note, keys);
        let satisfied = quorum.is_satisfied(&verified);
        debug!(
            quorum = quorum.name(),
            verified = verified.len(),
            satisfied,
            "evaluated witness quorum"
        );
        satisfied
    }
}

impl FromStr for WitnessPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn check_new_name(line: usize, name: &str, nodes: &HashMap<String, PolicyNode>) -> Result<()> {
    if name == NO_QUORUM {
        return Err(Error::Syntax {
            line,
            message: format!("{} is reserved", NO_QUORUM),
        });
    }
    if nodes.contains_key(name) {
        return Err(Error::Syntax {
            line,
            message: format!("{} is defined more than once", name),
        });
    }
    Ok(())
}

fn parse_key(line: usize, text: &str) -> Result<NoteVerifier> {
    NoteVerifier::parse(text).map_err(|source| Error::Key { line, source })
}

fn parse_url(line: usize, text: &str) -> Result<Url> {
    Url::parse(text).map_err(|e| Error::Syntax {
        line,
        message: format!("invalid url {}: {}", text, e),
    })
}
