//! The `printer` module produces the canonical serialized form of a syntax tree,
//! fingerprints it for deduplication, and writes mutants to disk.
//!
//! The canonical form is `prettyplease` output: deterministic formatting regardless
//! of the original file's layout, so two mutations that produce the same program
//! serialize identically and collapse in the seen-set.

use crate::error::{MutatrixError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// The width of a mutant fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 32;

/// Pretty-print `file` into its canonical text form.
pub fn canonical_string(file: &syn::File) -> String {
    prettyplease::unparse(file)
}

/// Pretty-print `file` into its canonical byte form.
pub fn canonical_bytes(file: &syn::File) -> Vec<u8> {
    canonical_string(file).into_bytes()
}

/// Fingerprint of a canonical byte form: the first 32 hex characters of its SHA-256.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// The set of fingerprints already seen during this run.
///
/// Pre-seeded from user blacklist files, then grown as mutants are emitted; a
/// fingerprint already present marks its mutant as a duplicate.
pub struct SeenSet {
    checksums: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> SeenSet {
        SeenSet {
            checksums: HashSet::new(),
        }
    }

    /// Load one blacklist file: newline-separated 32 character hex fingerprints.
    ///
    /// A malformed line is an input error that aborts the run before any mutant is
    /// produced.
    pub fn load_blacklist(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;

        for line in content.lines() {
            if line.is_empty() {
                continue;
            }

            if line.len() != FINGERPRINT_LEN || !line.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(MutatrixError::InvalidChecksum(line.to_string()));
            }

            self.checksums.insert(line.to_string());
        }

        Ok(())
    }

    /// Record `checksum`; returns false if it was already present.
    pub fn insert(&mut self, checksum: &str) -> bool {
        self.checksums.insert(checksum.to_string())
    }

    pub fn contains(&self, checksum: &str) -> bool {
        self.checksums.contains(checksum)
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new()
    }
}

/// The outcome of serializing one mutant.
pub enum SaveOutcome {
    /// The mutant's canonical form was already seen (or blacklisted); nothing was
    /// written.
    Duplicate { checksum: String },

    /// The mutant was new; its canonical form was written to the mutant path.
    Saved { checksum: String, source: String },
}

/// Serialize the current (mutated) tree, deduplicate it against `seen`, and write it
/// to `path` if it is new.
///
/// # Arguments
///
/// * `seen` - The run-wide seen-set.
/// * `path` - The temp path for this mutant (`<tmp>/<original-path>.<mutationID>`).
/// * `file` - The tree in its mutated state.
pub fn save_mutant(seen: &mut SeenSet, path: &Path, file: &syn::File) -> Result<SaveOutcome> {
    let source = canonical_string(file);
    let checksum = fingerprint(source.as_bytes());

    if !seen.insert(&checksum) {
        return Ok(SaveOutcome::Duplicate { checksum });
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &source)?;

    Ok(SaveOutcome::Saved { checksum, source })
}
