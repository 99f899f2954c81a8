//! Code-similarity engine: compares submitted source files against one
//! configured reference corpus.
//!
//! Three independent signals are kept separate on purpose: the global ratio
//! catches wholesale copies, the normalized-content digest catches exact
//! copies that the ratio could narrowly miss, and block overlap catches a
//! few reused functions inside otherwise-original code.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::types::{Severity, Violation, ViolationKind};

/// A candidate source file fetched from a team repository.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

static LINE_COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)#.*$").unwrap());
static SLASH_COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)//.*$").unwrap());
static BLOCK_COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static TRIPLE_DQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?s)\"\"\".*?\"\"\"").unwrap());
static TRIPLE_SQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)'''.*?'''").unwrap());
static IMPORT_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^\s*(import|from|use|include)\s+.*$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lossy normalization applied identically to candidate and reference.
///
/// Comments, docstrings, import lines, whitespace shape, and letter case are
/// all erased so that renames and reformatting do not evade detection.
/// Idempotent: normalizing already-normalized text is a no-op.
pub fn normalize_code(content: &str) -> String {
    let content = TRIPLE_DQUOTE.replace_all(content, "");
    let content = TRIPLE_SQUOTE.replace_all(&content, "");
    let content = BLOCK_COMMENTS.replace_all(&content, "");
    let content = LINE_COMMENTS.replace_all(&content, "");
    let content = SLASH_COMMENTS.replace_all(&content, "");
    let content = IMPORT_LINES.replace_all(&content, "");
    let content = WHITESPACE.replace_all(&content, " ");
    content.trim().to_lowercase()
}

/// Sequence-similarity ratio in [0, 1] over normalized texts. Symmetric,
/// and 1.0 for identical inputs.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize_code(a), &normalize_code(b))
}

fn content_digest(normalized: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(normalized.as_bytes())))
}

/// Engine constructed once per run; read-only afterwards and safe to share
/// across concurrent evaluations.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    reference_name: String,
    reference_len: usize,
    normalized_reference: String,
    reference_digest: String,
    /// Normalized text of each reference block.
    reference_blocks: Vec<String>,
    high_threshold: f64,
    medium_threshold: f64,
    block_match_threshold: f64,
    block_match_limit: usize,
    min_block_chars: usize,
}

impl SimilarityEngine {
    /// Build an engine from an in-memory reference corpus.
    pub fn new(
        reference_name: impl Into<String>,
        reference_content: &str,
        config: &AnalysisConfig,
    ) -> Self {
        let reference_name = reference_name.into();
        let normalized_reference = normalize_code(reference_content);
        let reference_digest = content_digest(&normalized_reference);
        let reference_blocks = extract_blocks(reference_content, config.min_block_chars)
            .iter()
            .map(|b| normalize_code(b))
            .collect();
        if normalized_reference.is_empty() {
            warn!(
                reference = %reference_name,
                "reference corpus is empty after normalization; code comparison disabled"
            );
        } else {
            info!(
                reference = %reference_name,
                chars = reference_content.len(),
                "loaded reference corpus"
            );
        }
        Self {
            reference_name,
            reference_len: reference_content.len(),
            normalized_reference,
            reference_digest,
            reference_blocks,
            high_threshold: config.similarity_high_threshold,
            medium_threshold: config.similarity_medium_threshold,
            block_match_threshold: config.block_match_threshold,
            block_match_limit: config.block_match_limit,
            min_block_chars: config.min_block_chars,
        }
    }

    /// Build an engine from a reference file on disk.
    ///
    /// A missing or unreadable reference degrades to an inert engine that
    /// produces no evidence; the reuse check is an optional enhancement and
    /// must never abort a run.
    pub fn from_reference_file(path: &Path, config: &AnalysisConfig) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::new(path.display().to_string(), &content, config),
            Err(err) => {
                warn!(
                    reference = %path.display(),
                    error = %err,
                    "reference file unreadable; code comparison disabled"
                );
                Self::new(path.display().to_string(), "", config)
            }
        }
    }

    /// True when a usable reference corpus is loaded.
    pub fn is_active(&self) -> bool {
        !self.normalized_reference.is_empty()
    }

    /// Compare candidate files against the reference corpus. A single file
    /// may accrue multiple violations, one per signal.
    pub fn compare(&self, files: &[SourceFile]) -> Vec<Violation> {
        if !self.is_active() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for file in files {
            violations.extend(self.compare_file(file));
        }
        violations
    }

    fn compare_file(&self, file: &SourceFile) -> Vec<Violation> {
        let mut violations = Vec::new();
        let normalized = normalize_code(&file.content);

        let ratio = strsim::normalized_levenshtein(&normalized, &self.normalized_reference);
        if ratio > self.high_threshold {
            violations.push(self.ratio_violation(file, ratio, Severity::High, "high_similarity"));
        } else if ratio > self.medium_threshold {
            violations.push(self.ratio_violation(
                file,
                ratio,
                Severity::Medium,
                "moderate_similarity",
            ));
        }

        // Independent of the ratio check: normalization differences could
        // mask an otherwise-100% match from floating-point nuance.
        let digest = content_digest(&normalized);
        if digest == self.reference_digest {
            violations.push(Violation::new(
                ViolationKind::CodeReuse,
                Severity::High,
                format!("Exact copy of reference code detected in {}", file.path),
                json!({
                    "file_path": file.path,
                    "match_type": "exact_copy",
                    "file_hash": digest,
                    "reference_file": self.reference_name,
                }),
            ));
        }

        let matches = self.matching_blocks(&file.content);
        if matches > self.block_match_limit {
            violations.push(Violation::new(
                ViolationKind::CodeReuse,
                Severity::Medium,
                format!(
                    "Multiple code blocks ({}) match reference in {}",
                    matches, file.path
                ),
                json!({
                    "file_path": file.path,
                    "matching_blocks": matches,
                    "reference_file": self.reference_name,
                    "match_type": "code_blocks",
                }),
            ));
        }

        violations
    }

    fn ratio_violation(
        &self,
        file: &SourceFile,
        ratio: f64,
        severity: Severity,
        match_type: &str,
    ) -> Violation {
        let adjective = match severity {
            Severity::High => "High",
            _ => "Moderate",
        };
        Violation::new(
            ViolationKind::CodeReuse,
            severity,
            format!(
                "{} similarity ({:.1}%) to reference code in {}",
                adjective,
                ratio * 100.0,
                file.path
            ),
            json!({
                "file_path": file.path,
                "similarity_score": ratio,
                "reference_file": self.reference_name,
                "match_type": match_type,
                "file_size": file.content.len(),
                "reference_size": self.reference_len,
            }),
        )
    }

    /// Count candidate blocks that resemble any reference block. First match
    /// wins; a candidate block is never counted twice.
    fn matching_blocks(&self, content: &str) -> usize {
        if self.reference_blocks.is_empty() {
            return 0;
        }
        let mut matches = 0;
        for block in extract_blocks(content, self.min_block_chars) {
            let normalized = normalize_code(&block);
            let hit = self
                .reference_blocks
                .iter()
                .any(|r| strsim::normalized_levenshtein(&normalized, r) > self.block_match_threshold);
            if hit {
                matches += 1;
            }
        }
        matches
    }
}

const BLOCK_PREFIXES: &[&str] = &["def ", "class ", "async def ", "fn ", "function "];

/// Coarse logical blocks via an indentation scan: a block starts at a
/// definition line and runs while lines are deeper-indented or blank.
///
/// Deliberately lexical and approximate; it is a structural hint, not a
/// parser-accurate boundary.
fn extract_blocks(content: &str, min_chars: usize) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_block = false;
    let mut indent = 0usize;

    for line in content.lines() {
        let stripped = line.trim();
        let is_def = BLOCK_PREFIXES.iter().any(|p| stripped.starts_with(p));

        if is_def {
            if in_block && !current.is_empty() {
                blocks.push(current.join("\n"));
            }
            current = vec![line];
            in_block = true;
            indent = line.len() - line.trim_start().len();
        } else if in_block {
            let line_indent = line.len() - line.trim_start().len();
            if line_indent > indent || stripped.is_empty() {
                current.push(line);
            } else {
                blocks.push(current.join("\n"));
                current = Vec::new();
                in_block = false;
            }
        }
    }
    if in_block && !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks.retain(|b| b.trim().len() > min_chars);
    blocks
}
