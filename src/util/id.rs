//! Issue id generation and resolution.
//!
//! Ids have the form `<prefix>-<hash>` where hash is lowercase base36 with an
//! adaptive length that grows with the number of stored issues.

use crate::error::{IssueBoardError, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

pub const DEFAULT_PREFIX: &str = "ib";

/// ID generation configuration.
#[derive(Debug, Clone)]
pub struct IdConfig {
    /// Issue ID prefix (e.g., "ib").
    pub prefix: String,
    pub min_hash_length: usize,
    pub max_hash_length: usize,
    /// Maximum collision probability before increasing length.
    pub max_collision_prob: f64,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            min_hash_length: 3,
            max_hash_length: 8,
            max_collision_prob: 0.25,
        }
    }
}

impl IdConfig {
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }
}

/// Produces unique issue ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    config: IdConfig,
}

impl IdGenerator {
    #[must_use]
    pub const fn new(config: IdConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(IdConfig::default())
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Smallest hash length whose birthday-bound collision probability
    /// stays under the configured maximum.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    pub fn optimal_length(&self, issue_count: usize) -> usize {
        let n = issue_count as f64;
        let max_prob = self.config.max_collision_prob;

        for len in self.config.min_hash_length..=self.config.max_hash_length {
            let space = 36_f64.powi(len as i32);
            // P(collision) ~ 1 - e^(-n^2 / 2d)
            let prob = 1.0 - (-n * n / (2.0 * space)).exp();
            if prob < max_prob {
                return len;
            }
        }
        self.config.max_hash_length
    }

    #[must_use]
    pub fn generate_candidate(
        &self,
        title: &str,
        description: Option<&str>,
        creator: Option<&str>,
        created_time: DateTime<Utc>,
        nonce: u32,
        hash_length: usize,
    ) -> String {
        let seed = generate_id_seed(title, description, creator, created_time, nonce);
        let hash_str = compute_id_hash(&seed, hash_length);
        format!("{}-{hash_str}", self.config.prefix)
    }

    /// Generate an id, using `exists` to skip ids already taken.
    pub fn generate<F>(
        &self,
        title: &str,
        description: Option<&str>,
        creator: Option<&str>,
        created_time: DateTime<Utc>,
        issue_count: usize,
        exists: F,
    ) -> String
    where
        F: Fn(&str) -> bool,
    {
        let mut length = self.optimal_length(issue_count);

        loop {
            for nonce in 0..10 {
                let id = self.generate_candidate(
                    title,
                    description,
                    creator,
                    created_time,
                    nonce,
                    length,
                );
                if !exists(&id) {
                    return id;
                }
            }

            if length < self.config.max_hash_length {
                length += 1;
                continue;
            }

            // Every short candidate collided: fall back to long hashes.
            for nonce in 10..1000 {
                let id =
                    self.generate_candidate(title, description, creator, created_time, nonce, 12);
                if !exists(&id) {
                    return id;
                }
            }
            let hash_str = compute_id_hash(
                &generate_id_seed(title, description, creator, created_time, 1000),
                12,
            );
            return format!("{}-{hash_str}-{}", self.config.prefix, issue_count);
        }
    }
}

/// Seed string: `title | description | creator | created_time (ns) | nonce`.
#[must_use]
pub fn generate_id_seed(
    title: &str,
    description: Option<&str>,
    creator: Option<&str>,
    created_time: DateTime<Utc>,
    nonce: u32,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        title,
        description.unwrap_or(""),
        creator.unwrap_or(""),
        created_time.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

/// SHA256 of the input, first 8 bytes as base36, cut to `length`.
#[must_use]
pub fn compute_id_hash(input: &str, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();

    let mut num = 0u64;
    for &byte in result.iter().take(8) {
        num = (num << 8) | u64::from(byte);
    }

    let mut s = base36_encode(num);
    if s.len() < length {
        s = format!("{s:0>length$}");
    }

    s.chars().take(length).collect()
}

fn base36_encode(mut num: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if num == 0 {
        return "0".to_string();
    }
    let mut chars = Vec::new();
    while num > 0 {
        chars.push(ALPHABET[(num % 36) as usize] as char);
        num /= 36;
    }
    chars.into_iter().rev().collect()
}

/// Lowercase and trim user input.
#[must_use]
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// How an id was matched during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    /// Matched after prepending the default prefix.
    PrefixNormalized,
    /// Matched via substring on the hash portion.
    Substring,
}

#[derive(Debug, Clone)]
pub struct ResolvedId {
    pub id: String,
    pub match_type: MatchType,
}

/// Resolves partial ids to full ids.
///
/// Resolution order:
/// 1. Exact id match
/// 2. Missing prefix: prepend `default_prefix-` and retry
/// 3. Substring match on the hash portion
/// 4. Several substring matches are an `AmbiguousId` error
#[derive(Debug, Clone)]
pub struct IdResolver {
    default_prefix: String,
}

impl IdResolver {
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            default_prefix: prefix.into(),
        }
    }

    /// Resolve `input` using `exists_fn` for exact lookups and
    /// `substring_match_fn` for hash fragments.
    ///
    /// # Errors
    ///
    /// - `IssueNotFound` if nothing matches.
    /// - `AmbiguousId` if several ids match the fragment.
    pub fn resolve<F, G>(
        &self,
        input: &str,
        exists_fn: F,
        substring_match_fn: G,
    ) -> Result<ResolvedId>
    where
        F: Fn(&str) -> bool,
        G: Fn(&str) -> Vec<String>,
    {
        let normalized = normalize_id(input);
        if normalized.is_empty() {
            return Err(IssueBoardError::IssueNotFound { id: String::new() });
        }

        if exists_fn(&normalized) {
            return Ok(ResolvedId {
                id: normalized,
                match_type: MatchType::Exact,
            });
        }

        if !normalized.contains('-') {
            let with_prefix = format!("{}-{}", self.default_prefix, normalized);
            if exists_fn(&with_prefix) {
                return Ok(ResolvedId {
                    id: with_prefix,
                    match_type: MatchType::PrefixNormalized,
                });
            }
        }

        let hash_pattern = normalized
            .find('-')
            .map_or(normalized.as_str(), |pos| &normalized[pos + 1..]);

        if !hash_pattern.is_empty() {
            let mut matches = substring_match_fn(hash_pattern);
            match matches.len() {
                0 => {}
                1 => {
                    if let Some(id) = matches.pop() {
                        return Ok(ResolvedId {
                            id,
                            match_type: MatchType::Substring,
                        });
                    }
                }
                _ => {
                    return Err(IssueBoardError::AmbiguousId {
                        partial: input.trim().to_string(),
                        matches,
                    });
                }
            }
        }

        Err(IssueBoardError::IssueNotFound {
            id: input.trim().to_string(),
        })
    }
}

/// All ids whose hash portion contains `hash_substring`.
#[must_use]
pub fn find_matching_ids(all_ids: &[String], hash_substring: &str) -> Vec<String> {
    all_ids
        .iter()
        .filter(|id| {
            id.find('-')
                .is_some_and(|pos| id[pos + 1..].contains(hash_substring))
        })
        .cloned()
        .collect()
}
