//! # Note Names
//!
//! Two kinds of names reach the store:
//!
//! - **User-supplied** names arrive from a URL or the CLI. They may use any
//!   characters as long as they are safe as a single path segment, see
//!   [`is_safe_name`].
//! - **Generated** names come from [`NameGenerator`] and are drawn only from
//!   the configured alphabet.
//!
//! ## Generation
//!
//! The generator starts at the configured minimum length and draws random
//! names, checking each against the [`ExistenceCache`]. After
//! [`ATTEMPTS_PER_LENGTH`] collisions at one length it moves to the next
//! length, so a crowded namespace costs a longer name instead of a long loop.
//! A name is reserved in the cache before it is returned; until the first save
//! writes the file, the reservation is what keeps the name from being handed
//! out twice.

use crate::cache::ExistenceCache;
use rand::Rng;

pub const DEFAULT_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";
pub const DEFAULT_MIN_LEN: usize = 3;
pub const DEFAULT_MAX_PATH_LENGTH: usize = 20;

/// Generated names never grow beyond this.
pub const MAX_GENERATED_LEN: usize = 20;
pub const ATTEMPTS_PER_LENGTH: usize = 10;

const MAX_GENERATED_NAME_CHECK_LEN: usize = 64;

/// Whether `name` can be used as a single path segment.
///
/// Rejects the empty string, anything longer than `max_len` bytes, `.` and
/// `..`, both path separators, and control characters other than tab, CR and
/// LF.
pub fn is_safe_name(name: &str, max_len: usize) -> bool {
    if name.is_empty() || name.len() > max_len || name == "." {
        return false;
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return false;
    }
    !name
        .chars()
        .any(|c| (c as u32) < 32 && c != '\t' && c != '\n' && c != '\r')
}

#[derive(Debug, Clone)]
pub struct NameGenerator {
    alphabet: Vec<char>,
    min_len: usize,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHABET, DEFAULT_MIN_LEN)
    }
}

impl NameGenerator {
    pub fn new(alphabet: &str, min_len: usize) -> Self {
        let mut chars: Vec<char> = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }
        Self {
            alphabet: chars,
            min_len: min_len.max(1),
        }
    }

    pub fn alphabet(&self) -> String {
        self.alphabet.iter().collect()
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Produces a name absent from `cache` and reserves it there.
    ///
    /// Returns `None` when every length up to [`MAX_GENERATED_LEN`] collided,
    /// which only happens with a degenerate alphabet or a saturated cache.
    pub fn generate(&self, cache: &ExistenceCache) -> Option<String> {
        if self.alphabet.is_empty() {
            return None;
        }

        let mut rng = rand::thread_rng();
        let mut length = self.min_len;
        while length <= MAX_GENERATED_LEN {
            for _ in 0..ATTEMPTS_PER_LENGTH {
                let candidate: String = (0..length)
                    .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
                    .collect();
                if cache.reserve(&candidate) {
                    return Some(candidate);
                }
            }
            length += 1;
        }

        tracing::warn!(
            alphabet = %self.alphabet(),
            min_len = self.min_len,
            "unable to generate a unique note name"
        );
        None
    }

    /// Whether `name` could have come out of this generator.
    pub fn is_generated_name(&self, name: &str) -> bool {
        if name.is_empty() || name.chars().count() > MAX_GENERATED_NAME_CHECK_LEN {
            return false;
        }
        name.chars().all(|c| self.alphabet.contains(&c))
    }
}
