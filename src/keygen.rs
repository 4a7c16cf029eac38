//! License key generation.
//!
//! Keys look like `LIC-XXXX-XXXX-XXXX-XXXX-XXXX-XXXX-XXXX`: 28 symbols drawn
//! uniformly from a 32-symbol alphabet without look-alike characters, which is
//! 140 bits of entropy. Nothing about the plan or the owner is encoded.

use rand::Rng;

use crate::models::Plan;

/// Unambiguous uppercase alphabet (no 0/O, 1/I).
const KEY_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const GROUP_LEN: usize = 4;
const GROUP_COUNT: usize = 7;

#[derive(Debug, Clone)]
pub struct KeyGenerator {
    prefix: String,
}

impl KeyGenerator {
    /// The prefix is stored uppercased so generated keys survive
    /// [`normalize_key`].
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim().to_uppercase(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a fresh license key.
    ///
    /// The plan is accepted so callers have one entry point per license, but it
    /// never influences the output.
    pub fn generate(&self, _plan: Plan) -> String {
        let mut rng = rand::thread_rng();
        let mut key = String::with_capacity(self.prefix.len() + GROUP_COUNT * (GROUP_LEN + 1));
        key.push_str(&self.prefix);

        for _ in 0..GROUP_COUNT {
            key.push('-');
            for _ in 0..GROUP_LEN {
                let idx = rng.gen_range(0..KEY_ALPHABET.len());
                key.push(KEY_ALPHABET[idx] as char);
            }
        }

        key
    }

    /// Cheap shape check for keys produced by this generator.
    pub fn looks_like_key(&self, input: &str) -> bool {
        let Some(rest) = input
            .strip_prefix(self.prefix.as_str())
            .and_then(|r| r.strip_prefix('-'))
        else {
            return false;
        };

        let groups: Vec<&str> = rest.split('-').collect();
        groups.len() == GROUP_COUNT
            && groups.iter().all(|g| {
                g.len() == GROUP_LEN && g.bytes().all(|b| KEY_ALPHABET.contains(&b))
            })
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new("LIC")
    }
}

/// Normalize a client-supplied key: surrounding whitespace is dropped and
/// lookups are case-insensitive.
pub fn normalize_key(input: &str) -> String {
    input.trim().to_uppercase()
}
