//! 128-bit content digests and the accumulator used to build them.

use std::fmt;

/// A 128-bit digest identifying a context or a plug's effective inputs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest([u8; 16]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

/// Incrementally combines hash contributions into a [`Digest`].
///
/// Variable-length fields are length-prefixed so that `("ab", "c")` and
/// `("a", "bc")` never produce the same digest.
#[derive(Clone, Default)]
pub struct HashAccumulator {
    hasher: blake3::Hasher,
}

impl HashAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_tag(&mut self, tag: u8) -> &mut Self {
        self.hasher.update(&[tag]);
        self
    }

    pub fn append_bool(&mut self, value: bool) -> &mut Self {
        self.append_tag(value as u8)
    }

    pub fn append_u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn append_i64(&mut self, value: i64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn append_f64(&mut self, value: f64) -> &mut Self {
        // Values that compare equal must hash equal.
        let canonical = if value == 0.0 {
            0.0f64
        } else if value.is_nan() {
            f64::NAN
        } else {
            value
        };
        self.append_u64(canonical.to_bits())
    }

    pub fn append_str(&mut self, value: &str) -> &mut Self {
        self.append_u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn append_digest(&mut self, digest: Digest) -> &mut Self {
        self.hasher.update(digest.as_bytes());
        self
    }

    pub fn finish(&self) -> Digest {
        let full = self.hasher.finalize();
        let mut out = [0u8; 16];
        out.copy_from_slice(&full.as_bytes()[..16]);
        Digest(out)
    }
}
