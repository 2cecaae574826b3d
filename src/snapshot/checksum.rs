//! Rolling checksum for snapshot documents
//!
//! Every document file is paired with a `.hash` file holding the checksum of
//! the document's exact bytes. The checksum is a cross-process integrity
//! gate, so its byte semantics are fixed:
//!
//! - two accumulators, `a = 1` and `b = 0`
//! - per byte: `a = (a + byte) mod 65521`, `b = (b + a) mod 65521`
//! - result: `(b << 16) | a`
//!
//! The checksum record on disk is exactly 4 bytes, big-endian.

/// Largest prime below 2^16
const MOD_ADLER: u32 = 65521;

/// Largest byte run that cannot overflow `b` before reduction
const NMAX: usize = 5552;

/// Size of the on-disk checksum record in bytes
pub const CHECKSUM_LEN: usize = 4;

/// Incremental form of the checksum.
///
/// Feeding the same bytes in any split yields the same result as
/// [`compute`] over the concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingChecksum {
    a: u32,
    b: u32,
}

impl RollingChecksum {
    /// Creates a checksum in its initial state.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Feeds bytes into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        // Reduction is deferred to once per NMAX bytes; the result is
        // identical to reducing after every byte.
        for chunk in data.chunks(NMAX) {
            for &byte in chunk {
                self.a += u32::from(byte);
                self.b += self.a;
            }
            self.a %= MOD_ADLER;
            self.b %= MOD_ADLER;
        }
    }

    /// Returns the checksum of all bytes fed so far.
    pub fn finalize(&self) -> u32 {
        (self.b << 16) | self.a
    }
}

impl Default for RollingChecksum {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the checksum over the provided data.
///
/// This function is deterministic: the same input always produces the same output.
pub fn compute(data: &[u8]) -> u32 {
    let mut checksum = RollingChecksum::new();
    checksum.update(data);
    checksum.finalize()
}

/// Verifies that the computed checksum matches the expected checksum.
pub fn verify(data: &[u8], expected: u32) -> bool {
    compute(data) == expected
}

/// Encodes a checksum as its 4-byte big-endian record.
pub fn encode(checksum: u32) -> [u8; CHECKSUM_LEN] {
    checksum.to_be_bytes()
}

/// Decodes a 4-byte big-endian record.
pub fn decode(record: [u8; CHECKSUM_LEN]) -> u32 {
    u32::from_be_bytes(record)
}

/// Decodes a checksum record read from disk.
///
/// Returns `None` unless the record is exactly 4 bytes.
pub fn decode_record(bytes: &[u8]) -> Option<u32> {
    let record: [u8; CHECKSUM_LEN] = bytes.try_into().ok()?;
    Some(decode(record))
}
