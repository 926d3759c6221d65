//! 0/1 test vectors
//!
//! A comparator network sorts every input iff it sorts every 0/1 input of
//! the same width, so the 2^n binary vectors are a complete test suite.

/// One binary input, one entry (0 or 1) per channel
pub type TestVector = Vec<u8>;

/// All 2^n binary vectors of length `channels`.
///
/// Vector `id` carries bit `j` of `id` on channel `j`, so `result[id]` is
/// the vector with that identifier.
pub fn binary_vectors(channels: usize) -> Vec<TestVector> {
    (0..1usize << channels)
        .map(|id| (0..channels).map(|j| ((id >> j) & 1) as u8).collect())
        .collect()
}

/// True if the values never decrease from channel 0 upward.
pub fn is_sorted(values: &[u8]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}
