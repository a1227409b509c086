//! Empirical Shannon entropy over byte sequences.

/// Computes the Shannon entropy of `data` in bits per byte.
///
/// Byte values are counted, converted to empirical probabilities, and
/// summed as `-p * log2(p)`. The result is within `[0.0, 8.0]` and is
/// deterministic for a given input. Empty input yields exactly `0.0`;
/// an empty frequency table has no terms and must not produce NaN.
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut counts = [0u64; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }

    let total = data.len() as f64;
    counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}
