const SEED: f64 = 66666.0;
const FACTOR: f64 = 3666.0;
const MODULUS: i128 = 31567;

/// A small stable hash used to namespace cache directories and output files.
///
/// Not collision resistant, only deterministic across runs and platforms.
pub fn num_hash(values: &[f64]) -> u32 {
    let h = values.iter().fold(SEED, |h, v| h * FACTOR + v);

    (h.trunc() as i128).rem_euclid(MODULUS) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_hashes_are_stable() {
        assert_eq!(num_hash(&[0.0]), 5842);
        assert_eq!(num_hash(&[10.0]), 5852);
        assert_eq!(num_hash(&[16.0]), 5858);
    }

    #[test]
    fn corner_hash() {
        assert_eq!(num_hash(&[116.3, 40.0, 116.5, 39.8]), 29838);
    }

    #[test]
    fn hash_is_order_sensitive() {
        assert_ne!(num_hash(&[1.0, 2.0]), num_hash(&[2.0, 1.0]));
    }
}
