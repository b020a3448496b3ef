//! Negative example generation.
//!
//! Negatives for classifier training are shuffled variants of the seed
//! sequences. The shuffle preserves local composition up to a chosen
//! order: the sequence is cut into chunks of `order` characters and the
//! chunks are permuted, so an order-2 shuffle keeps dinucleotide content
//! while destroying long-range structure.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// One shuffled variant of `seq`, preserving chunks of `order` characters.
///
/// `order == 0` is treated as 1 (a plain character shuffle).
pub fn shuffle_sequence(seq: &str, order: usize, rng: &mut StdRng) -> String {
    let order = order.max(1);
    let chars: Vec<char> = seq.chars().collect();
    let mut chunks: Vec<&[char]> = chars.chunks(order).collect();
    chunks.shuffle(rng);
    chunks.concat().into_iter().collect()
}

/// `times` independent shuffled variants of `seq`.
pub fn shuffled_variants(seq: &str, order: usize, times: usize, rng: &mut StdRng) -> Vec<String> {
    (0..times)
        .map(|_| shuffle_sequence(seq, order, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_shuffle_preserves_length_and_composition() {
        let mut rng = StdRng::seed_from_u64(3);
        let seq = "GGGCCCAAAUUU";
        let shuffled = shuffle_sequence(seq, 1, &mut rng);
        assert_eq!(shuffled.len(), seq.len());
        let mut a: Vec<char> = seq.chars().collect();
        let mut b: Vec<char> = shuffled.chars().collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_two_preserves_chunks() {
        let mut rng = StdRng::seed_from_u64(3);
        let shuffled = shuffle_sequence("GGCCAAUU", 2, &mut rng);
        // Every original 2-chunk must appear somewhere at even offsets.
        let chunks: Vec<&str> = vec!["GG", "CC", "AA", "UU"];
        for chunk in chunks {
            let found = (0..shuffled.len())
                .step_by(2)
                .any(|i| &shuffled[i..i + 2] == chunk);
            assert!(found, "chunk {chunk} lost in {shuffled}");
        }
    }

    #[test]
    fn test_shuffled_variants_count() {
        let mut rng = StdRng::seed_from_u64(9);
        let variants = shuffled_variants("GCGCGCAU", 2, 4, &mut rng);
        assert_eq!(variants.len(), 4);
        for v in &variants {
            assert_eq!(v.len(), 8);
        }
    }

    #[test]
    fn test_order_zero_degrades_to_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let shuffled = shuffle_sequence("ACGU", 0, &mut rng);
        assert_eq!(shuffled.len(), 4);
    }
}
