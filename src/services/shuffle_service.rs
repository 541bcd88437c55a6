use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Odd multiplier for mixing a question id into the base seed. Odd, so the
/// mapping is a bijection on u64 and two questions can never collide onto
/// the same choice-order seed for a given base.
const CHOICE_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ShuffleService;

impl ShuffleService {
    /// Seeded permutation. `None` keeps the persisted order unchanged. The
    /// same seed yields the same permutation in every process on every host;
    /// seeds derive from stable identifiers, never from wall-clock time.
    pub fn shuffle<T>(seed: Option<u64>, mut items: Vec<T>) -> Vec<T> {
        if let Some(seed) = seed {
            let mut rng = StdRng::seed_from_u64(seed);
            items.shuffle(&mut rng);
        }
        items
    }

    /// Seed for question order. Everyone in a room shares the room's seed
    /// (same paper for the whole room); a lone candidate gets a stable order
    /// derived from their attempt token; with neither there is no seed.
    pub fn question_order_seed(room_id: Option<i64>, attempt_token: Option<&str>) -> Option<u64> {
        if let Some(room_id) = room_id {
            return Some(room_id as u64);
        }
        attempt_token
            .filter(|token| !token.is_empty())
            .map(|token| token.bytes().map(u64::from).sum())
    }

    /// Seed for the choice order within one question: the base seed combined
    /// with the question id, so choice order differs per question but stays
    /// stable for that question.
    pub fn choice_order_seed(base: u64, question_id: i64) -> u64 {
        base.wrapping_add((question_id as u64).wrapping_mul(CHOICE_SEED_MIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_permutation() {
        let a = ShuffleService::shuffle(Some(42), vec![1, 2, 3, 4, 5]);
        let b = ShuffleService::shuffle(Some(42), vec![1, 2, 3, 4, 5]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = ShuffleService::shuffle(Some(42), vec![1, 2, 3, 4, 5]);
        let b = ShuffleService::shuffle(Some(43), vec![1, 2, 3, 4, 5]);
        assert_ne!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut shuffled = ShuffleService::shuffle(Some(7), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        shuffled.sort();
        assert_eq!(shuffled, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn no_seed_keeps_persisted_order() {
        let items = vec!["a", "b", "c"];
        assert_eq!(ShuffleService::shuffle(None, items.clone()), items);
    }

    #[test]
    fn room_seed_wins_over_attempt_token() {
        assert_eq!(
            ShuffleService::question_order_seed(Some(12), Some("token")),
            Some(12)
        );
    }

    #[test]
    fn attempt_token_seed_is_byte_sum() {
        // "AB" = 65 + 66
        assert_eq!(
            ShuffleService::question_order_seed(None, Some("AB")),
            Some(131)
        );
    }

    #[test]
    fn no_room_no_token_no_seed() {
        assert_eq!(ShuffleService::question_order_seed(None, None), None);
        assert_eq!(ShuffleService::question_order_seed(None, Some("")), None);
    }

    #[test]
    fn choice_seeds_are_distinct_per_question() {
        let base = 99;
        let seeds: Vec<u64> = (1..=50)
            .map(|qid| ShuffleService::choice_order_seed(base, qid))
            .collect();
        let mut deduped = seeds.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), seeds.len());
    }

    #[test]
    fn choice_seed_is_stable() {
        assert_eq!(
            ShuffleService::choice_order_seed(42, 7),
            ShuffleService::choice_order_seed(42, 7)
        );
    }
}
