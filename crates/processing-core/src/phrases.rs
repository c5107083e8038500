//! Built-in caption phrases.

use rand::seq::IndexedRandom;
use rand::Rng;

/// Phrases offered by the "random caption" action.
pub const PHRASES: [&str; 5] = [
    "Irys will keep this meme for 100 years!",
    "Satoshi said that Irys is the new Bitcoin",
    "This meme is verified by Irys",
    "Meme in the blockchain forever",
    "NFT meme created!",
];

/// Pick a phrase uniformly at random.
pub fn random_phrase() -> &'static str {
    random_phrase_with(&mut rand::rng())
}

pub fn random_phrase_with<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PHRASES.choose(rng).copied().unwrap_or(PHRASES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_phrase_is_from_list() {
        for _ in 0..50 {
            assert!(PHRASES.contains(&random_phrase()));
        }
    }

    #[test]
    fn test_all_phrases_reachable() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(random_phrase_with(&mut rng));
        }
        assert_eq!(seen.len(), PHRASES.len());
    }
}
