// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encouragement line selection.

use rand::seq::SliceRandom;
use rand::Rng;

/// Used when the stored pool is empty.
pub const BUILTIN_ENCOURAGEMENTS: &[&str] = &[
    "Small, steady steps add up.",
    "Every bit of gentle movement counts.",
    "Recovery is rarely a straight line, and that's okay.",
    "You're doing the work. Keep it up.",
    "Be patient with yourself today.",
];

/// Draw one line uniformly at random, falling back to the built-in pool.
pub fn pick_encouragement<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> String {
    match pool.choose(rng) {
        Some(line) => line.clone(),
        None => BUILTIN_ENCOURAGEMENTS
            .choose(rng)
            .map(|s| (*s).to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn draws_from_stored_pool() {
        let pool = vec!["one".to_string(), "two".to_string()];
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<String> = (0..64).map(|_| pick_encouragement(&pool, &mut rng)).collect();
        assert_eq!(seen, pool.into_iter().collect());
    }

    #[test]
    fn empty_pool_uses_builtin_lines() {
        let mut rng = StdRng::seed_from_u64(1);
        let line = pick_encouragement(&[], &mut rng);
        assert!(BUILTIN_ENCOURAGEMENTS.contains(&line.as_str()));
    }
}
