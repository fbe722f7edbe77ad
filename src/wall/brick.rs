// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! A single wall tile and its name label.

use rand::Rng;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Background image variant of a brick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum BrickKind {
    Weathered,
    Smooth,
    Cracked,
    Mossy,
}

impl BrickKind {
    pub const ALL: [BrickKind; 4] = [
        BrickKind::Weathered,
        BrickKind::Smooth,
        BrickKind::Cracked,
        BrickKind::Mossy,
    ];

    /// Pick a variant uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Variant at `index`, wrapping around the fixed set.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

/// Render description of one brick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Brick {
    pub kind: BrickKind,
    pub flipped: bool,
    pub tinted: bool,
    /// Formatted "First L." label, omitted for blank bricks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Brick {
    /// Build a brick, choosing a random variant when `kind` is `None`.
    pub fn new<R: Rng + ?Sized>(
        name: &str,
        kind: Option<BrickKind>,
        flipped: bool,
        rng: &mut R,
    ) -> Self {
        let kind = kind.unwrap_or_else(|| BrickKind::random(rng));
        let label = format_brick_name(name);

        Self {
            kind,
            flipped,
            tinted: false,
            label: (!label.is_empty()).then_some(label),
        }
    }

    pub fn tinted(mut self, tinted: bool) -> Self {
        self.tinted = tinted;
        self
    }
}

/// Format a full name as "First L.".
///
/// Single-token names are only capitalized; blank names yield an empty string.
pub fn format_brick_name(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();

    match tokens.as_slice() {
        [] => String::new(),
        [only] => capitalize(only),
        [first, .., last] => {
            let initial: String = last
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default();
            format!("{} {}.", capitalize(first), initial)
        }
    }
}

/// Uppercase the first character and lowercase the rest.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_format_brick_name() {
        assert_eq!(format_brick_name("john doe"), "John D.");
        assert_eq!(format_brick_name("Mary"), "Mary");
        assert_eq!(format_brick_name(""), "");
        assert_eq!(format_brick_name("   "), "");
        assert_eq!(format_brick_name("mARY ann  smith"), "Mary S.");
        assert_eq!(format_brick_name("  élodie  zola "), "Élodie Z.");
    }

    #[test]
    fn test_blank_brick_has_no_label() {
        let mut rng = StdRng::seed_from_u64(7);
        let brick = Brick::new("", Some(BrickKind::Smooth), true, &mut rng);
        assert_eq!(brick.label, None);
        assert_eq!(brick.kind, BrickKind::Smooth);
        assert!(brick.flipped);
    }

    #[test]
    fn test_random_kind_covers_all_variants() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(Brick::new("a b", None, false, &mut rng).kind);
        }
        assert_eq!(seen.len(), BrickKind::ALL.len());
    }

    #[test]
    fn test_from_index_wraps() {
        assert_eq!(BrickKind::from_index(0), BrickKind::Weathered);
        assert_eq!(BrickKind::from_index(5), BrickKind::Smooth);
    }
}
