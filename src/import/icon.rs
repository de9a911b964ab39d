//! Random emoji selection for page icons
//!
//! Picks a code point from a curated set of emoji blocks, resampling until it
//! lands on an assigned character. The resample loop is capped so a sparse
//! block can never spin forever.

use miette::Diagnostic;
use rand::Rng;
use thiserror::Error;

/// Inclusive code-point ranges considered valid decorative glyphs
pub const EMOJI_RANGES: [(u32, u32); 6] = [
    (0x1F601, 0x1F64F), // Emoticons
    (0x1F300, 0x1F5FF), // Misc Symbols and Pictographs
    (0x1F680, 0x1F6FF), // Transport and Map
    (0x2600, 0x26FF),   // Misc Symbols
    (0x2700, 0x27BF),   // Dingbats
    (0x1F900, 0x1F9FF), // Supplemental Symbols and Pictographs
];

/// Maximum number of code points drawn before giving up
pub const MAX_ICON_ATTEMPTS: u32 = 256;

/// Character names with this prefix are never returned
const EXCLUDED_NAME_PREFIX: &str = "CANCELED";

#[derive(Debug, Error, Diagnostic)]
#[error("no valid emoji found after {attempts} attempts in U+{start:04X}..=U+{end:04X}")]
#[diagnostic(
    code(huntr_notion::icon::exhausted),
    help("retry the upload, or run without --emoji")
)]
pub struct IconGenerationError {
    pub attempts: u32,
    pub start: u32,
    pub end: u32,
}

/// Draws emoji from [`EMOJI_RANGES`] using the wrapped random source
#[derive(Debug)]
pub struct IconSelector<R> {
    rng: R,
}

impl IconSelector<rand::rngs::ThreadRng> {
    /// Selector backed by the thread-local generator
    pub fn from_thread_rng() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: Rng> IconSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one glyph
    pub fn next_glyph(&mut self) -> Result<char, IconGenerationError> {
        random_emoji(&mut self.rng)
    }
}

/// Pick a range uniformly, then a code point uniformly within it.
///
/// Unassigned code points and excluded names are resampled from the same
/// range, at most [`MAX_ICON_ATTEMPTS`] times.
pub fn random_emoji<R: Rng + ?Sized>(rng: &mut R) -> Result<char, IconGenerationError> {
    let (start, end) = EMOJI_RANGES[rng.random_range(0..EMOJI_RANGES.len())];

    for _ in 0..MAX_ICON_ATTEMPTS {
        let code_point = rng.random_range(start..=end);
        if let Some(glyph) = char::from_u32(code_point).filter(|c| is_decorative(*c)) {
            return Ok(glyph);
        }
    }

    Err(IconGenerationError {
        attempts: MAX_ICON_ATTEMPTS,
        start,
        end,
    })
}

/// True when the character has a Unicode name that is not excluded
pub fn is_decorative(c: char) -> bool {
    match unicode_names2::name(c) {
        Some(name) => !name.to_string().starts_with(EXCLUDED_NAME_PREFIX),
        None => false,
    }
}

/// True when the character lies inside one of [`EMOJI_RANGES`]
pub fn in_emoji_ranges(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&cp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ten_thousand_draws_are_named_and_in_range() {
        let mut selector = IconSelector::new(StdRng::seed_from_u64(7));

        for _ in 0..10_000 {
            let glyph = selector.next_glyph().unwrap();
            assert!(in_emoji_ranges(glyph), "U+{:04X} outside ranges", glyph as u32);
            assert!(
                unicode_names2::name(glyph).is_some(),
                "U+{:04X} has no name",
                glyph as u32
            );
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = IconSelector::new(StdRng::seed_from_u64(42));
        let mut b = IconSelector::new(StdRng::seed_from_u64(42));

        for _ in 0..50 {
            assert_eq!(a.next_glyph().unwrap(), b.next_glyph().unwrap());
        }
    }

    #[test]
    fn test_is_decorative() {
        assert!(is_decorative('\u{1F600}')); // GRINNING FACE
        assert!(is_decorative('\u{2615}')); // HOT BEVERAGE
        assert!(!is_decorative('\u{0378}')); // unassigned
    }

    #[test]
    fn test_in_emoji_ranges() {
        assert!(in_emoji_ranges('\u{1F601}'));
        assert!(in_emoji_ranges('\u{27BF}'));
        assert!(!in_emoji_ranges('\u{1F600}'));
        assert!(!in_emoji_ranges('a'));
    }
}
