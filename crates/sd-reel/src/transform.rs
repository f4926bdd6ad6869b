//! Spin and rest transform math
//!
//! A reel scrolls through a conceptually repeated strip of the symbol set.
//! Offsets are `-(row_index × SYMBOL_HEIGHT_PX)`: scrolling down makes the
//! offset more negative. The landing row is anchored near the middle of the
//! repeated strip so there is travel room on both ends.

use serde::{Deserialize, Serialize};

/// Height of one symbol cell in pixels
pub const SYMBOL_HEIGHT_PX: f32 = 80.0;

/// How many times the symbol set is conceptually repeated on the strip
pub const STRIP_REPEATS: usize = 8;

/// Rows visible in the reel window; the middle one carries the outcome
pub const VISIBLE_ROWS: usize = 3;

/// Floor on perceived spin speed. With a tiny symbol set a single loop
/// scrolls past too few symbols to read as "spinning", so loops are added
/// until this rate is sustained over the spin duration.
pub const MIN_SYMBOLS_PER_SECOND: f64 = 8.0;

/// Default spin duration the standalone transform assumes
pub const DEFAULT_SPIN_DURATION_MS: u64 = 2200;

/// Start and end scroll offsets for one reel spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinTransform {
    /// Offset the reel snaps to before the animation starts
    pub initial_px: f32,
    /// Offset the reel animates to; middle row shows the target symbol
    pub final_px: f32,
}

/// Compute the spin transform for a target symbol at the default duration
pub fn spin_transform(target_index: usize, symbol_count: usize) -> SpinTransform {
    spin_transform_for_duration(target_index, symbol_count, DEFAULT_SPIN_DURATION_MS)
}

/// Compute the spin transform for a target symbol and spin duration.
///
/// The landing top-row sits `STRIP_REPEATS / 2` set-lengths into the strip,
/// clamped to strip bounds. The initial offset walks backward whole cycles:
/// at least 2, at most what the strip allows, and enough to keep
/// [`MIN_SYMBOLS_PER_SECOND`] over `spin_duration_ms`.
pub fn spin_transform_for_duration(
    target_index: usize,
    symbol_count: usize,
    spin_duration_ms: u64,
) -> SpinTransform {
    if symbol_count == 0 {
        return SpinTransform {
            initial_px: 0.0,
            final_px: 0.0,
        };
    }

    let target = target_index % symbol_count;
    let top_row = landing_top_row(target, symbol_count);
    let final_px = -(top_row as f32 * SYMBOL_HEIGHT_PX);

    // Whole cycles available above the landing row
    let available_loops = top_row / symbol_count;

    let duration_s = spin_duration_ms as f64 / 1000.0;
    let loops_for_rate =
        (MIN_SYMBOLS_PER_SECOND * duration_s / symbol_count as f64).ceil() as usize;

    let loops_forward = loops_for_rate.max(2).min(available_loops);

    let start_row = top_row - loops_forward * symbol_count;
    let initial_px = -(start_row as f32 * SYMBOL_HEIGHT_PX);

    SpinTransform {
        initial_px,
        final_px,
    }
}

/// Resting offset for the idle (non-spinning) display of `index`.
///
/// Identical to the final offset of a spin landing on `index`, so a stopped
/// reel converted back to idle does not jump.
pub fn rest_transform(index: usize, symbol_count: usize) -> f32 {
    if symbol_count == 0 {
        return 0.0;
    }
    -(landing_top_row(index % symbol_count, symbol_count) as f32 * SYMBOL_HEIGHT_PX)
}

/// Symbol index shown on the visible middle row at a given final offset.
/// Inverse of the transform, used to verify round-trips.
pub fn symbol_at_offset(offset_px: f32, symbol_count: usize) -> usize {
    if symbol_count == 0 {
        return 0;
    }
    let top_row = (-offset_px / SYMBOL_HEIGHT_PX).round() as usize;
    (top_row + VISIBLE_ROWS / 2) % symbol_count
}

fn landing_top_row(target: usize, symbol_count: usize) -> usize {
    let total_rows = symbol_count * STRIP_REPEATS;
    let anchor = (STRIP_REPEATS / 2) * symbol_count;

    // Middle visible row must show the target, so the top row is one above
    let raw = anchor + target;
    let top_row = raw.saturating_sub(VISIBLE_ROWS / 2);
    top_row.min(total_rows.saturating_sub(VISIBLE_ROWS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_counts_and_targets() {
        for symbol_count in 1..=40 {
            for target in 0..symbol_count {
                let t = spin_transform(target, symbol_count);
                assert_eq!(
                    symbol_at_offset(t.final_px, symbol_count),
                    target,
                    "count={symbol_count} target={target}"
                );
            }
        }
    }

    #[test]
    fn test_transform_is_deterministic() {
        let a = spin_transform(5, 12);
        let b = spin_transform(5, 12);
        assert_eq!(a, b);

        assert_eq!(rest_transform(5, 12), rest_transform(5, 12));
    }

    #[test]
    fn test_rest_matches_spin_final() {
        for symbol_count in 1..=20 {
            for index in 0..symbol_count {
                assert_eq!(
                    rest_transform(index, symbol_count),
                    spin_transform(index, symbol_count).final_px
                );
            }
        }
    }

    #[test]
    fn test_initial_is_at_least_two_loops_back() {
        for symbol_count in 2..=30 {
            let t = spin_transform(0, symbol_count);
            let travel_rows = ((t.initial_px - t.final_px) / SYMBOL_HEIGHT_PX).abs() as usize;
            assert!(
                travel_rows >= 2 * symbol_count,
                "count={symbol_count} travelled {travel_rows} rows"
            );
        }
    }

    #[test]
    fn test_tiny_symbol_set_adds_loops_for_spin_rate() {
        // A 3-symbol set needs more loops than a 20-symbol set to keep the
        // perceived rate up; the strip bound caps how far back we can go.
        let tiny = spin_transform_for_duration(1, 3, 2200);
        let tiny_loops =
            ((tiny.initial_px - tiny.final_px) / SYMBOL_HEIGHT_PX).abs() as usize / 3;

        let large = spin_transform_for_duration(1, 20, 2200);
        let large_loops =
            ((large.initial_px - large.final_px) / SYMBOL_HEIGHT_PX).abs() as usize / 20;

        assert!(tiny_loops > large_loops);
        assert!(tiny_loops * 3 >= 12, "tiny set should travel several loops");
    }

    #[test]
    fn test_offsets_stay_within_strip() {
        for symbol_count in 1..=40 {
            for target in 0..symbol_count {
                let t = spin_transform(target, symbol_count);
                let strip_px = (symbol_count * STRIP_REPEATS) as f32 * SYMBOL_HEIGHT_PX;
                assert!(t.final_px <= 0.0 && t.final_px > -strip_px);
                assert!(t.initial_px <= 0.0 && t.initial_px > -strip_px);
            }
        }
    }

    #[test]
    fn test_zero_symbol_count_degrades_quietly() {
        let t = spin_transform(0, 0);
        assert_eq!(t.initial_px, 0.0);
        assert_eq!(t.final_px, 0.0);
        assert_eq!(rest_transform(0, 0), 0.0);
    }
}
