//! Long-press gesture detector
//!
//! Independent of the spin state machine: it only turns raw press/release
//! timestamps into a single gesture event. The caller toggles auto-play mode
//! on `LongPress` and the store records the debounce timestamp that makes
//! the spin guard ignore the release tail of the gesture.

use std::time::Duration;

use tokio::time::Instant;

/// Hold duration that distinguishes a long press from a tap
pub const LONG_PRESS_THRESHOLD: Duration = Duration::from_millis(600);

/// Debounce window after a mode toggle during which spins are rejected
pub const MODE_TOGGLE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Gesture classified from one press/release pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Short press: a normal spin request
    Tap,
    /// Held past the threshold: toggles auto-play mode
    LongPress,
}

/// Timer-based press classifier
#[derive(Debug)]
pub struct LongPressDetector {
    threshold: Duration,
    pressed_at: Option<Instant>,
}

impl LongPressDetector {
    pub fn new() -> Self {
        Self::with_threshold(LONG_PRESS_THRESHOLD)
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            threshold,
            pressed_at: None,
        }
    }

    /// Record the press-down edge
    pub fn press(&mut self, now: Instant) {
        self.pressed_at = Some(now);
    }

    /// Record the release edge and classify the gesture.
    ///
    /// A release without a matching press yields nothing (spurious event).
    pub fn release(&mut self, now: Instant) -> Option<GestureEvent> {
        let pressed_at = self.pressed_at.take()?;
        let held = now.saturating_duration_since(pressed_at);
        if held >= self.threshold {
            Some(GestureEvent::LongPress)
        } else {
            Some(GestureEvent::Tap)
        }
    }

    /// Whether a press is currently held
    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }
}

impl Default for LongPressDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_short_press_is_tap() {
        let mut detector = LongPressDetector::new();
        detector.press(Instant::now());
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(detector.release(Instant::now()), Some(GestureEvent::Tap));
    }

    #[tokio::test(start_paused = true)]
    async fn test_held_press_is_long_press() {
        let mut detector = LongPressDetector::new();
        detector.press(Instant::now());
        tokio::time::advance(Duration::from_millis(700)).await;
        assert_eq!(
            detector.release(Instant::now()),
            Some(GestureEvent::LongPress)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_without_press_is_ignored() {
        let mut detector = LongPressDetector::new();
        assert_eq!(detector.release(Instant::now()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_consumes_the_press() {
        let mut detector = LongPressDetector::new();
        detector.press(Instant::now());
        tokio::time::advance(Duration::from_millis(700)).await;
        detector.release(Instant::now());
        assert_eq!(detector.release(Instant::now()), None);
        assert!(!detector.is_pressed());
    }
}
