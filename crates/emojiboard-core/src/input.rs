//! Pointer-event gesture recognition.
//!
//! Raw pointer events are disambiguated into taps, double-taps, and
//! drags with ordinary conditional dispatch: a press becomes a drag once
//! the pointer travels past a minimum-movement threshold, otherwise
//! releasing it is a tap. A second tap close enough in time and space is
//! reported as a double-tap.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Minimum travel in screen pixels before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 4.0;

/// Double-tap detection window.
const DOUBLE_TAP_TIME_MS: u128 = 500;
const DOUBLE_TAP_DISTANCE: f64 = 5.0;

/// A raw pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Moved { position: Point },
    Up { position: Point },
}

/// A recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// A press released without meaningful movement.
    Tap { position: Point },
    /// A second tap within the double-tap window.
    DoubleTap { position: Point },
    /// A drag in progress; `translation` is the total screen-space
    /// offset from the press position.
    DragChanged { translation: Vec2 },
    /// A drag released; `translation` is the final offset.
    DragEnded { translation: Vec2 },
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Pressed { start: Point },
    Dragging { start: Point },
}

/// Resolves raw pointer events into gestures.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    phase: Phase,
    last_tap: Option<(Instant, Point)>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            last_tap: None,
        }
    }
}

impl GestureRecognizer {
    /// Create a recognizer in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is currently in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Feed one pointer event; returns the gesture it resolves to, if any.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Gesture> {
        match (self.phase, event) {
            (Phase::Idle, PointerEvent::Down { position }) => {
                self.phase = Phase::Pressed { start: position };
                None
            }
            (Phase::Pressed { start }, PointerEvent::Moved { position }) => {
                let translation = position - start;
                if translation.hypot() >= DRAG_THRESHOLD {
                    self.phase = Phase::Dragging { start };
                    // A drag is never part of a double-tap sequence.
                    self.last_tap = None;
                    Some(Gesture::DragChanged { translation })
                } else {
                    None
                }
            }
            (Phase::Pressed { start }, PointerEvent::Up { .. }) => {
                self.phase = Phase::Idle;
                Some(self.resolve_tap(start))
            }
            (Phase::Dragging { start }, PointerEvent::Moved { position }) => {
                Some(Gesture::DragChanged {
                    translation: position - start,
                })
            }
            (Phase::Dragging { start }, PointerEvent::Up { position }) => {
                self.phase = Phase::Idle;
                Some(Gesture::DragEnded {
                    translation: position - start,
                })
            }
            // Stray events (a second Down mid-gesture, Moved/Up while
            // idle) are dropped rather than guessed at.
            _ => None,
        }
    }

    fn resolve_tap(&mut self, position: Point) -> Gesture {
        let now = Instant::now();
        if let Some((when, at)) = self.last_tap {
            let close_in_time = now.duration_since(when).as_millis() < DOUBLE_TAP_TIME_MS;
            let close_in_space = (position - at).hypot() < DOUBLE_TAP_DISTANCE;
            if close_in_time && close_in_space {
                self.last_tap = None;
                return Gesture::DoubleTap { position };
            }
        }
        self.last_tap = Some((now, position));
        Gesture::Tap { position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_is_tap() {
        let mut rec = GestureRecognizer::new();
        let pos = Point::new(100.0, 100.0);

        assert_eq!(rec.handle(PointerEvent::Down { position: pos }), None);
        assert_eq!(
            rec.handle(PointerEvent::Up { position: pos }),
            Some(Gesture::Tap { position: pos })
        );
    }

    #[test]
    fn test_movement_below_threshold_stays_a_tap() {
        let mut rec = GestureRecognizer::new();

        rec.handle(PointerEvent::Down {
            position: Point::new(100.0, 100.0),
        });
        assert_eq!(
            rec.handle(PointerEvent::Moved {
                position: Point::new(101.0, 101.0),
            }),
            None
        );
        assert!(matches!(
            rec.handle(PointerEvent::Up {
                position: Point::new(101.0, 101.0),
            }),
            Some(Gesture::Tap { .. })
        ));
    }

    #[test]
    fn test_movement_past_threshold_becomes_drag() {
        let mut rec = GestureRecognizer::new();

        rec.handle(PointerEvent::Down {
            position: Point::new(100.0, 100.0),
        });
        let gesture = rec.handle(PointerEvent::Moved {
            position: Point::new(130.0, 100.0),
        });
        assert_eq!(
            gesture,
            Some(Gesture::DragChanged {
                translation: Vec2::new(30.0, 0.0),
            })
        );
        assert!(rec.is_dragging());

        let gesture = rec.handle(PointerEvent::Up {
            position: Point::new(150.0, 120.0),
        });
        assert_eq!(
            gesture,
            Some(Gesture::DragEnded {
                translation: Vec2::new(50.0, 20.0),
            })
        );
        assert!(!rec.is_dragging());
    }

    #[test]
    fn test_double_tap_detection() {
        let mut rec = GestureRecognizer::new();
        let pos = Point::new(100.0, 100.0);

        rec.handle(PointerEvent::Down { position: pos });
        assert!(matches!(
            rec.handle(PointerEvent::Up { position: pos }),
            Some(Gesture::Tap { .. })
        ));

        rec.handle(PointerEvent::Down { position: pos });
        assert!(matches!(
            rec.handle(PointerEvent::Up { position: pos }),
            Some(Gesture::DoubleTap { .. })
        ));

        // A third tap starts a fresh sequence.
        rec.handle(PointerEvent::Down { position: pos });
        assert!(matches!(
            rec.handle(PointerEvent::Up { position: pos }),
            Some(Gesture::Tap { .. })
        ));
    }

    #[test]
    fn test_taps_far_apart_are_not_a_double_tap() {
        let mut rec = GestureRecognizer::new();

        rec.handle(PointerEvent::Down {
            position: Point::new(100.0, 100.0),
        });
        rec.handle(PointerEvent::Up {
            position: Point::new(100.0, 100.0),
        });

        rec.handle(PointerEvent::Down {
            position: Point::new(200.0, 200.0),
        });
        assert!(matches!(
            rec.handle(PointerEvent::Up {
                position: Point::new(200.0, 200.0),
            }),
            Some(Gesture::Tap { .. })
        ));
    }

    #[test]
    fn test_drag_does_not_feed_double_tap() {
        let mut rec = GestureRecognizer::new();
        let pos = Point::new(100.0, 100.0);

        rec.handle(PointerEvent::Down { position: pos });
        rec.handle(PointerEvent::Up { position: pos });

        // Drag between the two taps.
        rec.handle(PointerEvent::Down { position: pos });
        rec.handle(PointerEvent::Moved {
            position: Point::new(140.0, 100.0),
        });
        rec.handle(PointerEvent::Up {
            position: Point::new(140.0, 100.0),
        });

        rec.handle(PointerEvent::Down { position: pos });
        assert!(matches!(
            rec.handle(PointerEvent::Up { position: pos }),
            Some(Gesture::Tap { .. })
        ));
    }

    #[test]
    fn test_stray_events_are_dropped() {
        let mut rec = GestureRecognizer::new();
        let pos = Point::new(0.0, 0.0);

        assert_eq!(rec.handle(PointerEvent::Up { position: pos }), None);
        assert_eq!(rec.handle(PointerEvent::Moved { position: pos }), None);
    }
}
