//! Scroll direction detection.

use common::ScrollPosition;
use serde::Serialize;
use std::fmt;

/// Direction of the last significant scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
            ScrollDirection::Left => "left",
            ScrollDirection::Right => "right",
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction implied by moving from `last` to `new`.
///
/// The vertical axis wins when both axes moved by at least `sensitivity`.
/// Without a previous position there is no direction.
pub fn scroll_direction(last: Option<ScrollPosition>, new: ScrollPosition, sensitivity: f64) -> Option<ScrollDirection> {
    let last = last?;
    let dy = new.top - last.top;
    let dx = new.left - last.left;

    if dy.abs() >= sensitivity {
        Some(if dy > 0.0 { ScrollDirection::Down } else { ScrollDirection::Up })
    } else if dx.abs() >= sensitivity {
        Some(if dx > 0.0 { ScrollDirection::Right } else { ScrollDirection::Left })
    } else {
        None
    }
}

/// Per-element direction state.
#[derive(Clone, Debug)]
pub struct DirectionTracker {
    sensitivity: f64,
    last_position: Option<ScrollPosition>,
    last_direction: Option<ScrollDirection>,
}

impl DirectionTracker {
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity,
            last_position: None,
            last_direction: None,
        }
    }

    /// Record `position` and return a direction worth reporting.
    ///
    /// A direction is reported only while the element has entered the
    /// viewport and only when it differs from the last reported one.
    pub fn observe(&mut self, position: ScrollPosition, entered: bool) -> Option<ScrollDirection> {
        let direction = scroll_direction(self.last_position, position, self.sensitivity);
        self.last_position = Some(position);

        match direction {
            Some(direction) if entered && self.last_direction != Some(direction) => {
                self.last_direction = Some(direction);
                Some(direction)
            }
            _ => None,
        }
    }

    pub fn last_position(&self) -> Option<ScrollPosition> {
        self.last_position
    }

    pub fn last_direction(&self) -> Option<ScrollDirection> {
        self.last_direction
    }
}
