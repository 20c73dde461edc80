//! Enter/exit transitions for geometry-based backends.

/// A viewport transition to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Entered,
    Exited,
}

/// Apply one evaluation result to `entered`.
///
/// | entered | in viewport | spy | result |
/// |---|---|---|---|
/// | false | true | any | `Entered`, entered becomes true |
/// | true | false | true | `Exited`, entered becomes false |
/// | true | false | false | nothing, entry is sticky |
/// | same | same | any | nothing |
pub fn transition(entered: &mut bool, in_viewport: bool, spy: bool) -> Option<Signal> {
    match (*entered, in_viewport) {
        (false, true) => {
            *entered = true;
            Some(Signal::Entered)
        }
        (true, false) if spy => {
            *entered = false;
            Some(Signal::Exited)
        }
        _ => None,
    }
}

/// What an observer notification says about the element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionResult {
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Apply an observer notification to `entered`.
///
/// Intersecting enters; a ratio of zero exits. A partial overlap below the
/// threshold is neither. Repeated signals are dropped.
pub fn observed(entered: &mut bool, result: IntersectionResult) -> Option<Signal> {
    if result.is_intersecting {
        if *entered {
            return None;
        }
        *entered = true;
        Some(Signal::Entered)
    } else if result.ratio <= 0.0 && *entered {
        *entered = false;
        Some(Signal::Exited)
    } else {
        None
    }
}
