//! Host capability probes.

use bitflags::bitflags;

bitflags! {
    /// Detection mechanisms a host offers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// A render tree exists (not a server-side render).
        const DOM = 1 << 0;
        /// `requestAnimationFrame` / `cancelAnimationFrame`.
        const ANIMATION_FRAME = 1 << 1;
        /// Native intersection observation.
        const INTERSECTION_OBSERVER = 1 << 2;
    }
}

impl Capabilities {
    pub fn can_use_dom(&self) -> bool {
        self.contains(Capabilities::DOM)
    }

    pub fn can_use_animation_frame(&self) -> bool {
        self.contains(Capabilities::DOM | Capabilities::ANIMATION_FRAME)
    }

    pub fn can_use_intersection_observer(&self) -> bool {
        self.contains(Capabilities::DOM | Capabilities::INTERSECTION_OBSERVER)
    }
}
