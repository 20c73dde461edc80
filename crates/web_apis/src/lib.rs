//! Web APIs used by viewport tracking.
//!
//! This crate provides:
//! - Intersection Observer API

pub mod intersection_observer;

pub use intersection_observer::{
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    IntersectionObserverRegistry, MarginValue, ObserverId, RootMargin, Threshold,
};
