//! Node identities.

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for an element in the render tree.
    pub struct ElementId;
}

new_key_type! {
    /// Unique identifier for a scroll context (window, document or container).
    pub struct ContextId;
}
