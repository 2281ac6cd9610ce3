pub trait ViewportPort: Send + Sync {
    /// Scroll the document back to the top after a page swap.
    fn reset_scroll(&self);
}
