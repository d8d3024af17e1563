/// Which nodes the recentering pass visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalScope {
    /// Only the immediate children of the scene root.
    #[default]
    DirectChildren,
    /// Every node in the hierarchy.
    Recursive,
}

#[derive(Debug, Clone, Default)]
pub struct RecenterConfig {
    pub scope: TraversalScope,
}
