//! Error types for registry operations.

/// Errors returned by [`Registry`](crate::Registry) operations.
///
/// Every failing operation leaves the registry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A node with this name is already registered.
    #[error("node already exists: {0}")]
    DuplicateNode(String),

    /// No node with this name is registered.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A lookup was made against a registry with no nodes.
    #[error("registry has no nodes")]
    EmptyRegistry,
}

/// Convenience result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
