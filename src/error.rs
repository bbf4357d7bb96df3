//! Error types for world operations

/// Errors returned by [`PhysicsWorld`](crate::PhysicsWorld) operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// Operation on a handle that was removed or never issued by this world
    InvalidHandle,
    /// Worker pool construction failed
    WorkerPool(String),
}

impl std::fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHandle => write!(f, "invalid or stale collidable handle"),
            Self::WorkerPool(e) => write!(f, "worker pool error: {e}"),
        }
    }
}

impl std::error::Error for PhysicsError {}
