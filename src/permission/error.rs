use crate::forum::TreeError;
use sea_orm::DbErr;

/// Failures while loading or reaching the permission snapshot.
/// Denied checks are never errors; they are `false`.
#[derive(Debug)]
pub enum PermissionError {
    /// `init_permission_data` has not been called
    NotInitialized,
    /// A thread panicked while holding the snapshot lock
    LockPoisoned,
    Database(DbErr),
    Tree(TreeError),
}

impl std::fmt::Display for PermissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionError::NotInitialized => write!(f, "Permission data not initialized"),
            PermissionError::LockPoisoned => write!(f, "Permission data lock poisoned"),
            PermissionError::Database(e) => write!(f, "Permission data query failed: {}", e),
            PermissionError::Tree(e) => write!(f, "Invalid forum hierarchy: {}", e),
        }
    }
}

impl std::error::Error for PermissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PermissionError::Database(e) => Some(e),
            PermissionError::Tree(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DbErr> for PermissionError {
    fn from(e: DbErr) -> Self {
        PermissionError::Database(e)
    }
}

impl From<TreeError> for PermissionError {
    fn from(e: TreeError) -> Self {
        PermissionError::Tree(e)
    }
}
