pub mod error;
pub mod grant;
pub mod handler;
pub mod kind;

pub use error::PermissionError;
pub use grant::GrantTable;
pub use handler::{get_forum_last_post, PermissionHandler};
pub use kind::{ForumPermission, ForumPermissions};

use crate::forum::{ForumId, ForumTree};
use crate::user::{ForumUser, Principal};
use once_cell::sync::OnceCell;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Global permission data store
static PERMISSION_DATA: OnceCell<RwLock<Arc<PermissionData>>> = OnceCell::new();

/// Get the current permission snapshot.
/// The snapshot is shared, so it can be held across awaits while a reload swaps in a new one.
pub fn get_permission_data() -> Result<Arc<PermissionData>, PermissionError> {
    let lock = PERMISSION_DATA
        .get()
        .ok_or(PermissionError::NotInitialized)?;
    let data = lock.read().map_err(|_| PermissionError::LockPoisoned)?;
    Ok(Arc::clone(&data))
}

/// Install the global permission snapshot, replacing any previous one.
pub fn init_permission_data(data: PermissionData) -> Result<(), PermissionError> {
    let lock = PERMISSION_DATA.get_or_init(|| RwLock::new(Arc::new(PermissionData::default())));
    let mut current = lock.write().map_err(|_| PermissionError::LockPoisoned)?;
    *current = Arc::new(data);
    Ok(())
}

/// Reload forum permissions from database
/// Call this after modifying forums or forum grants via admin UI
pub async fn reload_forum_permissions(db: &DatabaseConnection) -> Result<(), PermissionError> {
    log::info!("Reloading forum permissions from database...");

    // No lock is held while querying; the swap happens in one short write.
    let defaults = crate::app_config::permissions().default_permissions();
    let data = new(db, defaults).await?;
    init_permission_data(data)?;

    log::info!("Forum permissions reloaded successfully");
    Ok(())
}

/// Immutable view of the forum tree and every forum grant.
#[derive(Clone, Debug, Default)]
pub struct PermissionData {
    tree: ForumTree,
    grants: GrantTable,
    /// Permissions every user is assumed to hold when nobody was granted them explicitly.
    default_permissions: ForumPermissions,
}

impl PermissionData {
    pub fn from_parts(
        tree: ForumTree,
        grants: GrantTable,
        default_permissions: ForumPermissions,
    ) -> Self {
        Self {
            tree,
            grants,
            default_permissions,
        }
    }

    pub fn tree(&self) -> &ForumTree {
        &self.tree
    }

    pub fn grants(&self) -> &GrantTable {
        &self.grants
    }

    pub fn default_permissions(&self) -> ForumPermissions {
        self.default_permissions
    }

    /// Object-level check: does the user, or one of its groups, hold `permission` on `forum`.
    /// Neither superuser status nor default permissions are considered here.
    pub fn has_perm(&self, user: &ForumUser, forum: ForumId, permission: ForumPermission) -> bool {
        self.grants.holds(user, forum, permission)
    }

    /// Everything the user holds on a forum. Superusers hold everything.
    pub fn permissions_in_forum(&self, user: &ForumUser, forum: ForumId) -> ForumPermissions {
        if user.is_superuser {
            ForumPermissions::all()
        } else {
            self.grants.for_user(user, forum)
        }
    }

    /// Forums on which the user or its groups hold at least one of `perms`.
    ///
    /// When no forum qualifies and every requested permission is part of the
    /// default permissions, all forums qualify instead. Both conditions are
    /// required; an empty result alone does not trigger the fallback.
    pub fn forums_for_user(&self, user: &ForumUser, perms: ForumPermissions) -> HashSet<ForumId> {
        if user.is_superuser {
            return self.tree.ids().collect();
        }

        let granted: HashSet<ForumId> = self
            .grants
            .forums_with_any(user, perms)
            .into_iter()
            .filter(|forum| self.tree.contains(*forum))
            .collect();

        if granted.is_empty() && self.default_permissions.contains(perms) {
            log::debug!(
                "No explicit {:?} grants for {:?}; using default permissions.",
                perms,
                user.principal()
            );
            return self.tree.ids().collect();
        }

        granted
    }
}

/// Load a permission snapshot from the database.
pub async fn new(
    db: &DatabaseConnection,
    default_permissions: ForumPermissions,
) -> Result<PermissionData, PermissionError> {
    use crate::orm::{forum_group_permissions, forum_user_permissions, forums};
    use sea_orm::entity::*;

    let forum_rows = forums::Entity::find().all(db).await?;
    let tree = ForumTree::from_models(&forum_rows)?;

    let mut grants = GrantTable::new();

    let user_rows = forum_user_permissions::Entity::find().all(db).await?;
    for row in user_rows {
        let principal = match (row.anonymous_user, row.user_id) {
            (true, _) => Principal::Anonymous,
            (false, Some(user_id)) => Principal::User(user_id),
            (false, None) => {
                log::warn!(
                    "forum_user_permissions row {} names neither a user nor the anonymous user.",
                    row.id
                );
                continue;
            }
        };

        match row.permission.parse::<ForumPermission>() {
            Ok(permission) => grants.grant(principal, row.forum_id, permission),
            Err(e) => log::warn!("Skipping forum_user_permissions row {}: {}", row.id, e),
        }
    }

    let group_rows = forum_group_permissions::Entity::find().all(db).await?;
    for row in group_rows {
        match row.permission.parse::<ForumPermission>() {
            Ok(permission) => {
                grants.grant(Principal::Group(row.group_id), row.forum_id, permission)
            }
            Err(e) => log::warn!("Skipping forum_group_permissions row {}: {}", row.id, e),
        }
    }

    log::info!(
        "Loaded {} forums and {} forum grant sets",
        tree.len(),
        grants.len()
    );

    Ok(PermissionData::from_parts(tree, grants, default_permissions))
}
