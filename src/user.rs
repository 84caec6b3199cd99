use crate::orm::{user_groups, users};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};

pub type UserId = i32;
pub type GroupId = i32;

/// Who is asking. Guests are not an absence of identity, they are the
/// anonymous identity, and can hold grants of their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Identity {
    Anonymous,
    User(UserId),
}

/// Grantee of a forum permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Principal {
    Anonymous,
    User(UserId),
    Group(GroupId),
}

/// The user a permission check is performed for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForumUser {
    pub identity: Identity,
    pub is_superuser: bool,
    /// Group memberships. Always empty for guests.
    pub groups: Vec<GroupId>,
}

impl Default for ForumUser {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl ForumUser {
    pub fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
            is_superuser: false,
            groups: Vec::new(),
        }
    }

    pub fn member(id: UserId, groups: Vec<GroupId>) -> Self {
        Self {
            identity: Identity::User(id),
            is_superuser: false,
            groups,
        }
    }

    pub fn superuser(id: UserId) -> Self {
        Self {
            identity: Identity::User(id),
            is_superuser: true,
            groups: Vec::new(),
        }
    }

    /// Returns the user id. None is a guest.
    pub fn get_id(&self) -> Option<UserId> {
        match self.identity {
            Identity::User(id) => Some(id),
            Identity::Anonymous => None,
        }
    }

    pub fn get_groups(&self) -> &[GroupId] {
        &self.groups
    }

    pub fn is_anonymous(&self) -> bool {
        self.identity == Identity::Anonymous
    }

    /// The principal that direct (non-group) grants are looked up under.
    pub fn principal(&self) -> Principal {
        match self.identity {
            Identity::User(id) => Principal::User(id),
            Identity::Anonymous => Principal::Anonymous,
        }
    }

    /// Loads a user and its group memberships. Returns None for unknown ids.
    pub async fn get_by_id(db: &DatabaseConnection, id: UserId) -> Result<Option<Self>, DbErr> {
        let user = match users::Entity::find_by_id(id).one(db).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        let groups = user_groups::Entity::find()
            .filter(user_groups::Column::UserId.eq(user.id))
            .order_by_asc(user_groups::Column::GroupId)
            .all(db)
            .await?
            .into_iter()
            .map(|ug| ug.group_id)
            .collect();

        Ok(Some(Self {
            identity: Identity::User(user.id),
            is_superuser: user.is_superuser,
            groups,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_maps_to_sentinel_principal() {
        let guest = ForumUser::anonymous();
        assert!(guest.is_anonymous());
        assert_eq!(guest.get_id(), None);
        assert_eq!(guest.principal(), Principal::Anonymous);
        assert!(guest.get_groups().is_empty());
    }

    #[test]
    fn test_member_principal() {
        let user = ForumUser::member(7, vec![1, 2]);
        assert_eq!(user.get_id(), Some(7));
        assert_eq!(user.principal(), Principal::User(7));
        assert_eq!(user.get_groups(), &[1, 2]);
        assert!(!user.is_superuser);
    }

    #[test]
    fn test_default_is_guest() {
        assert_eq!(ForumUser::default(), ForumUser::anonymous());
    }
}
