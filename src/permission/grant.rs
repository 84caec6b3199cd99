//! Per-forum grants held by users, groups and the anonymous identity.

use super::kind::{ForumPermission, ForumPermissions};
use crate::forum::ForumId;
use crate::user::{ForumUser, Principal};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Default)]
pub struct GrantTable {
    /// Principal -> forum -> granted permissions
    grants: HashMap<Principal, HashMap<ForumId, ForumPermissions>>,
}

impl GrantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds permissions to whatever the principal already holds on the forum.
    pub fn grant<P>(&mut self, principal: Principal, forum: ForumId, perms: P)
    where
        P: Into<ForumPermissions>,
    {
        *self
            .grants
            .entry(principal)
            .or_default()
            .entry(forum)
            .or_default() |= perms.into();
    }

    /// Removes permissions from the principal on the forum.
    pub fn revoke<P>(&mut self, principal: Principal, forum: ForumId, perms: P)
    where
        P: Into<ForumPermissions>,
    {
        if let Some(forums) = self.grants.get_mut(&principal) {
            if let Some(held) = forums.get_mut(&forum) {
                held.remove(perms.into());
                if held.is_empty() {
                    forums.remove(&forum);
                }
            }
            if forums.is_empty() {
                self.grants.remove(&principal);
            }
        }
    }

    /// What the principal itself holds on the forum, ignoring groups.
    pub fn get(&self, principal: Principal, forum: ForumId) -> ForumPermissions {
        self.grants
            .get(&principal)
            .and_then(|forums| forums.get(&forum))
            .copied()
            .unwrap_or_default()
    }

    /// Union of the user's own grants and every group grant on the forum.
    pub fn for_user(&self, user: &ForumUser, forum: ForumId) -> ForumPermissions {
        user.get_groups()
            .iter()
            .fold(self.get(user.principal(), forum), |acc, group| {
                acc | self.get(Principal::Group(*group), forum)
            })
    }

    pub fn holds(&self, user: &ForumUser, forum: ForumId, perm: ForumPermission) -> bool {
        self.for_user(user, forum).contains(perm.flag())
    }

    /// Forums where the user or one of its groups holds at least one of `perms`.
    pub fn forums_with_any(&self, user: &ForumUser, perms: ForumPermissions) -> HashSet<ForumId> {
        let principals = std::iter::once(user.principal())
            .chain(user.get_groups().iter().map(|g| Principal::Group(*g)));

        let mut out = HashSet::new();
        for principal in principals {
            if let Some(forums) = self.grants.get(&principal) {
                out.extend(
                    forums
                        .iter()
                        .filter(|(_, held)| held.intersects(perms))
                        .map(|(forum, _)| *forum),
                );
            }
        }
        out
    }

    /// Number of (principal, forum) pairs holding at least one permission.
    pub fn len(&self) -> usize {
        self.grants.values().map(|forums| forums.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grants_accumulate() {
        let mut table = GrantTable::new();
        table.grant(Principal::User(1), 10, ForumPermission::CanSeeForum);
        table.grant(Principal::User(1), 10, ForumPermission::CanReadForum);
        assert_eq!(table.get(Principal::User(1), 10), ForumPermissions::VISIBILITY);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_group_grants_join_user_grants() {
        let mut table = GrantTable::new();
        table.grant(Principal::User(1), 10, ForumPermission::CanReadForum);
        table.grant(Principal::Group(5), 10, ForumPermission::CanReplyToTopics);
        let member = ForumUser::member(1, vec![5]);
        let outsider = ForumUser::member(1, vec![]);

        assert!(table.holds(&member, 10, ForumPermission::CanReplyToTopics));
        assert!(!table.holds(&outsider, 10, ForumPermission::CanReplyToTopics));
        assert!(table.holds(&outsider, 10, ForumPermission::CanReadForum));
    }

    #[test]
    fn test_anonymous_grants_only_reach_guests() {
        let mut table = GrantTable::new();
        table.grant(Principal::Anonymous, 3, ForumPermission::CanSeeForum);

        assert!(table.holds(&ForumUser::anonymous(), 3, ForumPermission::CanSeeForum));
        assert!(!table.holds(&ForumUser::member(2, vec![]), 3, ForumPermission::CanSeeForum));
    }

    #[test]
    fn test_forums_with_any() {
        let mut table = GrantTable::new();
        table.grant(Principal::User(1), 1, ForumPermission::CanSeeForum);
        table.grant(Principal::User(1), 2, ForumPermission::CanAttachFile);
        table.grant(Principal::Group(9), 3, ForumPermission::CanReadForum);
        let user = ForumUser::member(1, vec![9]);

        let found = table.forums_with_any(&user, ForumPermissions::VISIBILITY);
        assert_eq!(found, HashSet::from([1, 3]));
    }

    #[test]
    fn test_revoke_cleans_up() {
        let mut table = GrantTable::new();
        table.grant(Principal::Group(2), 4, ForumPermission::CanEditPosts);
        table.revoke(Principal::Group(2), 4, ForumPermission::CanEditPosts);
        assert!(table.is_empty());
        assert_eq!(table.get(Principal::Group(2), 4), ForumPermissions::empty());
    }
}
