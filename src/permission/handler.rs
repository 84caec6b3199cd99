//! Access decisions for forums, topics, posts, polls and attachments.

use super::kind::{ForumPermission, ForumPermissions};
use super::PermissionData;
use crate::conversation::{find_latest_approved_post, latest_approved_post, Poll, Post, Topic};
use crate::forum::ForumId;
use crate::user::ForumUser;
use chrono::NaiveDateTime;
use sea_orm::{DatabaseConnection, DbErr};
use std::collections::HashSet;

/// Answers permission questions against one permission snapshot.
#[derive(Clone, Copy, Debug)]
pub struct PermissionHandler<'a> {
    data: &'a PermissionData,
}

impl<'a> PermissionHandler<'a> {
    pub fn new(data: &'a PermissionData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &'a PermissionData {
        self.data
    }

    // Filtering

    /// Keeps the forums the user can at least see or read. Order is preserved.
    pub fn forum_list_filter(&self, forums: &[ForumId], user: &ForumUser) -> Vec<ForumId> {
        if user.is_superuser {
            return forums.to_vec();
        }

        let hidden = self.hidden_forum_ids(forums, user);
        forums
            .iter()
            .copied()
            .filter(|forum| !hidden.contains(forum))
            .collect()
    }

    /// Forums hidden from the user among `forums`, plus all of their descendants.
    ///
    /// A forum is hidden when it is not visible itself or when any of its
    /// ancestors is not visible. Unknown forum ids are hidden.
    pub fn hidden_forum_ids(&self, forums: &[ForumId], user: &ForumUser) -> HashSet<ForumId> {
        let tree = self.data.tree();
        let visible = self
            .data
            .forums_for_user(user, ForumPermissions::VISIBILITY);

        let mut hidden = HashSet::new();
        for &forum in forums {
            if hidden.contains(&forum) {
                continue;
            }

            if !tree.contains(forum) {
                log::warn!("Visibility check on unknown forum {}", forum);
                hidden.insert(forum);
                continue;
            }

            let ancestors_visible = tree
                .ancestors(forum)
                .iter()
                .all(|ancestor| visible.contains(ancestor));

            if !ancestors_visible || !visible.contains(&forum) {
                hidden.extend(tree.descendants(forum, true));
            }
        }

        hidden
    }

    /// The forum and its descendants, minus those hidden from the user.
    pub fn readable_subtree(&self, forum: ForumId, user: &ForumUser) -> Vec<ForumId> {
        let forums = self.data.tree().descendants(forum, true);
        if user.is_superuser {
            return forums;
        }

        let hidden = self.hidden_forum_ids(&forums, user);
        forums
            .into_iter()
            .filter(|forum| !hidden.contains(forum))
            .collect()
    }

    /// Newest approved post among `posts` that lives in the readable part of `forum`'s subtree.
    pub fn latest_visible_post<'p, I>(
        &self,
        posts: I,
        forum: ForumId,
        user: &ForumUser,
    ) -> Option<&'p Post>
    where
        I: IntoIterator<Item = &'p Post>,
    {
        let readable: HashSet<ForumId> = self.readable_subtree(forum, user).into_iter().collect();
        latest_approved_post(posts, |f| readable.contains(&f))
    }

    // Forums

    pub fn can_read_forum(&self, forum: ForumId, user: &ForumUser) -> bool {
        self.check(forum, user, ForumPermission::CanReadForum)
    }

    // Posts and topics

    pub fn can_add_topic(&self, forum: ForumId, user: &ForumUser) -> bool {
        self.check(forum, user, ForumPermission::CanStartNewTopics)
    }

    pub fn can_add_stickies(&self, forum: ForumId, user: &ForumUser) -> bool {
        self.check(forum, user, ForumPermission::CanPostStickies)
    }

    pub fn can_add_announcements(&self, forum: ForumId, user: &ForumUser) -> bool {
        self.check(forum, user, ForumPermission::CanPostAnnouncements)
    }

    pub fn can_post_without_approval(&self, forum: ForumId, user: &ForumUser) -> bool {
        self.check(forum, user, ForumPermission::CanPostWithoutApproval)
    }

    pub fn can_add_post(&self, topic: &Topic, user: &ForumUser) -> bool {
        self.check(topic.forum_id, user, ForumPermission::CanReplyToTopics)
    }

    /// Superusers, authors holding `can_edit_own_posts`, and anyone holding `can_edit_posts`.
    pub fn can_edit_post(&self, post: &Post, user: &ForumUser) -> bool {
        self.check_own_or_any(
            post,
            user,
            ForumPermission::CanEditOwnPosts,
            ForumPermission::CanEditPosts,
        )
    }

    /// Superusers, authors holding `can_delete_own_posts`, and anyone holding `can_delete_posts`.
    pub fn can_delete_post(&self, post: &Post, user: &ForumUser) -> bool {
        self.check_own_or_any(
            post,
            user,
            ForumPermission::CanDeleteOwnPosts,
            ForumPermission::CanDeletePosts,
        )
    }

    // Polls

    pub fn can_create_polls(&self, forum: ForumId, user: &ForumUser) -> bool {
        self.check(forum, user, ForumPermission::CanCreatePoll)
    }

    pub fn can_vote_in_poll(&self, poll: &Poll, user: &ForumUser) -> bool {
        self.can_vote_in_poll_at(poll, user, chrono::Utc::now().naive_utc())
    }

    /// Expired polls refuse everyone, superusers included. A user who already
    /// voted may only vote again when the poll allows changing votes.
    pub fn can_vote_in_poll_at(&self, poll: &Poll, user: &ForumUser, now: NaiveDateTime) -> bool {
        if poll.is_expired_at(now) {
            return false;
        }

        let can_vote = self.check(poll.forum_id, user, ForumPermission::CanVoteInPolls);

        if can_vote && poll.has_voted(user) {
            return poll.user_changes;
        }

        can_vote
    }

    // Attachments

    pub fn can_attach_files(&self, forum: ForumId, user: &ForumUser) -> bool {
        self.check(forum, user, ForumPermission::CanAttachFile)
    }

    pub fn can_download_files(&self, forum: ForumId, user: &ForumUser) -> bool {
        self.check(forum, user, ForumPermission::CanDownloadFile)
    }

    // Common

    /// Superusers pass; everyone else needs the permission on the forum.
    pub fn check(&self, forum: ForumId, user: &ForumUser, permission: ForumPermission) -> bool {
        user.is_superuser || self.data.has_perm(user, forum, permission)
    }

    fn check_own_or_any(
        &self,
        post: &Post,
        user: &ForumUser,
        own: ForumPermission,
        any: ForumPermission,
    ) -> bool {
        user.is_superuser
            || (post.is_posted_by(user) && self.data.has_perm(user, post.forum_id, own))
            || self.data.has_perm(user, post.forum_id, any)
    }
}

/// Newest approved post the user can read in `forum` or below it.
pub async fn get_forum_last_post(
    db: &DatabaseConnection,
    data: &PermissionData,
    forum: ForumId,
    user: &ForumUser,
) -> Result<Option<Post>, DbErr> {
    let forum_ids = PermissionHandler::new(data).readable_subtree(forum, user);
    find_latest_approved_post(db, &forum_ids).await
}
