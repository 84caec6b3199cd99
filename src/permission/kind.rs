//! Forum permission kinds
//!
//! Every grant stored against a forum names one of these codenames. Sets of
//! kinds are held as bit flags so subset and intersection checks are cheap.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForumPermission {
    CanSeeForum,
    CanReadForum,
    CanStartNewTopics,
    CanPostStickies,
    CanPostAnnouncements,
    CanPostWithoutApproval,
    CanReplyToTopics,
    CanEditOwnPosts,
    CanEditPosts,
    CanDeleteOwnPosts,
    CanDeletePosts,
    CanCreatePoll,
    CanVoteInPolls,
    CanAttachFile,
    CanDownloadFile,
}

bitflags! {
    #[derive(Default)]
    pub struct ForumPermissions: u32 {
        const CAN_SEE_FORUM = 1 << 0;
        const CAN_READ_FORUM = 1 << 1;
        const CAN_START_NEW_TOPICS = 1 << 2;
        const CAN_POST_STICKIES = 1 << 3;
        const CAN_POST_ANNOUNCEMENTS = 1 << 4;
        const CAN_POST_WITHOUT_APPROVAL = 1 << 5;
        const CAN_REPLY_TO_TOPICS = 1 << 6;
        const CAN_EDIT_OWN_POSTS = 1 << 7;
        const CAN_EDIT_POSTS = 1 << 8;
        const CAN_DELETE_OWN_POSTS = 1 << 9;
        const CAN_DELETE_POSTS = 1 << 10;
        const CAN_CREATE_POLL = 1 << 11;
        const CAN_VOTE_IN_POLLS = 1 << 12;
        const CAN_ATTACH_FILE = 1 << 13;
        const CAN_DOWNLOAD_FILE = 1 << 14;

        /// Holding either of these makes a forum visible.
        const VISIBILITY = Self::CAN_SEE_FORUM.bits | Self::CAN_READ_FORUM.bits;
    }
}

/// A codename that does not name any forum permission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownPermission(pub String);

impl std::fmt::Display for UnknownPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown forum permission '{}'", self.0)
    }
}

impl std::error::Error for UnknownPermission {}

impl ForumPermission {
    pub const ALL: [ForumPermission; 15] = [
        ForumPermission::CanSeeForum,
        ForumPermission::CanReadForum,
        ForumPermission::CanStartNewTopics,
        ForumPermission::CanPostStickies,
        ForumPermission::CanPostAnnouncements,
        ForumPermission::CanPostWithoutApproval,
        ForumPermission::CanReplyToTopics,
        ForumPermission::CanEditOwnPosts,
        ForumPermission::CanEditPosts,
        ForumPermission::CanDeleteOwnPosts,
        ForumPermission::CanDeletePosts,
        ForumPermission::CanCreatePoll,
        ForumPermission::CanVoteInPolls,
        ForumPermission::CanAttachFile,
        ForumPermission::CanDownloadFile,
    ];

    /// Name the permission is stored under.
    pub fn codename(self) -> &'static str {
        match self {
            ForumPermission::CanSeeForum => "can_see_forum",
            ForumPermission::CanReadForum => "can_read_forum",
            ForumPermission::CanStartNewTopics => "can_start_new_topics",
            ForumPermission::CanPostStickies => "can_post_stickies",
            ForumPermission::CanPostAnnouncements => "can_post_announcements",
            ForumPermission::CanPostWithoutApproval => "can_post_without_approval",
            ForumPermission::CanReplyToTopics => "can_reply_to_topics",
            ForumPermission::CanEditOwnPosts => "can_edit_own_posts",
            ForumPermission::CanEditPosts => "can_edit_posts",
            ForumPermission::CanDeleteOwnPosts => "can_delete_own_posts",
            ForumPermission::CanDeletePosts => "can_delete_posts",
            ForumPermission::CanCreatePoll => "can_create_poll",
            ForumPermission::CanVoteInPolls => "can_vote_in_polls",
            ForumPermission::CanAttachFile => "can_attach_file",
            ForumPermission::CanDownloadFile => "can_download_file",
        }
    }

    pub fn flag(self) -> ForumPermissions {
        match self {
            ForumPermission::CanSeeForum => ForumPermissions::CAN_SEE_FORUM,
            ForumPermission::CanReadForum => ForumPermissions::CAN_READ_FORUM,
            ForumPermission::CanStartNewTopics => ForumPermissions::CAN_START_NEW_TOPICS,
            ForumPermission::CanPostStickies => ForumPermissions::CAN_POST_STICKIES,
            ForumPermission::CanPostAnnouncements => ForumPermissions::CAN_POST_ANNOUNCEMENTS,
            ForumPermission::CanPostWithoutApproval => ForumPermissions::CAN_POST_WITHOUT_APPROVAL,
            ForumPermission::CanReplyToTopics => ForumPermissions::CAN_REPLY_TO_TOPICS,
            ForumPermission::CanEditOwnPosts => ForumPermissions::CAN_EDIT_OWN_POSTS,
            ForumPermission::CanEditPosts => ForumPermissions::CAN_EDIT_POSTS,
            ForumPermission::CanDeleteOwnPosts => ForumPermissions::CAN_DELETE_OWN_POSTS,
            ForumPermission::CanDeletePosts => ForumPermissions::CAN_DELETE_POSTS,
            ForumPermission::CanCreatePoll => ForumPermissions::CAN_CREATE_POLL,
            ForumPermission::CanVoteInPolls => ForumPermissions::CAN_VOTE_IN_POLLS,
            ForumPermission::CanAttachFile => ForumPermissions::CAN_ATTACH_FILE,
            ForumPermission::CanDownloadFile => ForumPermissions::CAN_DOWNLOAD_FILE,
        }
    }
}

impl std::fmt::Display for ForumPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.codename())
    }
}

impl FromStr for ForumPermission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForumPermission::ALL
            .into_iter()
            .find(|p| p.codename() == s)
            .ok_or_else(|| UnknownPermission(s.to_owned()))
    }
}

impl ForumPermissions {
    /// Individual permissions contained in this set, in declaration order.
    pub fn permissions(self) -> impl Iterator<Item = ForumPermission> {
        ForumPermission::ALL
            .into_iter()
            .filter(move |p| self.contains(p.flag()))
    }
}

impl From<ForumPermission> for ForumPermissions {
    fn from(p: ForumPermission) -> Self {
        p.flag()
    }
}

impl FromIterator<ForumPermission> for ForumPermissions {
    fn from_iter<I: IntoIterator<Item = ForumPermission>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ForumPermissions::empty(), |acc, p| acc | p.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codenames_parse_back() {
        for p in ForumPermission::ALL {
            assert_eq!(p.codename().parse::<ForumPermission>(), Ok(p));
        }
    }

    #[test]
    fn test_unknown_codename() {
        let err = "can_fly".parse::<ForumPermission>().unwrap_err();
        assert_eq!(err, UnknownPermission("can_fly".to_string()));
    }

    #[test]
    fn test_flags_are_distinct() {
        let all: ForumPermissions = ForumPermission::ALL.into_iter().collect();
        assert_eq!(all.bits().count_ones(), 15);
        assert_eq!(all, ForumPermissions::all());
    }

    #[test]
    fn test_visibility_set() {
        let set: Vec<_> = ForumPermissions::VISIBILITY.permissions().collect();
        assert_eq!(
            set,
            vec![ForumPermission::CanSeeForum, ForumPermission::CanReadForum]
        );
    }

    #[test]
    fn test_serde_uses_codenames() {
        let json = serde_json::to_string(&ForumPermission::CanVoteInPolls).unwrap();
        assert_eq!(json, "\"can_vote_in_polls\"");
        let parsed: ForumPermission = serde_json::from_str("\"can_edit_own_posts\"").unwrap();
        assert_eq!(parsed, ForumPermission::CanEditOwnPosts);
    }
}
