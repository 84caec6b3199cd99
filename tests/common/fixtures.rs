//! Test fixtures for building permission snapshots
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use forum_permission::conversation::{Poll, PollOption, Post};
use forum_permission::forum::{ForumId, ForumTree};
use forum_permission::permission::{
    ForumPermission, ForumPermissions, GrantTable, PermissionData,
};
use forum_permission::user::Principal;

pub const ADMIN: i32 = 1;
pub const ALICE: i32 = 2;
pub const BOB: i32 = 3;
pub const MODERATORS: i32 = 50;
pub const MEMBERS: i32 = 51;

/// Builds a `PermissionData` snapshot forum by forum, grant by grant.
#[derive(Default)]
pub struct BoardBuilder {
    rows: Vec<(ForumId, Option<ForumId>, String)>,
    grants: GrantTable,
    defaults: ForumPermissions,
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forum(mut self, id: ForumId, parent: Option<ForumId>, name: &str) -> Self {
        self.rows.push((id, parent, name.to_string()));
        self
    }

    pub fn grant(mut self, principal: Principal, forum: ForumId, perms: &[ForumPermission]) -> Self {
        for perm in perms {
            self.grants.grant(principal, forum, *perm);
        }
        self
    }

    pub fn defaults(mut self, perms: &[ForumPermission]) -> Self {
        self.defaults = perms.iter().copied().collect();
        self
    }

    pub fn build(self) -> PermissionData {
        let tree = ForumTree::build(self.rows).expect("fixture forums form a tree");
        PermissionData::from_parts(tree, self.grants, self.defaults)
    }
}

/// A small board:
///
/// 1 Community
/// ├── 2 News
/// └── 3 Discussion
///     └── 4 Help
/// 5 Moderation
/// └── 6 Reports
pub fn standard_board() -> BoardBuilder {
    BoardBuilder::new()
        .forum(1, None, "Community")
        .forum(2, Some(1), "News")
        .forum(3, Some(1), "Discussion")
        .forum(4, Some(3), "Help")
        .forum(5, None, "Moderation")
        .forum(6, Some(5), "Reports")
}

pub const READ: &[ForumPermission] = &[ForumPermission::CanSeeForum, ForumPermission::CanReadForum];

pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 20)
        .expect("valid date")
        .and_hms_opt(18, 0, 0)
        .expect("valid time")
}

pub fn post(id: i32, forum_id: ForumId, poster: Option<i32>, minutes_ago: i64) -> Post {
    Post {
        id,
        topic_id: id * 10,
        forum_id,
        poster,
        approved: true,
        created: now() - Duration::minutes(minutes_ago),
    }
}

pub fn poll(forum_id: ForumId, duration: Option<u32>, days_ago: i64, user_changes: bool) -> Poll {
    Poll {
        id: 1,
        topic_id: 1,
        forum_id,
        duration,
        created: now() - Duration::days(days_ago),
        user_changes,
        options: vec![
            PollOption {
                id: 1,
                voters: vec![],
            },
            PollOption {
                id: 2,
                voters: vec![],
            },
        ],
    }
}
