//! Mock database setup and row builders
#![allow(dead_code)]

use chrono::NaiveDateTime;
use forum_permission::orm::{
    forum_group_permissions, forum_user_permissions, forums, poll_options, poll_votes, polls,
    posts, topics, user_groups, users,
};
use sea_orm::{DatabaseBackend, MockDatabase};

/// Empty Postgres mock. Query results are consumed in the order queries run.
pub fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// Debug dump of every statement the connection executed
pub fn statement_log(db: sea_orm::DatabaseConnection) -> String {
    format!("{:?}", db.into_transaction_log())
}

pub fn forum_row(id: i32, parent_id: Option<i32>, name: &str) -> forums::Model {
    forums::Model {
        id,
        parent_id,
        name: name.to_string(),
        display_order: 0,
    }
}

pub fn user_grant(id: i32, forum_id: i32, user_id: Option<i32>, permission: &str) -> forum_user_permissions::Model {
    forum_user_permissions::Model {
        id,
        forum_id,
        user_id,
        anonymous_user: false,
        permission: permission.to_string(),
    }
}

pub fn anonymous_grant(id: i32, forum_id: i32, permission: &str) -> forum_user_permissions::Model {
    forum_user_permissions::Model {
        id,
        forum_id,
        user_id: None,
        anonymous_user: true,
        permission: permission.to_string(),
    }
}

pub fn group_grant(id: i32, forum_id: i32, group_id: i32, permission: &str) -> forum_group_permissions::Model {
    forum_group_permissions::Model {
        id,
        forum_id,
        group_id,
        permission: permission.to_string(),
    }
}

pub fn topic_row(id: i32, forum_id: i32, created: NaiveDateTime) -> topics::Model {
    topics::Model {
        id,
        forum_id,
        subject: format!("Topic {}", id),
        created,
    }
}

pub fn post_row(id: i32, topic_id: i32, poster_id: Option<i32>, created: NaiveDateTime) -> posts::Model {
    posts::Model {
        id,
        topic_id,
        poster_id,
        approved: true,
        content: "Hello".to_string(),
        created,
    }
}

pub fn poll_row(id: i32, topic_id: i32, duration: Option<i32>, created: NaiveDateTime) -> polls::Model {
    polls::Model {
        id,
        topic_id,
        question: "Which?".to_string(),
        duration,
        user_changes: false,
        created,
    }
}

pub fn option_row(id: i32, poll_id: i32) -> poll_options::Model {
    poll_options::Model {
        id,
        poll_id,
        text: format!("Option {}", id),
    }
}

pub fn vote_row(id: i32, poll_option_id: i32, voter_id: i32) -> poll_votes::Model {
    poll_votes::Model {
        id,
        poll_option_id,
        voter_id,
    }
}

pub fn user_row(id: i32, username: &str, is_superuser: bool) -> users::Model {
    users::Model {
        id,
        username: username.to_string(),
        is_superuser,
    }
}

pub fn membership(user_id: i32, group_id: i32) -> user_groups::Model {
    user_groups::Model { user_id, group_id }
}
