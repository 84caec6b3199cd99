pub mod forum_group_permissions;
pub mod forum_user_permissions;
pub mod forums;
pub mod poll_options;
pub mod poll_votes;
pub mod polls;
pub mod posts;
pub mod topics;
pub mod user_groups;
pub mod users;
