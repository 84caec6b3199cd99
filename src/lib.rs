//! Forum access control.
//!
//! Decides whether a user may see, read, post in, moderate, vote in or attach
//! files to a forum, combining per-forum user and group grants with the forum
//! hierarchy and configured default permissions.

pub mod app_config;
pub mod constants;
pub mod conversation;
pub mod db;
pub mod forum;
pub mod markup;
pub mod orm;
pub mod permission;
pub mod user;

pub use forum::{ForumId, ForumTree};
pub use permission::{ForumPermission, ForumPermissions, PermissionData, PermissionHandler};
pub use user::{ForumUser, Identity, Principal};
