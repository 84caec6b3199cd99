//! Prints the forums a user can see, with what the user may do in each.
//!
//! Usage: `forum-perms [<user id> | anonymous]`

use anyhow::Context;
use env_logger::Env;
use forum_permission::app_config;
use forum_permission::constants::ANONYMOUS_USERNAME;
use forum_permission::db::{get_db_pool, init_db};
use forum_permission::forum::ForumId;
use forum_permission::permission::{self, get_forum_last_post, PermissionHandler};
use forum_permission::user::ForumUser;
use serde::Serialize;

#[derive(Serialize)]
struct ForumReport {
    id: ForumId,
    name: String,
    depth: usize,
    permissions: Vec<&'static str>,
    last_post_id: Option<i32>,
}

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();
    app_config::init().context("Invalid configuration.")?;

    let subject = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ANONYMOUS_USERNAME.to_owned());

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set.")?;
    init_db(database_url).await?;
    let db = get_db_pool().context("Database pool unavailable.")?;

    let defaults = app_config::permissions().default_permissions();
    permission::init_permission_data(permission::new(db, defaults).await?)?;
    let data = permission::get_permission_data()?;

    let user = if subject == ANONYMOUS_USERNAME {
        ForumUser::anonymous()
    } else {
        let id: i32 = subject.parse().with_context(|| {
            format!(
                "Expected a user id or '{}', got '{}'.",
                ANONYMOUS_USERNAME, subject
            )
        })?;
        ForumUser::get_by_id(db, id)
            .await?
            .with_context(|| format!("User {} not found.", id))?
    };

    let handler = PermissionHandler::new(&data);
    let all: Vec<ForumId> = data.tree().ids().collect();
    let visible = handler.forum_list_filter(&all, &user);

    let mut report = Vec::with_capacity(visible.len());
    for forum in visible.iter().copied() {
        let node = match data.tree().get(forum) {
            Some(node) => node,
            None => continue,
        };
        let last_post_id = get_forum_last_post(db, &data, forum, &user)
            .await?
            .map(|post| post.id);

        report.push(ForumReport {
            id: forum,
            name: node.name.clone(),
            depth: data.tree().depth(forum).unwrap_or_default(),
            permissions: data
                .permissions_in_forum(&user, forum)
                .permissions()
                .map(|p| p.codename())
                .collect(),
            last_post_id,
        });
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    log::info!(
        "{} of {} forums visible to {}",
        visible.len(),
        all.len(),
        subject
    );

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    let dotenv_result = dotenv::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();
    if let Err(e) = dotenv_result {
        log::debug!("No .env file loaded: {}", e);
    }
}
