//! Topics, posts and polls as seen by permission checks
//!
//! These carry only what access decisions need: the owning forum, the author,
//! the approval state and poll timing.

use crate::forum::ForumId;
use crate::orm::{poll_options, poll_votes, polls, posts, topics};
use crate::user::{ForumUser, UserId};
use chrono::{Duration, NaiveDateTime};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topic {
    pub id: i32,
    pub forum_id: ForumId,
}

impl Topic {
    pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        Ok(topics::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|topic| Topic {
                id: topic.id,
                forum_id: topic.forum_id,
            }))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: i32,
    pub topic_id: i32,
    /// Forum of the post's topic.
    pub forum_id: ForumId,
    /// None for guest posts.
    pub poster: Option<UserId>,
    pub approved: bool,
    pub created: NaiveDateTime,
}

impl Post {
    pub fn from_models(post: posts::Model, topic: &topics::Model) -> Self {
        Self {
            id: post.id,
            topic_id: post.topic_id,
            forum_id: topic.forum_id,
            poster: post.poster_id,
            approved: post.approved,
            created: post.created,
        }
    }

    /// True when the user is the registered author of this post.
    pub fn is_posted_by(&self, user: &ForumUser) -> bool {
        matches!((self.poster, user.get_id()), (Some(poster), Some(id)) if poster == id)
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        let row = posts::Entity::find_by_id(id)
            .find_also_related(topics::Entity)
            .one(db)
            .await?;
        Ok(match row {
            Some((post, Some(topic))) => Some(Post::from_models(post, &topic)),
            Some((post, None)) => {
                log::warn!("Post {} references missing topic {}", post.id, post.topic_id);
                None
            }
            None => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollOption {
    pub id: i32,
    /// Users who picked this option.
    pub voters: Vec<UserId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poll {
    pub id: i32,
    pub topic_id: i32,
    pub forum_id: ForumId,
    /// Days the poll stays open after creation. None or zero never closes.
    pub duration: Option<u32>,
    pub created: NaiveDateTime,
    /// Whether voters may change their vote.
    pub user_changes: bool,
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Moment the poll closes, if it ever does.
    pub fn closes_at(&self) -> Option<NaiveDateTime> {
        self.duration
            .filter(|days| *days > 0)
            .map(|days| self.created + Duration::days(i64::from(days)))
    }

    /// A poll is expired once its closing moment lies strictly before `now`.
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        match self.closes_at() {
            Some(end) => end < now,
            None => false,
        }
    }

    /// Whether the user already cast at least one vote. Guests never have.
    pub fn has_voted(&self, user: &ForumUser) -> bool {
        match user.get_id() {
            Some(id) => self.options.iter().any(|o| o.voters.contains(&id)),
            None => false,
        }
    }

    /// Loads a poll with its options and votes.
    pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        let (poll, topic) = match polls::Entity::find_by_id(id)
            .find_also_related(topics::Entity)
            .one(db)
            .await?
        {
            Some((poll, Some(topic))) => (poll, topic),
            Some((poll, None)) => {
                log::warn!("Poll {} references missing topic {}", poll.id, poll.topic_id);
                return Ok(None);
            }
            None => return Ok(None),
        };

        let options = poll_options::Entity::find()
            .filter(poll_options::Column::PollId.eq(poll.id))
            .order_by_asc(poll_options::Column::Id)
            .find_with_related(poll_votes::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|(option, votes)| PollOption {
                id: option.id,
                voters: votes.into_iter().map(|v| v.voter_id).collect(),
            })
            .collect();

        Ok(Some(Self {
            id: poll.id,
            topic_id: poll.topic_id,
            forum_id: topic.forum_id,
            duration: poll_duration(&poll),
            created: poll.created,
            user_changes: poll.user_changes,
            options,
        }))
    }
}

fn poll_duration(poll: &polls::Model) -> Option<u32> {
    let days = poll.duration?;
    match u32::try_from(days) {
        Ok(days) => Some(days),
        Err(_) => {
            log::warn!(
                "Poll {} has negative duration {}; treating it as open-ended",
                poll.id,
                days
            );
            None
        }
    }
}

/// Newest approved post among the given posts whose forum passes `include`.
pub fn latest_approved_post<'p, I, F>(posts: I, include: F) -> Option<&'p Post>
where
    I: IntoIterator<Item = &'p Post>,
    F: Fn(ForumId) -> bool,
{
    posts
        .into_iter()
        .filter(|p| p.approved && include(p.forum_id))
        .max_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)))
}

/// Newest approved post in any of the given forums.
pub async fn find_latest_approved_post(
    db: &DatabaseConnection,
    forum_ids: &[ForumId],
) -> Result<Option<Post>, DbErr> {
    if forum_ids.is_empty() {
        return Ok(None);
    }

    let row = posts::Entity::find()
        .find_also_related(topics::Entity)
        .filter(posts::Column::Approved.eq(true))
        .filter(topics::Column::ForumId.is_in(forum_ids.to_vec()))
        .order_by_desc(posts::Column::Created)
        .order_by_desc(posts::Column::Id)
        .one(db)
        .await?;

    Ok(match row {
        Some((post, Some(topic))) => Some(Post::from_models(post, &topic)),
        _ => None,
    })
}
