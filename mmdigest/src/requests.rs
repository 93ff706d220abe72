use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, trace};

use crate::models::Post;
use crate::staleness::Staleness;
use crate::threads::group_by_thread;

/// A thread's original post, paired with the first answer from the team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestWithAnswer {
    original: Post,
    answer: Option<Post>,
    monologue: bool,
}

impl RequestWithAnswer {
    pub fn new(original: Post) -> Self {
        Self {
            original,
            answer: None,
            monologue: true,
        }
    }

    pub fn with_answer(mut self, answer: Post) -> Self {
        self.answer = Some(answer);
        self
    }

    pub fn original_post(&self) -> &Post {
        &self.original
    }

    pub fn answer(&self) -> Option<&Post> {
        self.answer.as_ref()
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    /// Whether only the reporter ever posted in the thread.
    ///
    /// Kept for reporting; nothing filters on it yet.
    pub fn is_monologue(&self) -> bool {
        self.monologue
    }

    pub fn summary(&self) -> &str {
        self.original.summary()
    }

    pub fn reporter_name(&self) -> &str {
        &self.original.author
    }

    pub fn last_author_name(&self) -> &str {
        self.answer.as_ref().unwrap_or(&self.original).author.as_str()
    }

    pub fn url(&self) -> &str {
        &self.original.key
    }

    /// Timestamp of the last relevant event: the answer, else the request.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.answer.as_ref().unwrap_or(&self.original).created_at
    }

    pub fn staleness(&self, now: DateTime<Utc>) -> Staleness {
        Staleness::between(self.last_activity(), now)
    }
}

/// Rebuilds requests from a flat feed, threading posts with [`Post::thread_key`].
pub fn build_requests(posts: &[Post], team: &HashSet<String>) -> Vec<RequestWithAnswer> {
    build_requests_by(posts, team, Post::thread_key)
}

/// Same as [`build_requests`] with a caller-defined thread key.
///
/// Threads opened by a team member are not requests and are dropped. The
/// output order is unspecified.
pub fn build_requests_by<F>(
    posts: &[Post],
    team: &HashSet<String>,
    thread_key: F,
) -> Vec<RequestWithAnswer>
where
    F: Fn(&Post) -> String,
{
    let mut requests = Vec::new();

    for (thread, mut thread_posts) in group_by_thread(posts, thread_key) {
        // stable: posts sharing a timestamp keep their feed order
        thread_posts.sort_by_key(|post| post.created_at);

        let Some((first, replies)) = thread_posts.split_first() else {
            continue;
        };

        if team.contains(&first.author) {
            debug!("skipping thread '{}' opened by team member {}", thread, first.author);
            continue;
        }

        let mut request = RequestWithAnswer::new((*first).clone());
        request.monologue = replies.iter().all(|post| post.author == first.author);

        if let Some(answer) = replies.iter().find(|post| team.contains(&post.author)) {
            request = request.with_answer((*answer).clone());
        }

        trace!(
            "thread '{}': {} posts, answered: {}, monologue: {}",
            thread,
            thread_posts.len(),
            request.is_answered(),
            request.is_monologue()
        );
        requests.push(request);
    }

    requests
}
