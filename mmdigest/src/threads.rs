use std::collections::BTreeMap;

use crate::models::Post;

/// Thread key to the thread's posts, in the order they were seen.
pub type Threads<'a> = BTreeMap<String, Vec<&'a Post>>;

pub fn group_by_thread<F>(posts: &[Post], thread_key: F) -> Threads<'_>
where
    F: Fn(&Post) -> String,
{
    let mut threads = Threads::new();
    for post in posts {
        threads.entry(thread_key(post)).or_default().push(post);
    }
    threads
}
