use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::requests::RequestWithAnswer;

/// Last author to the requests they currently own, in input order.
pub fn group_by_last_author(
    requests: &[RequestWithAnswer],
) -> HashMap<&str, Vec<&RequestWithAnswer>> {
    let mut by_author: HashMap<&str, Vec<&RequestWithAnswer>> = HashMap::new();
    for request in requests {
        by_author
            .entry(request.last_author_name())
            .or_default()
            .push(request);
    }
    by_author
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerCount {
    /// Requests whose last author is this person.
    pub threads: usize,
    /// Among those, the ones with a team answer.
    pub answered: usize,
}

/// Per-author counts over the whole working set, built once per report.
#[derive(Debug, Clone, Default)]
pub struct OwnerCounts {
    counts: HashMap<String, OwnerCount>,
}

impl OwnerCounts {
    pub fn from_requests(requests: &[RequestWithAnswer]) -> Self {
        let counts = group_by_last_author(requests)
            .into_iter()
            .map(|(author, owned)| {
                let count = OwnerCount {
                    threads: owned.len(),
                    answered: owned.iter().filter(|r| r.is_answered()).count(),
                };
                (author.to_string(), count)
            })
            .collect();
        Self { counts }
    }

    pub fn get(&self, author: &str) -> OwnerCount {
        self.counts.get(author).copied().unwrap_or_default()
    }
}

/// Ascending by days since the last relevant event; stable.
pub fn sort_by_staleness(requests: &mut [RequestWithAnswer], now: DateTime<Utc>) {
    requests.sort_by_key(|request| request.staleness(now).days);
}

/// Ascending by how many requests the last author already owns; stable.
pub fn sort_by_load(requests: &mut [RequestWithAnswer], owners: &OwnerCounts) {
    requests.sort_by_key(|request| owners.get(request.last_author_name()).threads);
}
