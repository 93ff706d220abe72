use std::cmp::Reverse;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use regex::Regex;

use crate::models::Post;

pub const BUGZILLA_URL: &str = "https://bugs.eclipse.org/bugs/show_bug.cgi?id=";

const FIELD_SEPARATOR: char = '\x1f';
const RECORD_SEPARATOR: char = '\x1e';
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%aI%x1f%B%x1e";
const DROPPED_TRAILERS: [&str; 3] = ["Change-Id:", "Bug: ", "Signed-off-by:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    pub author: String,
    pub authored_at: DateTime<Utc>,
    pub message: String,
    /// Local branches containing the commit.
    pub branches: Vec<String>,
}

/// Commits of every ref authored strictly after `now - since_days`, newest first.
/// The window is on the author date, so the whole history is walked rather
/// than cut with `git log --since`, which goes by committer date.
pub fn read_commits(repo: &Path, since_days: u32, now: DateTime<Utc>) -> Result<Vec<Commit>> {
    let output = git(repo, &["log", "--all", LOG_FORMAT])?;
    let cutoff = now - Duration::days(i64::from(since_days));

    let mut commits: Vec<Commit> = parse_git_log(&output)?
        .into_iter()
        .filter(|commit| commit.authored_at > cutoff)
        .collect();
    commits.sort_by_key(|commit| Reverse(commit.authored_at));
    debug!(
        "{} commits authored since {} in {}",
        commits.len(),
        cutoff,
        repo.display()
    );

    for commit in &mut commits {
        let branches = git(
            repo,
            &[
                "branch",
                "--format=%(refname:short)",
                "--contains",
                commit.id.as_str(),
            ],
        )?;
        commit.branches = branches
            .lines()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(commits)
}

fn git(repo: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .with_context(|| format!("Failed to run git in {}", repo.display()))?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.first().unwrap_or(&""),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Parses `git log` output produced with the record/field separators of [`read_commits`].
pub fn parse_git_log(output: &str) -> Result<Vec<Commit>> {
    output
        .split(RECORD_SEPARATOR)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .map(|record| -> Result<Commit> {
            let mut fields = record.splitn(4, FIELD_SEPARATOR);
            let (Some(id), Some(author), Some(date), Some(message)) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                bail!("Malformed git log record: {record:?}");
            };
            let authored_at = DateTime::parse_from_rfc3339(date)
                .with_context(|| format!("Invalid author date on commit {id}"))?
                .with_timezone(&Utc);
            Ok(Commit {
                id: id.to_string(),
                author: author.to_string(),
                authored_at,
                message: message.to_string(),
                branches: Vec::new(),
            })
        })
        .collect()
}

pub fn commit_to_post(commit: &Commit, web_commit_url: &str) -> Result<Post> {
    let url = format!("{}{}", web_commit_url, commit.id);

    let mut title = commit
        .message
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string();
    if !commit.branches.is_empty() {
        title = format!("[{}] {}", commit.branches.join(","), title);
    }
    let title = link_bug_reference(&title)?;

    Ok(Post::new(
        url,
        commit.author.clone(),
        commit.authored_at,
        commit_body(&commit.message),
    )
    .with_subject(title))
}

/// Message lines after the first, without blank lines or review trailers.
pub fn commit_body(message: &str) -> String {
    message
        .split('\n')
        .filter(|line| !line.is_empty())
        .skip(1)
        .filter(|line| !DROPPED_TRAILERS.iter().any(|trailer| line.contains(trailer)))
        .map(|line| format!("{line}\n"))
        .collect()
}

/// Links the first `[1234]` of a title to the bug tracker.
pub fn link_bug_reference(title: &str) -> Result<String> {
    let re = Regex::new(r"\[([0-9]+)\]")?;
    Ok(re
        .replace(title, format!("[[${{1}}]({BUGZILLA_URL}${{1}})]"))
        .to_string())
}
