use crate::api::mattermost::{MattermostApi, MattermostClient};
use crate::builds::build_notice;
use crate::cli::{Args, BuildsArgs, Command, CommitsArgs, RequestsArgs, SortOrder};
use crate::commits::{commit_to_post, read_commits};
use crate::input::{load_json, load_posts};
use crate::models::ci::{BuildResult, TestReport};
use crate::ranking::{OwnerCounts, sort_by_load, sort_by_staleness};
use crate::report::{GraphicPicker, RandomPicker, ReportOptions, build_report};
use crate::requests::build_requests;
use crate::settings;

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::collections::HashSet;

pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

pub async fn run(args: Args) -> Result<()> {
    let args = settings::merge_settings_with_args(&args)?;

    let pages = match &args.command {
        Command::Requests(requests) => requests_digest(requests)?,
        Command::Builds(builds) => build_pages(builds)?,
        Command::Commits(commits) => commit_pages(commits)?,
    };

    if pages.is_empty() {
        info!("nothing to post");
        return Ok(());
    }

    match (&args.mm_url, &args.mm_token, &args.channel_id) {
        (Some(mm_url), Some(mm_token), Some(channel_id)) if !args.dry_run => {
            let client = MattermostClient::new(mm_url.clone(), mm_token.clone())?;
            publish(&client, channel_id, &pages).await
        }
        _ => {
            if !args.dry_run {
                warn!("no Mattermost channel configured, printing the pages");
            }
            println!("{}", pages.join("\n\n"));
            Ok(())
        }
    }
}

/// Pages of the request digest for one snapshot.
pub fn requests_digest(args: &RequestsArgs) -> Result<Vec<String>> {
    let now = args.now.unwrap_or_else(Utc::now);
    let posts = load_posts(&args.snapshot)?;

    let team: HashSet<String> = args
        .team
        .iter()
        .map(|member| member.trim().to_string())
        .filter(|member| !member.is_empty())
        .collect();
    if team.is_empty() {
        warn!("no team members configured, no request can be answered");
    }

    let mut requests = build_requests(&posts, &team);
    info!(
        "{} requests reconstructed from {} posts",
        requests.len(),
        posts.len()
    );

    let owners = OwnerCounts::from_requests(&requests);
    match args.sort {
        SortOrder::Staleness => sort_by_staleness(&mut requests, now),
        SortOrder::Load => sort_by_load(&mut requests, &owners),
    }
    if args.reverse {
        requests.reverse();
    }

    let options = ReportOptions {
        now,
        max_age_days: args.max_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS),
        owner_counts: args.owners.then_some(&owners),
    };
    let mut picker = RandomPicker;
    let graphic: Option<&mut dyn GraphicPicker> = if args.gif {
        Some(&mut picker as &mut dyn GraphicPicker)
    } else {
        None
    };

    Ok(build_report(&requests, &options, graphic))
}

fn build_pages(args: &BuildsArgs) -> Result<Vec<String>> {
    let build: BuildResult = load_json(&args.build)?;
    let tests = args
        .tests
        .as_deref()
        .map(load_json::<TestReport>)
        .transpose()?;
    let tests_url = args.tests_url.as_deref().unwrap_or_default();

    let notice = build_notice(&build, tests.as_ref().map(|report| (report, tests_url)))?;
    Ok(notice.map(|post| post.to_markdown()).into_iter().collect())
}

fn commit_pages(args: &CommitsArgs) -> Result<Vec<String>> {
    let web_commit_url = args
        .web_commit_url
        .as_deref()
        .context("--web-commit-url is required (or web_commit_url in the config file)")?;

    let now = args.now.unwrap_or_else(Utc::now);
    let mut commits = read_commits(&args.repo, args.since_days, now)?;
    // oldest first, the channel reads top to bottom
    commits.reverse();

    commits
        .iter()
        .map(|commit| commit_to_post(commit, web_commit_url).map(|post| post.to_markdown()))
        .collect()
}

/// Posts every page, in order, as its own message.
pub async fn publish(
    client: &impl MattermostApi,
    channel_id: &str,
    pages: &[String],
) -> Result<()> {
    let progress = ProgressBar::new(pages.len() as u64);

    for page in pages {
        let post = client.create_post(channel_id, page).await?;
        debug!("posted page as {}", post.id);
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!("posted {} page(s) to channel {}", pages.len(), channel_id);
    Ok(())
}
