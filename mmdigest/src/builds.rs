use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use log::debug;

use crate::models::Post;
use crate::models::ci::{BuildResult, TestCase, TestReport};

/// Rows shown in a failure table before the remainder is summarized.
pub const MAX_FAILED_TESTS: usize = 20;

/// Failures at most this many builds old are highlighted.
const RECENT_FAILURE_AGE: u32 = 10;
const MAX_LABEL_LEN: usize = 10;

const ICON_SUCCESS: &str = "https://i.imgur.com/OgGlGdI.png";
const ICON_UNSTABLE: &str = "https://i.imgur.com/ODJohQh.png";
const ICON_FAILED: &str = "https://i.imgur.com/LfNQATL.png";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureTable {
    pub markdown: String,
    pub has_recent_regressions: bool,
}

/// Reports worth reading, keyed by URL.
///
/// For a matrix build these are the child configurations that ran anything;
/// otherwise the root report itself when it has tests.
pub fn all_non_empty_reports<'a>(
    root: &'a TestReport,
    root_url: &str,
) -> Vec<(String, &'a TestReport)> {
    if !root.child_reports.is_empty() {
        root.child_reports
            .iter()
            .filter(|child| child.result.skip_count > 0 || child.result.pass_count > 0)
            .map(|child| (child.child.url.clone(), &child.result))
            .collect()
    } else if root.total_count > 0 {
        vec![(root_url.to_string(), root)]
    } else {
        Vec::new()
    }
}

/// One row per recently failing test, one column per failing configuration.
pub fn failure_table(reports: &[(String, &TestReport)]) -> FailureTable {
    // test name -> indices of the reports it fails in, both in first-seen order
    let mut failing: Vec<(String, Vec<usize>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, (_, report)) in reports.iter().enumerate() {
        if report.fail_count == 0 {
            continue;
        }
        let cases = report
            .suites
            .iter()
            .flat_map(|suite| suite.cases.iter())
            .filter(|case| case.is_recent_regression());
        for case in cases {
            let name = case.display_name();
            let position = *positions.entry(name.clone()).or_insert_with(|| {
                failing.push((name, Vec::new()));
                failing.len() - 1
            });
            let configs = &mut failing[position].1;
            if !configs.contains(&index) {
                configs.push(index);
            }
        }
    }

    if failing.is_empty() {
        return FailureTable::default();
    }

    let mut columns: Vec<usize> = Vec::new();
    for index in failing.iter().flat_map(|(_, configs)| configs.iter()) {
        if !columns.contains(index) {
            columns.push(*index);
        }
    }

    let mut out = String::from("| Test");
    for &index in &columns {
        let url = &reports[index].0;
        out.push_str(&format!("|[{}]({})", configuration_label(url), url));
    }
    out.push_str("|\n|----------");
    out.push_str(&"|--------".repeat(columns.len()));
    out.push_str("|\n");

    for (name, configs) in failing.iter().take(MAX_FAILED_TESTS) {
        let cases: Vec<Option<&TestCase>> = columns
            .iter()
            .map(|index| {
                configs
                    .contains(index)
                    .then(|| find_case(reports[*index].1, name))
                    .flatten()
            })
            .collect();
        let recent = cases
            .iter()
            .flatten()
            .any(|case| case.age <= RECENT_FAILURE_AGE);

        if recent {
            out.push_str(&format!("|**{name}**"));
        } else {
            out.push_str(&format!("|{name}"));
        }

        for (index, case) in columns.iter().zip(&cases) {
            match case {
                Some(case) if recent => out.push_str(&format!("|**{}**", case.age)),
                Some(case) => out.push_str(&format!("|{}", case.age)),
                None if configs.contains(index) => out.push_str("|X"),
                None => out.push_str("| "),
            }
        }
        out.push_str("|\n");
    }

    if failing.len() > MAX_FAILED_TESTS {
        out.push_str(&format!(
            ":warning: **{}**  recent failed tests in total, some could not be displayed.",
            failing.len()
        ));
    }

    FailureTable {
        markdown: out,
        has_recent_regressions: true,
    }
}

/// Turns a finished build into a channel notice.
///
/// Only manually triggered builds and builds with recent regressions are worth
/// a notice; `None` otherwise.
pub fn build_notice(
    build: &BuildResult,
    tests: Option<(&TestReport, &str)>,
) -> Result<Option<Post>> {
    if build.building {
        debug!("{} is still building", build.url);
        return Ok(None);
    }

    let total: u32 = build.actions.iter().map(|a| a.total_count).sum();
    let failed: u32 = build.actions.iter().map(|a| a.fail_count).sum();
    let skipped: u32 = build.actions.iter().map(|a| a.skip_count).sum();
    let manual_trigger = build
        .actions
        .iter()
        .flat_map(|action| action.causes.iter())
        .filter_map(|cause| cause.short_description.as_deref())
        .any(|description| description.contains("user") || description.contains("utilisateur"));

    let mut tests_results = String::new();
    let mut has_recent_regressions = false;
    if let Some((report, report_url)) = tests.filter(|_| total > 0) {
        let reports = all_non_empty_reports(report, report_url);
        let mut section = format!("failed : {failed}/{total} (skipped : {skipped})\n\n");
        if failed > 0 {
            let table = failure_table(&reports);
            has_recent_regressions = table.has_recent_regressions;
            section.push_str(&table.markdown);
        }
        if !reports.is_empty() || failed == 0 {
            tests_results = section;
        }
    }

    if !(manual_trigger || has_recent_regressions) {
        debug!("{} needs no notice", build.url);
        return Ok(None);
    }

    let mut body = if has_recent_regressions || failed == 0 {
        format!("{tests_results}\n")
    } else {
        first_lines(build.change_set.items.iter().filter_map(|i| i.comment.as_deref())).join("\n")
    };
    if !build.artifacts.is_empty() {
        body.push_str("\nArtifacts:");
        for artifact in &build.artifacts {
            body.push_str(&format!(
                "\n* [{}]({}artifact/{})",
                artifact.display_path, build.url, artifact.relative_path
            ));
        }
        body.push('\n');
    }

    let culprits = unique(
        build
            .culprits
            .iter()
            .filter_map(|culprit| culprit.full_name.clone()),
    );
    let author = if (1..=2).contains(&culprits.len()) {
        culprits.join(",")
    } else {
        "...".to_string()
    };

    let created_at = Utc
        .timestamp_millis_opt(build.timestamp)
        .single()
        .with_context(|| format!("Invalid timestamp on build {}", build.url))?;
    let subject = format!(
        "[![]({}) {}]({})",
        status_icon(build.result.as_deref()),
        build.full_display_name,
        build.url
    );

    Ok(Some(
        Post::new(build.url.clone(), author, created_at, body).with_subject(subject),
    ))
}

pub fn status_icon(result: Option<&str>) -> &'static str {
    match result {
        Some("SUCCESS" | "STABLE") => ICON_SUCCESS,
        Some("UNSTABLE") => ICON_UNSTABLE,
        _ => ICON_FAILED,
    }
}

/// Short column label for a configuration report URL, e.g. `linux` for
/// `..././PLATFORM=linux,JDK=17/testReport`.
fn configuration_label(report_url: &str) -> String {
    let mut name = report_url
        .find("./")
        .map_or(report_url, |at| &report_url[at + 2..]);
    if let Some(at) = name.find("PLATFORM=") {
        name = &name[at + "PLATFORM=".len()..];
    }
    if let Some(at) = name.find(',') {
        name = &name[..at];
    }
    if name.chars().count() > MAX_LABEL_LEN {
        "report".to_string()
    } else {
        name.to_string()
    }
}

fn find_case<'a>(report: &'a TestReport, test_name: &str) -> Option<&'a TestCase> {
    report
        .suites
        .iter()
        .flat_map(|suite| suite.cases.iter())
        .find(|case| case.display_name() == test_name)
}

fn first_lines<'a>(comments: impl Iterator<Item = &'a str>) -> Vec<String> {
    unique(comments.map(|comment| comment.split('\n').next().unwrap_or_default().to_string()))
}

fn unique(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
