use chrono::{DateTime, Duration, TimeZone, Utc};
use mmdigest::models::Post;
use mmdigest::ranking::{OwnerCounts, group_by_last_author, sort_by_load, sort_by_staleness};
use mmdigest::report::{
    CONGRATS_GIFS, GraphicPicker, PAGE_SIZE, RandomPicker, ReportOptions, build_report,
    filter_by_age,
};
use mmdigest::requests::RequestWithAnswer;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

/// A request from `reporter`, last active `days_ago` days before [`now`].
fn request(id: usize, reporter: &str, days_ago: i64, answered_by: Option<&str>) -> RequestWithAnswer {
    let last_activity = now() - Duration::days(days_ago);
    let original = Post::new(
        format!("https://forum/t/{id}"),
        reporter.to_string(),
        last_activity - Duration::hours(1),
        format!("question {id}\nmore details"),
    );
    let request = RequestWithAnswer::new(original);
    match answered_by {
        Some(author) => request.with_answer(Post::new(
            format!("https://forum/t/{id}/2"),
            author.to_string(),
            last_activity,
            "answer".to_string(),
        )),
        None => request,
    }
}

fn options(max_age_days: i64) -> ReportOptions<'static> {
    ReportOptions {
        now: now(),
        max_age_days,
        owner_counts: None,
    }
}

fn rows(page: &str) -> Vec<&str> {
    page.lines().filter(|line| line.starts_with("| [")).collect()
}

struct FixedPicker(usize);

impl GraphicPicker for FixedPicker {
    fn pick(&mut self, pool: &[&'static str]) -> Option<&'static str> {
        pool.get(self.0).copied()
    }
}

#[test]
fn test_pages_hold_at_most_twenty_rows() {
    let requests: Vec<_> = (0..45).map(|i| request(i, "bob", 1, None)).collect();

    let pages = build_report(&requests, &options(7), None);

    assert_eq!(pages.len(), 3);
    let sizes: Vec<usize> = pages.iter().map(|page| rows(page).len()).collect();
    assert_eq!(sizes, vec![PAGE_SIZE, PAGE_SIZE, 5]);
}

#[test]
fn test_pages_preserve_the_caller_order() {
    let requests: Vec<_> = (0..45).rev().map(|i| request(i, "bob", 1, None)).collect();

    let pages = build_report(&requests, &options(7), None);

    let rendered: Vec<String> = pages
        .iter()
        .flat_map(|page| rows(page))
        .map(|row| row.to_string())
        .collect();
    for (row, request) in rendered.iter().zip(&requests) {
        assert!(row.contains(&format!("]({})", request.url())), "{row}");
    }
    assert_eq!(rendered.len(), requests.len());
}

#[test]
fn test_page_count_for_exact_multiple() {
    let requests: Vec<_> = (0..40).map(|i| request(i, "bob", 0, None)).collect();

    let pages = build_report(&requests, &options(7), None);

    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|page| rows(page).len() == PAGE_SIZE));
}

#[test]
fn test_age_filter_is_inclusive() {
    let requests = vec![
        request(1, "bob", 5, None),
        request(2, "carol", 6, None),
        request(3, "dave", 0, None),
    ];

    let kept = filter_by_age(&requests, 5, now());

    let urls: Vec<&str> = kept.iter().map(|r| r.url()).collect();
    assert_eq!(urls, vec!["https://forum/t/1", "https://forum/t/3"]);
}

#[test]
fn test_trailing_note_counts_excluded_requests() {
    let mut requests: Vec<_> = (0..7).map(|i| request(i, "bob", 3, None)).collect();
    requests.extend((7..10).map(|i| request(i, "bob", 12, None)));
    let owners = OwnerCounts::from_requests(&requests);

    let simple = build_report(&requests, &options(5), None);
    let detailed = build_report(
        &requests,
        &ReportOptions {
            owner_counts: Some(&owners),
            ..options(5)
        },
        None,
    );

    assert_eq!(simple.len(), 1);
    assert_eq!(rows(&simple[0]).len(), 7);
    assert!(simple[0].ends_with(
        "*There are 3 old requests (at least 5 days old) waiting for an answer though.*"
    ));
    assert!(detailed[0].ends_with(
        "*There are 3 additional threads waiting for an answer for more than 5 days.*"
    ));
}

#[test]
fn test_trailing_note_goes_on_the_last_page() {
    let mut requests: Vec<_> = (0..25).map(|i| request(i, "bob", 1, None)).collect();
    requests.push(request(25, "bob", 30, None));

    let pages = build_report(&requests, &options(7), None);

    assert_eq!(pages.len(), 2);
    assert!(!pages[0].contains("There are"));
    assert!(pages[1].contains("There are 1 old requests"));
}

#[test]
fn test_no_note_when_nothing_is_excluded() {
    let requests = vec![request(1, "bob", 1, None)];

    let pages = build_report(&requests, &options(7), None);

    assert!(!pages[0].contains("There are"));
}

#[test]
fn test_empty_report_congratulates_with_graphic() {
    let mut picker = FixedPicker(2);

    let pages = build_report(&[], &options(7), Some(&mut picker));

    assert_eq!(pages.len(), 1);
    assert!(pages[0].starts_with("Congrats!  **No one** is waiting for an answer !\n"));
    assert!(pages[0].ends_with(&format!("![]({})\n", CONGRATS_GIFS[2])));
}

#[test]
fn test_empty_report_without_graphic() {
    let pages = build_report(&[], &options(7), None);

    assert_eq!(pages, vec!["Congrats!  **No one** is waiting for an answer !\n".to_string()]);
}

#[test]
fn test_detailed_empty_report_mentions_the_age_limit() {
    let owners = OwnerCounts::default();
    let options = ReportOptions {
        owner_counts: Some(&owners),
        ..options(4)
    };

    let pages = build_report(&[], &options, None);

    assert_eq!(
        pages[0],
        "Congrats!  **No one** has been waiting for more than 4 days for an answer !\n"
    );
}

#[test]
fn test_everything_too_old_yields_congrats_and_note() {
    let requests = vec![request(1, "bob", 9, None), request(2, "carol", 10, None)];
    let mut picker = FixedPicker(0);

    let pages = build_report(&requests, &options(7), Some(&mut picker));

    assert_eq!(pages.len(), 1);
    assert!(pages[0].starts_with("Congrats!"));
    assert!(pages[0].contains(CONGRATS_GIFS[0]));
    assert!(pages[0].ends_with("*There are 2 old requests (at least 7 days old) waiting for an answer though.*"));
}

#[test]
fn test_negative_age_limit_excludes_everything() {
    let requests = vec![request(1, "bob", 0, None)];

    let pages = build_report(&requests, &options(-1), None);

    assert_eq!(pages.len(), 1);
    assert!(rows(&pages[0]).is_empty());
    assert!(pages[0].contains("There are 1 old requests"));
}

#[test]
fn test_random_picker_draws_from_the_pool() {
    let mut picker = RandomPicker;
    for _ in 0..20 {
        let url = picker.pick(&CONGRATS_GIFS).unwrap();
        assert!(CONGRATS_GIFS.contains(&url));
    }
    assert_eq!(picker.pick(&[]), None);
}

#[test]
fn test_simple_table_layout() {
    let requests = vec![request(1, "bob", 2, Some("alice"))];

    let pages = build_report(&requests, &options(7), None);

    assert_eq!(
        pages[0],
        "| Summary | reporter | last author | days ago |\n\
         |---|---|---|---|\n\
         | [question 1](https://forum/t/1) | bob | alice | 2 days |\n"
    );
}

#[test]
fn test_detailed_table_counts_all_requests_of_the_last_author() {
    let requests = vec![
        request(1, "bob", 1, Some("alice")),
        request(2, "carol", 2, Some("alice")),
        // alice asked herself and nobody answered; too old to be listed
        request(3, "alice", 20, None),
        request(4, "dave", 3, None),
    ];
    let owners = OwnerCounts::from_requests(&requests);
    let options = ReportOptions {
        owner_counts: Some(&owners),
        ..options(7)
    };

    let pages = build_report(&requests, &options, None);
    let table_rows = rows(&pages[0]);

    assert!(pages[0].starts_with(
        "| Summary | reporter | last author | delay so far | response/thread |\n|---|---|---|---|---|\n"
    ));
    assert_eq!(table_rows.len(), 3);
    assert_eq!(
        table_rows[0],
        "| [question 1](https://forum/t/1) | bob | alice | 1 day 0 hours | 2/3 |"
    );
    assert!(table_rows[1].ends_with("| 2 days 0 hours | 2/3 |"));
    assert_eq!(
        table_rows[2],
        "| [question 4](https://forum/t/4) | dave | dave | 3 days 0 hours | 0/1 |"
    );
}

#[test]
fn test_pipes_in_summary_are_escaped() {
    let original = Post::new(
        "https://forum/t/9".to_string(),
        "bob".to_string(),
        now(),
        "body".to_string(),
    )
    .with_subject("a | b".to_string());
    let requests = vec![RequestWithAnswer::new(original)];

    let pages = build_report(&requests, &options(7), None);

    assert!(pages[0].contains("[a \\| b](https://forum/t/9)"));
}

#[test]
fn test_sort_by_staleness_is_stable() {
    let mut requests = vec![
        request(1, "bob", 4, None),
        request(2, "carol", 1, None),
        request(3, "dave", 4, None),
        request(4, "erin", 0, None),
    ];

    sort_by_staleness(&mut requests, now());

    let urls: Vec<&str> = requests.iter().map(|r| r.url()).collect();
    assert_eq!(
        urls,
        vec![
            "https://forum/t/4",
            "https://forum/t/2",
            "https://forum/t/1",
            "https://forum/t/3"
        ]
    );
}

#[test]
fn test_sort_by_load() {
    let mut requests = vec![
        request(1, "bob", 1, Some("alice")),
        request(2, "carol", 1, None),
        request(3, "dave", 1, Some("alice")),
        request(4, "erin", 1, Some("zoe")),
    ];
    let owners = OwnerCounts::from_requests(&requests);

    sort_by_load(&mut requests, &owners);

    let last_authors: Vec<&str> = requests.iter().map(|r| r.last_author_name()).collect();
    assert_eq!(last_authors, vec!["carol", "zoe", "alice", "alice"]);
}

#[test]
fn test_group_by_last_author_keeps_input_order() {
    let requests = vec![
        request(1, "bob", 1, Some("alice")),
        request(2, "carol", 1, None),
        request(3, "dave", 1, Some("alice")),
    ];

    let by_author = group_by_last_author(&requests);

    let alice: Vec<&str> = by_author["alice"].iter().map(|r| r.url()).collect();
    assert_eq!(alice, vec!["https://forum/t/1", "https://forum/t/3"]);
    assert_eq!(by_author["carol"].len(), 1);

    let owners = OwnerCounts::from_requests(&requests);
    assert_eq!(owners.get("alice").threads, 2);
    assert_eq!(owners.get("alice").answered, 2);
    assert_eq!(owners.get("carol").answered, 0);
    assert_eq!(owners.get("nobody").threads, 0);
}

#[test]
fn test_trailing_note_is_set_apart_from_the_table() {
    let requests = vec![request(1, "bob", 1, None), request(2, "carol", 9, None)];

    let pages = build_report(&requests, &options(7), None);

    assert_eq!(
        pages[0],
        "| Summary | reporter | last author | days ago |\n\
         |---|---|---|---|\n\
         | [question 1](https://forum/t/1) | bob | bob | 1 days |\n\
         \n\
         *There are 1 old requests (at least 7 days old) waiting for an answer though.*"
    );
}

#[test]
fn test_trailing_note_follows_congrats_directly() {
    let requests = vec![request(1, "bob", 9, None)];

    let pages = build_report(&requests, &options(7), None);

    assert_eq!(
        pages[0],
        "Congrats!  **No one** is waiting for an answer !\n\
         *There are 1 old requests (at least 7 days old) waiting for an answer though.*"
    );
}
