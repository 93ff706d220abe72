use clap::Parser;
use mmdigest::cli::{Args, Command};
use mmdigest::settings::{Settings, merge_settings};

fn settings() -> Settings {
    Settings {
        mm_url: Some("https://chat.example.com".to_string()),
        mm_token: Some("token".to_string()),
        channel_id: Some("town-square".to_string()),
        team: vec!["alice".to_string(), "carol".to_string()],
        max_age_days: Some(14),
        congrats_gif: Some(true),
        web_commit_url: Some("https://git.example.com/c/".to_string()),
    }
}

#[test]
fn test_config_fills_unset_request_options() {
    let args = Args::try_parse_from(["mmdigest", "requests", "posts.json"]).unwrap();

    let merged = merge_settings(&args, settings());

    let Command::Requests(requests) = merged.command else {
        panic!("expected the requests command");
    };
    assert_eq!(requests.team, vec!["alice", "carol"]);
    assert_eq!(requests.max_age_days, Some(14));
    assert!(requests.gif);
}

#[test]
fn test_command_line_wins_over_config() {
    let args = Args::try_parse_from([
        "mmdigest",
        "--mm-url",
        "https://other.example.com",
        "requests",
        "posts.json",
        "--team",
        "bob,dave",
        "--max-age-days",
        "-1",
    ])
    .unwrap();

    let merged = merge_settings(&args, settings());

    assert_eq!(merged.mm_url.as_deref(), Some("https://other.example.com"));
    let Command::Requests(requests) = merged.command else {
        panic!("expected the requests command");
    };
    assert_eq!(requests.team, vec!["bob", "dave"]);
    assert_eq!(requests.max_age_days, Some(-1));
}

#[test]
fn test_config_fills_commit_url() {
    let args = Args::try_parse_from(["mmdigest", "commits", "."]).unwrap();

    let merged = merge_settings(&args, settings());

    let Command::Commits(commits) = merged.command else {
        panic!("expected the commits command");
    };
    assert_eq!(
        commits.web_commit_url.as_deref(),
        Some("https://git.example.com/c/")
    );
    assert_eq!(commits.since_days, 1);
}

#[test]
fn test_empty_config_changes_nothing() {
    let args = Args::try_parse_from(["mmdigest", "requests", "posts.json", "--owners"]).unwrap();

    let merged = merge_settings(&args, Settings::default());

    let Command::Requests(requests) = merged.command else {
        panic!("expected the requests command");
    };
    assert!(requests.team.is_empty());
    assert_eq!(requests.max_age_days, None);
    assert!(requests.owners);
    assert!(!requests.gif);
}

#[test]
fn test_no_gif_overrides_config() {
    let args = Args::try_parse_from(["mmdigest", "requests", "posts.json", "--no-gif"]).unwrap();

    let merged = merge_settings(&args, settings());

    let Command::Requests(requests) = merged.command else {
        panic!("expected the requests command");
    };
    assert!(!requests.gif);
    assert!(requests.no_gif);
}

#[test]
fn test_last_gif_flag_wins() {
    let args =
        Args::try_parse_from(["mmdigest", "requests", "posts.json", "--no-gif", "--gif"]).unwrap();

    let Command::Requests(requests) = args.command else {
        panic!("expected the requests command");
    };
    assert!(requests.gif);
    assert!(!requests.no_gif);
}
