use chrono::{DateTime, Utc};
use log::debug;
use rand::seq::SliceRandom;

use crate::ranking::OwnerCounts;
use crate::requests::RequestWithAnswer;
use crate::staleness::pretty_delay;

/// Maximum number of rows in one posted table.
pub const PAGE_SIZE: usize = 20;

pub const CONGRATS_GIFS: [&str; 16] = [
    "https://media.giphy.com/media/9g8PH1MbwTy4o/giphy.gif",
    "https://media.giphy.com/media/Mp4hQy51LjY6A/giphy.gif",
    "https://media.giphy.com/media/xTiTnAbu69LQDFTOEg/giphy.gif",
    "https://media.giphy.com/media/7rj2ZgttvgomY/giphy.gif",
    "https://media.giphy.com/media/XB6pGqvOfJqY8/giphy.gif",
    "https://media.giphy.com/media/lnlAifQdenMxW/giphy.gif",
    "https://media.giphy.com/media/5orToQ5JFECis/giphy.gif",
    "https://media.giphy.com/media/sY1WaSHia8kMM/giphy.gif",
    "https://media.giphy.com/media/Hp2KnoY45cSfm/giphy.gif",
    "https://media.giphy.com/media/YKtTiAiiMyUc8/giphy.gif",
    "https://media.giphy.com/media/7j0IQDjVURCH6/giphy.gif",
    "https://media.giphy.com/media/PzztizcE7jvBS/giphy.gif",
    "https://media.giphy.com/media/9cQVP2aRB4kUg/giphy.gif",
    "https://media.giphy.com/media/jd6TVgsph6w7e/giphy.gif",
    "https://media.giphy.com/media/6IQ9o86ThLoGY/giphy.gif",
    "https://media.giphy.com/media/3BlN2bxcw0l5S/giphy.gif",
];

/// Chooses the graphic appended to an empty report.
pub trait GraphicPicker {
    fn pick(&mut self, pool: &[&'static str]) -> Option<&'static str>;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Default)]
pub struct RandomPicker;

impl GraphicPicker for RandomPicker {
    fn pick(&mut self, pool: &[&'static str]) -> Option<&'static str> {
        pool.choose(&mut rand::thread_rng()).copied()
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions<'a> {
    pub now: DateTime<Utc>,
    /// Requests idle for more days than this are left out of the tables.
    pub max_age_days: i64,
    /// Selects the detailed table with delays and per-author counts.
    pub owner_counts: Option<&'a OwnerCounts>,
}

/// Requests whose last activity is at most `max_age_days` old.
pub fn filter_by_age(
    requests: &[RequestWithAnswer],
    max_age_days: i64,
    now: DateTime<Utc>,
) -> Vec<&RequestWithAnswer> {
    requests
        .iter()
        .filter(|request| request.staleness(now).days <= max_age_days)
        .collect()
}

/// Renders the requests, in the given order, as markdown pages ready to post.
///
/// There is always at least one page. Without any request within the age
/// limit, that page is a congratulation, followed by a graphic when a picker
/// is given. Requests left out by the age limit are counted in a note at the
/// end of the last page.
pub fn build_report(
    requests: &[RequestWithAnswer],
    options: &ReportOptions,
    graphic: Option<&mut dyn GraphicPicker>,
) -> Vec<String> {
    let filtered = filter_by_age(requests, options.max_age_days, options.now);
    debug!(
        "{} of {} requests active in the last {} days",
        filtered.len(),
        requests.len(),
        options.max_age_days
    );

    let mut pages: Vec<String> = if filtered.is_empty() {
        vec![congrats_page(options, graphic)]
    } else {
        filtered
            .chunks(PAGE_SIZE)
            .map(|rows| render_table(rows, options))
            .collect()
    };

    let excluded = requests.len() - filtered.len();
    if excluded > 0 {
        let note = match options.owner_counts {
            Some(_) => format!(
                "*There are {} additional threads waiting for an answer for more than {} days.*",
                excluded, options.max_age_days
            ),
            None => format!(
                "*There are {} old requests (at least {} days old) waiting for an answer though.*",
                excluded, options.max_age_days
            ),
        };
        match pages.last_mut() {
            Some(page) => {
                // a line right under a table would render as one more row
                if !filtered.is_empty() {
                    page.push('\n');
                }
                page.push_str(&note);
            }
            None => pages.push(note),
        }
    }

    debug!("report rendered in {} page(s)", pages.len());
    pages
}

fn congrats_page(options: &ReportOptions, graphic: Option<&mut dyn GraphicPicker>) -> String {
    let mut page = match options.owner_counts {
        Some(_) => format!(
            "Congrats!  **No one** has been waiting for more than {} days for an answer !\n",
            options.max_age_days
        ),
        None => "Congrats!  **No one** is waiting for an answer !\n".to_string(),
    };
    if let Some(url) = graphic.and_then(|picker| picker.pick(&CONGRATS_GIFS)) {
        page.push_str(&format!("![]({url})\n"));
    }
    page
}

fn render_table(rows: &[&RequestWithAnswer], options: &ReportOptions) -> String {
    let mut table = String::new();

    match options.owner_counts {
        Some(owners) => {
            table.push_str("| Summary | reporter | last author | delay so far | response/thread |\n");
            table.push_str("|---|---|---|---|---|\n");
            for request in rows {
                let owned = owners.get(request.last_author_name());
                table.push_str(&format!(
                    "| {} | {} | {} | {} | {}/{} |\n",
                    summary_link(request),
                    request.reporter_name(),
                    request.last_author_name(),
                    pretty_delay(request.staleness(options.now).minutes),
                    owned.answered,
                    owned.threads
                ));
            }
        }
        None => {
            table.push_str("| Summary | reporter | last author | days ago |\n");
            table.push_str("|---|---|---|---|\n");
            for request in rows {
                table.push_str(&format!(
                    "| {} | {} | {} | {} days |\n",
                    summary_link(request),
                    request.reporter_name(),
                    request.last_author_name(),
                    request.staleness(options.now).days
                ));
            }
        }
    }

    table
}

fn summary_link(request: &RequestWithAnswer) -> String {
    format!(
        "[{}]({})",
        request.summary().replace('|', "\\|"),
        request.url()
    )
}
