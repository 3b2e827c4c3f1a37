//! Offline summaries of dumped timelines.

use crate::api::{ReferenceKind, Tweet};
use crate::timeline::Timeline;
use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub total: usize,
    pub replies: usize,
    pub retweets: usize,
    pub quotes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partner {
    pub username: String,
    pub replies: usize,
}

/// Partners that get a per-day reply series.
pub const SERIES_PARTNERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyReplies {
    pub date: NaiveDate,
    pub replies: usize,
}

/// Replies to one partner for every day between the oldest and newest
/// dated post, zero on days without any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerSeries {
    pub username: String,
    pub days: Vec<DailyReplies>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub posts: usize,
    /// Posts without `created_at` are left out of `days`, `partner_days` and `hours`
    pub undated: usize,
    pub days: Vec<DayCount>,
    pub partners: Vec<Partner>,
    pub partner_days: Vec<PartnerSeries>,
    /// Original posts per local hour of day
    pub hours: [usize; 24],
}

/// Concatenates dumps so the last-listed file comes first, keeping the
/// combined sequence newest-first when files are given oldest run first.
pub fn merge(timelines: Vec<Timeline>) -> Vec<Tweet> {
    timelines
        .into_iter()
        .rev()
        .flat_map(|timeline| timeline.data)
        .collect()
}

/// The handle a reply is addressed to, taken from a leading `@handle`.
pub fn interaction_partner(tweet: &Tweet) -> Option<&str> {
    tweet.reference(ReferenceKind::RepliedTo)?;
    let first = tweet.text.split_whitespace().next()?;
    let handle = first.strip_prefix('@')?;
    if handle.is_empty() {
        None
    } else {
        Some(handle)
    }
}

fn is_original(tweet: &Tweet) -> bool {
    interaction_partner(tweet).is_none()
        && tweet.reference(ReferenceKind::Quoted).is_none()
        && tweet.reference(ReferenceKind::Retweeted).is_none()
}

pub fn analyze(posts: &[Tweet], tz: Tz, top: usize) -> Report {
    let mut days: BTreeMap<NaiveDate, DayCount> = BTreeMap::new();
    let mut partners: HashMap<&str, usize> = HashMap::new();
    let mut partner_dates: HashMap<&str, BTreeMap<NaiveDate, usize>> = HashMap::new();
    let mut hours = [0usize; 24];
    let mut undated = 0;

    for tweet in posts {
        let partner = interaction_partner(tweet);
        if let Some(handle) = partner {
            *partners.entry(handle).or_default() += 1;
        }

        let Some(created_at) = tweet.created_at else {
            undated += 1;
            continue;
        };
        let local = created_at.with_timezone(&tz);

        let date = local.date_naive();
        let day = days.entry(date).or_insert_with(|| DayCount {
            date,
            total: 0,
            replies: 0,
            retweets: 0,
            quotes: 0,
        });
        day.total += 1;
        if tweet.reference(ReferenceKind::RepliedTo).is_some() {
            day.replies += 1;
        }
        if tweet.reference(ReferenceKind::Retweeted).is_some() {
            day.retweets += 1;
        }
        if tweet.reference(ReferenceKind::Quoted).is_some() {
            day.quotes += 1;
        }

        if let Some(handle) = partner {
            *partner_dates
                .entry(handle)
                .or_default()
                .entry(date)
                .or_default() += 1;
        }

        if is_original(tweet) {
            hours[local.hour() as usize] += 1;
        }
    }

    let mut partners: Vec<Partner> = partners
        .into_iter()
        .map(|(username, replies)| Partner {
            username: username.to_string(),
            replies,
        })
        .collect();
    partners.sort_by(|a, b| {
        b.replies
            .cmp(&a.replies)
            .then_with(|| a.username.cmp(&b.username))
    });

    let range = days.keys().next().copied().zip(days.keys().next_back().copied());
    let partner_days = partners
        .iter()
        .take(SERIES_PARTNERS)
        .map(|partner| PartnerSeries {
            username: partner.username.clone(),
            days: daily_series(partner_dates.get(partner.username.as_str()), range),
        })
        .collect();
    partners.truncate(top);

    Report {
        posts: posts.len(),
        undated,
        days: days.into_values().collect(),
        partners,
        partner_days,
        hours,
    }
}

fn daily_series(
    counts: Option<&BTreeMap<NaiveDate, usize>>,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Vec<DailyReplies> {
    let Some((first, last)) = range else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| DailyReplies {
            date,
            replies: counts.and_then(|c| c.get(&date)).copied().unwrap_or(0),
        })
        .collect()
}

pub fn render(report: &Report, tz: Tz) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} posts ({} undated), times in {}", report.posts, report.undated, tz);

    let _ = writeln!(out, "\n{:<12} {:>6} {:>8} {:>5} {:>6}", "date", "total", "replies", "rts", "qrts");
    for day in &report.days {
        let _ = writeln!(
            out,
            "{:<12} {:>6} {:>8} {:>5} {:>6}",
            day.date.to_string(),
            day.total,
            day.replies,
            day.retweets,
            day.quotes
        );
    }

    if !report.partners.is_empty() {
        let _ = writeln!(out, "\ntop interactions");
        for partner in &report.partners {
            let _ = writeln!(out, "  @{:<20} {:>5}", partner.username, partner.replies);
        }
    }

    if let Some(first) = report.partner_days.first().and_then(|s| s.days.first()) {
        let _ = writeln!(out, "\ndaily replies from {}", first.date);
        for series in &report.partner_days {
            let counts: Vec<String> = series.days.iter().map(|d| d.replies.to_string()).collect();
            let _ = writeln!(out, "  @{:<20} {}", series.username, counts.join(" "));
        }
    }

    let _ = writeln!(out, "\noriginal posts by hour");
    for (hour, count) in report.hours.iter().enumerate() {
        if *count > 0 {
            let _ = writeln!(out, "  {:02}:00 {:>5}", hour, count);
        }
    }
    out
}
