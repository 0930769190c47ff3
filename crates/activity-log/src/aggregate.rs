//! Summary statistics over an activity snapshot.
//!
//! Every function takes an explicit `now`. The `*_at` variants judge "today" by the local
//! calendar date; the `*_in` variants take the time zone explicitly.

use activity_types::{
    ActivityRecord, ActivityStats, CountEntry, DailyCount, EmployeeSummary, SectionActivity,
};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, HashSet};

/// How many records an employee summary carries verbatim.
pub const RECENT_ACTIVITY_LIMIT: usize = 20;

/// Longest range `daily_counts_*` will produce; larger requests are clamped.
pub const MAX_DAILY_DAYS: u32 = 366;

fn local_date<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

/// Counts per key in first-encountered order, then stable-sorted by count descending,
/// so ties keep the order they were first seen in.
fn histogram<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<CountEntry> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CountEntry> = Vec::new();
    for key in keys {
        match position.get(key) {
            Some(&i) => out[i].count += 1,
            None => {
                position.insert(key, out.len());
                out.push(CountEntry {
                    key: key.to_string(),
                    count: 1,
                });
            }
        }
    }
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

pub fn stats_at(records: &[ActivityRecord], now: DateTime<Utc>) -> ActivityStats {
    stats_in(records, now, &Local)
}

pub fn stats_in<Tz: TimeZone>(
    records: &[ActivityRecord],
    now: DateTime<Utc>,
    tz: &Tz,
) -> ActivityStats {
    let today = local_date(&now, tz);
    let mut today_activities = 0usize;
    let mut users_today: HashSet<&str> = HashSet::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut sections: Vec<SectionActivity> = Vec::new();

    for r in records {
        if local_date(&r.timestamp, tz) == today {
            today_activities += 1;
            users_today.insert(&r.user_id);
        }
        match position.get(r.section.as_str()) {
            Some(&i) => {
                let entry = &mut sections[i];
                entry.count += 1;
                if r.timestamp > entry.last_activity {
                    entry.last_activity = r.timestamp;
                }
            }
            None => {
                position.insert(&r.section, sections.len());
                sections.push(SectionActivity {
                    section: r.section.clone(),
                    count: 1,
                    last_activity: r.timestamp,
                });
            }
        }
    }
    sections.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

    ActivityStats {
        total_activities: records.len(),
        today_activities,
        unique_users_today: users_today.len(),
        sections_activity: sections,
    }
}

/// `None` when the user has no records. An unknown user and a user with zero activity
/// look the same here.
pub fn employee_summary_at(
    records: &[ActivityRecord],
    user_id: &str,
    now: DateTime<Utc>,
) -> Option<EmployeeSummary> {
    employee_summary_in(records, user_id, now, &Local)
}

pub fn employee_summary_in<Tz: TimeZone>(
    records: &[ActivityRecord],
    user_id: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Option<EmployeeSummary> {
    let mine: Vec<&ActivityRecord> = records.iter().filter(|r| r.user_id == user_id).collect();
    let latest = mine.iter().copied().max_by_key(|r| r.timestamp)?;

    let today = local_date(&now, tz);
    let today_activities = mine
        .iter()
        .filter(|r| local_date(&r.timestamp, tz) == today)
        .count();
    let action_breakdown = histogram(mine.iter().map(|r| r.action.as_str()));
    let section_breakdown = histogram(mine.iter().map(|r| r.section.as_str()));
    let most_active_section = section_breakdown
        .first()
        .map(|e| e.key.clone())
        .unwrap_or_default();

    Some(EmployeeSummary {
        user_id: user_id.to_string(),
        user_name: latest.user_name.clone(),
        user_role: latest.user_role.clone(),
        total_activities: mine.len(),
        today_activities,
        last_activity: latest.timestamp,
        most_active_section,
        action_breakdown,
        section_breakdown,
        recent_activities: mine
            .iter()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|r| (*r).clone())
            .collect(),
    })
}

/// Summaries for every user id present in the records, in first-seen order.
/// Employees with no logged activity never appear.
pub fn all_employees_summary_at(
    records: &[ActivityRecord],
    now: DateTime<Utc>,
) -> Vec<EmployeeSummary> {
    all_employees_summary_in(records, now, &Local)
}

pub fn all_employees_summary_in<Tz: TimeZone>(
    records: &[ActivityRecord],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<EmployeeSummary> {
    let mut seen: HashSet<&str> = HashSet::new();
    let user_ids: Vec<&str> = records
        .iter()
        .map(|r| r.user_id.as_str())
        .filter(|id| seen.insert(id))
        .collect();
    user_ids
        .into_iter()
        .filter_map(|id| employee_summary_in(records, id, now, tz))
        .collect()
}

/// Per-day record counts for the `days` calendar days ending today, oldest first.
/// Days without activity are present with a zero count.
pub fn daily_counts_at(records: &[ActivityRecord], days: u32, now: DateTime<Utc>) -> Vec<DailyCount> {
    daily_counts_in(records, days, now, &Local)
}

pub fn daily_counts_in<Tz: TimeZone>(
    records: &[ActivityRecord],
    days: u32,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<DailyCount> {
    let days = days.min(MAX_DAILY_DAYS);
    if days == 0 {
        return Vec::new();
    }
    let today = local_date(&now, tz);
    let mut by_date: HashMap<NaiveDate, usize> = HashMap::new();
    for r in records {
        *by_date.entry(local_date(&r.timestamp, tz)).or_insert(0) += 1;
    }
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(back as u64)))
        .map(|date| DailyCount {
            date,
            count: by_date.get(&date).copied().unwrap_or(0),
        })
        .collect()
}
