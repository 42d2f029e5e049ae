//! Daily completion tracking.
//!
//! Pure functions only: the tracker service owns the task list, the fetched
//! history and the "already notified today" flag, and performs the I/O these
//! functions signal.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Percentage, Task};

/// One percentage per calendar day.
pub type DayProgress = BTreeMap<NaiveDate, Percentage>;

/// Percentage carried by calendar cells that are not a day of the month.
pub const BLANK_SENTINEL: i16 = -1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CalendarError {
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("invalid progress date: {0}")]
    InvalidDate(String),
}

/// `round(100 * completed / total)`, or zero for an empty list.
#[must_use]
pub fn compute_today_percentage(tasks: &[Task]) -> Percentage {
    let completed = tasks.iter().filter(|task| task.is_completed()).count();
    Percentage::of(completed, tasks.len())
}

/// Return `history` with `today` set to `today_pct`.
#[must_use]
pub fn merge_history(history: &DayProgress, today: NaiveDate, today_pct: Percentage) -> DayProgress {
    let mut merged = history.clone();
    merged.insert(today, today_pct);
    merged
}

/// True exactly when the day just reached 100% and nobody was told yet.
#[must_use]
pub fn should_notify_completion(today_pct: Percentage, already_notified_today: bool) -> bool {
    today_pct.is_complete() && !already_notified_today
}

/// A completion record as stored by the progress backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub date: String,
    #[serde(default)]
    pub completed: bool,
}

/// Calendar day of a backend date, which may be a bare date or an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns `CalendarError::InvalidDate` if neither form parses.
pub fn parse_record_date(raw: &str) -> Result<NaiveDate, CalendarError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| CalendarError::InvalidDate(raw.to_string()))
}

/// Fold backend records into a history map (completed = 100, otherwise 0).
///
/// Several records for one day collapse into one entry; a completed record wins.
///
/// # Errors
///
/// Returns `CalendarError::InvalidDate` for an unparsable date.
pub fn history_from_records(records: &[ProgressRecord]) -> Result<DayProgress, CalendarError> {
    let mut history = DayProgress::new();
    for record in records {
        let day = parse_record_date(&record.date)?;
        let pct = if record.completed {
            Percentage::FULL
        } else {
            Percentage::ZERO
        };
        history
            .entry(day)
            .and_modify(|existing| *existing = (*existing).max(pct))
            .or_insert(pct);
    }
    Ok(history)
}

/// Shade bucket used to render a calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressLevel {
    Blank,
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    day: Option<u32>,
    percentage: Option<Percentage>,
}

impl CalendarCell {
    #[must_use]
    pub fn blank() -> Self {
        Self {
            day: None,
            percentage: None,
        }
    }

    #[must_use]
    pub fn day(day: u32, percentage: Percentage) -> Self {
        Self {
            day: Some(day),
            percentage: Some(percentage),
        }
    }

    #[must_use]
    pub fn day_of_month(&self) -> Option<u32> {
        self.day
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.day.is_none()
    }

    /// Percentage for the day, or `BLANK_SENTINEL` for a placeholder.
    #[must_use]
    pub fn percentage(&self) -> i16 {
        self.percentage
            .map_or(BLANK_SENTINEL, |pct| i16::from(pct.value()))
    }

    #[must_use]
    pub fn level(&self) -> ProgressLevel {
        match self.percentage.map(Percentage::value) {
            None => ProgressLevel::Blank,
            Some(0) => ProgressLevel::None,
            Some(p) if p < 30 => ProgressLevel::Low,
            Some(p) if p < 70 => ProgressLevel::Medium,
            Some(_) => ProgressLevel::High,
        }
    }

    /// Completed days render as a check mark instead of the day number.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percentage.is_some_and(Percentage::is_complete)
    }
}

/// Lay out a month for a Sunday-first 7-column grid.
///
/// Leading blanks pad up to the weekday of the 1st; there are no trailing blanks.
///
/// # Errors
///
/// Returns `CalendarError::InvalidMonth` if `year`/`month` is not a real month.
pub fn build_month_grid(
    year: i32,
    month: u32,
    history: &DayProgress,
) -> Result<Vec<CalendarCell>, CalendarError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(CalendarError::InvalidMonth { year, month })?;
    let days = days_in_month(first).ok_or(CalendarError::InvalidMonth { year, month })?;
    let leading = first.weekday().num_days_from_sunday() as usize;

    let mut cells = Vec::with_capacity(leading + days as usize);
    cells.extend(std::iter::repeat_n(CalendarCell::blank(), leading));
    for (day, date) in (1..=days).zip(first.iter_days()) {
        let pct = history.get(&date).copied().unwrap_or_default();
        cells.push(CalendarCell::day(day, pct));
    }
    Ok(cells)
}

fn days_in_month(first: NaiveDate) -> Option<u32> {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;

    fn task(id: &str, completed: bool) -> Task {
        let mut t = Task::new(TaskId::new(id), format!("Task {id}"), "5 min", "").unwrap();
        t.set_completed(completed);
        t
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn pct(v: i64) -> Percentage {
        Percentage::new(v).unwrap()
    }

    #[test]
    fn percentage_of_empty_list_is_zero() {
        assert_eq!(compute_today_percentage(&[]).value(), 0);
    }

    #[test]
    fn percentage_rounds() {
        let half = [task("1", true), task("2", false)];
        assert_eq!(compute_today_percentage(&half).value(), 50);

        let all = [task("1", true), task("2", true), task("3", true)];
        assert_eq!(compute_today_percentage(&all).value(), 100);

        let third = [task("1", true), task("2", false), task("3", false)];
        assert_eq!(compute_today_percentage(&third).value(), 33);
    }

    #[test]
    fn notify_only_on_first_full_day() {
        assert!(should_notify_completion(Percentage::FULL, false));
        assert!(!should_notify_completion(Percentage::FULL, true));
        assert!(!should_notify_completion(pct(99), false));
    }

    #[test]
    fn merge_inserts_and_overwrites() {
        let mut history = DayProgress::new();
        history.insert(date("2025-05-01"), pct(50));

        let merged = merge_history(&history, date("2025-05-02"), pct(80));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&date("2025-05-01")], pct(50));
        assert_eq!(merged[&date("2025-05-02")], pct(80));

        let again = merge_history(&merged, date("2025-05-01"), pct(70));
        assert_eq!(again.len(), 2);
        assert_eq!(again[&date("2025-05-01")], pct(70));
        // input untouched
        assert_eq!(history[&date("2025-05-01")], pct(50));
    }

    #[test]
    fn records_fold_into_days() {
        let records = vec![
            ProgressRecord {
                date: "2025-05-01T18:30:00.000Z".into(),
                completed: true,
            },
            ProgressRecord {
                date: "2025-05-01".into(),
                completed: false,
            },
            ProgressRecord {
                date: "2025-05-03".into(),
                completed: false,
            },
        ];
        let history = history_from_records(&records).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[&date("2025-05-01")], Percentage::FULL);
        assert_eq!(history[&date("2025-05-03")], Percentage::ZERO);
    }

    #[test]
    fn record_date_rejects_garbage() {
        assert!(matches!(
            parse_record_date("yesterday"),
            Err(CalendarError::InvalidDate(_))
        ));
    }

    #[test]
    fn month_starting_wednesday_has_three_blanks() {
        // January 2025 starts on a Wednesday.
        let grid = build_month_grid(2025, 1, &DayProgress::new()).unwrap();
        let blanks = grid.iter().take_while(|c| c.is_blank()).count();
        assert_eq!(blanks, 3);
        assert_eq!(grid[3].day_of_month(), Some(1));
        assert_eq!(grid.len(), 3 + 31);
        assert_eq!(grid[0].percentage(), BLANK_SENTINEL);
    }

    #[test]
    fn grid_uses_history_and_defaults_to_zero() {
        let mut history = DayProgress::new();
        history.insert(date("2024-02-29"), Percentage::FULL);
        history.insert(date("2024-02-10"), pct(40));
        history.insert(date("2024-03-01"), pct(90));

        let grid = build_month_grid(2024, 2, &history).unwrap();
        // Feb 2024 starts on Thursday.
        assert_eq!(grid.len(), 4 + 29);
        let day = |d: u32| grid.iter().find(|c| c.day_of_month() == Some(d)).unwrap();
        assert!(day(29).is_complete());
        assert_eq!(day(10).percentage(), 40);
        assert_eq!(day(10).level(), ProgressLevel::Medium);
        assert_eq!(day(11).percentage(), 0);
        assert_eq!(day(11).level(), ProgressLevel::None);
        assert_eq!(grid[0].level(), ProgressLevel::Blank);
    }

    #[test]
    fn december_rolls_over() {
        let grid = build_month_grid(2025, 12, &DayProgress::new()).unwrap();
        // December 2025 starts on Monday.
        assert_eq!(grid.len(), 1 + 31);
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert_eq!(
            build_month_grid(2025, 13, &DayProgress::new()).unwrap_err(),
            CalendarError::InvalidMonth {
                year: 2025,
                month: 13
            }
        );
    }

    #[test]
    fn levels_follow_thresholds() {
        assert_eq!(CalendarCell::day(1, pct(29)).level(), ProgressLevel::Low);
        assert_eq!(CalendarCell::day(1, pct(30)).level(), ProgressLevel::Medium);
        assert_eq!(CalendarCell::day(1, pct(70)).level(), ProgressLevel::High);
    }
}
