//! Monday-based week calendar.
//!
//! Weeks run Monday through Sunday. A week is keyed by its ISO-8601 week
//! number together with the calendar year of its Monday, which is how
//! completions and meals are filed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CompletedTask, Task, User};

/// Storage key of a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    /// ISO week number of the Monday.
    pub week_number: u32,
    /// Calendar year of the Monday.
    pub year: i32,
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {} of {}", self.week_number, self.year)
    }
}

/// A Monday..Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Week {
    monday: NaiveDate,
}

impl Week {
    /// The week containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let back = u64::from(date.weekday().num_days_from_monday());
        let monday = date.checked_sub_days(Days::new(back)).unwrap_or(date);
        Self { monday }
    }

    /// The week `offset` weeks away from the one containing `today`.
    ///
    /// Returns `None` if the shift leaves the supported date range.
    #[must_use]
    pub fn from_offset(today: NaiveDate, offset: i32) -> Option<Self> {
        let base = Self::containing(today).monday;
        let days = Days::new(u64::from(offset.unsigned_abs()) * 7);
        let monday = if offset >= 0 {
            base.checked_add_days(days)?
        } else {
            base.checked_sub_days(days)?
        };
        Some(Self { monday })
    }

    /// First day of the week.
    #[must_use]
    pub const fn monday(&self) -> NaiveDate {
        self.monday
    }

    /// Last day of the week.
    #[must_use]
    pub fn sunday(&self) -> NaiveDate {
        self.day(6)
    }

    /// Date of weekday `index` (Monday = 0), clamped to Sunday.
    #[must_use]
    pub fn day(&self, index: u8) -> NaiveDate {
        self.monday
            .checked_add_days(Days::new(u64::from(index.min(6))))
            .unwrap_or(self.monday)
    }

    /// The seven dates Monday..Sunday.
    #[must_use]
    pub fn dates(&self) -> [NaiveDate; 7] {
        std::array::from_fn(|i| self.day(u8::try_from(i).unwrap_or(6)))
    }

    /// Storage key.
    #[must_use]
    pub fn key(&self) -> WeekKey {
        WeekKey {
            week_number: week_number(self.monday),
            year: self.monday.year(),
        }
    }

    /// Whether `instant` falls on a day of this week (UTC calendar date).
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let date = instant.date_naive();
        date >= self.monday && date <= self.sunday()
    }
}

/// The seven dates of the week containing `today`, shifted by `offset` weeks.
#[must_use]
pub fn week_dates(today: NaiveDate, offset: i32) -> Option<[NaiveDate; 7]> {
    Week::from_offset(today, offset).map(|week| week.dates())
}

/// ISO-8601 week number of `date`.
#[must_use]
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Weekday index of `date`, Monday = 0.
#[must_use]
pub fn day_index(date: NaiveDate) -> u8 {
    u8::try_from(date.weekday().num_days_from_monday()).unwrap_or(0)
}

/// Whose tasks to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskFilter {
    /// Everyone's tasks.
    #[default]
    All,
    /// Tasks of the member with this name, plus shared tasks.
    Member(String),
}

impl FromStr for TaskFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Member(s.to_string()))
        }
    }
}

impl TaskFilter {
    /// Resolve the member filter against the known users.
    ///
    /// An unknown name keeps only shared tasks.
    fn member_id(&self, users: &[User]) -> Option<Option<Uuid>> {
        match self {
            Self::All => None,
            Self::Member(name) => Some(
                users
                    .iter()
                    .find(|u| u.name.eq_ignore_ascii_case(name))
                    .map(|u| u.id),
            ),
        }
    }
}

/// Tasks to show on weekday `day` of `week`.
///
/// Recurring tasks show every week; one-off tasks only in the week they
/// were created.
#[must_use]
pub fn tasks_for_day<'a>(
    tasks: &'a [Task],
    day: u8,
    week: &Week,
    filter: &TaskFilter,
    users: &[User],
) -> Vec<&'a Task> {
    let member = filter.member_id(users);
    tasks
        .iter()
        .filter(|task| task.day_of_week == day)
        .filter(|task| task.is_recurring || week.contains(task.created_at))
        .filter(|task| match member {
            None => true,
            Some(Some(id)) => task.is_for(id),
            Some(None) => task.is_both,
        })
        .collect()
}

/// Whether `task_id` has a completion among `completions`.
#[must_use]
pub fn is_completed(task_id: Uuid, completions: &[CompletedTask]) -> bool {
    completions.iter().any(|c| c.task_id == task_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            pin: String::new(),
            avatar_url: None,
        }
    }

    fn task(day: u8, recurring: bool, created: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Afwassen".into(),
            description: None,
            day_of_week: day,
            assigned_to: None,
            is_both: false,
            is_recurring: recurring,
            created_by: None,
            created_at: created,
        }
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-10-18 is a Sunday
        let week = Week::containing(date(2026, 10, 18));
        assert_eq!(week.monday(), date(2026, 10, 12));
        assert_eq!(week.sunday(), date(2026, 10, 18));
        assert_eq!(day_index(date(2026, 10, 18)), 6);
        assert_eq!(day_index(date(2026, 10, 12)), 0);
    }

    #[test]
    fn offset_shifts_whole_weeks() {
        let dates = week_dates(date(2026, 10, 14), -1).expect("dates");
        assert_eq!(dates[0], date(2026, 10, 5));
        assert_eq!(dates[6], date(2026, 10, 11));
        let next = Week::from_offset(date(2026, 10, 14), 2).expect("week");
        assert_eq!(next.monday(), date(2026, 10, 26));
    }

    #[test]
    fn key_uses_iso_week_and_monday_year() {
        assert_eq!(
            Week::containing(date(2026, 1, 1)).key(),
            WeekKey {
                week_number: 1,
                year: 2025
            }
        );
        assert_eq!(week_number(date(2026, 10, 19)), 43);
    }

    #[test]
    fn one_off_task_shows_only_in_creation_week() {
        let created = Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap();
        let tasks = vec![task(2, false, created)];
        let this_week = Week::containing(date(2026, 10, 14));
        let next_week = Week::containing(date(2026, 10, 21));
        assert_eq!(
            tasks_for_day(&tasks, 2, &this_week, &TaskFilter::All, &[]).len(),
            1
        );
        assert!(tasks_for_day(&tasks, 2, &next_week, &TaskFilter::All, &[]).is_empty());
        assert!(tasks_for_day(&tasks, 3, &this_week, &TaskFilter::All, &[]).is_empty());
    }

    #[test]
    fn recurring_task_shows_every_week() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let tasks = vec![task(4, true, created)];
        let week = Week::containing(date(2026, 10, 14));
        assert_eq!(
            tasks_for_day(&tasks, 4, &week, &TaskFilter::All, &[]).len(),
            1
        );
    }

    #[test]
    fn member_filter_keeps_own_and_shared_tasks() {
        let ann = user("Ann");
        let bo = user("Bo");
        let users = vec![ann.clone(), bo.clone()];
        let created = Utc.with_ymd_and_hms(2026, 10, 13, 9, 0, 0).unwrap();
        let mut own = task(1, false, created);
        own.assigned_to = Some(ann.id);
        let mut other = task(1, false, created);
        other.assigned_to = Some(bo.id);
        let mut shared = task(1, false, created);
        shared.is_both = true;
        let tasks = vec![own.clone(), other, shared.clone()];
        let week = Week::containing(date(2026, 10, 13));

        let filter: TaskFilter = "ann".parse().expect("filter");
        let shown = tasks_for_day(&tasks, 1, &week, &filter, &users);
        assert_eq!(shown, vec![&own, &shared]);

        let unknown = TaskFilter::Member("Cas".into());
        assert_eq!(
            tasks_for_day(&tasks, 1, &week, &unknown, &users),
            vec![&shared]
        );
    }

    #[test]
    fn filter_parses_all() {
        assert_eq!("all".parse::<TaskFilter>(), Ok(TaskFilter::All));
        assert_eq!("".parse::<TaskFilter>(), Ok(TaskFilter::All));
    }

    #[test]
    fn completion_lookup() {
        let id = Uuid::new_v4();
        let completions = vec![CompletedTask {
            task_id: id,
            user_id: None,
            week_number: 43,
            year: 2026,
        }];
        assert!(is_completed(id, &completions));
        assert!(!is_completed(Uuid::new_v4(), &completions));
    }
}
