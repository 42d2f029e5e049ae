use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use log::{info, warn};

use care_core::Clock;
use care_core::model::{Percentage, Task, TaskId, TaskList, UserId};
use care_core::progress::{
    CalendarCell, DayProgress, build_month_grid, compute_today_percentage, history_from_records,
    merge_history, should_notify_completion,
};

use crate::api::ProgressApi;
use crate::error::TrackerError;

/// What a task mutation did to today's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerUpdate {
    pub today: Percentage,
    /// True when this mutation sent today's completion notification.
    pub notified: bool,
}

/// Today's exercise list, the server history, and the once-per-day completion signal.
pub struct TrackerService {
    clock: Clock,
    api: Arc<dyn ProgressApi>,
    user: UserId,
    tasks: TaskList,
    history: DayProgress,
    notified_on: Option<NaiveDate>,
}

impl TrackerService {
    #[must_use]
    pub fn new(clock: Clock, api: Arc<dyn ProgressApi>, user: UserId) -> Self {
        Self {
            clock,
            api,
            user,
            tasks: TaskList::new(),
            history: DayProgress::new(),
            notified_on: None,
        }
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.user
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    #[must_use]
    pub fn history(&self) -> &DayProgress {
        &self.history
    }

    #[must_use]
    pub fn today_percentage(&self) -> Percentage {
        compute_today_percentage(self.tasks.as_slice())
    }

    /// Whether the completion request already succeeded for the clock's current day.
    #[must_use]
    pub fn notified_today(&self) -> bool {
        self.notified_on == Some(self.clock.today())
    }

    /// Replace history with the server's records, then merge today back in.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::History` if the request fails, or
    /// `TrackerError::Calendar` if a record carries an unreadable date. The
    /// previous history is kept in both cases.
    pub async fn refresh_history(&mut self) -> Result<&DayProgress, TrackerError> {
        let records = self
            .api
            .fetch_progress(&self.user)
            .await
            .map_err(TrackerError::History)?;
        let fetched = history_from_records(&records)?;
        self.history = fetched;
        self.merge_today();
        Ok(&self.history)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Task` for a duplicate id, or
    /// `TrackerError::Completion` if the completion request fails.
    pub async fn add_task(&mut self, task: Task) -> Result<TrackerUpdate, TrackerError> {
        self.tasks.add(task)?;
        self.reconcile().await
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Task` for an unknown id, or
    /// `TrackerError::Completion` if the completion request fails. The toggle
    /// itself is kept either way.
    pub async fn toggle_task(&mut self, id: &TaskId) -> Result<TrackerUpdate, TrackerError> {
        self.tasks.toggle(id)?;
        self.reconcile().await
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Task` for an unknown id, or
    /// `TrackerError::Completion` if the completion request fails.
    pub async fn remove_task(&mut self, id: &TaskId) -> Result<TrackerUpdate, TrackerError> {
        self.tasks.remove(id)?;
        self.reconcile().await
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Calendar` for an invalid year or month.
    pub fn month_grid(&self, year: i32, month: u32) -> Result<Vec<CalendarCell>, TrackerError> {
        Ok(build_month_grid(year, month, &self.history)?)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Calendar` if the clock's month cannot be laid out.
    pub fn current_month_grid(&self) -> Result<Vec<CalendarCell>, TrackerError> {
        let today = self.clock.today();
        self.month_grid(today.year(), today.month())
    }

    fn merge_today(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let today = self.clock.today();
        self.history = merge_history(&self.history, today, self.today_percentage());
    }

    async fn reconcile(&mut self) -> Result<TrackerUpdate, TrackerError> {
        self.merge_today();
        let today_pct = self.today_percentage();
        if !should_notify_completion(today_pct, self.notified_today()) {
            return Ok(TrackerUpdate {
                today: today_pct,
                notified: false,
            });
        }

        if let Err(err) = self.api.complete_today(&self.user).await {
            warn!("completion for {} not recorded: {err}", self.user);
            return Err(TrackerError::Completion(err));
        }
        self.notified_on = Some(self.clock.today());
        info!("recorded completion for {} on {}", self.user, self.clock.today());

        if let Err(err) = self.refresh_history().await {
            warn!("history refresh after completion failed: {err}");
        }
        Ok(TrackerUpdate {
            today: today_pct,
            notified: true,
        })
    }
}
