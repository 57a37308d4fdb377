use chrono::{Local, NaiveDate, Utc};
use tracing::debug;

use crate::internal_error::{InternalError, InternalResult};
use crate::store::{
    Store, DAILY_TASKS_KEY, COLOR_OUTPUT_KEY, OBJECTIVES_KEY, SESSIONS_KEY, WEEKLY_TASKS_KEY,
};

use super::data::{
    default_objectives, new_id, DailyTask, Objective, PomodoroSession, Priority, WeeklyTask,
};
use super::sync::{
    delete_daily, delete_weekly, recompute_progress, sync_daily_with_weekly, toggle_daily,
    toggle_weekly, update_daily, update_weekly, DailyTaskUpdate, WeeklyTaskUpdate,
};

/// The single writer over all persisted collections. Every mutation
/// runs the reconciliation pass (daily rollover + progress recompute)
/// and mirrors the affected collections back to the store.
pub struct StudyData {
    store: Store,
    pub objectives: Vec<Objective>,
    pub weekly_tasks: Vec<WeeklyTask>,
    pub daily_tasks: Vec<DailyTask>,
    pub sessions: Vec<PomodoroSession>,
}

impl StudyData {
    pub fn load(store: Store) -> InternalResult<StudyData> {
        let objectives = store.get(OBJECTIVES_KEY, default_objectives());
        let weekly_tasks = store.get(WEEKLY_TASKS_KEY, vec![]);
        let daily_tasks = store.get(DAILY_TASKS_KEY, vec![]);
        let sessions = store.get(SESSIONS_KEY, vec![]);

        let mut data = StudyData {
            store,
            objectives,
            weekly_tasks,
            daily_tasks,
            sessions,
        };

        // Rollover runs on load too, so tasks due today appear in the
        // daily list before any mutation happens.
        data.reconcile_and_persist()?;

        Ok(data)
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn reconcile_and_persist(&mut self) -> InternalResult<()> {
        sync_daily_with_weekly(
            &self.weekly_tasks,
            &mut self.daily_tasks,
            Self::today(),
            Utc::now(),
        );

        self.store.set(WEEKLY_TASKS_KEY, &self.weekly_tasks)?;
        self.store.set(DAILY_TASKS_KEY, &self.daily_tasks)?;

        if recompute_progress(&mut self.objectives, &self.weekly_tasks, &self.daily_tasks) {
            debug!("objective progress changed, writing back");
            self.store.set(OBJECTIVES_KEY, &self.objectives)?;
        }

        Ok(())
    }

    fn require_objective(&self, objective_id: &str) -> InternalResult<()> {
        if self.objectives.iter().any(|o| o.id == objective_id) {
            Ok(())
        } else {
            Err(InternalError::from(format!(
                "unknown objective: {}",
                objective_id
            )))
        }
    }

    fn require_title(title: &str) -> InternalResult<()> {
        if title.trim().is_empty() {
            Err(InternalError::from("title is required"))
        } else {
            Ok(())
        }
    }

    pub fn add_weekly_task(
        &mut self,
        objective_id: &str,
        title: &str,
        description: &str,
        due_date: NaiveDate,
        priority: Priority,
    ) -> InternalResult<String> {
        self.require_objective(objective_id)?;
        Self::require_title(title)?;

        let id = new_id();
        self.weekly_tasks.push(WeeklyTask {
            id: id.clone(),
            objective_id: objective_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            completed: false,
            due_date,
            priority,
        });

        self.reconcile_and_persist()?;
        Ok(id)
    }

    /// Bulk insert for the generated schedule. Tasks whose id already
    /// exists are skipped; returns how many were added.
    pub fn add_weekly_tasks(&mut self, tasks: Vec<WeeklyTask>) -> InternalResult<usize> {
        let mut added = 0;

        for task in tasks {
            if self.weekly_tasks.iter().any(|w| w.id == task.id) {
                continue;
            }
            self.weekly_tasks.push(task);
            added += 1;
        }

        if added > 0 {
            self.reconcile_and_persist()?;
        }

        Ok(added)
    }

    pub fn toggle_weekly_task(&mut self, task_id: &str) -> InternalResult<()> {
        toggle_weekly(&mut self.weekly_tasks, &mut self.daily_tasks, task_id);
        self.reconcile_and_persist()
    }

    pub fn update_weekly_task(
        &mut self,
        task_id: &str,
        updates: &WeeklyTaskUpdate,
    ) -> InternalResult<()> {
        if let Some(objective_id) = &updates.objective_id {
            self.require_objective(objective_id)?;
        }
        if let Some(title) = &updates.title {
            Self::require_title(title)?;
        }

        update_weekly(&mut self.weekly_tasks, &mut self.daily_tasks, task_id, updates);
        self.reconcile_and_persist()
    }

    pub fn delete_weekly_task(&mut self, task_id: &str) -> InternalResult<()> {
        delete_weekly(&mut self.weekly_tasks, &mut self.daily_tasks, task_id);
        self.reconcile_and_persist()
    }

    pub fn add_daily_task(&mut self, objective_id: &str, title: &str) -> InternalResult<String> {
        self.require_objective(objective_id)?;
        Self::require_title(title)?;

        let id = new_id();
        self.daily_tasks.push(DailyTask {
            id: id.clone(),
            objective_id: objective_id.to_string(),
            title: title.to_string(),
            completed: false,
            time_spent: 0,
            created_at: Utc::now(),
            weekly_task_id: None,
        });

        self.reconcile_and_persist()?;
        Ok(id)
    }

    pub fn toggle_daily_task(&mut self, task_id: &str) -> InternalResult<()> {
        toggle_daily(&mut self.daily_tasks, &mut self.weekly_tasks, task_id);
        self.reconcile_and_persist()
    }

    pub fn update_daily_task(
        &mut self,
        task_id: &str,
        updates: &DailyTaskUpdate,
    ) -> InternalResult<()> {
        if let Some(objective_id) = &updates.objective_id {
            self.require_objective(objective_id)?;
        }
        if let Some(title) = &updates.title {
            Self::require_title(title)?;
        }

        update_daily(&mut self.daily_tasks, &mut self.weekly_tasks, task_id, updates);
        self.reconcile_and_persist()
    }

    pub fn delete_daily_task(&mut self, task_id: &str) -> InternalResult<()> {
        delete_daily(&mut self.daily_tasks, &mut self.weekly_tasks, task_id);
        self.reconcile_and_persist()
    }

    pub fn log_time(&mut self, task_id: &str, minutes: u32) -> InternalResult<()> {
        if let Some(task) = self.daily_tasks.iter_mut().find(|t| t.id == task_id) {
            task.time_spent += minutes;
        }
        self.reconcile_and_persist()
    }

    pub fn add_session(
        &mut self,
        objective_id: &str,
        duration: u32,
        is_break: bool,
    ) -> InternalResult<()> {
        self.sessions.push(PomodoroSession {
            id: new_id(),
            objective_id: objective_id.to_string(),
            duration,
            is_break,
            completed_at: Utc::now(),
        });

        self.store.set(SESSIONS_KEY, &self.sessions)
    }

    pub fn color_output(&self) -> bool {
        self.store.get(COLOR_OUTPUT_KEY, false)
    }

    pub fn set_color_output(&mut self, on: bool) -> InternalResult<()> {
        self.store.set(COLOR_OUTPUT_KEY, &on)
    }
}
