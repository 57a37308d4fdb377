use chrono::{DateTime, NaiveDate, Utc};

use std::collections::HashSet;

use super::data::{new_id, DailyTask, Objective, WeeklyTask};

/// Fields of a weekly task that may change on edit. Unset fields keep
/// their current value.
#[derive(Debug, Default, Clone)]
pub struct WeeklyTaskUpdate {
    pub objective_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<super::data::Priority>,
}

#[derive(Debug, Default, Clone)]
pub struct DailyTaskUpdate {
    pub objective_id: Option<String>,
    pub title: Option<String>,
}

/// Daily rollover. Linked daily tasks whose weekly task is no longer
/// due today are dropped; each weekly task due today without a mirror
/// gets a fresh one copying objective, title and completion state.
/// Unlinked daily tasks are never touched.
pub fn sync_daily_with_weekly(
    weekly: &[WeeklyTask],
    daily: &mut Vec<DailyTask>,
    today: NaiveDate,
    now: DateTime<Utc>,
) {
    let due_today: HashSet<&str> = weekly
        .iter()
        .filter(|w| w.due_date == today)
        .map(|w| w.id.as_str())
        .collect();

    daily.retain(|task| match &task.weekly_task_id {
        Some(weekly_id) => due_today.contains(weekly_id.as_str()),
        None => true,
    });

    let mirrored: HashSet<&str> = daily
        .iter()
        .filter_map(|task| task.weekly_task_id.as_deref())
        .collect();

    let mut mirrors: Vec<DailyTask> = weekly
        .iter()
        .filter(|w| w.due_date == today && !mirrored.contains(w.id.as_str()))
        .map(|w| DailyTask {
            id: new_id(),
            objective_id: w.objective_id.clone(),
            title: w.title.clone(),
            completed: w.completed,
            time_spent: 0,
            created_at: now,
            weekly_task_id: Some(w.id.clone()),
        })
        .collect();

    daily.append(&mut mirrors);
}

/// Flips a weekly task's completion flag and mirrors the new value
/// onto its linked daily task. Unknown ids are a no-op.
pub fn toggle_weekly(weekly: &mut [WeeklyTask], daily: &mut [DailyTask], task_id: &str) {
    let new_status = match weekly.iter_mut().find(|w| w.id == task_id) {
        Some(task) => {
            task.completed = !task.completed;
            task.completed
        }
        None => return,
    };

    for task in daily.iter_mut() {
        if task.weekly_task_id.as_deref() == Some(task_id) {
            task.completed = new_status;
        }
    }
}

/// Flips a daily task's completion flag; a linked task carries the new
/// value back to its parent weekly task.
pub fn toggle_daily(daily: &mut [DailyTask], weekly: &mut [WeeklyTask], task_id: &str) {
    let (new_status, link) = match daily.iter_mut().find(|t| t.id == task_id) {
        Some(task) => {
            task.completed = !task.completed;
            (task.completed, task.weekly_task_id.clone())
        }
        None => return,
    };

    if let Some(weekly_id) = link {
        if let Some(parent) = weekly.iter_mut().find(|w| w.id == weekly_id) {
            parent.completed = new_status;
        }
    }
}

pub fn update_weekly(
    weekly: &mut [WeeklyTask],
    daily: &mut [DailyTask],
    task_id: &str,
    updates: &WeeklyTaskUpdate,
) {
    let task = match weekly.iter_mut().find(|w| w.id == task_id) {
        Some(task) => task,
        None => return,
    };

    if let Some(objective_id) = &updates.objective_id {
        task.objective_id = objective_id.clone();
    }
    if let Some(title) = &updates.title {
        task.title = title.clone();
    }
    if let Some(description) = &updates.description {
        task.description = description.clone();
    }
    if let Some(completed) = updates.completed {
        task.completed = completed;
    }
    if let Some(due_date) = updates.due_date {
        task.due_date = due_date;
    }
    if let Some(priority) = updates.priority {
        task.priority = priority;
    }

    let (objective_id, title, completed) =
        (task.objective_id.clone(), task.title.clone(), task.completed);

    for mirror in daily.iter_mut() {
        if mirror.weekly_task_id.as_deref() == Some(task_id) {
            mirror.objective_id = objective_id.clone();
            mirror.title = title.clone();
            mirror.completed = completed;
        }
    }
}

/// Objective and title edits on a linked daily task propagate back to
/// the parent weekly task.
pub fn update_daily(
    daily: &mut [DailyTask],
    weekly: &mut [WeeklyTask],
    task_id: &str,
    updates: &DailyTaskUpdate,
) {
    let task = match daily.iter_mut().find(|t| t.id == task_id) {
        Some(task) => task,
        None => return,
    };

    if let Some(objective_id) = &updates.objective_id {
        task.objective_id = objective_id.clone();
    }
    if let Some(title) = &updates.title {
        task.title = title.clone();
    }

    let link = task.weekly_task_id.clone();
    let (objective_id, title) = (task.objective_id.clone(), task.title.clone());

    if let Some(weekly_id) = link {
        if let Some(parent) = weekly.iter_mut().find(|w| w.id == weekly_id) {
            parent.objective_id = objective_id;
            parent.title = title;
        }
    }
}

/// Deleting a weekly task also removes its mirror daily task.
pub fn delete_weekly(weekly: &mut Vec<WeeklyTask>, daily: &mut Vec<DailyTask>, task_id: &str) {
    weekly.retain(|w| w.id != task_id);
    daily.retain(|t| t.weekly_task_id.as_deref() != Some(task_id));
}

/// Deleting a linked daily task also removes its parent weekly task.
pub fn delete_daily(daily: &mut Vec<DailyTask>, weekly: &mut Vec<WeeklyTask>, task_id: &str) {
    let link = daily
        .iter()
        .find(|t| t.id == task_id)
        .and_then(|t| t.weekly_task_id.clone());

    daily.retain(|t| t.id != task_id);

    if let Some(weekly_id) = link {
        weekly.retain(|w| w.id != weekly_id);
    }
}

/// Derives each objective's `completed_tasks` from the task
/// collections. Returns whether any objective actually changed so the
/// caller can skip a redundant write.
pub fn recompute_progress(
    objectives: &mut [Objective],
    weekly: &[WeeklyTask],
    daily: &[DailyTask],
) -> bool {
    let mut changed = false;

    for objective in objectives.iter_mut() {
        let completed_weekly = weekly
            .iter()
            .filter(|w| w.objective_id == objective.id && w.completed)
            .count();
        let completed_daily = daily
            .iter()
            .filter(|t| t.objective_id == objective.id && t.completed)
            .count();

        let total = (completed_weekly + completed_daily) as u32;
        if total != objective.completed_tasks {
            objective.completed_tasks = total;
            changed = true;
        }
    }

    changed
}
