use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// A long-running study goal with a task quota. `completed_tasks` is a
/// derived projection; only the recompute pass writes it.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub title: String,
    pub description: String,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub color: String,
    pub icon: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTask {
    pub id: String,
    pub objective_id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_date: NaiveDate,
    pub priority: Priority,
}

/// A same-day task. `weekly_task_id` is the mirror link tying it to the
/// weekly task it was generated from; unlinked tasks leave it unset.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    pub id: String,
    pub objective_id: String,
    pub title: String,
    pub completed: bool,
    pub time_spent: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_task_id: Option<String>,
}

/// A completed work or break interval. Append-only.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSession {
    pub id: String,
    pub objective_id: String,
    pub duration: u32,
    pub is_break: bool,
    pub completed_at: DateTime<Utc>,
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Seeded when the store holds no objectives yet.
pub fn default_objectives() -> Vec<Objective> {
    vec![
        Objective {
            id: "ielts".to_string(),
            title: "IELTS Preparation".to_string(),
            description: "Achieve band 8.0 in IELTS exam".to_string(),
            total_tasks: 120,
            completed_tasks: 0,
            color: "blue".to_string(),
            icon: "🎯".to_string(),
        },
        Objective {
            id: "pl300".to_string(),
            title: "PL-300 Certification".to_string(),
            description: "Microsoft Power BI Data Analyst certification".to_string(),
            total_tasks: 80,
            completed_tasks: 0,
            color: "purple".to_string(),
            icon: "📊".to_string(),
        },
        Objective {
            id: "programming".to_string(),
            title: "Python & Java".to_string(),
            description: "Master programming fundamentals and frameworks".to_string(),
            total_tasks: 150,
            completed_tasks: 0,
            color: "green".to_string(),
            icon: "💻".to_string(),
        },
        Objective {
            id: "ai-bi".to_string(),
            title: "AI+BI Project".to_string(),
            description: "Build comprehensive AI and BI solution".to_string(),
            total_tasks: 100,
            completed_tasks: 0,
            color: "orange".to_string(),
            icon: "🤖".to_string(),
        },
    ]
}
