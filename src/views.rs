use chrono::NaiveDate;

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::tasks::data::{DailyTask, Objective, PomodoroSession, WeeklyTask};

const BAR_WIDTH: usize = 20;

fn paint(text: &str, code: &str, colored: bool) -> String {
    if colored {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

fn objective_title<'a>(objectives: &'a [Objective], id: &str) -> &'a str {
    objectives
        .iter()
        .find(|o| o.id == id)
        .map(|o| o.title.as_str())
        .unwrap_or("Unknown")
}

pub fn percent(completed: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        (completed * 100 + total / 2) / total
    }
}

pub fn progress_bar(completed: u32, total: u32) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((completed as usize * BAR_WIDTH) / total as usize).min(BAR_WIDTH)
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn status_mark(completed: bool, colored: bool) -> String {
    if completed {
        paint("[x]", "32", colored)
    } else {
        "[ ]".to_string()
    }
}

pub fn dashboard(
    objectives: &[Objective],
    sessions: &[PomodoroSession],
    colored: bool,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", paint("Study Progress", "1", colored));
    let _ = writeln!(out, "==============");
    let _ = writeln!(out);

    for objective in objectives {
        let _ = writeln!(
            out,
            "{} {} — {}",
            objective.icon,
            paint(&objective.title, "1", colored),
            objective.description
        );
        let _ = writeln!(
            out,
            "   [{}] {}/{} ({}%)",
            progress_bar(objective.completed_tasks, objective.total_tasks),
            objective.completed_tasks,
            objective.total_tasks,
            percent(objective.completed_tasks, objective.total_tasks)
        );
    }

    let pomodoros = sessions.iter().filter(|s| !s.is_break).count();
    let focus_minutes: u32 = sessions
        .iter()
        .filter(|s| !s.is_break)
        .map(|s| s.duration)
        .sum();
    let completed: u32 = objectives.iter().map(|o| o.completed_tasks).sum();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} pomodoros, {:.1}h focused, {} tasks completed",
        pomodoros,
        focus_minutes as f64 / 60.0,
        completed
    );

    out
}

/// Weekly tasks grouped by due date, oldest first.
pub fn weekly_list(objectives: &[Objective], weekly: &[WeeklyTask], colored: bool) -> String {
    if weekly.is_empty() {
        return "no weekly tasks\n".to_string();
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<&WeeklyTask>> = BTreeMap::new();
    for task in weekly {
        by_date.entry(task.due_date).or_default().push(task);
    }

    let mut out = String::new();
    for (date, tasks) in by_date {
        let _ = writeln!(out, "{}", paint(&date.to_string(), "1", colored));
        for task in tasks {
            let priority = paint(&format!("({})", task.priority), "33", colored);
            let _ = writeln!(
                out,
                "  {} {} {} — {}  {}",
                status_mark(task.completed, colored),
                priority,
                task.title,
                objective_title(objectives, &task.objective_id),
                paint(&task.id, "2", colored)
            );
        }
    }

    out
}

pub fn daily_list(objectives: &[Objective], daily: &[DailyTask], colored: bool) -> String {
    if daily.is_empty() {
        return "no daily tasks\n".to_string();
    }

    let mut out = String::new();
    for task in daily {
        let mirror = if task.weekly_task_id.is_some() {
            " (from weekly plan)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{} {} — {}, {}min{}  {}",
            status_mark(task.completed, colored),
            task.title,
            objective_title(objectives, &task.objective_id),
            task.time_spent,
            mirror,
            paint(&task.id, "2", colored)
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::data::{default_objectives, Priority};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn weekly(id: &str, due: NaiveDate) -> WeeklyTask {
        WeeklyTask {
            id: id.to_string(),
            objective_id: "ielts".to_string(),
            title: format!("task {}", id),
            description: String::new(),
            completed: false,
            due_date: due,
            priority: Priority::High,
        }
    }

    #[test]
    fn percent_rounds_and_handles_zero_total() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(120, 120), 100);
    }

    #[test]
    fn progress_bar_is_fixed_width() {
        assert_eq!(progress_bar(0, 10).chars().count(), BAR_WIDTH);
        assert_eq!(progress_bar(5, 10).chars().count(), BAR_WIDTH);
        assert_eq!(progress_bar(10, 10), "█".repeat(BAR_WIDTH));
    }

    #[test]
    fn dashboard_lists_every_objective() {
        let objectives = default_objectives();
        let rendered = dashboard(&objectives, &[], false);

        for objective in &objectives {
            assert!(rendered.contains(&objective.title), "{}", objective.title);
        }
        assert!(rendered.contains("0 pomodoros"));
    }

    #[test]
    fn dashboard_sums_focus_time_from_work_sessions_only() {
        let objectives = default_objectives();
        let sessions = vec![
            PomodoroSession {
                id: "s1".to_string(),
                objective_id: "ielts".to_string(),
                duration: 50,
                is_break: false,
                completed_at: Utc::now(),
            },
            PomodoroSession {
                id: "s2".to_string(),
                objective_id: "ielts".to_string(),
                duration: 10,
                is_break: true,
                completed_at: Utc::now(),
            },
        ];

        let rendered = dashboard(&objectives, &sessions, false);

        assert!(rendered.contains("1 pomodoros"));
        assert!(rendered.contains("0.8h focused"));
    }

    #[test]
    fn weekly_list_groups_by_date_in_order() {
        let objectives = default_objectives();
        let tasks = vec![
            weekly("b", NaiveDate::from_ymd_opt(2024, 8, 3).unwrap()),
            weekly("a", NaiveDate::from_ymd_opt(2024, 8, 2).unwrap()),
        ];

        let rendered = weekly_list(&objectives, &tasks, false);

        let first = rendered.find("2024-08-02").unwrap();
        let second = rendered.find("2024-08-03").unwrap();
        assert!(first < second);
        assert!(rendered.contains("IELTS Preparation"));
    }

    #[test]
    fn daily_list_marks_mirrored_tasks() {
        let objectives = default_objectives();
        let tasks = vec![DailyTask {
            id: "d1".to_string(),
            objective_id: "missing".to_string(),
            title: "Listening".to_string(),
            completed: true,
            time_spent: 30,
            created_at: Utc::now(),
            weekly_task_id: Some("w1".to_string()),
        }];

        let rendered = daily_list(&objectives, &tasks, false);

        assert!(rendered.contains("(from weekly plan)"));
        assert!(rendered.contains("Unknown"));
        assert!(rendered.contains("30min"));
    }
}
