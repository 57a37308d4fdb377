use chrono::Local;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::internal_error::InternalResult;
use crate::tasks::data::{DailyTask, Objective, WeeklyTask};
use crate::views::{percent, progress_bar};

fn objective_title<'a>(objectives: &'a [Objective], id: &str) -> &'a str {
    objectives
        .iter()
        .find(|o| o.id == id)
        .map(|o| o.title.as_str())
        .unwrap_or("Unknown")
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn stamped_name(extension: &str) -> String {
    format!(
        "study-progress-{}.{}",
        Local::now().format("%Y-%m-%d"),
        extension
    )
}

/// One row per objective, weekly task and daily task, written to a
/// date-stamped file in `dir`.
pub fn export_csv(
    objectives: &[Objective],
    weekly: &[WeeklyTask],
    daily: &[DailyTask],
    dir: &Path,
) -> InternalResult<PathBuf> {
    let mut rows = vec!["Type,Objective,Title,Status,Progress,Date,Duration".to_string()];

    for objective in objectives {
        rows.push(format!(
            "Objective,{},{},{}/{},{}%,,",
            csv_field(&objective.title),
            csv_field(&objective.description),
            objective.completed_tasks,
            objective.total_tasks,
            percent(objective.completed_tasks, objective.total_tasks)
        ));
    }

    for task in weekly {
        rows.push(format!(
            "Weekly Task,{},{},{},,{},",
            csv_field(objective_title(objectives, &task.objective_id)),
            csv_field(&task.title),
            if task.completed { "Completed" } else { "Pending" },
            task.due_date
        ));
    }

    for task in daily {
        rows.push(format!(
            "Daily Task,{},{},{},,{},{}min",
            csv_field(objective_title(objectives, &task.objective_id)),
            csv_field(&task.title),
            if task.completed { "Completed" } else { "Pending" },
            task.created_at.to_rfc3339(),
            task.time_spent
        ));
    }

    let path = dir.join(stamped_name("csv"));
    fs::write(&path, rows.join("\n"))?;

    Ok(path)
}

/// Printable HTML report: objectives with progress bars, all weekly
/// tasks, the 20 most recent daily tasks.
pub fn export_report(
    objectives: &[Objective],
    weekly: &[WeeklyTask],
    daily: &[DailyTask],
    dir: &Path,
) -> InternalResult<PathBuf> {
    let mut body = String::new();

    let _ = writeln!(body, "<h1>Study Progress Report</h1>");
    let _ = writeln!(
        body,
        "<p>Generated on: {}</p>",
        Local::now().format("%Y-%m-%d")
    );

    let _ = writeln!(body, "<h2>Objectives Overview</h2>");
    for objective in objectives {
        let pct = percent(objective.completed_tasks, objective.total_tasks);
        let _ = writeln!(body, "<div class=\"objective\">");
        let _ = writeln!(
            body,
            "<h3>{} {}</h3><p>{}</p>",
            objective.icon, objective.title, objective.description
        );
        let _ = writeln!(
            body,
            "<p>Progress: {}/{} tasks ({}%)</p>",
            objective.completed_tasks, objective.total_tasks, pct
        );
        let _ = writeln!(
            body,
            "<div class=\"progress-bar\"><div class=\"progress-fill\" style=\"width: {}%\"></div></div>",
            pct
        );
        let _ = writeln!(body, "<pre>[{}]</pre>", progress_bar(objective.completed_tasks, objective.total_tasks));
        let _ = writeln!(body, "</div>");
    }

    let _ = writeln!(body, "<h2>Weekly Tasks</h2>");
    let _ = writeln!(body, "<ul>");
    for task in weekly {
        let _ = writeln!(
            body,
            "<li class=\"{}\">{} {} ({})</li>",
            if task.completed { "completed" } else { "" },
            if task.completed { "✅" } else { "⏳" },
            task.title,
            objective_title(objectives, &task.objective_id)
        );
    }
    let _ = writeln!(body, "</ul>");

    let _ = writeln!(body, "<h2>Recent Daily Tasks</h2>");
    let _ = writeln!(body, "<ul>");
    let recent_start = daily.len().saturating_sub(20);
    for task in &daily[recent_start..] {
        let _ = writeln!(
            body,
            "<li class=\"{}\">{} {} ({})</li>",
            if task.completed { "completed" } else { "" },
            if task.completed { "✅" } else { "⏳" },
            task.title,
            objective_title(objectives, &task.objective_id)
        );
    }
    let _ = writeln!(body, "</ul>");

    let document = format!(
        "<html>\n<head>\n<title>Study Progress Report</title>\n<style>\n\
         body {{ font-family: Arial, sans-serif; margin: 20px; }}\n\
         h1 {{ color: #3B82F6; border-bottom: 2px solid #3B82F6; padding-bottom: 10px; }}\n\
         h2 {{ color: #6366F1; margin-top: 30px; }}\n\
         .objective {{ margin: 20px 0; padding: 15px; border-left: 4px solid #10B981; background: #f8f9fa; }}\n\
         .progress-bar {{ background: #e5e7eb; height: 10px; border-radius: 5px; overflow: hidden; }}\n\
         .progress-fill {{ height: 100%; background: #10B981; }}\n\
         ul {{ list-style-type: none; padding: 0; }}\n\
         li {{ margin: 5px 0; padding: 8px; background: white; border-radius: 5px; }}\n\
         .completed {{ text-decoration: line-through; color: #6b7280; }}\n\
         </style>\n</head>\n<body>\n{}</body>\n</html>\n",
        body
    );

    let path = dir.join(stamped_name("html"));
    fs::write(&path, document)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::data::{default_objectives, Priority};
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    fn sample_weekly() -> WeeklyTask {
        WeeklyTask {
            id: "w1".to_string(),
            objective_id: "ielts".to_string(),
            title: "Listening, Test \"1\"".to_string(),
            description: String::new(),
            completed: true,
            due_date: NaiveDate::from_ymd_opt(2024, 8, 2).unwrap(),
            priority: Priority::Medium,
        }
    }

    fn sample_daily(id: &str, title: &str) -> DailyTask {
        DailyTask {
            id: id.to_string(),
            objective_id: "ielts".to_string(),
            title: title.to_string(),
            completed: false,
            time_spent: 15,
            created_at: Utc::now(),
            weekly_task_id: None,
        }
    }

    #[test]
    fn csv_field_escapes_commas_and_quotes() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_export_contains_every_record_kind() {
        let dir = tempfile::tempdir().unwrap();
        let objectives = default_objectives();
        let weekly = vec![sample_weekly()];
        let daily = vec![sample_daily("d1", "Review mistakes")];

        let path = export_csv(&objectives, &weekly, &daily, dir.path()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "Type,Objective,Title,Status,Progress,Date,Duration");
        // header + 4 objectives + 1 weekly + 1 daily
        assert_eq!(lines.len(), 7);
        assert!(content.contains("Weekly Task,IELTS Preparation"));
        assert!(content.contains("Completed"));
        assert!(content.contains("15min"));
        assert!(content.contains("\"Listening, Test \"\"1\"\"\""));
    }

    #[test]
    fn report_limits_daily_tasks_to_most_recent_twenty() {
        let dir = tempfile::tempdir().unwrap();
        let objectives = default_objectives();
        let daily: Vec<DailyTask> = (0..25)
            .map(|i| sample_daily(&format!("d{}", i), &format!("task number {}", i)))
            .collect();

        let path = export_report(&objectives, &[], &daily, dir.path()).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(!content.contains("task number 4 "));
        assert!(content.contains("task number 5 "));
        assert!(content.contains("task number 24 "));
        assert!(content.contains("<h1>Study Progress Report</h1>"));
    }
}
