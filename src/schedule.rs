use chrono::{Datelike, NaiveDate, Weekday};

use std::collections::HashSet;

use crate::internal_error::InternalResult;
use crate::tasks::data::{Priority, WeeklyTask};

const OBJECTIVE_ID: &str = "ielts";

struct ScheduleBuilder {
    tasks: Vec<WeeklyTask>,
    counter: u32,
}

impl ScheduleBuilder {
    fn new() -> ScheduleBuilder {
        ScheduleBuilder {
            tasks: vec![],
            counter: 0,
        }
    }

    fn add(&mut self, due_date: NaiveDate, title: &str, description: &str) {
        self.counter += 1;
        self.tasks.push(WeeklyTask {
            id: format!("ielts-{}", self.counter),
            objective_id: OBJECTIVE_ID.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            completed: false,
            due_date,
            priority: Priority::Medium,
        });
    }
}

fn date(year: i32, month: u32, day: u32) -> InternalResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| "invalid schedule date".into())
}

/// The fixed IELTS preparation plan: warm-up, intensive practice and
/// exam simulation phases with literal dates. Ids are stable
/// (`ielts-N`) so re-seeding skips tasks that already exist.
pub fn exam_prep_tasks() -> InternalResult<Vec<WeeklyTask>> {
    let mut builder = ScheduleBuilder::new();

    // Phase 1: warm-up and foundation, Aug 2 - Aug 20. The Aug 7-13
    // gap is a vacation with no scheduled work.
    let phase1: [(u32, &[(&str, &str)]); 12] = [
        (2, &[
            ("Listening Test 1", "Cambridge book, review mistakes"),
            ("Speaking Part 1", "10 questions"),
        ]),
        (3, &[
            ("Reading Test 1", "3 passages, 60 min"),
            ("Speaking Part 1", "Record responses"),
        ]),
        (4, &[
            ("Writing Task 1", "150 words, chart/graph"),
            ("Speaking Part 2", "2-minute topic"),
        ]),
        (5, &[("Listening Test 2", ""), ("Speaking Part 3", "Discussion")]),
        (6, &[("Reading Test 2", ""), ("Speaking Part 1", "Short practice")]),
        (14, &[
            ("Listening Test 3", ""),
            ("Writing Task 2", "Opinion essay, 250 words"),
        ]),
        (15, &[("Reading Test 3", ""), ("Speaking Part 1", "")]),
        (16, &[("Writing Task 1", ""), ("Speaking Part 2", "")]),
        (17, &[("Listening Test 4", ""), ("Speaking Part 3", "")]),
        (18, &[("Reading Test 4", ""), ("Speaking Part 1", "")]),
        (19, &[("Writing Task 2", ""), ("Speaking full mock test", "15 min")]),
        (20, &[("Listening Test 5", ""), ("Speaking quick questions", "")]),
    ];

    for (day, items) in phase1 {
        let due = date(2024, 8, day)?;
        for (title, description) in items {
            builder.add(due, title, description);
        }
    }

    // Phase 2: intensive practice, Aug 21 - Sep 15. Listening and
    // reading days alternate by day-of-month parity; Sundays add a
    // full speaking mock.
    let mut day = date(2024, 8, 21)?;
    let phase2_end = date(2024, 9, 15)?;
    while day <= phase2_end {
        if day.day() % 2 == 1 {
            builder.add(day, "Listening full test", "Review deeply");
            builder.add(day, "Writing Task 1", "Practice");
        } else {
            builder.add(day, "Reading full test", "3 passages, 60 min");
            builder.add(day, "Writing Task 2", "Practice");
        }
        builder.add(day, "Speaking practice", "15 min (Part 1 or 2)");
        if day.weekday() == Weekday::Sun {
            builder.add(day, "Speaking full mock", "Parts 1, 2, 3 (~15 min)");
        }

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    // Phase 3: exam simulation, Sep 16 - Sep 30.
    let phase3: [(u32, &str, &str); 15] = [
        (16, "Full Mock Test #1", "Listening + Reading + Writing (2h40)"),
        (17, "Speaking full mock", ""),
        (18, "Full Mock Test #2", ""),
        (19, "Speaking Part 2 practice", ""),
        (20, "Full Mock Test #3", ""),
        (21, "Speaking mock", ""),
        (22, "Full Mock Test #4", ""),
        (23, "Light review", "Writing corrections, error lists"),
        (24, "Light review", "Writing corrections, error lists"),
        (25, "IELTS Exam", "Preferred date"),
        (26, "IELTS Exam", "Alternate date"),
        (27, "Mock test or speaking practice", "Continue if exam later"),
        (28, "Mock test or speaking practice", "Continue if exam later"),
        (29, "Mock test or speaking practice", "Continue if exam later"),
        (30, "Mock test or speaking practice", "Continue if exam later"),
    ];

    for (day, title, description) in phase3 {
        builder.add(date(2024, 9, day)?, title, description);
    }

    // Every phase 3 day gets at least one speaking exercise.
    let speaking_dates: HashSet<NaiveDate> = builder
        .tasks
        .iter()
        .filter(|t| t.title.to_lowercase().contains("speaking"))
        .map(|t| t.due_date)
        .collect();

    let mut day = date(2024, 9, 16)?;
    let phase3_end = date(2024, 9, 30)?;
    while day <= phase3_end {
        if !speaking_dates.contains(&day) {
            builder.add(day, "Speaking practice", "Daily speaking practice");
        }

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(builder.tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_stable() {
        let first = exam_prep_tasks().unwrap();
        let second = exam_prep_tasks().unwrap();

        let ids: HashSet<&str> = first.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), first.len());
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].id, second[0].id);
        assert!(first.iter().all(|t| t.id.starts_with("ielts-")));
    }

    #[test]
    fn vacation_week_has_no_tasks() {
        let tasks = exam_prep_tasks().unwrap();

        for day in 7..=13 {
            let due = NaiveDate::from_ymd_opt(2024, 8, day).unwrap();
            assert!(
                !tasks.iter().any(|t| t.due_date == due),
                "unexpected task on 2024-08-{:02}",
                day
            );
        }
    }

    #[test]
    fn phase2_alternates_listening_and_reading() {
        let tasks = exam_prep_tasks().unwrap();

        let odd = NaiveDate::from_ymd_opt(2024, 8, 21).unwrap();
        let even = NaiveDate::from_ymd_opt(2024, 8, 22).unwrap();

        assert!(tasks
            .iter()
            .any(|t| t.due_date == odd && t.title == "Listening full test"));
        assert!(tasks
            .iter()
            .any(|t| t.due_date == even && t.title == "Reading full test"));
        assert!(!tasks
            .iter()
            .any(|t| t.due_date == even && t.title == "Listening full test"));
    }

    #[test]
    fn phase2_sundays_get_a_full_speaking_mock() {
        let tasks = exam_prep_tasks().unwrap();

        // 2024-08-25 is a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2024, 8, 25).unwrap();
        assert!(tasks
            .iter()
            .any(|t| t.due_date == sunday && t.title == "Speaking full mock"));
    }

    #[test]
    fn every_phase3_day_has_speaking_practice() {
        let tasks = exam_prep_tasks().unwrap();

        for day in 16..=30 {
            let due = NaiveDate::from_ymd_opt(2024, 9, day).unwrap();
            assert!(
                tasks.iter().any(|t| t.due_date == due
                    && t.title.to_lowercase().contains("speaking")),
                "no speaking task on 2024-09-{:02}",
                day
            );
        }
    }

    #[test]
    fn all_tasks_belong_to_the_ielts_objective_and_start_incomplete() {
        let tasks = exam_prep_tasks().unwrap();

        assert!(!tasks.is_empty());
        assert!(tasks.iter().all(|t| t.objective_id == "ielts"));
        assert!(tasks.iter().all(|t| !t.completed));
    }
}
