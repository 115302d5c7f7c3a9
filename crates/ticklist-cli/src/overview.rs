use std::io::Write;

use chrono::NaiveDate;
use color_eyre::Result;
use ticklist_core::{
    storage::CollectionStore,
    tasks::{Draft, Priority, Task, TaskStatus},
    time,
};
use ticklist_task::{Statistics, TaskManager};

use crate::tasks::{write_json, write_task_line};

/// Statistics followed by the tasks due today and the overdue ones.
pub fn show<TS, DS>(repo: &TaskManager<TS, DS>, out: &mut impl Write) -> Result<()>
where
    TS: CollectionStore<Task>,
    DS: CollectionStore<Draft>,
{
    show_as_of(repo, time::today(), out)
}

/// Overview with `today` as the reference day for every section.
pub fn show_as_of<TS, DS>(
    repo: &TaskManager<TS, DS>,
    today: NaiveDate,
    out: &mut impl Write,
) -> Result<()>
where
    TS: CollectionStore<Task>,
    DS: CollectionStore<Draft>,
{
    write_statistics(out, &repo.statistics_as_of(today))?;

    writeln!(out)?;
    writeln!(out, "Due today:")?;
    write_section(out, &repo.tasks_due_on(today))?;

    writeln!(out)?;
    writeln!(out, "Overdue:")?;
    write_section(out, &repo.tasks_overdue_as_of(today))?;
    Ok(())
}

pub fn stats<TS, DS>(repo: &TaskManager<TS, DS>, out: &mut impl Write, json: bool) -> Result<()>
where
    TS: CollectionStore<Task>,
    DS: CollectionStore<Draft>,
{
    let stats = repo.statistics();
    if json {
        return write_json(out, &stats);
    }
    write_statistics(out, &stats)
}

fn write_section(out: &mut impl Write, tasks: &[&Task]) -> Result<()> {
    if tasks.is_empty() {
        writeln!(out, "  nothing")?;
    }
    for task in tasks {
        write_task_line(out, task)?;
    }
    Ok(())
}

fn write_statistics(out: &mut impl Write, stats: &Statistics) -> Result<()> {
    writeln!(out, "Tasks:     {}", stats.total)?;
    for status in TaskStatus::ALL {
        writeln!(out, "  {:<12}{}", status.label(), stats.status_count(status))?;
    }
    writeln!(out, "Priority:")?;
    for priority in Priority::ALL.iter().rev() {
        writeln!(out, "  {:<12}{}", priority.label(), stats.priority_count(*priority))?;
    }
    writeln!(out, "Overdue:   {}", stats.overdue)?;
    writeln!(out, "Due today: {}", stats.due_today)?;
    writeln!(out, "Drafts:    {}", stats.draft_count)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticklist_core::{storage::InMemoryStore, tasks::NewTask};

    #[test]
    fn overview_lists_due_today_and_overdue() {
        let mut repo = TaskManager::new(InMemoryStore::new(), InMemoryStore::new());
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
        repo.create_task(NewTask {
            due_date: today.and_hms_opt(18, 0, 0),
            ..NewTask::titled("Water plants")
        });
        repo.create_task(NewTask {
            due_date: today.pred_opt().and_then(|d| d.and_hms_opt(9, 0, 0)),
            ..NewTask::titled("Pay rent")
        });
        repo.create_draft("Someday", "", vec![]);

        let mut out = Vec::new();
        show_as_of(&repo, today, &mut out).expect("overview");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.contains("Tasks:     2"));
        assert!(text.contains("Overdue:   1"));
        assert!(text.contains("Due today: 1"));
        assert!(text.contains("Drafts:    1"));
        let (due, overdue) = text.split_once("\nOverdue:\n").expect("overdue section");
        assert!(due.contains("Water plants"));
        assert!(overdue.contains("Pay rent"));
        assert!(!overdue.contains("Water plants"));
    }

    #[test]
    fn stats_json_matches_repository() {
        let mut repo = TaskManager::new(InMemoryStore::new(), InMemoryStore::new());
        repo.create_task(NewTask::titled("One"));

        let mut out = Vec::new();
        stats(&repo, &mut out, true).expect("stats");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value["total"], 1);
        assert_eq!(value["todo"], 1);
        assert_eq!(value["priority"]["Medium"], 1);
    }

    #[test]
    fn empty_sections_say_nothing() {
        let repo = TaskManager::new(InMemoryStore::<Task>::new(), InMemoryStore::<Draft>::new());
        let mut out = Vec::new();
        show(&repo, &mut out).expect("overview");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Due today:\n  nothing\n"));
    }
}
