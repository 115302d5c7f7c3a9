use std::io::Write;

use color_eyre::{
    eyre::{bail, eyre},
    Result,
};
use serde::Serialize;
use ticklist_core::{
    input::{parse_tags, validate_title},
    query::TaskQuery,
    storage::CollectionStore,
    tasks::{Draft, NewTask, Task, TaskPatch, TaskStatus},
    time::{display_date, format_timestamp},
};
use ticklist_task::TaskManager;

use crate::{cli::TaskCommand, prompt};

/// Execute a task subcommand against the task manager.
pub fn handle<TS, DS>(
    cmd: TaskCommand,
    repo: &mut TaskManager<TS, DS>,
    out: &mut impl Write,
) -> Result<()>
where
    TS: CollectionStore<Task>,
    DS: CollectionStore<Draft>,
{
    match cmd {
        TaskCommand::List {
            filter,
            sort,
            search,
            json,
        } => {
            let query = TaskQuery {
                search,
                filter: filter.into(),
                sort: sort.into(),
            };
            let tasks = repo.query(&query);
            if json {
                return write_json(out, &tasks);
            }
            if tasks.is_empty() {
                writeln!(out, "No tasks to show. Add one with `ticklist task add <title>`.")?;
                return Ok(());
            }
            for task in tasks {
                write_task_line(out, task)?;
            }
        }
        TaskCommand::Add {
            title,
            description,
            due,
            priority,
            status,
            tags,
        } => {
            let task = repo.create_task(NewTask {
                title: validate_title(&title)?,
                description: description.trim().to_string(),
                due_date: due,
                priority: priority.into(),
                status: status.into(),
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
            });
            writeln!(out, "Created task {}: {}", task.id, task.title)?;
        }
        TaskCommand::Show { id, json } => {
            let id = resolve_id(repo.list_tasks().iter().map(|t| t.id.as_str()), &id, "task")?;
            let task = repo
                .get_task(&id)
                .ok_or_else(|| eyre!("no task with id {id}"))?;
            if json {
                return write_json(out, task);
            }
            write_task_detail(out, task)?;
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            due,
            clear_due,
            priority,
            status,
            tags,
        } => {
            let id = resolve_id(repo.list_tasks().iter().map(|t| t.id.as_str()), &id, "task")?;
            let patch = TaskPatch {
                title: title.as_deref().map(validate_title).transpose()?,
                description: description.map(|d| d.trim().to_string()),
                due_date: if clear_due { Some(None) } else { due.map(Some) },
                priority: priority.map(Into::into),
                status: status.map(Into::into),
                tags: tags.as_deref().map(parse_tags),
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field to edit");
            }
            let task = repo
                .update_task(&id, patch)
                .ok_or_else(|| eyre!("no task with id {id}"))?;
            writeln!(out, "Updated task {}: {}", task.id, task.title)?;
        }
        TaskCommand::Done { id } => {
            let id = resolve_id(repo.list_tasks().iter().map(|t| t.id.as_str()), &id, "task")?;
            let task = repo
                .update_task(&id, TaskPatch::status(TaskStatus::Completed))
                .ok_or_else(|| eyre!("no task with id {id}"))?;
            writeln!(out, "Marked done: {}", task.title)?;
        }
        TaskCommand::Rm { id, yes } => {
            let id = resolve_id(repo.list_tasks().iter().map(|t| t.id.as_str()), &id, "task")?;
            let title = repo
                .get_task(&id)
                .map(|t| t.title.clone())
                .ok_or_else(|| eyre!("no task with id {id}"))?;
            if !yes && !prompt::confirm(&format!("Delete task \"{title}\"?"))? {
                writeln!(out, "Kept task: {title}")?;
                return Ok(());
            }
            if !repo.delete_task(&id) {
                bail!("no task with id {id}");
            }
            writeln!(out, "Deleted task: {title}")?;
        }
    }

    Ok(())
}

/// Match `input` against `ids` exactly, or as a unique prefix.
pub(crate) fn resolve_id<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    input: &str,
    kind: &str,
) -> Result<String> {
    let input = input.trim();
    let mut candidates = Vec::new();
    for id in ids {
        if id == input {
            return Ok(id.to_string());
        }
        if !input.is_empty() && id.starts_with(input) {
            candidates.push(id);
        }
    }
    match candidates.as_slice() {
        [only] => Ok(only.to_string()),
        [] => bail!("no {kind} with id {input}"),
        many => bail!(
            "id prefix {input} matches {} {kind}s; type more characters",
            many.len()
        ),
    }
}

pub(crate) fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn write_task_line(out: &mut impl Write, task: &Task) -> Result<()> {
    writeln!(
        out,
        "{} [{}] {} ({}, due {})",
        task.id,
        task.status,
        task.title,
        task.priority,
        display_date(task.due_date.as_ref())
    )?;
    if !task.tags.is_empty() {
        writeln!(out, "    tags: {}", task.tags.join(", "))?;
    }
    Ok(())
}

fn write_task_detail(out: &mut impl Write, task: &Task) -> Result<()> {
    writeln!(out, "{}", task.title)?;
    writeln!(out, "  id:        {}", task.id)?;
    writeln!(out, "  status:    {}", task.status)?;
    writeln!(out, "  priority:  {}", task.priority)?;
    writeln!(out, "  due:       {}", display_date(task.due_date.as_ref()))?;
    writeln!(out, "  created:   {}", format_timestamp(&task.created_at))?;
    if let Some(done) = &task.completed_at {
        writeln!(out, "  completed: {}", format_timestamp(done))?;
    }
    if !task.tags.is_empty() {
        writeln!(out, "  tags:      {}", task.tags.join(", "))?;
    }
    if !task.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", task.description)?;
    }
    Ok(())
}
