use std::io::Write;

use color_eyre::{
    eyre::{bail, eyre},
    Result,
};
use ticklist_core::{
    input::{parse_tags, validate_title},
    storage::CollectionStore,
    tasks::{Draft, DraftPatch, NewTask, Task},
    time::format_timestamp,
};
use ticklist_task::TaskManager;

use crate::{
    cli::DraftCommand,
    prompt,
    tasks::{resolve_id, write_json},
};

/// Execute a draft subcommand against the task manager.
pub fn handle<TS, DS>(
    cmd: DraftCommand,
    repo: &mut TaskManager<TS, DS>,
    out: &mut impl Write,
) -> Result<()>
where
    TS: CollectionStore<Task>,
    DS: CollectionStore<Draft>,
{
    match cmd {
        DraftCommand::List { json } => {
            let drafts = repo.list_drafts();
            if json {
                return write_json(out, drafts);
            }
            if drafts.is_empty() {
                writeln!(out, "No drafts. Add one with `ticklist draft add <title>`.")?;
                return Ok(());
            }
            for draft in drafts {
                writeln!(out, "{} {}", draft.id, draft.title)?;
                if !draft.tags.is_empty() {
                    writeln!(out, "    tags: {}", draft.tags.join(", "))?;
                }
            }
        }
        DraftCommand::Add {
            title,
            description,
            tags,
        } => {
            let draft = repo.create_draft(
                validate_title(&title)?,
                description.trim(),
                tags.as_deref().map(parse_tags).unwrap_or_default(),
            );
            writeln!(out, "Created draft {}: {}", draft.id, draft.title)?;
        }
        DraftCommand::Show { id, json } => {
            let id = resolve_draft_id(repo, &id)?;
            let draft = repo
                .get_draft(&id)
                .ok_or_else(|| eyre!("no draft with id {id}"))?;
            if json {
                return write_json(out, draft);
            }
            writeln!(out, "{}", draft.title)?;
            writeln!(out, "  id:      {}", draft.id)?;
            writeln!(out, "  created: {}", format_timestamp(&draft.created_at))?;
            if !draft.tags.is_empty() {
                writeln!(out, "  tags:    {}", draft.tags.join(", "))?;
            }
            if !draft.description.is_empty() {
                writeln!(out)?;
                writeln!(out, "{}", draft.description)?;
            }
        }
        DraftCommand::Edit {
            id,
            title,
            description,
            tags,
        } => {
            let id = resolve_draft_id(repo, &id)?;
            let patch = DraftPatch {
                title: title.as_deref().map(validate_title).transpose()?,
                description: description.map(|d| d.trim().to_string()),
                tags: tags.as_deref().map(parse_tags),
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field to edit");
            }
            let draft = repo
                .update_draft(&id, patch)
                .ok_or_else(|| eyre!("no draft with id {id}"))?;
            writeln!(out, "Updated draft {}: {}", draft.id, draft.title)?;
        }
        DraftCommand::Rm { id, yes } => {
            let id = resolve_draft_id(repo, &id)?;
            let title = repo
                .get_draft(&id)
                .map(|d| d.title.clone())
                .ok_or_else(|| eyre!("no draft with id {id}"))?;
            if !yes && !prompt::confirm(&format!("Delete draft \"{title}\"?"))? {
                writeln!(out, "Kept draft: {title}")?;
                return Ok(());
            }
            if !repo.delete_draft(&id) {
                bail!("no draft with id {id}");
            }
            writeln!(out, "Deleted draft: {title}")?;
        }
        DraftCommand::Assign {
            id,
            title,
            description,
            due,
            priority,
            status,
            tags,
        } => {
            let id = resolve_draft_id(repo, &id)?;
            let seed = repo
                .get_draft(&id)
                .map(Draft::to_new_task)
                .ok_or_else(|| eyre!("no draft with id {id}"))?;
            let fields = NewTask {
                title: validate_title(title.as_deref().unwrap_or(&seed.title))?,
                description: description
                    .map(|d| d.trim().to_string())
                    .unwrap_or(seed.description),
                due_date: due,
                priority: priority.into(),
                status: status.into(),
                tags: tags.as_deref().map(parse_tags).unwrap_or(seed.tags),
            };
            let task = repo.assign_draft(&id, fields);
            writeln!(out, "Assigned draft as task {}: {}", task.id, task.title)?;
        }
    }

    Ok(())
}

fn resolve_draft_id<TS, DS>(repo: &TaskManager<TS, DS>, input: &str) -> Result<String>
where
    TS: CollectionStore<Task>,
    DS: CollectionStore<Draft>,
{
    resolve_id(repo.list_drafts().iter().map(|d| d.id.as_str()), input, "draft")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{PriorityArg, StatusArg};
    use chrono::NaiveDate;
    use ticklist_core::{
        storage::InMemoryStore,
        tasks::{Priority, TaskStatus},
    };

    type MemoryManager = TaskManager<InMemoryStore<Task>, InMemoryStore<Draft>>;

    fn repo_with_draft() -> (MemoryManager, String) {
        let mut repo = TaskManager::new(InMemoryStore::new(), InMemoryStore::new());
        let draft = repo.create_draft("Plan trip", "pick dates", vec!["travel".into()]);
        (repo, draft.id)
    }

    fn run(repo: &mut MemoryManager, cmd: DraftCommand) -> Result<String> {
        let mut out = Vec::new();
        handle(cmd, repo, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn add_and_list_drafts() {
        let mut repo = TaskManager::new(InMemoryStore::new(), InMemoryStore::new());
        let empty = run(&mut repo, DraftCommand::List { json: false }).expect("list");
        assert!(empty.starts_with("No drafts."));

        run(
            &mut repo,
            DraftCommand::Add {
                title: "Idea".into(),
                description: String::new(),
                tags: Some("later, maybe".into()),
            },
        )
        .expect("add");
        let listed = run(&mut repo, DraftCommand::List { json: false }).expect("list");
        assert!(listed.contains(" Idea\n"));
        assert!(listed.contains("tags: later, maybe"));
    }

    #[test]
    fn assign_defaults_to_draft_fields() {
        let (mut repo, id) = repo_with_draft();
        let due = NaiveDate::from_ymd_opt(2024, 7, 1).and_then(|d| d.and_hms_opt(0, 0, 0));

        run(
            &mut repo,
            DraftCommand::Assign {
                id: id.clone(),
                title: None,
                description: None,
                due,
                priority: PriorityArg::High,
                status: StatusArg::InProgress,
                tags: None,
            },
        )
        .expect("assign");

        assert!(repo.get_draft(&id).is_none());
        let task = &repo.list_tasks()[0];
        assert_eq!(task.title, "Plan trip");
        assert_eq!(task.description, "pick dates");
        assert_eq!(task.tags, vec!["travel".to_string()]);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date, due);
    }

    #[test]
    fn assign_overrides_title_and_tags() {
        let (mut repo, id) = repo_with_draft();
        run(
            &mut repo,
            DraftCommand::Assign {
                id,
                title: Some("X".into()),
                description: None,
                due: None,
                priority: PriorityArg::Medium,
                status: StatusArg::Todo,
                tags: Some("".into()),
            },
        )
        .expect("assign");
        let task = &repo.list_tasks()[0];
        assert_eq!(task.title, "X");
        assert!(task.tags.is_empty());
        assert!(repo.list_drafts().is_empty());
    }

    #[test]
    fn edit_show_and_remove_draft() {
        let (mut repo, id) = repo_with_draft();
        run(
            &mut repo,
            DraftCommand::Edit {
                id: id.clone(),
                title: Some("Plan holiday".into()),
                description: None,
                tags: None,
            },
        )
        .expect("edit");

        let shown = run(
            &mut repo,
            DraftCommand::Show {
                id: id.clone(),
                json: true,
            },
        )
        .expect("show");
        let value: serde_json::Value = serde_json::from_str(&shown).expect("json");
        assert_eq!(value["title"], "Plan holiday");
        assert_eq!(value["description"], "pick dates");

        let removed = run(&mut repo, DraftCommand::Rm { id, yes: true }).expect("rm");
        assert_eq!(removed, "Deleted draft: Plan holiday\n");
        assert!(repo.list_drafts().is_empty());
    }

    #[test]
    fn assign_unknown_draft_is_an_error() {
        let (mut repo, _) = repo_with_draft();
        let err = run(
            &mut repo,
            DraftCommand::Assign {
                id: "missing".into(),
                title: None,
                description: None,
                due: None,
                priority: PriorityArg::Medium,
                status: StatusArg::Todo,
                tags: None,
            },
        )
        .expect_err("unknown draft");
        assert!(err.to_string().contains("no draft with id missing"));
        assert!(repo.list_tasks().is_empty());
    }
}
