use uuid::Uuid;

use crate::cli::core::{parse_date, parse_index, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::render_table;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::Formatter;
use crate::core::services::TaskService;
use crate::workspace::{Task, TaskStatus};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "task",
        "Manage tasks and checklists",
        "task <add|list|show|status|due|link|check|remove> ...",
        cmd_task,
    )]
}

fn cmd_task(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: task <add|list|show|status|due|link|check|remove>".into(),
        ));
    }

    match args[0].to_lowercase().as_str() {
        "add" => cmd_add(context, &args[1..]),
        "list" => cmd_list(context, &args[1..]),
        "show" => cmd_show(context, &args[1..]),
        "status" => cmd_status(context, &args[1..]),
        "due" => cmd_due(context, &args[1..]),
        "link" => cmd_link(context, &args[1..]),
        "check" => cmd_check(context, &args[1..]),
        "remove" => cmd_remove(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown task subcommand `{}`",
            other
        ))),
    }
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: task add <title>".into(),
        ));
    }
    let creator = context.require_active_user()?;
    let title = args.join(" ");
    context.with_workspace_mut(|workspace| {
        TaskService::add(workspace, Task::new(title.clone(), creator)).map_err(CommandError::from)
    })?;
    io::print_success(format!("Task `{}` added.", title));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let status = match args.first().map(|raw| raw.to_lowercase()) {
        None => None,
        Some(token) if token == "all" => None,
        Some(token) => Some(TaskStatus::parse(&token).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown task status `{}`", token))
        })?),
    };
    context.with_workspace(|workspace| {
        let tasks = TaskService::list(workspace, status);
        if tasks.is_empty() {
            io::print_warning("No tasks match.");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let client = task
                    .client_id
                    .and_then(|id| workspace.client(id))
                    .map(|client| client.name.clone())
                    .unwrap_or_else(|| "-".into());
                let due = task
                    .due_date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".into());
                let (done, total) = task.checklist_progress();
                vec![
                    index.to_string(),
                    task.title.clone(),
                    task.status.label().to_string(),
                    due,
                    client,
                    format!("{}/{}", done, total),
                ]
            })
            .collect();
        render_table(&["#", "Title", "Status", "Due", "Client", "Checklist"], &rows);
        Ok(())
    })
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: task show <index>".into(),
        ));
    };
    let index = parse_index(raw, "task")?;
    context.with_workspace(|workspace| {
        let task = workspace
            .tasks
            .get(index)
            .ok_or_else(|| CommandError::InvalidArguments("task index out of range".into()))?;

        let formatter = Formatter::new();
        formatter.print_header(format!("Task: {}", task.title));
        formatter.print_detail(format!("Status: {}", task.status.label()));
        if let Some(due) = task.due_date {
            formatter.print_detail(format!("Due: {}", due.format("%Y-%m-%d")));
        }
        if let Some(client) = task.client_id.and_then(|id| workspace.client(id)) {
            formatter.print_detail(format!("Client: {}", client.name));
        }
        for (item_index, item) in task.checklist.iter().enumerate() {
            let mark = if item.done { "x" } else { " " };
            formatter.print_detail(format!("[{}] {}. {}", mark, item_index, item.text));
        }
        if let Some(notes) = &task.notes {
            if !notes.trim().is_empty() {
                formatter.print_detail(format!("Notes: {}", notes));
            }
        }
        Ok(())
    })?;
    context.await_menu_escape()
}

fn cmd_status(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (Some(raw_index), Some(raw_status)) = (args.first(), args.get(1)) else {
        return Err(CommandError::InvalidArguments(
            "usage: task status <index> <todo|doing|done>".into(),
        ));
    };
    let index = parse_index(raw_index, "task")?;
    let status = TaskStatus::parse(raw_status).ok_or_else(|| {
        CommandError::InvalidArguments(format!("unknown task status `{}`", raw_status))
    })?;
    let (task_id, title) = task_at(context, index)?;
    context.with_workspace_mut(|workspace| {
        TaskService::set_status(workspace, task_id, status).map_err(CommandError::from)
    })?;
    io::print_success(format!("Task `{}` marked {}.", title, status.label()));
    Ok(())
}

fn cmd_due(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (Some(raw_index), Some(raw_date)) = (args.first(), args.get(1)) else {
        return Err(CommandError::InvalidArguments(
            "usage: task due <index> <YYYY-MM-DD|none>".into(),
        ));
    };
    let index = parse_index(raw_index, "task")?;
    let due = if raw_date.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(parse_date(raw_date)?)
    };
    let (task_id, title) = task_at(context, index)?;
    context.with_workspace_mut(|workspace| {
        TaskService::update(workspace, task_id, |task| task.due_date = due)
            .map_err(CommandError::from)
    })?;
    io::print_success(format!("Task `{}` updated.", title));
    Ok(())
}

fn cmd_link(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (Some(raw_index), Some(raw_client)) = (args.first(), args.get(1)) else {
        return Err(CommandError::InvalidArguments(
            "usage: task link <index> <client-name|none>".into(),
        ));
    };
    let index = parse_index(raw_index, "task")?;
    let (task_id, title) = task_at(context, index)?;

    let client_id = if raw_client.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(context.with_workspace(|workspace| {
            workspace
                .clients
                .iter()
                .find(|client| client.name.eq_ignore_ascii_case(raw_client))
                .map(|client| client.id)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "client `{}` not found. Use `client list` to view available names.",
                        raw_client
                    ))
                })
        })?)
    };

    context.with_workspace_mut(|workspace| {
        TaskService::update(workspace, task_id, |task| task.client_id = client_id)
            .map_err(CommandError::from)
    })?;
    io::print_success(format!("Task `{}` updated.", title));
    Ok(())
}

fn cmd_check(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: task check <add|toggle> ...".into(),
        ));
    }
    match args[0].to_lowercase().as_str() {
        "add" => {
            let Some(raw_index) = args.get(1) else {
                return Err(CommandError::InvalidArguments(
                    "usage: task check add <index> <text>".into(),
                ));
            };
            let index = parse_index(raw_index, "task")?;
            let text = args[2..].join(" ");
            let (task_id, title) = task_at(context, index)?;
            context.with_workspace_mut(|workspace| {
                TaskService::add_checklist_item(workspace, task_id, text)
                    .map_err(CommandError::from)
            })?;
            io::print_success(format!("Checklist item added to `{}`.", title));
            Ok(())
        }
        "toggle" => {
            let (Some(raw_task), Some(raw_item)) = (args.get(1), args.get(2)) else {
                return Err(CommandError::InvalidArguments(
                    "usage: task check toggle <task-index> <item-index>".into(),
                ));
            };
            let task_index = parse_index(raw_task, "task")?;
            let item_index = parse_index(raw_item, "checklist item")?;
            let (task_id, _title) = task_at(context, task_index)?;
            let item_id = context.with_workspace(|workspace| {
                workspace
                    .tasks
                    .get(task_index)
                    .and_then(|task| task.checklist.get(item_index))
                    .map(|item| item.id)
                    .ok_or_else(|| {
                        CommandError::InvalidArguments("checklist item index out of range".into())
                    })
            })?;
            let state = context.with_workspace_mut(|workspace| {
                TaskService::toggle_checklist_item(workspace, task_id, item_id)
                    .map_err(CommandError::from)
            })?;
            io::print_success(if state {
                "Checklist item completed."
            } else {
                "Checklist item reopened."
            });
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown task check action `{}`",
            other
        ))),
    }
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: task remove <index>".into(),
        ));
    };
    let index = parse_index(raw, "task")?;
    let (task_id, title) = task_at(context, index)?;

    if !context.confirm(&format!("Remove task `{}`?", title))? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    context.with_workspace_mut(|workspace| {
        TaskService::remove(workspace, task_id).map_err(CommandError::from)
    })?;
    io::print_success(format!("Task `{}` removed.", title));
    Ok(())
}

fn task_at(context: &ShellContext, index: usize) -> Result<(Uuid, String), CommandError> {
    context.with_workspace(|workspace| {
        workspace
            .tasks
            .get(index)
            .map(|task| (task.id, task.title.clone()))
            .ok_or_else(|| CommandError::InvalidArguments("task index out of range".into()))
    })
}
