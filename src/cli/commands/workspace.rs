use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::workspace::Workspace;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "workspace",
        "Manage agency workspaces",
        "workspace <new|save|load|list|backup|backups|restore> ...",
        cmd_workspace,
    )]
}

fn cmd_workspace(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: workspace <new|save|load|list|backup|backups|restore>".into(),
        ));
    }

    match args[0].to_lowercase().as_str() {
        "new" => cmd_new(context, &args[1..]),
        "save" => cmd_save(context, &args[1..]),
        "load" => cmd_load(context, &args[1..]),
        "list" => cmd_list(context),
        "backup" => cmd_backup(context, &args[1..]),
        "backups" => cmd_backups(context, &args[1..]),
        "restore" => cmd_restore(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown workspace subcommand `{}`",
            other
        ))),
    }
}

fn cmd_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: workspace new <name>".into(),
        ));
    }
    let name = args.join(" ");
    let workspace = Workspace::new(name.clone());
    context.manager.set_current(workspace, Some(name.clone()));
    context.set_active_user(None);
    io::print_success(format!("New workspace `{}` created.", name));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = match args.first() {
        Some(raw) => raw.to_string(),
        None => context
            .manager
            .current_name()
            .map(|name| name.to_string())
            .ok_or_else(|| {
                CommandError::InvalidArguments("usage: workspace save <name>".into())
            })?,
    };
    context
        .manager
        .save_as(&name)
        .map_err(CommandError::from_core)?;
    context.update_last_opened(Some(&name))?;
    let path = context.storage.workspace_path(&name);
    io::print_success(format!("Workspace `{}` saved to {}.", name, path.display()));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: workspace load <name>".into(),
        ));
    };
    let report = context
        .manager
        .load(name)
        .map_err(CommandError::from_core)?;
    context.set_active_user(None);
    context.report_load(&report);
    context.update_last_opened(Some(name))?;
    let path = context.storage.workspace_path(name);
    io::print_success(format!(
        "Workspace `{}` loaded from {}.",
        name,
        path.display()
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext) -> CommandResult {
    let names = context
        .manager
        .storage()
        .list_workspaces()
        .map_err(CommandError::from_core)?;
    if names.is_empty() {
        io::print_warning("No saved workspaces.");
        return Ok(());
    }
    io::print_info("Saved workspaces:");
    for name in names {
        io::print_info(format!("  {}", name));
    }
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    };
    context
        .manager
        .backup(note.as_deref())
        .map_err(CommandError::from_core)?;
    io::print_success("Backup created.");
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = match args.first() {
        Some(raw) => raw.to_string(),
        None => context
            .manager
            .current_name()
            .map(|name| name.to_string())
            .ok_or_else(|| {
                CommandError::InvalidArguments("usage: workspace backups <name>".into())
            })?,
    };
    let backups = context
        .manager
        .list_backups(&name)
        .map_err(CommandError::from_core)?;
    if backups.is_empty() {
        io::print_warning("No backups available.");
        return Ok(());
    }
    io::print_info("Available backups:");
    for (index, backup_name) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", index + 1, backup_name));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (Some(name), Some(reference)) = (args.first(), args.get(1)) else {
        return Err(CommandError::InvalidArguments(
            "usage: workspace restore <name> <backup|index>".into(),
        ));
    };
    let backups = context
        .manager
        .list_backups(name)
        .map_err(CommandError::from_core)?;
    if backups.is_empty() {
        return Err(CommandError::InvalidArguments(
            "no backups available to restore".into(),
        ));
    }
    let target = if let Ok(index_raw) = reference.parse::<usize>() {
        let index = index_raw.saturating_sub(1);
        backups
            .get(index)
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!("backup index {} out of range", reference))
            })?
            .clone()
    } else {
        backups
            .iter()
            .find(|candidate| candidate.contains(*reference))
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no backup matches reference `{}`",
                    reference
                ))
            })?
    };

    if !context.confirm(&format!(
        "Restore workspace `{}` from backup `{}`?",
        name, target
    ))? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    let report = context
        .manager
        .restore_backup(name, &target)
        .map_err(CommandError::from_core)?;
    context.set_active_user(None);
    context.report_load(&report);
    context.update_last_opened(Some(name))?;
    io::print_success(format!(
        "Workspace `{}` restored from backup `{}`.",
        name, target
    ));
    Ok(())
}
