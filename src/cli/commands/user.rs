use uuid::Uuid;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::render_table;
use crate::cli::registry::CommandEntry;
use crate::core::services::UserService;
use crate::workspace::{User, UserRole};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "user",
        "Manage the user directory and session",
        "user <add|list|login|logout|whoami|remove|reset-password> ...",
        cmd_user,
    )]
}

fn cmd_user(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: user <add|list|login|logout|whoami|remove|reset-password>".into(),
        ));
    }

    match args[0].to_lowercase().as_str() {
        "add" => cmd_add(context, &args[1..]),
        "list" => cmd_list(context),
        "login" => cmd_login(context, &args[1..]),
        "logout" => cmd_logout(context),
        "whoami" => cmd_whoami(context),
        "remove" => cmd_remove(context, &args[1..]),
        "reset-password" => cmd_reset_password(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown user subcommand `{}`",
            other
        ))),
    }
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: user add <name> [admin|member] [email]".into(),
        ));
    };
    let role = match args.get(1) {
        Some(raw) => UserRole::parse(raw).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown role `{}` (admin, member)", raw))
        })?,
        None => UserRole::Member,
    };
    let email = args.get(2).map(|raw| raw.to_string());

    let mut user = User::new(*name, role);
    user.email = email;
    let label = user.name.clone();
    context.with_workspace_mut(|workspace| {
        UserService::register(workspace, user).map_err(CommandError::from)
    })?;
    io::print_success(format!("User `{}` added ({}).", label, role.label()));
    Ok(())
}

fn cmd_list(context: &mut ShellContext) -> CommandResult {
    context.with_workspace(|workspace| {
        let users = UserService::list(workspace);
        if users.is_empty() {
            io::print_warning("No users registered.");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = users
            .iter()
            .map(|user| {
                vec![
                    user.name.clone(),
                    user.role.label().to_string(),
                    user.email.clone().unwrap_or_else(|| "-".into()),
                    if user.must_reset_password {
                        "reset pending".into()
                    } else {
                        "ok".into()
                    },
                ]
            })
            .collect();
        render_table(&["Name", "Role", "Email", "Credentials"], &rows);
        Ok(())
    })
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: user login <name>".into(),
        ));
    };
    let user_id = context.with_workspace(|workspace| {
        workspace
            .user_by_name(name)
            .map(|user| user.id)
            .ok_or_else(|| CommandError::InvalidArguments(format!("user `{}` not found", name)))
    })?;
    context.set_active_user(Some(user_id));
    io::print_success(format!("Logged in as `{}`.", name));
    Ok(())
}

fn cmd_logout(context: &mut ShellContext) -> CommandResult {
    context.set_active_user(None);
    io::print_info("Logged out.");
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext) -> CommandResult {
    match context.active_user_label() {
        Some(name) => io::print_info(format!("Active user: {}", name)),
        None => io::print_warning("No active user. Use `user login <name>`."),
    }
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: user remove <name>".into(),
        ));
    };
    let acting = context.require_active_user()?;
    let target = resolve_user(context, name)?;

    if !context.confirm(&format!("Remove user `{}`?", name))? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    context.with_workspace_mut(|workspace| {
        UserService::remove(workspace, acting, target).map_err(CommandError::from)
    })?;
    io::print_success(format!("User `{}` removed.", name));
    Ok(())
}

fn cmd_reset_password(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: user reset-password <name>".into(),
        ));
    };
    let acting = context.require_active_user()?;
    let target = resolve_user(context, name)?;
    context.with_workspace_mut(|workspace| {
        UserService::reset_password(workspace, acting, target).map_err(CommandError::from)
    })?;
    io::print_success(format!("Password reset requested for `{}`.", name));
    Ok(())
}

fn resolve_user(context: &ShellContext, name: &str) -> Result<Uuid, CommandError> {
    context.with_workspace(|workspace| {
        workspace
            .user_by_name(name)
            .map(|user| user.id)
            .ok_or_else(|| CommandError::InvalidArguments(format!("user `{}` not found", name)))
    })
}
