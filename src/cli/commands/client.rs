use uuid::Uuid;

use crate::cli::core::{parse_index, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::render_table;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::Formatter;
use crate::core::services::ClientService;
use crate::workspace::Client;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "client",
        "Manage agency clients",
        "client <add|list|show|set|remove> ...",
        cmd_client,
    )]
}

fn cmd_client(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: client <add|list|show|set|remove>".into(),
        ));
    }

    match args[0].to_lowercase().as_str() {
        "add" => cmd_add(context, &args[1..]),
        "list" => cmd_list(context),
        "show" => cmd_show(context, &args[1..]),
        "set" => cmd_set(context, &args[1..]),
        "remove" => cmd_remove(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown client subcommand `{}`",
            other
        ))),
    }
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: client add <name>".into(),
        ));
    }
    let creator = context.require_active_user()?;
    let name = args.join(" ");
    context.with_workspace_mut(|workspace| {
        ClientService::add(workspace, Client::new(name.clone(), creator))
            .map_err(CommandError::from)
    })?;
    io::print_success(format!("Client `{}` added.", name));
    Ok(())
}

fn cmd_list(context: &mut ShellContext) -> CommandResult {
    context.with_workspace(|workspace| {
        let clients = ClientService::list(workspace);
        if clients.is_empty() {
            io::print_warning("No clients registered.");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = clients
            .iter()
            .enumerate()
            .map(|(index, client)| {
                let open_tasks = workspace
                    .tasks
                    .iter()
                    .filter(|task| task.client_id == Some(client.id))
                    .count();
                vec![
                    index.to_string(),
                    client.name.clone(),
                    client.company.clone().unwrap_or_else(|| "-".into()),
                    client.email.clone().unwrap_or_else(|| "-".into()),
                    open_tasks.to_string(),
                ]
            })
            .collect();
        render_table(&["#", "Name", "Company", "Email", "Tasks"], &rows);
        Ok(())
    })
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: client show <index>".into(),
        ));
    };
    let index = parse_index(raw, "client")?;
    context.with_workspace(|workspace| {
        let client = workspace
            .clients
            .get(index)
            .ok_or_else(|| CommandError::InvalidArguments("client index out of range".into()))?;

        let formatter = Formatter::new();
        formatter.print_header(format!("Client: {}", client.name));
        if let Some(company) = &client.company {
            formatter.print_detail(format!("Company: {}", company));
        }
        if let Some(email) = &client.email {
            formatter.print_detail(format!("Email: {}", email));
        }
        if let Some(phone) = &client.phone {
            formatter.print_detail(format!("Phone: {}", phone));
        }
        if let Some(notes) = &client.notes {
            if !notes.trim().is_empty() {
                formatter.print_detail(format!("Notes: {}", notes));
            }
        }
        Ok(())
    })?;
    context.await_menu_escape()
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (Some(raw_index), Some(field)) = (args.first(), args.get(1)) else {
        return Err(CommandError::InvalidArguments(
            "usage: client set <index> <company|email|phone|notes> <value>".into(),
        ));
    };
    let index = parse_index(raw_index, "client")?;
    let field = field.to_lowercase();
    if !matches!(field.as_str(), "company" | "email" | "phone" | "notes") {
        return Err(CommandError::InvalidArguments(format!(
            "unknown client field `{}`",
            field
        )));
    }
    let value = args[2..].join(" ");

    let (client_id, name) = client_at(context, index)?;
    context.with_workspace_mut(|workspace| {
        ClientService::update(workspace, client_id, |client| {
            let slot = match field.as_str() {
                "company" => &mut client.company,
                "email" => &mut client.email,
                "phone" => &mut client.phone,
                _ => &mut client.notes,
            };
            *slot = if value.is_empty() { None } else { Some(value.clone()) };
        })
        .map_err(CommandError::from)
    })?;
    io::print_success(format!("Client `{}` updated.", name));
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: client remove <index>".into(),
        ));
    };
    let index = parse_index(raw, "client")?;
    let (client_id, name) = client_at(context, index)?;

    if !context.confirm(&format!("Remove client `{}`?", name))? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    context.with_workspace_mut(|workspace| {
        ClientService::remove(workspace, client_id).map_err(CommandError::from)
    })?;
    io::print_success(format!("Client `{}` removed.", name));
    Ok(())
}

fn client_at(context: &ShellContext, index: usize) -> Result<(Uuid, String), CommandError> {
    context.with_workspace(|workspace| {
        workspace
            .clients
            .get(index)
            .map(|client| (client.id, client.name.clone()))
            .ok_or_else(|| CommandError::InvalidArguments("client index out of range".into()))
    })
}
