use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::Formatter;
use crate::workspace::Frequency;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change application settings",
        "config <show|set|backup|backups|restore> ...",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: config <show|set|backup|backups|restore>".into(),
        ));
    }

    match args[0].to_lowercase().as_str() {
        "show" => cmd_show(context),
        "set" => {
            let (Some(key), Some(value)) = (args.get(1), args.get(2)) else {
                return Err(CommandError::InvalidArguments(
                    "usage: config set <key> <value>".into(),
                ));
            };
            cmd_set(context, key, value)
        }
        "backup" => cmd_backup(context, &args[1..]),
        "backups" => cmd_backups(context),
        "restore" => {
            let Some(reference) = args.get(1) else {
                return Err(CommandError::InvalidArguments(
                    "usage: config restore <backup|index>".into(),
                ));
            };
            cmd_restore(context, reference)
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{}`",
            other
        ))),
    }
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    };
    let file_name = context
        .config_manager
        .backup(&context.config, note.as_deref())
        .map_err(CommandError::from_core)?;
    io::print_success(format!("Configuration backup saved: {}", file_name));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext) -> CommandResult {
    let backups = context
        .config_manager
        .list_backups()
        .map_err(CommandError::from_core)?;
    if backups.is_empty() {
        io::print_warning("No configuration backups found.");
        return Ok(());
    }
    io::print_info("Available configuration backups:");
    for (index, name) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", index + 1, name));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, reference: &str) -> CommandResult {
    let backups = context
        .config_manager
        .list_backups()
        .map_err(CommandError::from_core)?;
    if backups.is_empty() {
        return Err(CommandError::InvalidArguments(
            "no configuration backups available".into(),
        ));
    }
    let target = if let Ok(index_raw) = reference.parse::<usize>() {
        let index = index_raw.saturating_sub(1);
        backups
            .get(index)
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "configuration backup index {} out of range",
                    reference
                ))
            })?
            .clone()
    } else {
        backups
            .iter()
            .find(|candidate| candidate.contains(reference))
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no configuration backup matches reference `{}`",
                    reference
                ))
            })?
    };

    let restored = context
        .config_manager
        .restore(&target)
        .map_err(CommandError::from_core)?;
    context.config = restored;
    context.persist_config()?;
    output::set_preferences(output::OutputPreferences {
        screen_reader_mode: context.config.screen_reader_mode,
        quiet_mode: false,
    });
    io::print_success(format!("Configuration restored from `{}`.", target));
    Ok(())
}

fn cmd_show(context: &mut ShellContext) -> CommandResult {
    let formatter = Formatter::new();
    formatter.print_header("Configuration");
    io::print_info(format!("  Locale: {}", context.config.locale));
    io::print_info(format!("  Currency: {}", context.config.currency));
    io::print_info(format!(
        "  Theme: {}",
        context.config.theme.as_deref().unwrap_or("default")
    ));
    io::print_info(format!(
        "  Last opened workspace: {}",
        context
            .config
            .last_opened_workspace
            .as_deref()
            .unwrap_or("(none)")
    ));
    io::print_info(format!(
        "  Default frequency: {}",
        context.config.default_frequency
    ));
    io::print_info(format!(
        "  Screen reader mode: {}",
        if context.config.screen_reader_mode {
            "on"
        } else {
            "off"
        }
    ));
    Ok(())
}

fn cmd_set(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    match key.to_lowercase().as_str() {
        "locale" => context.config.locale = value.to_string(),
        "currency" => context.config.currency = value.to_uppercase(),
        "theme" => {
            if value.eq_ignore_ascii_case("none") || value.is_empty() {
                context.config.theme = None;
            } else {
                context.config.theme = Some(value.to_string());
            }
        }
        "last_opened_workspace" => {
            if value.eq_ignore_ascii_case("none") || value.is_empty() {
                context.config.last_opened_workspace = None;
            } else {
                context.config.last_opened_workspace = Some(value.to_string());
            }
        }
        "default_frequency" => {
            if Frequency::parse(value).is_none() {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown frequency `{}` (weekly, biweekly, monthly, quarterly, \
                     semiannual, annual)",
                    value
                )));
            }
            context.config.default_frequency = value.to_lowercase();
        }
        "screen_reader_mode" => {
            let enabled = match value.to_lowercase().as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                _ => {
                    return Err(CommandError::InvalidArguments(
                        "screen_reader_mode must be on or off".into(),
                    ))
                }
            };
            context.config.screen_reader_mode = enabled;
            output::set_preferences(output::OutputPreferences {
                screen_reader_mode: enabled,
                quiet_mode: false,
            });
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown config key `{}`",
                other
            )))
        }
    }
    context.persist_config()?;
    io::print_success("Configuration updated.");
    Ok(())
}
