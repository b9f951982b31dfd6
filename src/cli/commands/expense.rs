use uuid::Uuid;

use crate::cli::core::{
    parse_date, parse_index, today, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::render_table;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::formatting::Formatter;
use crate::core::services::ExpenseService;
use crate::workspace::{Expense, Frequency, PaymentMethod, Recurrence};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "expense",
        "Manage expenses and recurring templates",
        "expense <add|recurring|list|show|note|total|materialize|remove> ...",
        cmd_expense,
    )]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: expense <add|recurring|list|show|note|total|materialize|remove>".into(),
        ));
    }

    match args[0].to_lowercase().as_str() {
        "add" => cmd_add(context, &args[1..]),
        "recurring" => cmd_recurring(context, &args[1..]),
        "list" => cmd_list(context, &args[1..]),
        "show" => cmd_show(context, &args[1..]),
        "note" => cmd_note(context, &args[1..]),
        "total" => cmd_total(context, &args[1..]),
        "materialize" => cmd_materialize(context, &args[1..]),
        "remove" => cmd_remove(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown expense subcommand `{}`",
            other
        ))),
    }
}

fn parse_method(raw: &str) -> Result<PaymentMethod, CommandError> {
    PaymentMethod::parse(raw).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "unknown payment method `{}` (transfer, card, cash, debit)",
            raw
        ))
    })
}

fn parse_amount(raw: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments("unit value must be numeric".into()))
}

fn parse_quantity(raw: Option<&&str>) -> Result<u32, CommandError> {
    match raw {
        Some(token) => token
            .parse::<u32>()
            .map_err(|_| CommandError::InvalidArguments("quantity must be a whole number".into())),
        None => Ok(1),
    }
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 5 {
        return Err(CommandError::InvalidArguments(
            "usage: expense add <name> <category> <YYYY-MM-DD> <method> <unit-value> [quantity]"
                .into(),
        ));
    }
    let creator = context.require_active_user()?;
    let payment_date = parse_date(args[2])?;
    let method = parse_method(args[3])?;
    let unit_value = parse_amount(args[4])?;
    let quantity = parse_quantity(args.get(5))?;

    let expense = Expense::new(
        args[0],
        args[1],
        payment_date,
        method,
        unit_value,
        quantity,
        creator,
    );
    let name = expense.name.clone();
    context.with_workspace_mut(|workspace| {
        ExpenseService::add(workspace, expense).map_err(CommandError::from)
    })?;
    io::print_success(format!("Expense `{}` added.", name));
    Ok(())
}

fn cmd_recurring(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 5 {
        return Err(CommandError::InvalidArguments(
            "usage: expense recurring <name> <category> <start> <method> <unit-value> \
             [quantity] [frequency] [end]"
                .into(),
        ));
    }
    let creator = context.require_active_user()?;
    let start_date = parse_date(args[2])?;
    let method = parse_method(args[3])?;
    let unit_value = parse_amount(args[4])?;
    let quantity = parse_quantity(args.get(5))?;

    let frequency_token = args
        .get(6)
        .map(|token| token.to_string())
        .unwrap_or_else(|| context.config.default_frequency.clone());
    let frequency = match Frequency::parse(&frequency_token) {
        Some(frequency) => frequency,
        None => {
            context.print_warning(&format!(
                "Unrecognized frequency `{}`; defaulting to monthly.",
                frequency_token
            ));
            Frequency::Monthly
        }
    };

    let mut recurrence = Recurrence::new(start_date, frequency);
    if let Some(raw_end) = args.get(7) {
        recurrence = recurrence.until(parse_date(raw_end)?);
    }

    let expense = Expense::new(
        args[0],
        args[1],
        start_date,
        method,
        unit_value,
        quantity,
        creator,
    )
    .with_recurrence(recurrence);
    let name = expense.name.clone();
    context.with_workspace_mut(|workspace| {
        ExpenseService::add(workspace, expense).map_err(CommandError::from)
    })?;
    io::print_success(format!(
        "Recurring template `{}` added ({}).",
        name,
        frequency.label()
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = args.first().map(|raw| raw.to_lowercase());
    context.with_workspace(|workspace| {
        let expenses: Vec<_> = ExpenseService::list(workspace)
            .into_iter()
            .filter(|expense| match filter.as_deref() {
                Some("templates") => expense.is_template(),
                Some("occurrences") => !expense.is_template(),
                _ => true,
            })
            .collect();
        if expenses.is_empty() {
            io::print_warning("No expenses match.");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = expenses
            .iter()
            .enumerate()
            .map(|(index, expense)| {
                let kind = match &expense.recurrence {
                    Some(rule) => rule.frequency.label().to_string(),
                    None => "-".into(),
                };
                vec![
                    index.to_string(),
                    expense.name.clone(),
                    expense.category.clone(),
                    expense.payment_date.format("%Y-%m-%d").to_string(),
                    format!("{:.2}", expense.amount()),
                    kind,
                ]
            })
            .collect();
        render_table(
            &["#", "Name", "Category", "Payment date", "Amount", "Recurs"],
            &rows,
        );
        Ok(())
    })
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: expense show <index>".into(),
        ));
    };
    let index = parse_index(raw, "expense")?;
    let expense = context.with_workspace(|workspace| {
        workspace
            .expenses
            .get(index)
            .cloned()
            .ok_or_else(|| CommandError::InvalidArguments("expense index out of range".into()))
    })?;

    let formatter = Formatter::new();
    formatter.print_header(format!("Expense: {}", expense.name));
    formatter.print_detail(format!("Category: {}", expense.category));
    formatter.print_detail(format!(
        "Payment date: {}",
        context.format_date(expense.payment_date)
    ));
    formatter.print_detail(format!("Method: {}", expense.payment_method.label()));
    formatter.print_detail(format!(
        "Amount: {} ({} x {})",
        context.format_amount(expense.amount()),
        expense.unit_value,
        expense.quantity
    ));
    if let Some(rule) = &expense.recurrence {
        let end = rule
            .end_date
            .map(|date| context.format_date(date))
            .unwrap_or_else(|| "open-ended".into());
        formatter.print_detail(format!(
            "Recurs {} from {} until {}",
            rule.frequency.label(),
            context.format_date(rule.start_date),
            end
        ));
    }
    if let Some(notes) = &expense.notes {
        formatter.print_detail(format!("Notes: {}", notes));
    }
    context.await_menu_escape()
}

fn cmd_note(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: expense note <index> <text>".into(),
        ));
    };
    let index = parse_index(raw, "expense")?;
    let text = args[1..].join(" ");
    let (expense_id, name) = expense_at(context, index)?;
    context.with_workspace_mut(|workspace| {
        ExpenseService::update(workspace, expense_id, |expense| {
            expense.notes = if text.is_empty() { None } else { Some(text.clone()) };
        })
        .map_err(CommandError::from)
    })?;
    io::print_success(format!("Expense `{}` updated.", name));
    Ok(())
}

fn cmd_total(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: expense total <YYYY-MM>".into(),
        ));
    };
    let (year, month) = parse_year_month(raw)?;
    let total =
        context.with_workspace(|workspace| Ok(ExpenseService::total_for_month(workspace, year, month)))?;
    io::print_info(format!(
        "Total for {}: {}",
        raw,
        context.format_amount(total)
    ));
    Ok(())
}

fn cmd_materialize(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let as_of = match args.first() {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let actor = context.active_user;
    let outcome = context.with_workspace_mut(|workspace| {
        ExpenseService::materialize(workspace, as_of, actor).map_err(CommandError::from)
    })?;

    if outcome.created > 0 {
        io::print_success(format!(
            "Materialized {} occurrence(s), {} skipped.",
            outcome.created, outcome.skipped
        ));
    } else {
        io::print_info(format!(
            "No new occurrences ({} skipped).",
            outcome.skipped
        ));
    }
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "usage: expense remove <index>".into(),
        ));
    };
    let index = parse_index(raw, "expense")?;
    let (expense_id, name) = expense_at(context, index)?;

    if !context.confirm(&format!("Remove expense `{}`?", name))? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    context.with_workspace_mut(|workspace| {
        ExpenseService::remove(workspace, expense_id).map_err(CommandError::from)
    })?;
    io::print_success(format!("Expense `{}` removed.", name));
    Ok(())
}

fn expense_at(context: &ShellContext, index: usize) -> Result<(Uuid, String), CommandError> {
    context.with_workspace(|workspace| {
        workspace
            .expenses
            .get(index)
            .map(|expense| (expense.id, expense.name.clone()))
            .ok_or_else(|| CommandError::InvalidArguments("expense index out of range".into()))
    })
}

fn parse_year_month(raw: &str) -> Result<(i32, u32), CommandError> {
    let error = || {
        CommandError::InvalidArguments(format!(
            "`{raw}` is not a valid month (expected YYYY-MM)"
        ))
    };
    let (year, month) = raw.split_once('-').ok_or_else(error)?;
    let year = year.parse::<i32>().map_err(|_| error())?;
    let month = month.parse::<u32>().map_err(|_| error())?;
    if !(1..=12).contains(&month) {
        return Err(error());
    }
    Ok((year, month))
}
