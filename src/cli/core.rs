//! Core CLI loop, dispatch, and shell context helpers.

use chrono::{Local, NaiveDate};
use strsim::levenshtein;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::errors::AgencyError,
    core::services::ServiceError,
    core::workspace_manager::{LoadMetadata, WorkspaceManager},
    storage::JsonStorage,
    workspace::Workspace,
};

use super::commands;
use super::io as cli_io;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};
use super::ui::prompts;
pub use crate::core::errors::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Errors surfaced by individual shell commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Workspace not loaded")]
    WorkspaceNotLoaded,
    #[error("exit requested")]
    ExitRequested,
    #[error(transparent)]
    Core(AgencyError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Interaction error: {0}")]
    Dialoguer(#[from] dialoguer::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    pub(crate) fn from_core(err: AgencyError) -> Self {
        match err {
            AgencyError::WorkspaceNotLoaded => CommandError::WorkspaceNotLoaded,
            other => CommandError::Core(other),
        }
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: WorkspaceManager,
    pub storage: JsonStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub active_user: Option<Uuid>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let storage = JsonStorage::new_default().map_err(CliError::from)?;
        let manager = WorkspaceManager::new(Box::new(storage.clone()));
        let config_manager = ConfigManager::new().map_err(CliError::from)?;
        let config = config_manager.load().map_err(CliError::from)?;
        output::set_preferences(output::OutputPreferences {
            screen_reader_mode: config.screen_reader_mode,
            quiet_mode: false,
        });

        let mut context = ShellContext {
            mode,
            registry,
            manager,
            storage,
            config_manager,
            config,
            active_user: None,
            last_command: None,
            running: true,
        };
        context.auto_load_last();
        Ok(context)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive || self.manager.has_current() {
            return;
        }
        let Some(name) = self.config.last_opened_workspace.clone() else {
            return;
        };
        if let Ok(report) = self.manager.load(&name) {
            self.report_load(&report);
            cli_io::print_success(format!("Automatically loaded last workspace `{}`.", name));
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        let name = self.manager.current_name().unwrap_or("agency");
        match self.active_user_label() {
            Some(user) => format!("{name} ({user})> "),
            None => format!("{name}> "),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action("Exit shell?").map_err(|err| CliError::Command(err.to_string()))
    }

    /// Asks the user before a destructive action. Script mode always
    /// proceeds so piped sessions stay non-interactive.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode != CliMode::Interactive {
            return Ok(true);
        }
        cli_io::confirm_action(prompt)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::WorkspaceNotLoaded => {
                self.print_error(
                    "Workspace not loaded. Use `workspace new` or `workspace load` first.",
                );
                self.print_hint("Try `workspace new Agency` to get started.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn report_load(&self, report: &LoadMetadata) {
        for warning in &report.warnings {
            cli_io::print_warning(warning);
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }

    pub(crate) fn with_workspace<T>(
        &self,
        f: impl FnOnce(&Workspace) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        self.manager
            .with_current(f)
            .map_err(CommandError::from_core)?
    }

    pub(crate) fn with_workspace_mut<T>(
        &mut self,
        f: impl FnOnce(&mut Workspace) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        self.manager
            .with_current_mut(f)
            .map_err(CommandError::from_core)?
    }

    pub(crate) fn require_active_user(&self) -> Result<Uuid, CommandError> {
        self.active_user
            .ok_or(CommandError::Service(ServiceError::NoActiveUser))
    }

    pub(crate) fn active_user_label(&self) -> Option<String> {
        let id = self.active_user?;
        self.manager
            .with_current(|workspace| workspace.user(id).map(|user| user.name.clone()))
            .ok()
            .flatten()
    }

    pub(crate) fn set_active_user(&mut self, user: Option<Uuid>) {
        self.active_user = user;
    }

    pub(crate) fn persist_config(&self) -> Result<(), CommandError> {
        self.config_manager
            .save(&self.config)
            .map_err(CommandError::from_core)
    }

    pub(crate) fn update_last_opened(&mut self, name: Option<&str>) -> CommandResult {
        self.config.last_opened_workspace = name.map(|value| value.to_string());
        self.persist_config()
    }

    pub(crate) fn format_amount(&self, value: f64) -> String {
        format!("{} {:.2}", self.config.currency, value)
    }

    pub(crate) fn format_date(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    pub(crate) fn await_menu_escape(&self) -> CommandResult {
        if self.mode != CliMode::Interactive {
            return Ok(());
        }
        cli_io::print_hint("Press ESC to return to the shell.");
        prompts::wait_for_escape().map_err(CommandError::Io)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!(
            "`{raw}` is not a valid date (expected YYYY-MM-DD)"
        ))
    })
}

pub(crate) fn parse_index(raw: &str, what: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .map_err(|_| CommandError::InvalidArguments(format!("{what} index must be numeric")))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
