pub(crate) mod client;
pub(crate) mod config;
pub(crate) mod expense;
pub(crate) mod system;
pub(crate) mod task;
pub(crate) mod user;
pub(crate) mod workspace;

use super::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let definitions = system::definitions()
        .into_iter()
        .chain(workspace::definitions())
        .chain(client::definitions())
        .chain(task::definitions())
        .chain(expense::definitions())
        .chain(user::definitions())
        .chain(config::definitions());
    for entry in definitions {
        registry.register(entry);
    }
}
