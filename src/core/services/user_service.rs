//! User directory maintenance and the privileged admin actions.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::workspace::{User, Workspace};

/// Provides validated helpers for the workspace's user directory. The
/// destructive operations require the acting user to be an administrator.
pub struct UserService;

impl UserService {
    /// Registers a new user and returns its identifier. Names must be
    /// unique case-insensitively.
    pub fn register(workspace: &mut Workspace, user: User) -> ServiceResult<Uuid> {
        let name = user.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("User name cannot be empty".into()));
        }
        if workspace.user_by_name(name).is_some() {
            return Err(ServiceError::Invalid(format!(
                "User `{name}` already exists"
            )));
        }
        Ok(workspace.add_user(user))
    }

    /// Deletes a user account. Only administrators may do this, and never to
    /// their own account.
    pub fn remove(workspace: &mut Workspace, acting: Uuid, target: Uuid) -> ServiceResult<User> {
        Self::require_admin(workspace, acting, "User removal")?;
        if acting == target {
            return Err(ServiceError::Invalid(
                "Administrators cannot remove their own account".into(),
            ));
        }
        workspace
            .remove_user(target)
            .ok_or_else(|| ServiceError::Invalid("User not found".into()))
    }

    /// Flags a user account for a mandatory password reset. Admin-only;
    /// credential storage itself lives outside this application.
    pub fn reset_password(
        workspace: &mut Workspace,
        acting: Uuid,
        target: Uuid,
    ) -> ServiceResult<()> {
        Self::require_admin(workspace, acting, "Password reset")?;
        let user = workspace
            .user_mut(target)
            .ok_or_else(|| ServiceError::Invalid("User not found".into()))?;
        user.must_reset_password = true;
        workspace.touch();
        Ok(())
    }

    /// Returns a snapshot of the workspace's users.
    pub fn list(workspace: &Workspace) -> Vec<&User> {
        workspace.users.iter().collect()
    }

    fn require_admin(workspace: &Workspace, acting: Uuid, action: &str) -> ServiceResult<()> {
        let actor = workspace.user(acting).ok_or(ServiceError::NoActiveUser)?;
        if !actor.is_admin() {
            return Err(ServiceError::NotAuthorized(action.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::UserRole;

    fn workspace_with_admin() -> (Workspace, Uuid) {
        let mut workspace = Workspace::new("Users");
        let admin =
            UserService::register(&mut workspace, User::new("root", UserRole::Admin)).unwrap();
        (workspace, admin)
    }

    #[test]
    fn members_cannot_remove_users() {
        let (mut workspace, _admin) = workspace_with_admin();
        let member =
            UserService::register(&mut workspace, User::new("ana", UserRole::Member)).unwrap();
        let other =
            UserService::register(&mut workspace, User::new("bruno", UserRole::Member)).unwrap();

        let err = UserService::remove(&mut workspace, member, other)
            .expect_err("member must not remove accounts");
        assert!(matches!(err, ServiceError::NotAuthorized(_)));
    }

    #[test]
    fn admins_cannot_remove_themselves() {
        let (mut workspace, admin) = workspace_with_admin();
        let err = UserService::remove(&mut workspace, admin, admin)
            .expect_err("self removal must fail");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn reset_password_flags_the_target() {
        let (mut workspace, admin) = workspace_with_admin();
        let member =
            UserService::register(&mut workspace, User::new("ana", UserRole::Member)).unwrap();
        UserService::reset_password(&mut workspace, admin, member).unwrap();
        assert!(workspace.user(member).unwrap().must_reset_password);
    }
}
