//! Role table authorization.
//!
//! | role   | accounts                                   | dashboard |
//! |--------|--------------------------------------------|-----------|
//! | admin  | everything, including role assignment      | yes       |
//! | editor | manage non-admin accounts, no role changes | yes       |
//! | author | edit/update own account                    | yes       |
//! | member | edit/update own account                    | no        |
//! | guest  | nothing                                    | no        |

use crate::domain::{Action, Actor, AuthorizationPort, Resource, UserRole};

#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl RolePolicy {
    pub fn new() -> Self {
        Self
    }

    fn editor_allows(action: Action, resource: Resource<'_>) -> bool {
        match (action, resource) {
            (Action::UpdateRole, _) => false,
            (Action::Index, Resource::AdminDashboard) => true,
            (_, Resource::AdminDashboard) => false,
            (Action::Index | Action::New | Action::Create, Resource::Users) => true,
            (_, Resource::Users) => false,
            (_, Resource::User(target)) => !target.has_role(UserRole::Admin),
        }
    }

    fn owns(actor: &Actor, resource: Resource<'_>) -> bool {
        matches!(resource, Resource::User(target) if actor.id.as_deref() == Some(target.id.as_str()))
    }
}

impl AuthorizationPort for RolePolicy {
    fn allowed(&self, actor: &Actor, action: Action, resource: Resource<'_>) -> bool {
        if actor.is_guest() {
            return false;
        }
        if actor.has_role(UserRole::Admin) {
            return true;
        }
        if actor.has_role(UserRole::Editor) && Self::editor_allows(action, resource) {
            return true;
        }
        if actor.has_role(UserRole::Author)
            && matches!((action, resource), (Action::Index, Resource::AdminDashboard))
        {
            return true;
        }
        matches!(action, Action::Edit | Action::Update) && Self::owns(actor, resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use chrono::Utc;

    fn user(id: &str, roles: Vec<UserRole>) -> User {
        let now = Utc::now();
        User {
            id: id.into(),
            login: id.into(),
            name: None,
            email: format!("{}@example.com", id),
            password_hash: String::new(),
            roles,
            gender: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            reset_password_token: None,
            reset_password_sent_at: None,
        }
    }

    #[test]
    fn guest_is_denied_everything() {
        let policy = RolePolicy::new();
        let guest = Actor::guest();
        assert!(!policy.allowed(&guest, Action::Index, Resource::Users));
        assert!(!policy.allowed(&guest, Action::Index, Resource::AdminDashboard));
    }

    #[test]
    fn only_admin_assigns_roles() {
        let policy = RolePolicy::new();
        let admin = Actor::from_user(&user("a", vec![UserRole::Admin]));
        let editor = Actor::from_user(&user("e", vec![UserRole::Editor]));
        assert!(policy.allowed(&admin, Action::UpdateRole, Resource::Users));
        assert!(!policy.allowed(&editor, Action::UpdateRole, Resource::Users));
    }

    #[test]
    fn editor_cannot_touch_admins() {
        let policy = RolePolicy::new();
        let editor = Actor::from_user(&user("e", vec![UserRole::Editor]));
        let admin = user("a", vec![UserRole::Admin]);
        let member = user("m", vec![UserRole::Member]);
        assert!(policy.allowed(&editor, Action::Destroy, Resource::User(&member)));
        assert!(!policy.allowed(&editor, Action::Destroy, Resource::User(&admin)));
        assert!(policy.allowed(&editor, Action::Index, Resource::Users));
    }

    #[test]
    fn members_edit_only_themselves() {
        let policy = RolePolicy::new();
        let me = user("m", vec![UserRole::Member]);
        let other = user("o", vec![UserRole::Member]);
        let actor = Actor::from_user(&me);
        assert!(policy.allowed(&actor, Action::Update, Resource::User(&me)));
        assert!(!policy.allowed(&actor, Action::Update, Resource::User(&other)));
        assert!(!policy.allowed(&actor, Action::Destroy, Resource::User(&me)));
        assert!(!policy.allowed(&actor, Action::Index, Resource::AdminDashboard));
    }

    #[test]
    fn authors_reach_the_dashboard() {
        let policy = RolePolicy::new();
        let author = Actor::from_user(&user("w", vec![UserRole::Author]));
        assert!(policy.allowed(&author, Action::Index, Resource::AdminDashboard));
        assert!(!policy.allowed(&author, Action::Index, Resource::Users));
    }
}
