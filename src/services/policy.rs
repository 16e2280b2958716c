// Table des permissions : action -> rôles autorisés (+ propriétaire éventuel).
// Chaque endpoint appelle `check` une seule fois avec l'action qu'il réalise.
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateUser,
    ListUsers,
    ViewUser,
    UpdateUser,
    DeleteUser,
    CreateKermesse,
    ViewKermesse,
    UpdateKermesse,
    DeleteKermesse,
    ManageKermesseMembers,
    CreateStand,
    ListStands,
    UpdateStand,
    DeleteStand,
    GivePoints,
    CreateProduct,
    ListProducts,
    UpdateProduct,
    DeleteProduct,
    ManageJetons,
    LinkChildren,
    GiveCoins,
}

pub struct Rule {
    pub action: Action,
    pub roles: &'static [Role],
    /// Le propriétaire de la ressource passe même sans le rôle
    pub owner_allowed: bool,
}

const ADMIN: &[Role] = &[Role::Admin];

pub const RULES: &[Rule] = &[
    Rule { action: Action::CreateUser, roles: ADMIN, owner_allowed: false },
    Rule { action: Action::ListUsers, roles: ADMIN, owner_allowed: false },
    Rule { action: Action::ViewUser, roles: ADMIN, owner_allowed: false },
    Rule { action: Action::UpdateUser, roles: ADMIN, owner_allowed: false },
    Rule { action: Action::DeleteUser, roles: ADMIN, owner_allowed: false },
    Rule { action: Action::CreateKermesse, roles: &[Role::Admin, Role::Organizer], owner_allowed: false },
    // propriétaire = créateur, organisateur ou participant
    Rule { action: Action::ViewKermesse, roles: ADMIN, owner_allowed: true },
    Rule { action: Action::UpdateKermesse, roles: ADMIN, owner_allowed: true },
    Rule { action: Action::DeleteKermesse, roles: ADMIN, owner_allowed: true },
    // propriétaire = créateur ou organisateur
    Rule { action: Action::ManageKermesseMembers, roles: ADMIN, owner_allowed: true },
    Rule { action: Action::CreateStand, roles: &[Role::Admin, Role::StandHolder], owner_allowed: false },
    Rule { action: Action::ListStands, roles: ADMIN, owner_allowed: false },
    Rule { action: Action::UpdateStand, roles: ADMIN, owner_allowed: true },
    Rule { action: Action::DeleteStand, roles: ADMIN, owner_allowed: true },
    Rule { action: Action::GivePoints, roles: &[], owner_allowed: true },
    // propriétaire = teneur du stand qui vend le produit
    Rule { action: Action::CreateProduct, roles: ADMIN, owner_allowed: true },
    Rule { action: Action::ListProducts, roles: ADMIN, owner_allowed: false },
    Rule { action: Action::UpdateProduct, roles: ADMIN, owner_allowed: true },
    Rule { action: Action::DeleteProduct, roles: ADMIN, owner_allowed: true },
    Rule { action: Action::ManageJetons, roles: ADMIN, owner_allowed: false },
    Rule { action: Action::LinkChildren, roles: &[Role::Parent], owner_allowed: false },
    Rule { action: Action::GiveCoins, roles: &[Role::Parent], owner_allowed: false },
];

pub fn rule_for(action: Action) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| rule.action == action)
        .unwrap_or_else(|| unreachable!("no rule declared for {:?}", action))
}

pub fn is_allowed(role: Role, action: Action, is_owner: bool) -> bool {
    let rule = rule_for(action);
    rule.roles.contains(&role) || (rule.owner_allowed && is_owner)
}

/// Vérifie que l'utilisateur peut réaliser l'action.
/// `is_owner` est calculé par l'appelant (créateur, teneur du stand, ...)
pub fn check(user: &AuthUser, action: Action, is_owner: bool) -> AppResult<()> {
    if is_allowed(user.role, action, is_owner) {
        Ok(())
    } else {
        tracing::info!(user_id = user.user_id, role = %user.role, ?action, "permission denied");
        Err(AppError::Forbidden("You don't have permission to do that".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ACTIONS: [Action; 22] = [
        Action::CreateUser,
        Action::ListUsers,
        Action::ViewUser,
        Action::UpdateUser,
        Action::DeleteUser,
        Action::CreateKermesse,
        Action::ViewKermesse,
        Action::UpdateKermesse,
        Action::DeleteKermesse,
        Action::ManageKermesseMembers,
        Action::CreateStand,
        Action::ListStands,
        Action::UpdateStand,
        Action::DeleteStand,
        Action::GivePoints,
        Action::CreateProduct,
        Action::ListProducts,
        Action::UpdateProduct,
        Action::DeleteProduct,
        Action::ManageJetons,
        Action::LinkChildren,
        Action::GiveCoins,
    ];

    #[test]
    fn test_every_action_has_exactly_one_rule() {
        for action in ALL_ACTIONS {
            let count = RULES.iter().filter(|r| r.action == action).count();
            assert_eq!(count, 1, "{:?}", action);
        }
        assert_eq!(RULES.len(), ALL_ACTIONS.len());
    }

    #[test]
    fn test_admin_never_blocked_on_directory_writes() {
        let directory_writes = [
            Action::CreateUser,
            Action::UpdateUser,
            Action::DeleteUser,
            Action::CreateKermesse,
            Action::UpdateKermesse,
            Action::DeleteKermesse,
            Action::ManageKermesseMembers,
            Action::CreateStand,
            Action::UpdateStand,
            Action::DeleteStand,
            Action::CreateProduct,
            Action::UpdateProduct,
            Action::DeleteProduct,
            Action::ManageJetons,
        ];
        for action in directory_writes {
            assert!(is_allowed(Role::Admin, action, false), "{:?}", action);
        }
    }

    #[test]
    fn test_student_cannot_create_stand() {
        assert!(!is_allowed(Role::Student, Action::CreateStand, false));
        assert!(is_allowed(Role::StandHolder, Action::CreateStand, false));
    }

    #[test]
    fn test_owner_rules() {
        // Un teneur de stand modifie son stand mais pas celui d'un autre
        assert!(is_allowed(Role::StandHolder, Action::UpdateStand, true));
        assert!(!is_allowed(Role::StandHolder, Action::UpdateStand, false));

        // Seul le propriétaire du stand attribue des points, même pas l'admin
        assert!(is_allowed(Role::StandHolder, Action::GivePoints, true));
        assert!(!is_allowed(Role::Admin, Action::GivePoints, false));

        // La propriété ne suffit pas pour les actions sans owner_allowed
        assert!(!is_allowed(Role::Student, Action::ListStands, true));
    }

    #[test]
    fn test_parent_only_actions() {
        for role in Role::ALL {
            let expected = role == Role::Parent;
            assert_eq!(is_allowed(role, Action::GiveCoins, false), expected);
            assert_eq!(is_allowed(role, Action::LinkChildren, false), expected);
        }
    }

    #[test]
    fn test_check_returns_forbidden() {
        let student = AuthUser { user_id: 7, email: "eleve@ecole.fr".into(), role: Role::Student };
        match check(&student, Action::CreateKermesse, false) {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
        let organizer = AuthUser { role: Role::Organizer, ..student };
        assert!(check(&organizer, Action::CreateKermesse, false).is_ok());
    }
}
