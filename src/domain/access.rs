use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Operator,
    Admin,
}

/// The authenticated caller of a query or command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i32,
    pub role: Role,
}

impl Requester {
    pub fn customer(user_id: i32) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    /// Operators and admins may read and move any order.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Operator | Role::Admin)
    }

    pub fn can_view(&self, owner_id: i32) -> bool {
        self.is_staff() || self.user_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_can_view_own_order() {
        assert!(Requester::customer(7).can_view(7));
    }

    #[test]
    fn customer_cannot_view_foreign_order() {
        assert!(!Requester::customer(7).can_view(8));
    }

    #[test]
    fn staff_can_view_any_order() {
        for role in [Role::Operator, Role::Admin] {
            let requester = Requester { user_id: 1, role };
            assert!(requester.can_view(99));
        }
    }

    #[test]
    fn missing_role_defaults_to_customer() {
        assert_eq!(Role::default(), Role::Customer);
        let role: Role = serde_json::from_str("\"operator\"").unwrap();
        assert_eq!(role, Role::Operator);
    }
}
