//! Staff roles and unit-scoped visibility.
//!
//! `admin` sees and manages everything. `master` manages the fleet of its
//! own unit. `comum` reads its own unit and works pendencies.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MASTER: &str = "master";
pub const ROLE_COMUM: &str = "comum";

/// Role claim carried by driver access tokens.
pub const ROLE_DRIVER: &str = "driver";

pub const STAFF_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MASTER, ROLE_COMUM];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Master,
    Comum,
}

impl Role {
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        match name {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MASTER => Ok(Role::Master),
            ROLE_COMUM => Ok(Role::Comum),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                STAFF_ROLES.join(", ")
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Master => ROLE_MASTER,
            Role::Comum => ROLE_COMUM,
        }
    }

    pub fn can_manage_users(self) -> bool {
        self == Role::Admin
    }

    /// Drivers, plates, vehicles, content, checklists and documents.
    pub fn can_manage_fleet(self) -> bool {
        matches!(self, Role::Admin | Role::Master)
    }

    pub fn can_resolve_pendencies(self) -> bool {
        true
    }
}

/// Which units a staff member may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitScope {
    All,
    Unit(String),
}

impl UnitScope {
    pub fn for_role(role: Role, unit: &str) -> Self {
        match role {
            Role::Admin => UnitScope::All,
            Role::Master | Role::Comum => UnitScope::Unit(unit.to_string()),
        }
    }

    pub fn allows(&self, unit: &str) -> bool {
        match self {
            UnitScope::All => true,
            UnitScope::Unit(own) => own == unit,
        }
    }

    /// Unit filter to bind into list queries (`$n IS NULL OR unit = $n`).
    pub fn filter(&self) -> Option<&str> {
        match self {
            UnitScope::All => None,
            UnitScope::Unit(own) => Some(own.as_str()),
        }
    }

    /// Error out when a record from `unit` is outside this scope.
    pub fn ensure(&self, unit: &str) -> Result<(), CoreError> {
        if self.allows(unit) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Records of unit '{unit}' are outside your scope"
            )))
        }
    }

    /// Pick the unit for a new record: non-admins always write into their own unit.
    pub fn resolve_unit(&self, requested: Option<&str>) -> Result<String, CoreError> {
        match (self, requested) {
            (UnitScope::Unit(own), None) => Ok(own.clone()),
            (UnitScope::Unit(own), Some(req)) if req == own => Ok(own.clone()),
            (UnitScope::Unit(_), Some(req)) => Err(CoreError::Forbidden(format!(
                "Cannot create records for unit '{req}'"
            ))),
            (UnitScope::All, Some(req)) if !req.trim().is_empty() => Ok(req.trim().to_string()),
            (UnitScope::All, _) => Err(CoreError::Validation("unit must not be empty".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_known_roles() {
        assert_eq!(Role::parse("admin").unwrap(), Role::Admin);
        assert_eq!(Role::parse("master").unwrap(), Role::Master);
        assert_eq!(Role::parse("comum").unwrap(), Role::Comum);
        assert_matches!(Role::parse("driver"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn capabilities_by_role() {
        assert!(Role::Admin.can_manage_users());
        assert!(!Role::Master.can_manage_users());
        assert!(Role::Master.can_manage_fleet());
        assert!(!Role::Comum.can_manage_fleet());
        assert!(Role::Comum.can_resolve_pendencies());
    }

    #[test]
    fn admin_scope_sees_all_units() {
        let scope = UnitScope::for_role(Role::Admin, "Matriz");
        assert!(scope.allows("Filial"));
        assert_eq!(scope.filter(), None);
    }

    #[test]
    fn unit_scope_is_restricted() {
        let scope = UnitScope::for_role(Role::Comum, "Filial");
        assert!(scope.allows("Filial"));
        assert!(!scope.allows("Matriz"));
        assert_eq!(scope.filter(), Some("Filial"));
        assert_matches!(scope.ensure("Matriz"), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn resolve_unit_for_new_records() {
        let master = UnitScope::for_role(Role::Master, "Filial");
        assert_eq!(master.resolve_unit(None).unwrap(), "Filial");
        assert_eq!(master.resolve_unit(Some("Filial")).unwrap(), "Filial");
        assert_matches!(master.resolve_unit(Some("Matriz")), Err(CoreError::Forbidden(_)));

        let admin = UnitScope::All;
        assert_eq!(admin.resolve_unit(Some(" Matriz ")).unwrap(), "Matriz");
        assert_matches!(admin.resolve_unit(None), Err(CoreError::Validation(_)));
    }
}
