//! Access-role gate for the portal features.
//!
//! Roles cascade: admin sees everything, supervisors everything except
//! settings, regular users only the day-to-day features. Per-account
//! overrides can grant extra capabilities on top of the role defaults but
//! never revoke them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supervisor,
    User,
}

impl Role {
    /// Parse the stored role string. Unknown values map to the least
    /// privileged role.
    pub fn parse(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "supervisor" => Role::Supervisor,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::User => "user",
        }
    }

    /// Default capability set for this role.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Admin => Capabilities {
                employees: true,
                clients: true,
                tasks: true,
                messaging: true,
                logs: true,
                settings: true,
            },
            Role::Supervisor => Capabilities {
                employees: true,
                clients: true,
                tasks: true,
                messaging: true,
                logs: true,
                settings: false,
            },
            Role::User => Capabilities {
                employees: false,
                clients: false,
                tasks: true,
                messaging: true,
                logs: false,
                settings: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    Employees,
    Clients,
    Tasks,
    Messaging,
    Logs,
    Settings,
}

/// Per-feature access flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub employees: bool,
    pub clients: bool,
    pub tasks: bool,
    pub messaging: bool,
    pub logs: bool,
    pub settings: bool,
}

impl Capabilities {
    pub fn allows(&self, feature: Feature) -> bool {
        match feature {
            Feature::Employees => self.employees,
            Feature::Clients => self.clients,
            Feature::Tasks => self.tasks,
            Feature::Messaging => self.messaging,
            Feature::Logs => self.logs,
            Feature::Settings => self.settings,
        }
    }

    /// Union with per-account overrides. Overrides only add.
    pub fn with_overrides(self, overrides: Capabilities) -> Capabilities {
        Capabilities {
            employees: self.employees || overrides.employees,
            clients: self.clients || overrides.clients,
            tasks: self.tasks || overrides.tasks,
            messaging: self.messaging || overrides.messaging,
            logs: self.logs || overrides.logs,
            settings: self.settings || overrides.settings,
        }
    }
}

/// Gate check used by the portal views.
pub fn can_access(role: Role, overrides: Option<Capabilities>, feature: Feature) -> bool {
    let capabilities = match overrides {
        Some(extra) => role.capabilities().with_overrides(extra),
        None => role.capabilities(),
    };
    capabilities.allows(feature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_strings() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse(" Supervisor "), Role::Supervisor);
        assert_eq!(Role::parse("user"), Role::User);
        // Unknown values fall back to least privilege
        assert_eq!(Role::parse("root"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }

    #[test]
    fn test_role_cascade() {
        assert!(can_access(Role::Admin, None, Feature::Settings));
        assert!(can_access(Role::Supervisor, None, Feature::Logs));
        assert!(!can_access(Role::Supervisor, None, Feature::Settings));
        assert!(can_access(Role::User, None, Feature::Messaging));
        assert!(!can_access(Role::User, None, Feature::Employees));
    }

    #[test]
    fn test_overrides_only_add() {
        let extra = Capabilities {
            logs: true,
            ..Capabilities::default()
        };
        assert!(can_access(Role::User, Some(extra), Feature::Logs));
        // Defaults that the override leaves false stay granted
        assert!(can_access(Role::User, Some(extra), Feature::Tasks));
        assert!(!can_access(Role::User, Some(extra), Feature::Settings));
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Admin, Role::Supervisor, Role::User] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }
}
