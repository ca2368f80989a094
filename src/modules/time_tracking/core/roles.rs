// Role-check contract consumed by the views. Enforcement lives on the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Chair,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ClockIn,
    ClockOut,
    ViewOwnLogs,
    ExportOwnLogs,
    ViewTeam,
    ViewMemberTimesheet,
    ViewTeamSummary,
    ManageUsers,
    ViewSystemStats,
    ManageCommittees,
    ManageAccessCodes,
}

const MEMBER: &[Permission] = &[
    Permission::ClockIn,
    Permission::ClockOut,
    Permission::ViewOwnLogs,
    Permission::ExportOwnLogs,
];

const CHAIR: &[Permission] = &[
    Permission::ClockIn,
    Permission::ClockOut,
    Permission::ViewOwnLogs,
    Permission::ExportOwnLogs,
    Permission::ViewTeam,
    Permission::ViewMemberTimesheet,
    Permission::ViewTeamSummary,
];

const ADMIN: &[Permission] = &[
    Permission::ClockIn,
    Permission::ClockOut,
    Permission::ViewOwnLogs,
    Permission::ExportOwnLogs,
    Permission::ViewTeam,
    Permission::ViewMemberTimesheet,
    Permission::ViewTeamSummary,
    Permission::ManageUsers,
    Permission::ViewSystemStats,
    Permission::ManageCommittees,
    Permission::ManageAccessCodes,
];

impl Role {
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::Admin => ADMIN,
            Role::Chair => CHAIR,
            Role::Member => MEMBER,
        }
    }

    pub fn can(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Chair => "chair",
            Role::Member => "member",
        };
        f.write_str(name)
    }
}
