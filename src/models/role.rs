use serde::{Deserialize, Serialize};
use std::fmt;

/// Rôles applicatifs. La valeur entière est celle stockée en base
/// (colonne users.role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Role {
    Admin = 1,
    Organizer = 2,
    StandHolder = 3,
    Parent = 4,
    Student = 5,
}

impl Role {
    #[cfg(test)]
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Organizer,
        Role::StandHolder,
        Role::Parent,
        Role::Student,
    ];

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Role {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Organizer),
            3 => Ok(Role::StandHolder),
            4 => Ok(Role::Parent),
            5 => Ok(Role::Student),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.as_i32()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Organizer => "organizer",
            Role::StandHolder => "stand_holder",
            Role::Parent => "parent",
            Role::Student => "student",
        };
        f.write_str(name)
    }
}
