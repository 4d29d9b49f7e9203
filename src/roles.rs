use serde::{Deserialize, Serialize};

/// Staff/user role names keyed by the numeric ids the backend hands out.
///
/// Modelled as a total lookup: every i64 maps to a role, unknown ids fall
/// back to [`Role::Unknown`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Coordinator,
    Supervisor,
    Parent,
    Unknown,
}

impl Role {
    pub fn from_id(id: i64) -> Self {
        match id {
            1 => Role::Admin,
            2 => Role::Coordinator,
            3 => Role::Supervisor,
            4 => Role::Parent,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Coordinator => "Coordinator",
            Role::Supervisor => "Supervisor",
            Role::Parent => "Parent",
            Role::Unknown => "Unknown",
        }
    }

    /// The assignable roles, in id order. `Unknown` is a fallback, not an
    /// assignable role, so it is not listed.
    pub fn variants() -> [(i64, Role); 4] {
        [
            (1, Role::Admin),
            (2, Role::Coordinator),
            (3, Role::Supervisor),
            (4, Role::Parent),
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
