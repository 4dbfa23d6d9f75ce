//! Role and capability model.
//!
//! Each capability is one bit of a [`Capabilities`] bitfield. A [`Role`]
//! grants the bitwise-OR of the capabilities listed for it in the static
//! [`PermissionTable`]. The table is built once at startup and is read-only
//! afterwards, so lookups are pure and need no synchronization.
//!
//! # Example
//!
//! ```ignore
//! use tollgate_core::permissions::{PermissionTable, Role, BASELINE, MANAGE_CONTENT};
//!
//! let table = PermissionTable::standard();
//! let caps = table.capabilities_for(Role::Editor);
//!
//! assert!(caps.contains(BASELINE | MANAGE_CONTENT));
//! ```

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Capability bits
// =============================================================================

/// Baseline access granted to every authenticated principal
pub const BASELINE: Capabilities = Capabilities(1 << 0);
/// Permission to manage content
pub const MANAGE_CONTENT: Capabilities = Capabilities(1 << 1);
/// Permission to manage user accounts and their roles
pub const MANAGE_ACCOUNTS: Capabilities = Capabilities(1 << 2);

const CAPABILITY_NAMES: &[(&str, Capabilities)] = &[
    ("baseline", BASELINE),
    ("manage_content", MANAGE_CONTENT),
    ("manage_accounts", MANAGE_ACCOUNTS),
];

/// A set of capabilities packed into an unsigned bitfield.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = u32)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const EMPTY: Capabilities = Capabilities(0);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every bit of `other` is also set in `self`.
    #[inline]
    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: Capabilities) -> Self {
        Self(self.0 | other.0)
    }

    /// Names of the known capabilities set in this bitfield, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        CAPABILITY_NAMES
            .iter()
            .filter(|(_, cap)| self.contains(*cap))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<Capabilities> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capabilities>>(iter: I) -> Self {
        iter.into_iter().fold(Capabilities::EMPTY, |acc, cap| acc | cap)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capabilities({:#05b} {:?})", self.0, self.names())
    }
}

// =============================================================================
// Roles
// =============================================================================

/// The closed set of roles a user account can hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    User,
    Editor,
    Admin,
}

const ROLE_COUNT: usize = 3;

impl Role {
    pub const ALL: [Role; ROLE_COUNT] = [Role::User, Role::Editor, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    const fn index(self) -> usize {
        match self {
            Role::User => 0,
            Role::Editor => 1,
            Role::Admin => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

// =============================================================================
// Role table
// =============================================================================

fn standard_grants(role: Role) -> &'static [Capabilities] {
    match role {
        Role::User => &[BASELINE],
        Role::Editor => &[BASELINE, MANAGE_CONTENT],
        Role::Admin => &[BASELINE, MANAGE_CONTENT, MANAGE_ACCOUNTS],
    }
}

/// Immutable role to capability mapping.
///
/// Bitfields are folded once at construction; [`capabilities_for`] is a
/// plain array read.
///
/// [`capabilities_for`]: PermissionTable::capabilities_for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionTable {
    grants: [Capabilities; ROLE_COUNT],
}

impl PermissionTable {
    pub fn standard() -> Self {
        Self::from_grants(standard_grants)
    }

    /// Builds a table from a per-role list of capability bits.
    pub fn from_grants(grants: impl Fn(Role) -> &'static [Capabilities]) -> Self {
        let mut folded = [Capabilities::EMPTY; ROLE_COUNT];
        for role in Role::ALL {
            folded[role.index()] = grants(role).iter().copied().collect();
        }
        Self { grants: folded }
    }

    pub fn capabilities_for(&self, role: Role) -> Capabilities {
        self.grants[role.index()]
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}
