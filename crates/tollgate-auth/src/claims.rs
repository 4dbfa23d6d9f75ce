//! Principal and JWT claim structures.
//!
//! A [`Principal`] is the identity a verified token asserts. It is derived
//! fresh from the user record at issuance time and embedded, unchanged, in
//! every token minted for it. [`Claims`] is the wire form of a principal plus
//! the registered JWT timing claims.

use serde::{Deserialize, Serialize};
use tollgate_core::permissions::{Capabilities, PermissionTable, Role};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::codec::TokenError;

/// The verified identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub capabilities: Capabilities,
}

impl Principal {
    /// Builds a principal, computing its capability snapshot from the role table.
    pub fn new(id: Uuid, full_name: impl Into<String>, role: Role, table: &PermissionTable) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            role,
            capabilities: table.capabilities_for(role),
        }
    }

    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }
}

/// JWT claims shared by access and refresh tokens.
///
/// # Fields
///
/// - `sub`: principal id
/// - `name`: display name
/// - `role`: role at issuance time
/// - `caps`: capability bitfield at issuance time
/// - `iat` / `exp`: validity window, seconds since epoch
/// - `jti`: random token id, so two tokens minted in the same second differ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub caps: Capabilities,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn for_principal(principal: &Principal, iat: i64, exp: i64) -> Self {
        Self {
            sub: principal.id.to_string(),
            name: principal.full_name.clone(),
            role: principal.role,
            caps: principal.capabilities,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Recovers the principal; a non-UUID subject means the token is malformed.
    pub fn principal(&self) -> Result<Principal, TokenError> {
        let id = Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)?;
        Ok(Principal {
            id,
            full_name: self.name.clone(),
            role: self.role,
            capabilities: self.caps,
        })
    }
}
