//! # Tollgate Core
//!
//! Core types shared by every Tollgate crate:
//!
//! - [`errors`]: the closed error taxonomy and its HTTP rendering
//! - [`password`]: bcrypt hashing and verification, offloaded from the async runtime
//! - [`permissions`]: roles, capability bits and the static role table
//!
//! # Example
//!
//! ```ignore
//! use tollgate_core::permissions::{PermissionTable, Role, MANAGE_ACCOUNTS};
//!
//! let table = PermissionTable::standard();
//! assert!(table.capabilities_for(Role::Admin).contains(MANAGE_ACCOUNTS));
//! ```

pub mod errors;
pub mod password;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorBody, ErrorKind};
pub use password::{hash_password, verify_password};
pub use permissions::{Capabilities, PermissionTable, Role};
