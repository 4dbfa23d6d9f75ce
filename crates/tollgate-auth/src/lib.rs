//! # Tollgate Auth
//!
//! Principal claims and the signed-token codec.
//!
//! - [`claims`]: the [`Principal`] asserted by a token and the JWT [`Claims`] that carry it
//! - [`codec`]: [`TokenCodec`], which issues and verifies access and refresh tokens
//!
//! # Token Types
//!
//! - **Access token**: short-lived, stateless; valid purely by signature and expiry
//! - **Refresh token**: longer-lived, signed with a separate secret and also
//!   tracked server-side so it can be revoked
//!
//! # Example
//!
//! ```ignore
//! use tollgate_auth::{Principal, TokenCodec};
//! use tollgate_config::JwtConfig;
//!
//! let codec = TokenCodec::new(&JwtConfig::from_env()?);
//!
//! let issued = codec.issue_access(&principal)?;
//! let verified = codec.verify_access(&issued.token)?;
//! assert_eq!(verified, principal);
//! ```

pub mod claims;
pub mod codec;

// Re-export commonly used types at crate root
pub use claims::{Claims, Principal};
pub use codec::{IssuedToken, TokenCodec, TokenError, verify_token};
