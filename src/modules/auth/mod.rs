//! Session Issuance Protocol: registration, login, refresh and logout.

pub mod controller;
pub mod router;
pub mod service;
