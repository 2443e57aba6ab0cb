// src/api/handlers/mod.rs
pub mod enrollment_handler;
pub mod oidc_handler;
pub mod participant_handler;
pub mod system_handler;
