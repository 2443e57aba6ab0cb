// src/service/mod.rs
pub mod oidc_service;
pub mod pairing_service;
pub mod participant_service;
pub mod retention_service;
