// src/domain/mod.rs
pub mod capability;
pub mod expiration;
pub mod pairing_model;
pub mod participant_model;
pub mod participant_role;
pub mod session_user;
