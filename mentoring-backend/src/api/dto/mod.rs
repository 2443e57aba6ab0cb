// src/api/dto/mod.rs
pub mod enrollment_dto;
pub mod oidc_dto;
pub mod participant_dto;
