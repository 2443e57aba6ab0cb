// src/repository/mod.rs
pub mod pairing_repository;
pub mod participant_repository;
