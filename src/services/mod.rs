// Business logic services module
// This module contains the core business logic services

pub mod credential_store;
pub mod photo_storage;
pub mod session_manager;
