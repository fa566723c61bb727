// MAPA Report Data
// This crate handles persistence for patients, studies, reports and the authoring profile

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
