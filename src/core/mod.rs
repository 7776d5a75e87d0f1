// src/core/mod.rs

//! Core data structures and types

// Declare modules within core
pub mod error;
pub mod matrix;
pub mod register;

// Re-export public types for convenient access via `qcbm::core::TypeName`
pub use error::QcbmError;
pub use matrix::DenseMatrix;
pub use register::Register;
