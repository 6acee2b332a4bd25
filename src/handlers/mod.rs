// src/handlers/mod.rs

pub mod evaluation;
pub mod student;
pub mod teacher;
