// src/utils/mod.rs

pub mod code;
pub mod logging;
pub mod session;
