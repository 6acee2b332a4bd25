// src/models/mod.rs

pub mod question;
pub mod response;
pub mod student;
pub mod test_record;
