// src/models/student.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Column header of the student ledger.
pub const STUDENT_LEDGER_HEADER: [&str; 4] = ["Name", "Roll Number", "Email ID", "Unique Code"];

/// One row of the student ledger. Duplicates are allowed: every login appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSubmission {
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub unique_code: String,
}

impl StudentSubmission {
    pub fn to_row(&self) -> [&str; 4] {
        [&self.name, &self.roll_number, &self.email, &self.unique_code]
    }
}

/// Form posted on the code entry page.
#[derive(Debug, Deserialize)]
pub struct TestCodeForm {
    pub test_code: String,
}

/// Form posted on the student login page. Values are stored as typed, only
/// emptiness is checked.
#[derive(Debug, Deserialize, Validate)]
pub struct StudentLoginForm {
    #[validate(length(min = 1, max = 100, message = "Name is required."))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Roll number is required."))]
    pub roll_number: String,
    #[validate(length(min = 1, max = 254, message = "Email is required."))]
    pub email: String,
}
