// src/store/matcher.rs

//! Fuzzy header matching for ledgers whose column names drift over time
//! ("Unique Test Code", "test code", "Code", ...).
//!
//! Headers are compared lowercased and trimmed, by substring containment.
//! Field extraction runs an ordered rule list: each rule claims the first
//! header (in file column order) that no higher-priority rule has claimed.

use crate::models::test_record::{MISSING_FIELD, TestRecord};

/// Substrings that mark a column as holding the test code.
pub const CODE_KEYWORDS: &[&str] = &["unique", "test code", "code"];

/// Canonical fields of a test ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Code,
    Faculty,
    TotalMarks,
    QuestionPdf,
    Duration,
    Date,
    Time,
    Subject,
    Name,
}

/// Rules in priority order. `Faculty` precedes `Name` so that "Faculty Name"
/// is never taken for the test name, and `Code` goes first so that
/// "Unique Test Code" is never taken for anything else.
pub const FIELD_RULES: &[(Field, &[&str])] = &[
    (Field::Code, CODE_KEYWORDS),
    (Field::Faculty, &["faculty"]),
    (Field::TotalMarks, &["total", "marks"]),
    (Field::QuestionPdf, &["pdf"]),
    (Field::Duration, &["duration"]),
    (Field::Date, &["date"]),
    (Field::Time, &["time"]),
    (Field::Subject, &["subject"]),
    (Field::Name, &["name"]),
];

fn normalize(header: &str) -> String {
    header.trim().to_lowercase()
}

fn contains_any(header: &str, keywords: &[&str]) -> bool {
    let header = normalize(header);
    keywords.iter().any(|kw| header.contains(kw))
}

/// True when `header` looks like a test-code column.
pub fn is_code_header(header: &str) -> bool {
    contains_any(header, CODE_KEYWORDS)
}

/// True iff some code-like column of `row` holds `code` (both sides trimmed).
///
/// Rows shorter than the header are tolerated; missing cells never match.
pub fn row_matches_code<S: AsRef<str>>(headers: &[S], row: &[S], code: &str) -> bool {
    let code = code.trim();
    headers
        .iter()
        .zip(row.iter())
        .any(|(h, v)| is_code_header(h.as_ref()) && v.as_ref().trim() == code)
}

/// Resolved column index per canonical field for one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: Vec<(Field, usize)>,
}

impl ColumnMap {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut claimed = vec![false; headers.len()];
        let mut columns = Vec::with_capacity(FIELD_RULES.len());

        for (field, keywords) in FIELD_RULES {
            let hit = headers
                .iter()
                .enumerate()
                .find(|&(idx, h)| !claimed[idx] && contains_any(h.as_ref(), keywords));
            if let Some((idx, _)) = hit {
                claimed[idx] = true;
                columns.push((*field, idx));
            }
        }

        Self { columns }
    }

    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, idx)| *idx)
    }

    /// Cell value for `field`, or `None` if the column is absent or the row is short.
    pub fn get<'r, S: AsRef<str>>(&self, row: &'r [S], field: Field) -> Option<&'r str> {
        self.index_of(field)
            .and_then(|idx| row.get(idx))
            .map(|v| v.as_ref())
    }

    fn get_or_missing<S: AsRef<str>>(&self, row: &[S], field: Field) -> String {
        self.get(row, field).unwrap_or(MISSING_FIELD).to_string()
    }

    /// Builds a `TestRecord` from a matched row, filling absent fields with `N/A`.
    pub fn to_record<S: AsRef<str>>(&self, row: &[S], code: &str) -> TestRecord {
        TestRecord {
            name: self.get_or_missing(row, Field::Name),
            time: self.get_or_missing(row, Field::Time),
            date: self.get_or_missing(row, Field::Date),
            duration: self.get_or_missing(row, Field::Duration),
            subject: self.get_or_missing(row, Field::Subject),
            faculty: self.get_or_missing(row, Field::Faculty),
            total_marks: self.get_or_missing(row, Field::TotalMarks),
            unique_code: code.trim().to_string(),
            question_pdf: self
                .get(row, Field::QuestionPdf)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }
}

/// Every non-empty value found in a code-like column, in file order.
pub fn codes<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Vec<String> {
    rows.iter()
        .flat_map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .filter(|(h, _)| is_code_header(h.as_ref()))
                .map(|(_, v)| v.as_ref().trim())
        })
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// First row whose code column holds `code`, in file order.
pub fn find_row<'a, S: AsRef<str>>(
    headers: &[S],
    rows: &'a [Vec<S>],
    code: &str,
) -> Option<&'a Vec<S>> {
    rows.iter().find(|row| row_matches_code(headers, row, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_headers() -> Vec<&'static str> {
        vec!["Name", "Roll No", "E-mail", "Unique Test Code"]
    }

    #[test]
    fn exact_code_matches() {
        let row = vec!["Asha", "12", "a@x.com", "ab12cd34"];
        assert!(row_matches_code(&student_headers(), &row, "ab12cd34"));
    }

    #[test]
    fn untrimmed_code_matches() {
        let row = vec!["Asha", "12", "a@x.com", "ab12cd34"];
        assert!(row_matches_code(&student_headers(), &row, " ab12cd34 "));
    }

    #[test]
    fn prefix_of_code_does_not_match() {
        let row = vec!["Asha", "12", "a@x.com", "ab12cd34"];
        assert!(!row_matches_code(&student_headers(), &row, "ab12cd3"));
    }

    #[test]
    fn value_in_non_code_column_does_not_match() {
        let row = vec!["ab12cd34", "12", "a@x.com", "zz"];
        assert!(!row_matches_code(&student_headers(), &row, "ab12cd34"));
    }

    #[test]
    fn padded_cell_and_odd_header_casing_match() {
        let headers = vec!["  TEST CODE "];
        let row = vec!["  q1w2e3r4  "];
        assert!(row_matches_code(&headers, &row, "q1w2e3r4"));
    }

    #[test]
    fn short_row_is_tolerated() {
        let row = vec!["Asha", "12"];
        assert!(!row_matches_code(&student_headers(), &row, "ab12cd34"));
    }

    #[test]
    fn any_code_like_column_can_match() {
        let headers = vec!["Code", "Unique Test Code"];
        let row = vec!["old", "new"];
        assert!(row_matches_code(&headers, &row, "old"));
        assert!(row_matches_code(&headers, &row, "new"));
    }

    #[test]
    fn faculty_name_is_not_taken_for_name() {
        let headers = vec!["Faculty Name", "Name", "Subject"];
        let map = ColumnMap::from_headers(&headers);
        assert_eq!(map.index_of(Field::Faculty), Some(0));
        assert_eq!(map.index_of(Field::Name), Some(1));
    }

    #[test]
    fn first_matching_header_wins_within_a_rule() {
        let headers = vec!["Start Time", "End Time"];
        let map = ColumnMap::from_headers(&headers);
        assert_eq!(map.index_of(Field::Time), Some(0));
    }

    #[test]
    fn canonical_ledger_maps_every_field() {
        let headers = crate::models::test_record::TEST_LEDGER_HEADER;
        let map = ColumnMap::from_headers(&headers);
        let row = [
            "Midterm", "10:00", "2024-03-01", "90", "Physics", "Dr. Rao", "50", "ab12cd34",
            "ab12cd34_paper.pdf",
        ];
        let record = map.to_record(&row, "ab12cd34");
        assert_eq!(record.name, "Midterm");
        assert_eq!(record.time, "10:00");
        assert_eq!(record.date, "2024-03-01");
        assert_eq!(record.duration, "90");
        assert_eq!(record.subject, "Physics");
        assert_eq!(record.faculty, "Dr. Rao");
        assert_eq!(record.total_marks, "50");
        assert_eq!(record.question_pdf.as_deref(), Some("ab12cd34_paper.pdf"));
    }

    #[test]
    fn missing_columns_fall_back_to_placeholder() {
        let headers = vec!["Test Code", "Subject"];
        let map = ColumnMap::from_headers(&headers);
        let record = map.to_record(&["x1", "Maths"], "x1");
        assert_eq!(record.subject, "Maths");
        assert_eq!(record.name, MISSING_FIELD);
        assert_eq!(record.total_marks, MISSING_FIELD);
        assert_eq!(record.question_pdf, None);
    }

    #[test]
    fn duplicate_codes_resolve_to_first_row() {
        let headers = vec!["Name".to_string(), "Code".to_string()];
        let rows = vec![
            vec!["first".to_string(), "dup".to_string()],
            vec!["second".to_string(), "dup".to_string()],
        ];
        let row = find_row(&headers, &rows, "dup").unwrap();
        assert_eq!(row[0], "first");
    }
}
