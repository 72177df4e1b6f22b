/// One data row of the syllabus import template.
///
/// The template is a CSV with a header row and 14 columns: faculty,
/// career, period (ignored, the period comes from the request),
/// semester, credits, total hours, theory hours, practice hours,
/// training area, course code, course name, course type, prerequisites,
/// professor email.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub faculty: String,
    pub career: String,
    pub semester: String,
    pub credits: i32,
    pub total_hours: i32,
    pub theory_hours: i32,
    pub practice_hours: i32,
    pub training_area: String,
    pub course_code: String,
    pub course_name: String,
    pub course_type: String,
    pub prerequisites: String,
    pub professor_email: String,
}

/// Parse the sheet contents. The header row is skipped, rows whose
/// first cell is empty are skipped, numeric cells default to 0 when
/// blank or malformed.
pub fn parse_sheet(data: &str) -> Vec<SheetRow> {
    let records = parse_records(data);
    let mut rows = Vec::new();

    for record in records.into_iter().skip(1) {
        let first = record.first().map(|c| c.trim()).unwrap_or("");
        if first.is_empty() {
            continue;
        }

        rows.push(SheetRow {
            faculty: cell(&record, 0),
            career: cell(&record, 1),
            semester: cell(&record, 3),
            credits: numeric_cell(&record, 4),
            total_hours: numeric_cell(&record, 5),
            theory_hours: numeric_cell(&record, 6),
            practice_hours: numeric_cell(&record, 7),
            training_area: cell(&record, 8),
            course_code: cell(&record, 9),
            course_name: cell(&record, 10),
            course_type: cell(&record, 11),
            prerequisites: cell(&record, 12),
            professor_email: cell(&record, 13),
        });
    }

    rows
}

fn cell(record: &[String], index: usize) -> String {
    record.get(index).map(|c| c.trim().to_string()).unwrap_or_default()
}

fn numeric_cell(record: &[String], index: usize) -> i32 {
    record
        .get(index)
        .and_then(|c| c.trim().parse::<i32>().ok())
        .unwrap_or(0)
}

/// Minimal CSV reader: comma separated, fields may be double-quoted,
/// quoted fields may contain commas, newlines, and doubled quotes.
fn parse_records(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();
    let mut saw_any = false;

    while let Some(c) = chars.next() {
        saw_any = true;
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => {
                record.push(std::mem::take(&mut field));
            }
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if saw_any && (!field.is_empty() || !record.is_empty()) {
        record.push(field);
        records.push(record);
    }

    records
}
