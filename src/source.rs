//! Word-list loading.
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xls`, `.ods`) are read with calamine: the
//! first row is a header, columns A/B/C hold number, question and answer.
//! A `.json` file holds an array of `{ "number", "question", "answer" }`.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde::Deserialize;

use crate::error::AppError;
use crate::model::Entry;

/// Word-list row in a JSON file
#[derive(Debug, Deserialize)]
struct WordListEntry {
    #[serde(default)]
    number: Option<serde_json::Value>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Sheet names in workbook order. A JSON word list has no sheets.
pub fn list_sheets(path: &Path) -> Result<Vec<String>, AppError> {
    if is_json(path) {
        return Ok(Vec::new());
    }
    let workbook = open_workbook_auto(path)
        .map_err(|e| AppError::WorkbookError(format!("{}: {}", path.display(), e)))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read every usable row of `sheet`. The sheet is ignored for JSON files.
pub fn load_entries(path: &Path, sheet: &str) -> Result<Vec<Entry>, AppError> {
    let entries = if is_json(path) {
        load_word_list(path)?
    } else {
        load_workbook_sheet(path, sheet)?
    };
    log::debug!("Loaded {} rows from {}", entries.len(), path.display());
    Ok(entries)
}

fn load_word_list(path: &Path) -> Result<Vec<Entry>, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::WordListError(format!("{}: {}", path.display(), e)))?;
    let rows: Vec<WordListEntry> = serde_json::from_str(&content)
        .map_err(|e| AppError::WordListError(format!("Invalid JSON: {}", e)))?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let number = row.number.as_ref().and_then(json_number);
            let question = row.question.unwrap_or_default();
            let answer = row.answer.unwrap_or_default();
            if row.number.is_none() && question.is_empty() && answer.is_empty() {
                return None;
            }
            Some(Entry {
                number,
                question,
                answer,
            })
        })
        .collect())
}

fn json_number(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_number)),
        serde_json::Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn load_workbook_sheet(path: &Path, sheet: &str) -> Result<Vec<Entry>, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::WorkbookError(format!("{}: {}", path.display(), e)))?;

    let names = workbook.sheet_names().to_vec();
    if !names.iter().any(|name| name == sheet) {
        return Err(AppError::WorkbookError(format!(
            "no sheet named {:?} (available: {})",
            sheet,
            names.join(", ")
        )));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| AppError::WorkbookError(format!("{}: {}", sheet, e)))?;

    let mut entries = Vec::new();
    // first row is the column header
    for row in range.rows().skip(1) {
        let number_cell = row.first().unwrap_or(&Data::Empty);
        let question = row.get(1).map(cell_to_string).unwrap_or_default();
        let answer = row.get(2).map(cell_to_string).unwrap_or_default();

        if matches!(number_cell, Data::Empty) && question.is_empty() && answer.is_empty() {
            continue;
        }

        entries.push(Entry {
            number: cell_number(number_cell),
            question,
            answer,
        });
    }

    Ok(entries)
}

/// Row number from the first column; anything non-numeric is `None`.
fn cell_number(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) => float_to_number(*f),
        Data::String(s) => parse_number(s),
        _ => None,
    }
}

/// Parse text such as `"12"` or `"12.0"`, truncating any fraction.
pub fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(float_to_number))
}

fn float_to_number(value: f64) -> Option<i64> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{:?}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("wordtest-pdf-source-tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_integers_and_floats() {
        assert_eq!(parse_number("12"), Some(12));
        assert_eq!(parse_number(" 7 "), Some(7));
        assert_eq!(parse_number("12.0"), Some(12));
        assert_eq!(parse_number("12.9"), Some(12));
        assert_eq!(parse_number("-3.5"), Some(-3));
    }

    #[test]
    fn unparseable_numbers_are_none() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn cell_numbers_follow_cell_type() {
        assert_eq!(cell_number(&Data::Int(4)), Some(4));
        assert_eq!(cell_number(&Data::Float(4.0)), Some(4));
        assert_eq!(cell_number(&Data::String("5".into())), Some(5));
        assert_eq!(cell_number(&Data::Bool(true)), None);
        assert_eq!(cell_number(&Data::Empty), None);
    }

    #[test]
    fn whole_floats_print_without_decimals() {
        assert_eq!(cell_to_string(&Data::Float(3.0)), "3");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::String("apple".into())), "apple");
    }

    #[test]
    fn loads_json_word_list() {
        let path = scratch_file(
            "words.json",
            r#"[
                {"number": 1, "question": "apple", "answer": "りんご"},
                {"number": "2", "question": "book", "answer": "本"},
                {"number": 3.0, "question": "cat", "answer": "猫"},
                {"number": null, "question": "dog", "answer": "犬"},
                {}
            ]"#,
        );
        let entries = load_entries(&path, "ignored").unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], Entry::new(Some(1), "apple", "りんご"));
        assert_eq!(entries[1].number, Some(2));
        assert_eq!(entries[2].number, Some(3));
        assert_eq!(entries[3].number, None);
        assert!(list_sheets(&path).unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let path = scratch_file("broken.json", "{ not json");
        assert!(matches!(
            load_entries(&path, ""),
            Err(AppError::WordListError(_))
        ));
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let result = load_entries(Path::new("no/such/book.xlsx"), "Sheet1");
        assert!(matches!(result, Err(AppError::WorkbookError(_))));
    }
}
