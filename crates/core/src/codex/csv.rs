//! CSV ingestion for codex tables.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::kind::CodexKind;
use crate::error::CoreError;

/// Columns holding comma-separated lists. Their cells are split into JSON
/// arrays; every other column is kept as a scalar.
pub const ARRAY_COLUMNS: &[&str] = &[
    "ability_req",
    "abil_req_val",
    "skill_req",
    "skill_req_val",
    "tags",
    "ability",
    "sizes",
    "traits",
    "flaws",
    "characteristics",
    "skills",
    "languages",
    "abilities",
    "feats",
];

/// One parsed codex row, ready for upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodexRecord {
    pub code: String,
    pub name: String,
    pub data: Map<String, Value>,
}

/// Lowercase, ASCII alphanumerics kept, runs of anything else collapsed to
/// a single underscore.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_sep = false;
    for ch in value.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Parse a codex CSV export.
///
/// The first row is the header. `id` becomes the record code (slugified
/// `name` when absent), `name` is required, empty cells are omitted and
/// numeric cells become JSON numbers unless they belong to an array column.
/// Quoted cells may span several lines; errors name the line a row starts on.
pub fn parse_codex_csv(kind: CodexKind, data: &[u8]) -> Result<Vec<CodexRecord>, CoreError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| CoreError::Validation(format!("{}: invalid UTF-8: {e}", kind.file_name())))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text)
        .map_err(|line_no| {
            CoreError::Validation(format!(
                "{} line {line_no}: unterminated quoted field",
                kind.file_name()
            ))
        })?
        .into_iter();

    let header_row = rows
        .next()
        .ok_or_else(|| CoreError::Validation(format!("{}: CSV is empty", kind.file_name())))?;
    let headers: Vec<String> = header_row
        .cells
        .into_iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    if !headers.iter().any(|h| h == "name") {
        return Err(CoreError::Validation(format!(
            "{}: header row has no 'name' column",
            kind.file_name()
        )));
    }

    let mut records = Vec::new();
    for row in rows {
        let line_no = row.line;
        let values = row.cells;

        let mut code = None;
        let mut name = None;
        let mut fields = Map::new();

        for (i, header) in headers.iter().enumerate() {
            let value = values.get(i).map(|s| s.trim()).unwrap_or("");
            if value.is_empty() || header.is_empty() {
                continue;
            }
            match header.as_str() {
                "id" => code = Some(value.to_string()),
                "name" => name = Some(value.to_string()),
                column if ARRAY_COLUMNS.contains(&column) => {
                    let items = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Value::String(s.to_string()))
                        .collect();
                    fields.insert(column.to_string(), Value::Array(items));
                }
                column => {
                    fields.insert(column.to_string(), scalar(value));
                }
            }
        }

        let name = name.ok_or_else(|| {
            CoreError::Validation(format!("{} line {line_no}: missing name", kind.file_name()))
        })?;
        let code = code.unwrap_or_else(|| slugify(&name));
        if code.is_empty() {
            return Err(CoreError::Validation(format!(
                "{} line {line_no}: cannot derive a code from name '{name}'",
                kind.file_name()
            )));
        }

        records.push(CodexRecord {
            code,
            name,
            data: fields,
        });
    }

    Ok(records)
}

fn scalar(value: &str) -> Value {
    if let Ok(i) = value.parse::<i64>() {
        return Value::Number(i.into());
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

/// One CSV record and the 1-based line it starts on.
#[derive(Debug, PartialEq)]
struct CsvRow {
    line: usize,
    cells: Vec<String>,
}

/// Split CSV text into records, honouring double-quoted fields, `""`
/// escapes and line breaks inside quotes. Blank lines are dropped.
///
/// Fails with the starting line of a quoted field that never closes.
fn split_rows(text: &str) -> Result<Vec<CsvRow>, usize> {
    let mut rows = Vec::new();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted_row = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut quote_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match (in_quotes, ch) {
            (true, '"') if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            (true, '"') => in_quotes = false,
            (true, '\n') => {
                current.push('\n');
                line += 1;
            }
            (true, '\r') if chars.peek() == Some(&'\n') => {}
            (false, '"') => {
                in_quotes = true;
                quoted_row = true;
                quote_start = line;
            }
            (false, ',') => cells.push(std::mem::take(&mut current)),
            (false, '\r') if chars.peek() == Some(&'\n') => {}
            (false, '\n') => {
                cells.push(std::mem::take(&mut current));
                push_row(&mut rows, row_start, std::mem::take(&mut cells), quoted_row);
                quoted_row = false;
                line += 1;
                row_start = line;
            }
            _ => current.push(ch),
        }
    }
    if in_quotes {
        return Err(quote_start);
    }
    cells.push(current);
    push_row(&mut rows, row_start, cells, quoted_row);
    Ok(rows)
}

fn push_row(rows: &mut Vec<CsvRow>, line: usize, cells: Vec<String>, quoted: bool) {
    let blank = !quoted && cells.len() == 1 && cells[0].trim().is_empty();
    if !blank {
        rows.push(CsvRow { line, cells });
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_rows_with_quotes_and_arrays() {
        let csv = "id,name,description,ability_req,lvl_req,char_feat\n\
                   brawler,Brawler,\"Hits hard, often\",\"strength, vitality\",3,yes\n";
        let records = parse_codex_csv(CodexKind::Feats, csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        let feat = &records[0];
        assert_eq!(feat.code, "brawler");
        assert_eq!(feat.name, "Brawler");
        assert_eq!(feat.data["description"], json!("Hits hard, often"));
        assert_eq!(feat.data["ability_req"], json!(["strength", "vitality"]));
        assert_eq!(feat.data["lvl_req"], json!(3));
        assert_eq!(feat.data["char_feat"], json!("yes"));
        assert!(!feat.data.contains_key("name"));
    }

    #[test]
    fn missing_id_falls_back_to_slugified_name() {
        let csv = "name,base_en\nFire Bolt,1.5\n";
        let records = parse_codex_csv(CodexKind::Parts, csv.as_bytes()).unwrap();
        assert_eq!(records[0].code, "fire_bolt");
        assert_eq!(records[0].data["base_en"], json!(1.5));
    }

    #[test]
    fn empty_cells_and_blank_lines_are_skipped() {
        let csv = "id,name,category\n\na,Alpha,\n";
        let records = parse_codex_csv(CodexKind::Skills, csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].data.is_empty());
    }

    #[test]
    fn row_without_name_reports_line_number() {
        let csv = "id,name\nok,Fine\nbad,\n";
        assert_matches!(
            parse_codex_csv(CodexKind::Traits, csv.as_bytes()),
            Err(CoreError::Validation(msg)) if msg.contains("line 3")
        );
    }

    #[test]
    fn header_must_have_name_column() {
        assert_matches!(
            parse_codex_csv(CodexKind::Traits, b"id,description\n"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(parse_codex_csv(CodexKind::Traits, b""), Err(_));
    }

    #[test]
    fn escaped_quotes() {
        let rows = split_rows(r#"a,"say ""hi""",c"#).unwrap();
        assert_eq!(rows[0].cells, vec!["a", "say \"hi\"", "c"]);
    }

    #[test]
    fn quoted_cells_may_span_lines() {
        let csv = "id,name,description\n\
                   brawler,Brawler,\"Line one\nline two\"\n\
                   quick,Quick,short\n";
        let records = parse_codex_csv(CodexKind::Feats, csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data["description"], json!("Line one\nline two"));
        assert_eq!(records[1].code, "quick");
        assert_eq!(records[1].data["description"], json!("short"));
    }

    #[test]
    fn rows_report_their_starting_line() {
        let csv = "id,name,description\r\nok,Fine,\"one\r\ntwo\r\nthree\"\r\nbad,,x\r\n";
        assert_matches!(
            parse_codex_csv(CodexKind::Feats, csv.as_bytes()),
            Err(CoreError::Validation(msg)) if msg.contains("line 5")
        );

        let rows = split_rows("a,b\n\n\"x\ny\",z\n").unwrap();
        assert_eq!(rows.iter().map(|r| r.line).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(rows[1].cells, vec!["x\ny", "z"]);
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let csv = "id,name,description\nbrawler,Brawler,\"never closed\nstill open\n";
        assert_matches!(
            parse_codex_csv(CodexKind::Feats, csv.as_bytes()),
            Err(CoreError::Validation(msg))
                if msg.contains("line 2") && msg.contains("unterminated")
        );
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Mental  Fortitude! "), "mental_fortitude");
        assert_eq!(slugify("Hunter's Mark"), "hunter_s_mark");
        assert_eq!(slugify("!!!"), "");
    }
}
