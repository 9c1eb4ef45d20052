//! CLI output formatting
//!
//! Two formats: human-readable (checkmarks, aligned tables) and JSON
//! for scripting. Every command goes through a formatter so `--json`
//! affects all output uniformly.

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
    fn print_table(&self, headers: &[&str], rows: &[Vec<String>]);
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }

    fn info(&self, message: &str) {
        println!("  {}", message);
    }

    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }

    fn print_table(&self, headers: &[&str], rows: &[Vec<String>]) {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() && cell.len() > widths[i] {
                    widths[i] = cell.len();
                }
            }
        }

        let header_line: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
            .collect();
        println!("{}", header_line.join("  "));
        println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));

        for row in rows {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect();
            println!("{}", line.join("  "));
        }
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }

    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }

    fn info(&self, _message: &str) {}

    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }

    fn print_table(&self, _headers: &[&str], _rows: &[Vec<String>]) {
        // JSON formatter receives structured data via print_json
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_selection() {
        assert!(matches!(
            OutputFormat::Human,
            OutputFormat::Human
        ));
        // Smoke-test both formatters against a table.
        let rows = vec![vec!["a".to_string(), "bb".to_string()]];
        HumanFormatter.print_table(&["col1", "col2"], &rows);
        JsonFormatter.print_table(&["col1", "col2"], &rows);
    }
}
