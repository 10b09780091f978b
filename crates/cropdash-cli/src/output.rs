use console::style;
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
        }
    }

    /// Status lines are human-only; JSON mode emits a single document per run
    pub fn success(&self, message: impl Display) {
        if self.format == OutputFormat::Human {
            println!("{} {}", style("✓").green().bold(), message);
        }
    }

    pub fn info(&self, message: impl Display) {
        if self.format == OutputFormat::Human {
            println!("{} {}", style("ℹ").blue().bold(), message);
        }
    }

    pub fn warning(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", style("⚠").yellow().bold(), message);
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "status": "warning",
                    "message": message.to_string(),
                });
                if let Ok(text) = serde_json::to_string(&output) {
                    eprintln!("{}", text);
                }
            }
        }
    }

    /// Render rows as a table; JSON mode is handled by `result`
    pub fn table<T: Tabled>(&self, rows: Vec<T>) {
        if self.format != OutputFormat::Human {
            return;
        }
        if rows.is_empty() {
            println!("{}", style("(no data)").dim());
        } else {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }

    /// Emit the command's result document in JSON mode
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            println!("{}", render_result(&data)?);
        }
        Ok(())
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        if self.format == OutputFormat::Human {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    pub fn section(&self, title: impl Display) {
        if self.format == OutputFormat::Human {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn text(&self, body: impl Display) {
        if self.format == OutputFormat::Human {
            println!("{}", body);
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// Wrap `data` in the success envelope
pub fn render_result<T: Serialize>(data: &T) -> anyhow::Result<String> {
    let output = serde_json::json!({
        "status": "success",
        "data": data,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// One-line description of a metric payload for tables
pub fn summarize_payload(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).take(4).collect();
            let more = if map.len() > 4 { ", ..." } else { "" };
            format!("{{{}{}}}", keys.join(", "), more)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Null => "null".to_string(),
        other => truncate(&other.to_string(), 40),
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_envelope() {
        let rendered = render_result(&json!({ "count": 2 })).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["data"]["count"], 2);
    }

    #[test]
    fn test_summarize_payload() {
        assert_eq!(summarize_payload(&json!({ "labels": [], "accuracy": [] })), "{accuracy, labels}");
        assert_eq!(summarize_payload(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(
            summarize_payload(&json!({ "a": 1, "b": 2, "c": 3, "d": 4, "e": 5 })),
            "{a, b, c, d, ...}"
        );
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Pune", 10), "Pune");
        assert_eq!(truncate("São Paulo, Brazil", 8), "São P...");
    }
}
