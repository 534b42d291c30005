use crate::cli::OutputFormat;
use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", to_pretty_json(value));
        }
        OutputFormat::Yaml => {
            println!("{}", format_yaml(value, 0));
        }
        OutputFormat::Table => {
            print_as_table(value);
        }
    }
}

/// Prints the result of a command that may have changed the configuration.
pub fn print_result(value: &Value, changed: bool, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_as_table(value);
            println!("{}: {}", "changed".cyan(), changed);
        }
        _ => print_value(&serde_json::json!({"changed": changed, "response": value}), format),
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn print_as_table(value: &Value) {
    if let Some(items) = extract_items(value) {
        if items.is_empty() {
            println!("No objects found.");
            return;
        }
        let mut builder = Builder::default();
        builder.push_record(["Name", "ID", "Type", "Version"]);
        for item in items {
            let field = |key: &str| item.get(key).and_then(|v| v.as_str()).unwrap_or("-");
            builder.push_record([field("name"), field("id"), field("type"), field("version")]);
        }
        let table = builder.build().with(Style::rounded()).to_string();
        println!("{table}");
        let count = value
            .get("paging")
            .and_then(|p| p.get("count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(items.len() as u64);
        println!("Total: {count}");
    } else if let Some(obj) = value.as_object() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, field) in obj {
            let shown = match field {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            builder.push_record([key.clone(), shown]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    } else {
        println!("{}", to_pretty_json(value));
    }
}

/// Objects of a list response: a bare array or a page with `items`.
fn extract_items(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => obj.get("items")?.as_array(),
        _ => None,
    }
}

// Simple YAML-like output without a YAML dependency.
fn format_yaml(value: &Value, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.contains('\n') {
                format!(
                    "|\n{}{}",
                    " ".repeat(indent + 2),
                    s.replace('\n', &format!("\n{}", " ".repeat(indent + 2)))
                )
            } else {
                format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
        Value::Array(arr) => {
            if arr.is_empty() {
                return "[]".to_string();
            }
            let items: Vec<String> = arr
                .iter()
                .map(|v| format!("{prefix}- {}", format_yaml(v, indent + 2).trim_start()))
                .collect();
            format!("\n{}", items.join("\n"))
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                return "{}".to_string();
            }
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    let val = format_yaml(v, indent + 2);
                    if val.starts_with('\n') {
                        format!("{prefix}{k}:{val}")
                    } else {
                        format!("{prefix}{k}: {val}")
                    }
                })
                .collect();
            if indent == 0 {
                items.join("\n")
            } else {
                format!("\n{}", items.join("\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_items() {
        let page = json!({"items": [{"name": "a"}], "paging": {"count": 1}});
        assert_eq!(extract_items(&page).map(Vec::len), Some(1));
        assert_eq!(extract_items(&json!([1, 2])).map(Vec::len), Some(2));
        assert!(extract_items(&json!({"name": "a"})).is_none());
    }

    #[test]
    fn test_format_yaml() {
        let yaml = format_yaml(&json!({"changed": true, "response": {"name": "web"}}), 0);
        assert_eq!(yaml, "changed: true\nresponse:\n  name: \"web\"");
    }
}
