use ratatui::{prelude::*, widgets::*};

use crate::kv::{KvColumn, KvRow};

/// Renders the tab bar titles
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Method color
pub fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Green,
        "POST" => Color::Yellow,
        "PUT" => Color::Blue,
        "PATCH" => Color::Cyan,
        "DELETE" => Color::Red,
        _ => Color::White,
    }
}

/// Health indicator color
pub fn health_color(status: &str) -> Color {
    match status {
        "ok" => Color::Green,
        _ => Color::Yellow,
    }
}

/// One key-value editor row as a styled line. The selected row highlights
/// the focused column when the editor is live; blank placeholder keys
/// render dimmed.
pub fn kv_row_line(row: &KvRow, is_selected: bool, column: KvColumn) -> Line<'static> {
    let key_style = if is_selected && column == KvColumn::Key {
        Style::default().fg(Color::Yellow).bold()
    } else if row.key.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let value_style = if is_selected && column == KvColumn::Value {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default()
    };

    let key = if row.key.is_empty() {
        "<key>".to_string()
    } else {
        row.key.clone()
    };
    let marker = if is_selected { "> " } else { "  " };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(key, key_style),
        Span::raw(": "),
        Span::styled(row.value.clone(), value_style),
    ])
}

/// All rows of a key-value editor as list items
pub fn kv_list_items(
    rows: &[KvRow],
    selected: usize,
    column: KvColumn,
    editing: bool,
) -> Vec<ListItem<'static>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| ListItem::new(kv_row_line(row, editing && i == selected, column)))
        .collect()
}

/// Simple JSON syntax highlighting for read-only structural dumps
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    text.lines().map(highlight_json_line).collect()
}

fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some(start) = rest.find('"') {
            // everything before the string literal
            if start > 0 {
                spans.push(plain_span(&rest[..start]));
            }
            let after = &rest[start + 1..];
            match find_string_end(after) {
                Some(end) => {
                    let literal = &rest[start..start + end + 2];
                    let tail = &after[end + 1..];
                    let color = if tail.trim_start().starts_with(':') {
                        Color::Cyan // object key
                    } else {
                        Color::Green
                    };
                    spans.push(Span::styled(
                        literal.to_string(),
                        Style::default().fg(color),
                    ));
                    rest = tail;
                }
                None => {
                    spans.push(plain_span(rest));
                    break;
                }
            }
        } else {
            spans.push(plain_span(rest));
            break;
        }
    }

    Line::from(spans)
}

/// Index of the closing quote in `s`, honoring backslash escapes
fn find_string_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn plain_span(text: &str) -> Span<'static> {
    let trimmed = text.trim();
    let style = if trimmed
        .trim_end_matches(',')
        .parse::<f64>()
        .is_ok()
    {
        Style::default().fg(Color::Yellow)
    } else if matches!(trimmed.trim_end_matches(','), "true" | "false" | "null") {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default()
    };
    Span::styled(text.to_string(), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_and_values_get_distinct_colors() {
        let lines = highlight_json("  \"name\": \"demo\",");
        let spans = &lines[0].spans;
        let key = spans.iter().find(|s| s.content.contains("name")).unwrap();
        let value = spans.iter().find(|s| s.content.contains("demo")).unwrap();
        assert_eq!(key.style.fg, Some(Color::Cyan));
        assert_eq!(value.style.fg, Some(Color::Green));
    }

    #[test]
    fn escaped_quotes_stay_inside_the_literal() {
        let lines = highlight_json(r#""a \"quoted\" key": 1"#);
        let spans = &lines[0].spans;
        assert!(spans
            .iter()
            .any(|s| s.content.contains(r#"\"quoted\""#)));
    }
}
