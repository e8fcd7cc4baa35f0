/// Structural tag of a single report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupLine {
    Heading(String),
    Emphasis(String),
    Text(String),
}

/// Classifies one line of report content.
///
/// `###` opens a heading (prefix stripped), `**` opens an emphasized label
/// (every `**` removed). Anything else is plain text.
pub fn classify_line(line: &str) -> MarkupLine {
    if let Some(rest) = line.strip_prefix("###") {
        MarkupLine::Heading(rest.trim().to_string())
    } else if line.starts_with("**") {
        MarkupLine::Emphasis(line.replace("**", ""))
    } else {
        MarkupLine::Text(line.to_string())
    }
}

pub(crate) fn classify_content(content: &str) -> Vec<MarkupLine> {
    content.lines().map(classify_line).collect()
}
