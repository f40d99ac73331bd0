//! Renderer module
//!
//! Renders search result records to different output formats: jsonl, json, md, raw

use crate::core::model::ResultRecord;
use colored::Colorize;
use std::io::Write;

/// Printed by the human-oriented formats when a query matched nothing
pub const NO_RESULTS: &str = "No files found.";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Jsonl,
    Json,
    Markdown,
    #[default]
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: false,
            color: true,
        }
    }
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Renderer for search results
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render records to a string
    ///
    /// The result carries no trailing newline; JSON formats render an empty
    /// result set as nothing (jsonl) or `[]` (json).
    pub fn render(&self, records: &[ResultRecord]) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(records),
            OutputFormat::Json => self.render_json(records),
            OutputFormat::Markdown => self.render_markdown(records),
            OutputFormat::Raw => self.render_raw(records),
        }
    }

    /// Render to a writer, terminating non-empty output with a newline
    pub fn render_to<W: Write>(&self, records: &[ResultRecord], mut writer: W) -> std::io::Result<()> {
        let output = self.render(records);
        if output.is_empty() {
            return Ok(());
        }
        writeln!(writer, "{}", output)
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, records: &[ResultRecord]) -> String {
        records
            .iter()
            .filter_map(|record| {
                if self.config.pretty {
                    serde_json::to_string_pretty(record).ok()
                } else {
                    serde_json::to_string(record).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, records: &[ResultRecord]) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as a Markdown bullet list with the match in bold
    fn render_markdown(&self, records: &[ResultRecord]) -> String {
        if records.is_empty() {
            return NO_RESULTS.to_string();
        }

        records
            .iter()
            .map(|record| {
                if record.is_annotated() {
                    format!(
                        "- {}**{}**{}",
                        escape_markdown(&record.prefix),
                        escape_markdown(&record.matched),
                        escape_markdown(&record.suffix)
                    )
                } else {
                    format!("- {}", escape_markdown(&record.full_path))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render one path per line, highlighting the match
    fn render_raw(&self, records: &[ResultRecord]) -> String {
        if records.is_empty() {
            return NO_RESULTS.to_string();
        }

        records
            .iter()
            .map(|record| {
                if !record.is_annotated() {
                    record.full_path.clone()
                } else if self.config.color {
                    format!(
                        "{}{}{}",
                        record.prefix,
                        record.matched.as_str().bold().yellow(),
                        record.suffix
                    )
                } else {
                    format!("{}{}{}", record.prefix, record.matched, record.suffix)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Backslash-escape characters Markdown would treat as inline markup
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '#' | '~' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
