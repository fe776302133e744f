// Rendering of search results and routes

use crate::route::PathEntry;
use crate::search::SearchReport;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEAVY_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LIGHT_RULE: &str = "────────────────────────────────────────────────────────────────────────────────\n";
const SNIPPET_WIDTH: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

pub fn render_search_report(report: &SearchReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_search_text_report(report)),
        ReportFormat::Json => generate_search_json_report(report),
        ReportFormat::Markdown => Ok(generate_search_markdown_report(report)),
    }
}

pub fn render_route(target_url: &str, path: &[PathEntry], format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_route_text_report(target_url, path)),
        ReportFormat::Json => generate_route_json_report(target_url, path),
        ReportFormat::Markdown => Ok(generate_route_markdown_report(target_url, path)),
    }
}

pub fn generate_search_text_report(data: &SearchReport) -> String {
    let mut report = String::new();

    report.push_str(HEAVY_RULE);
    report.push_str("                           SITETRAIL SEARCH REPORT\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    report.push_str(&format!("Keyword:      {}\n", data.keyword));
    report.push_str(&format!("Strategy:     {}\n", data.strategy.as_str().to_uppercase()));
    report.push_str(&format!("Max Depth:    {}\n", data.max_depth));
    report.push_str(&format!(
        "Seed:         {}\n",
        data.seed_url.as_deref().unwrap_or("none found")
    ));
    report.push_str(&format!("Results:      {}\n\n", data.results.len()));

    if data.results.is_empty() {
        report.push_str("No matching pages.\n\n");
        return report;
    }

    report.push_str(HEAVY_RULE);
    report.push_str("RESULTS\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    for (idx, result) in data.results.iter().enumerate() {
        report.push_str(&format!("[{}] {}\n", idx + 1, result.record.title));
        report.push_str(&format!("Score:        {:.2}\n", result.score));
        report.push_str(&format!("Depth:        {}\n", result.depth));
        report.push_str(&format!("URL:          {}\n", result.record.url));

        let snippet = snippet(&result.record.content, &data.keyword, SNIPPET_WIDTH);
        if !snippet.is_empty() {
            report.push('\n');
            report.push_str(&wrap_text(&snippet, 80, "  "));
            report.push('\n');
        }
        report.push('\n');
        report.push_str(LIGHT_RULE);
        report.push('\n');
    }

    report
}

pub fn generate_search_json_report(data: &SearchReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sitetrail",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "query": {
                "keyword": data.keyword,
                "strategy": data.strategy,
                "max_depth": data.max_depth,
                "seed_url": data.seed_url
            },
            "summary": {
                "total_results": data.results.len()
            },
            "results": data.results
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_search_markdown_report(data: &SearchReport) -> String {
    let mut report = String::new();

    report.push_str(&format!("# Search results for `{}`\n\n", data.keyword));
    report.push_str(&format!(
        "- **Strategy:** {}\n- **Max depth:** {}\n- **Seed:** {}\n- **Results:** {}\n\n",
        data.strategy.as_str().to_uppercase(),
        data.max_depth,
        data.seed_url.as_deref().unwrap_or("none found"),
        data.results.len()
    ));

    if data.results.is_empty() {
        report.push_str("_No matching pages._\n");
        return report;
    }

    report.push_str("| # | Title | Score | Depth | URL |\n");
    report.push_str("|---|-------|-------|-------|-----|\n");
    for (idx, result) in data.results.iter().enumerate() {
        report.push_str(&format!(
            "| {} | {} | {:.2} | {} | {} |\n",
            idx + 1,
            escape_markdown_cell(&result.record.title),
            result.score,
            result.depth,
            result.record.url
        ));
    }

    report
}

pub fn generate_route_text_report(target_url: &str, path: &[PathEntry]) -> String {
    let mut report = String::new();

    report.push_str(HEAVY_RULE);
    report.push_str(&format!("ROUTE TO {}\n", target_url));
    report.push_str(HEAVY_RULE);
    report.push('\n');

    for (step, entry) in path.iter().enumerate() {
        let indent = "  ".repeat(step);
        let marker = if step == 0 { "●" } else { "└─" };
        report.push_str(&format!("{}{} {}\n", indent, marker, entry.title));
        report.push_str(&format!("{}   {}\n", indent, entry.url));
    }

    report.push('\n');
    report.push_str(&format!("{} steps from seed\n", path.len().saturating_sub(1)));
    report
}

pub fn generate_route_json_report(target_url: &str, path: &[PathEntry]) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "route": {
            "target": target_url,
            "steps": path.len().saturating_sub(1),
            "path": path
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_route_markdown_report(target_url: &str, path: &[PathEntry]) -> String {
    let mut report = String::new();
    report.push_str(&format!("# Route to {}\n\n", target_url));
    for (step, entry) in path.iter().enumerate() {
        report.push_str(&format!(
            "{}. [{}]({})\n",
            step + 1,
            escape_markdown_cell(&entry.title),
            entry.url
        ));
    }
    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Up to `width` characters of `content` around the first keyword hit, or its
/// start when the keyword only matched the title.
fn snippet(content: &str, keyword: &str, width: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= width {
        return content.to_string();
    }

    let lowered: Vec<char> = content.to_lowercase().chars().collect();
    let needle: Vec<char> = keyword.to_lowercase().chars().collect();
    // Lowercasing can change the char count; only trust positions when it didn't
    let hit = if lowered.len() == chars.len() && !needle.is_empty() {
        lowered.windows(needle.len()).position(|w| w == needle.as_slice())
    } else {
        None
    };

    let start = hit.map(|pos| pos.saturating_sub(width / 4)).unwrap_or(0);
    let end = (start + width).min(chars.len());
    let mut out: String = chars[start..end].iter().collect();
    if start > 0 {
        out.insert_str(0, "...");
    }
    if end < chars.len() {
        out.push_str("...");
    }
    out
}

fn escape_markdown_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 > width - indent.len() && !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
    }

    result
}
