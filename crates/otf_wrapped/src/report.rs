//! Report assembly: placeholder substitution over a Markdown template and
//! the Markdown to HTML conversion.

use crate::error::ReportResult;
use pulldown_cmark::{Options, Parser, html};
use std::collections::BTreeMap;
use std::path::Path;

/// The Markdown template shipped with the crate.
pub const DEFAULT_TEMPLATE: &str = include_str!("../template.md");

/// Literal find-and-replace of each `{name}` token. Unresolved tokens are
/// left verbatim on purpose: a report with one section missing still
/// renders instead of crashing the whole pipeline.
pub fn fill_template(template: &str, placeholders: &BTreeMap<&str, String>) -> String {
    let mut out = template.to_string();
    for (name, value) in placeholders {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Markdown to HTML with raw HTML passthrough, so embedded SVG charts
/// survive untouched.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Write the final artifact. Only called once assembly fully succeeded, so
/// a failed run never leaves a partial report behind.
pub fn write_report(path: &Path, html: &str) -> ReportResult<()> {
    std::fs::write(path, html)?;
    tracing::info!(path = %path.display(), bytes = html.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_template_substitutes_known_tokens() {
        let mut placeholders = BTreeMap::new();
        placeholders.insert("class_count", "42".to_string());
        let out = fill_template("You took {class_count} classes", &placeholders);
        assert_eq!(out, "You took 42 classes");
    }

    #[test]
    fn fill_template_leaves_unknown_tokens_verbatim() {
        let mut placeholders = BTreeMap::new();
        placeholders.insert("class_count", "42".to_string());
        let out = fill_template("{class_count} and {not_a_token}", &placeholders);
        assert_eq!(out, "42 and {not_a_token}");
    }

    #[test]
    fn markdown_passes_raw_html_through() {
        let html = markdown_to_html("# Title\n\n<svg width=\"10\"><rect/></svg>\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<svg width=\"10\"><rect/></svg>"));
    }

    #[test]
    fn default_template_carries_every_placeholder() {
        for token in [
            "{row_start_plot}",
            "{tread_start_plot}",
            "{minutes_in_zone_plot}",
            "{total_calories}",
            "{max_calories}",
            "{max_splats}",
            "{max_hr}",
            "{class_by_type_plot}",
            "{max_count_timestamp}",
            "{max_count_value}",
            "{class_by_coach_plot}",
            "{class_count}",
        ] {
            assert!(DEFAULT_TEMPLATE.contains(token), "missing {token}");
        }
    }

    #[test]
    fn write_report_creates_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("otf_wrapped.html");
        write_report(&path, "<html></html>").expect("write");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "<html></html>"
        );
    }
}
