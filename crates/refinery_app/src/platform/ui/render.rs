use std::fmt::Write as _;

use refinery_core::{AppViewModel, ExtractionMode, FacetBody, PageView, PhaseView};

/// Renders the whole view as plain text for the terminal.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    match &view.phase {
        PhaseView::Empty => {
            let _ = writeln!(out, "[{}] {}", view.mode, view.mode.input_hint());
        }
        PhaseView::Loading { mode } => {
            let _ = writeln!(out, "[{mode}] {}", loading_label(*mode));
        }
        PhaseView::Error { message } => {
            let _ = writeln!(out, "Error: {message}");
        }
        PhaseView::NoResults { mode } => {
            let _ = writeln!(
                out,
                "[{mode}] No results for {}",
                view.source.as_deref().unwrap_or_default()
            );
        }
        PhaseView::Displaying { mode } => render_result(&mut out, *mode, view),
    }
    out
}

fn loading_label(mode: ExtractionMode) -> &'static str {
    match mode {
        ExtractionMode::Scrape => "Scraping page...",
        ExtractionMode::Crawl => "Crawling site...",
        ExtractionMode::Map => "Mapping links...",
        ExtractionMode::Search => "Searching...",
    }
}

fn render_result(out: &mut String, mode: ExtractionMode, view: &AppViewModel) {
    if let Some(source) = &view.source {
        let _ = writeln!(out, "[{mode}] {source}");
    }

    if mode == ExtractionMode::Map {
        let _ = writeln!(out, "Links ({}):", format_with_commas(view.links.len() as u64));
        for link in &view.links {
            let _ = writeln!(out, "  {link}");
        }
        return;
    }

    if view.pages.len() > 1 || view.has_combined {
        let _ = writeln!(out, "Pages:");
        if view.has_combined {
            let marker = if view.consolidated { '*' } else { ' ' };
            let _ = writeln!(out, " {marker} combined");
        }
        for tab in &view.pages {
            let marker = if tab.selected { '*' } else { ' ' };
            let title = if tab.title.is_empty() { &tab.url } else { &tab.title };
            let _ = writeln!(out, " {marker} {}. {title}", tab.index + 1);
        }
        out.push('\n');
    }

    if let Some(page) = &view.current {
        render_page(out, page);
    }
}

fn render_page(out: &mut String, page: &PageView) {
    if !page.title.is_empty() {
        let _ = writeln!(out, "{}", page.title);
    }
    let _ = writeln!(out, "{}", page.url);
    let _ = writeln!(
        out,
        "{} -> {} chars ({}% reduction)",
        format_with_commas(page.original_length),
        format_with_commas(page.cleaned_length),
        page.reduction_percent
    );
    let facets: Vec<String> = page
        .available_facets
        .iter()
        .map(|facet| {
            if *facet == page.facet {
                format!("[{facet}]")
            } else {
                facet.to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "Facets: {}", facets.join(" "));
    if let Some(summary) = &page.summary {
        let _ = writeln!(out, "Summary: {summary}");
    }
    out.push('\n');

    match &page.body {
        FacetBody::Markdown(text) | FacetBody::Raw(text) => {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
        FacetBody::Screenshot { encoded_len } => {
            let _ = writeln!(
                out,
                "(screenshot, {} base64 bytes; use `export` to save it)",
                format_with_commas(*encoded_len as u64)
            );
        }
        FacetBody::Document { encoded_len } => {
            let _ = writeln!(
                out,
                "(PDF document, {} base64 bytes; use `export` to save it)",
                format_with_commas(*encoded_len as u64)
            );
        }
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use refinery_core::{Facet, PageTabView};

    fn page_view(body: FacetBody) -> PageView {
        PageView {
            url: "https://a.test".to_string(),
            title: "A".to_string(),
            summary: None,
            facet: Facet::Preview,
            available_facets: vec![Facet::Preview, Facet::Raw, Facet::Screenshot],
            original_length: 12_500,
            cleaned_length: 5_000,
            reduction_percent: 60,
            body,
        }
    }

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }

    #[test]
    fn empty_view_prompts_for_input() {
        let view = AppViewModel::default();
        assert_eq!(render(&view), "[scrape] https://example.com/article\n");
    }

    #[test]
    fn error_shows_message() {
        let view = AppViewModel {
            phase: PhaseView::Error {
                message: "No content retrieved from browser".to_string(),
            },
            ..AppViewModel::default()
        };
        assert_eq!(render(&view), "Error: No content retrieved from browser\n");
    }

    #[test]
    fn page_shows_lengths_facets_and_body() {
        let view = AppViewModel {
            phase: PhaseView::Displaying {
                mode: ExtractionMode::Scrape,
            },
            source: Some("https://a.test".to_string()),
            pages: vec![PageTabView {
                index: 0,
                title: "A".to_string(),
                url: "https://a.test".to_string(),
                selected: true,
            }],
            current: Some(page_view(FacetBody::Markdown("# A".to_string()))),
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.contains("12,500 -> 5,000 chars (60% reduction)"));
        assert!(text.contains("Facets: [preview] raw screenshot"));
        assert!(text.ends_with("\n# A\n"));
        assert!(!text.contains("Pages:"));
    }

    #[test]
    fn grown_page_shows_negative_reduction() {
        let page = PageView {
            original_length: 10,
            cleaned_length: 25,
            reduction_percent: -150,
            ..page_view(FacetBody::Raw("<p>x</p>".to_string()))
        };
        let mut out = String::new();
        render_page(&mut out, &page);
        assert!(out.contains("10 -> 25 chars (-150% reduction)"));
    }

    #[test]
    fn search_lists_combined_and_result_tabs() {
        let view = AppViewModel {
            phase: PhaseView::Displaying {
                mode: ExtractionMode::Search,
            },
            source: Some("rust async".to_string()),
            pages: vec![PageTabView {
                index: 0,
                title: String::new(),
                url: "https://a.test".to_string(),
                selected: false,
            }],
            has_combined: true,
            consolidated: true,
            current: Some(page_view(FacetBody::Screenshot { encoded_len: 4096 })),
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.contains("Pages:\n * combined\n   1. https://a.test\n"));
        assert!(text.contains("(screenshot, 4,096 base64 bytes"));
    }

    #[test]
    fn map_lists_links() {
        let view = AppViewModel {
            phase: PhaseView::Displaying {
                mode: ExtractionMode::Map,
            },
            source: Some("https://a.test".to_string()),
            links: vec!["/x".to_string(), "/y".to_string()],
            ..AppViewModel::default()
        };
        assert_eq!(render(&view), "[map] https://a.test\nLinks (2):\n  /x\n  /y\n");
    }
}
