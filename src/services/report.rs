//! Report Export
//!
//! Lays an analysis out as a paginated plain-text document. Blocks that do
//! not fit the remaining lines of a page move to the next one.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::analysis::{AnalysisResult, ScoreBand};
use crate::utils::wrap_text;

pub const DEFAULT_FILE_NAME: &str = "GulfValidate-Analysis-Report.txt";

const TITLE: &str = "GulfValidate Analysis Report";
const TAGLINE: &str = "AI-powered startup validation for Gulf markets";
const PRODUCT_FOOTER: &str = "Generated by GulfValidate - AI-powered startup validation";
const PAGE_BREAK: char = '\u{c}';

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Reports are written as .txt, got '{0}'")]
    UnsupportedExtension(String),

    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct ReportBuilder {
    date: NaiveDate,
    page_lines: usize,
    width: usize,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            date: Local::now().date_naive(),
            page_lines: 48,
            width: 72,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Body lines per page, footer excluded
    pub fn with_page_lines(mut self, lines: usize) -> Self {
        self.page_lines = lines.max(4);
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    fn header(&self) -> Vec<String> {
        let date = format!("Generated on {}", self.date.format("%Y-%m-%d"));
        let gap = self.width.saturating_sub(TITLE.len() + date.len()).max(2);
        vec![
            format!("{}{}{}", TITLE, " ".repeat(gap), date),
            TAGLINE.to_string(),
            "=".repeat(self.width),
        ]
    }

    /// Numbered item with a hanging indent
    fn item(&self, index: usize, text: &str) -> Vec<String> {
        let marker = format!("{}. ", index);
        let indent = " ".repeat(marker.len());
        wrap_text(text, self.width.saturating_sub(marker.len()))
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    format!("{}{}", marker, line)
                } else {
                    format!("{}{}", indent, line)
                }
            })
            .collect()
    }

    fn blocks(&self, result: &AnalysisResult) -> Vec<Vec<String>> {
        let mut blocks = vec![
            self.header(),
            vec![
                String::new(),
                "Overall Feasibility Score".to_string(),
                format!("{}/100", result.overall_score),
                format!("Interpretation: {}", result.interpretation),
            ],
        ];

        let mut dimensions = vec![String::new(), "Dimension Analysis".to_string()];
        for (dimension, score) in result.scores.iter() {
            dimensions.push(format!(
                "{:<26}{:>3}/100  {}",
                format!("{}:", dimension.label()),
                score,
                ScoreBand::from_score(score).label()
            ));
        }
        blocks.push(dimensions);

        let sections = [
            ("Key Strengths", &result.strengths),
            ("Critical Concerns", &result.concerns),
            ("Priority Recommendations", &result.recommendations),
        ];
        for (title, items) in sections {
            let mut heading = vec![String::new(), title.to_string()];
            let mut items = items.iter().enumerate().map(|(i, text)| self.item(i + 1, text));
            // a heading never ends a page on its own
            if let Some(first) = items.next() {
                heading.extend(first);
            }
            blocks.push(heading);
            blocks.extend(items);
        }
        blocks
    }

    pub fn build(&self, result: &AnalysisResult) -> ReportDocument {
        let mut pages: Vec<Vec<String>> = vec![Vec::new()];
        for block in self.blocks(result) {
            for chunk in block.chunks(self.page_lines) {
                let full = pages
                    .last()
                    .is_some_and(|page| !page.is_empty() && page.len() + chunk.len() > self.page_lines);
                if full {
                    pages.push(Vec::new());
                }
                if let Some(page) = pages.last_mut() {
                    // no blank line at the top of a fresh page
                    let skip = usize::from(page.is_empty() && chunk.first().is_some_and(|l| l.is_empty()));
                    page.extend(chunk[skip..].iter().cloned());
                }
            }
        }
        ReportDocument {
            pages,
            page_lines: self.page_lines,
            width: self.width,
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pages: Vec<Vec<String>>,
    page_lines: usize,
    width: usize,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Body lines of each page
    pub fn pages(&self) -> &[Vec<String>] {
        &self.pages
    }

    fn footer(&self, page: usize) -> Vec<String> {
        let total = self.page_count();
        let number = format!("Page {} of {}", page, total);
        let mut footer = vec!["-".repeat(self.width)];
        if page == total {
            let gap = self.width.saturating_sub(PRODUCT_FOOTER.len() + number.len()).max(2);
            footer.push(format!("{}{}{}", PRODUCT_FOOTER, " ".repeat(gap), number));
        } else {
            footer.push(format!("{:>width$}", number, width = self.width));
        }
        footer
    }

    /// Pages padded to full height, separated by form feeds
    pub fn render(&self) -> String {
        let mut rendered = Vec::with_capacity(self.pages.len());
        for (i, body) in self.pages.iter().enumerate() {
            let mut lines = body.clone();
            lines.resize(self.page_lines, String::new());
            lines.extend(self.footer(i + 1));
            rendered.push(lines.join("\n"));
        }
        let mut text = rendered.join(&format!("\n{}", PAGE_BREAK));
        text.push('\n');
        text
    }

    pub async fn save(&self, path: &Path) -> Result<(), ReportError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => {}
            Some(ext) => return Err(ReportError::UnsupportedExtension(ext.to_string())),
            None => return Err(ReportError::UnsupportedExtension(String::new())),
        }
        let io_err = |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        fs::write(path, self.render()).await.map_err(io_err)?;
        info!("Report written to {} ({} pages)", path.display(), self.page_count());
        Ok(())
    }
}
