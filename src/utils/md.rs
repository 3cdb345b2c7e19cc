//! Markdown output for the terminal.
//!
//! Rendered with termimad when stdout is a terminal, printed as raw markdown
//! otherwise so the output can be piped into a file.

use std::io::IsTerminal;

use polars::prelude::{AnyValue, DataFrame};
use termimad::{
    crossterm::style::{Attribute, Color},
    Alignment, MadSkin,
};

/// Left-aligned bold blue headers, the top-level one drawn as a banner.
fn skin() -> MadSkin {
    let mut skin = MadSkin::default();
    for header in skin.headers.iter_mut() {
        header.align = Alignment::Left;
        header.add_attr(Attribute::Bold);
        header.set_fg(Color::Blue);
    }
    skin.headers[0].set_bg(Color::Blue);
    skin.headers[0].add_attr(Attribute::NoUnderline);
    skin
}

pub fn print_md(s: impl AsRef<str>) {
    MarkdownPrinter::from(s.as_ref()).dump();
}

/// Accumulates a markdown document, e.g. a report, before printing it at once.
#[derive(Debug, Default)]
pub struct MarkdownPrinter {
    content: String,
}

impl From<&str> for MarkdownPrinter {
    fn from(s: &str) -> Self {
        Self {
            content: s.to_owned(),
        }
    }
}

impl MarkdownPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dump(&self) {
        if std::io::stdout().is_terminal() {
            skin().print_text(&self.content);
        } else {
            println!("{}", self.content);
        }
    }

    pub fn add(&mut self, s: impl AsRef<str>) {
        self.content += s.as_ref();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn format_cell(value: AnyValue) -> String {
        match value {
            AnyValue::Float64(v) => format!("{:.4}", v),
            AnyValue::Float32(v) => format!("{:.4}", v),
            AnyValue::Null => "-".to_owned(),
            v => v.to_string(),
        }
    }

    /// Append a dataframe as a markdown table.
    pub fn add_dataframe(&mut self, df: &DataFrame) {
        let names = df.get_column_names();
        self.add(format!("|{}|\n", names.join("|")));
        self.add(format!("|{}|\n", vec![":-:"; names.len()].join("|")));
        for i in 0..df.height() {
            let cells = df
                .get_columns()
                .iter()
                .map(|c| c.get(i).map(Self::format_cell).unwrap_or_default())
                .collect::<Vec<_>>();
            self.add(format!("|{}|\n", cells.join("|")));
        }
    }
}

#[macro_export]
macro_rules! print_md {
    ($($arg:tt)*) => {
        $crate::utils::md::print_md(format!($($arg)*));
    };
}
