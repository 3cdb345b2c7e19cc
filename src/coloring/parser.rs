//! Parser for the text output of the external colorer.
//!
//! Data lines look like `Edge <u> - <v> : Color <c>` with a 1-based color.
//! The entry may sit anywhere on a line and whitespace around the separators is
//! optional. Lines without an entry (banners, totals, logs) are skipped.
//!
//! When an edge is listed more than once, [`ParseMode::Lenient`] keeps the last
//! color while [`ParseMode::Strict`] rejects the output. Strict mode also
//! rejects `Color 0` and numbers that do not fit a `usize`. Lenient mode stores
//! `Color 0` as [`COLOR_ZERO`] and skips lines with oversized numbers.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1, space0, space1},
    sequence::{delimited, preceded, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

use super::{Coloring, COLOR_ZERO};
use crate::graph::{Edge, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseMode {
    /// Repeated edges overwrite earlier entries.
    #[default]
    Lenient,
    /// Repeated edges are an error.
    Strict,
}

/// One `Edge u - v : Color c` entry, numbers still in text form and `c` 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry<'a> {
    u: &'a str,
    v: &'a str,
    color: &'a str,
}

fn number(input: &str) -> IResult<&str, &str> {
    digit1(input)
}

fn entry(input: &str) -> IResult<&str, Entry<'_>> {
    let (input, u) = preceded(tuple((tag("Edge"), space1)), number)(input)?;
    let (input, v) = preceded(delimited(space0, char('-'), space0), number)(input)?;
    let (input, color) = preceded(
        tuple((space0, char(':'), space0, tag("Color"), space1)),
        number,
    )(input)?;
    Ok((input, Entry { u, v, color }))
}

/// Find the first entry on a line.
fn scan_line(line: &str) -> Option<Entry<'_>> {
    line.match_indices("Edge")
        .find_map(|(i, _)| entry(&line[i..]).ok().map(|(_, e)| e))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColoringParser {
    mode: ParseMode,
}

impl ColoringParser {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn parse(&self, reader: impl BufRead) -> anyhow::Result<Coloring> {
        let mut coloring = Coloring::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let Some(entry) = scan_line(&line) else {
                continue;
            };
            let (Ok(u), Ok(v), Ok(color)) = (
                entry.u.parse::<NodeId>(),
                entry.v.parse::<NodeId>(),
                entry.color.parse::<usize>(),
            ) else {
                if self.mode == ParseMode::Strict {
                    anyhow::bail!("Line {}: number too large in `{}`", lineno + 1, line.trim());
                }
                log::warn!("Skipping line {}: number too large", lineno + 1);
                continue;
            };
            let color = match color.checked_sub(1) {
                Some(color) => color,
                None if self.mode == ParseMode::Strict => {
                    anyhow::bail!("Line {}: color 0 is out of range", lineno + 1);
                }
                None => COLOR_ZERO,
            };
            let edge = Edge::new(u, v);
            if let Some(previous) = coloring.set(edge, color) {
                if self.mode == ParseMode::Strict {
                    anyhow::bail!(
                        "Line {}: edge {} listed twice (colors {} and {})",
                        lineno + 1,
                        edge,
                        previous + 1,
                        entry.color
                    );
                }
            }
        }
        Ok(coloring)
    }

    pub fn parse_str(&self, text: &str) -> anyhow::Result<Coloring> {
        self.parse(text.as_bytes())
    }

    pub fn parse_file(&self, path: &Path) -> anyhow::Result<Coloring> {
        let file = File::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open coloring {}: {}", path.display(), e))?;
        self.parse(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(text: &str) -> Coloring {
        ColoringParser::default().parse_str(text).unwrap()
    }

    #[test]
    fn parses_entries_and_skips_noise() {
        let coloring = lenient(
            "Edge List with Colors:\nEdge 3 - 0 : Color 2\nEdge 1 - 4 : Color 1\nTotal colors used: 2\n",
        );
        assert_eq!(coloring.len(), 2);
        assert_eq!(coloring.color(Edge(0, 3)), Some(1));
        assert_eq!(coloring.color(Edge(1, 4)), Some(0));
        assert_eq!(coloring.num_colors, 2);
    }

    #[test]
    fn tolerates_whitespace_and_surrounding_text() {
        let coloring = lenient("[out] Edge\t7-8:Color  3 ;\n  Edge 9 -10 :  Color 1\n");
        assert_eq!(coloring.color(Edge(7, 8)), Some(2));
        assert_eq!(coloring.color(Edge(9, 10)), Some(0));
    }

    #[test]
    fn keyword_match_is_case_sensitive() {
        assert!(lenient("edge 1 - 2 : color 1\nEDGE 1 - 2 : COLOR 1\n").is_empty());
    }

    #[test]
    fn finds_entry_after_earlier_keyword() {
        let coloring = lenient("Edge list follows. Edge 5 - 6 : Color 4\n");
        assert_eq!(coloring.color(Edge(5, 6)), Some(3));
    }

    #[test]
    fn last_occurrence_wins() {
        let coloring = lenient("Edge 1 - 2 : Color 1\nEdge 1 - 2 : Color 3\n");
        assert_eq!(coloring.len(), 1);
        assert_eq!(coloring.color(Edge(1, 2)), Some(2));
        assert_eq!(coloring.num_colors, 3);

        let coloring = lenient("Edge 1 - 2 : Color 3\nEdge 2 - 1 : Color 1\n");
        assert_eq!(coloring.color(Edge(1, 2)), Some(0));
        // the overwritten color still counts
        assert_eq!(coloring.num_colors, 3);
    }

    #[test]
    fn strict_mode_rejects_repeated_edges() {
        let parser = ColoringParser::new(ParseMode::Strict);
        let err = parser
            .parse_str("Edge 1 - 2 : Color 1\nEdge 2 - 1 : Color 2\n")
            .unwrap_err();
        assert!(err.to_string().contains("(1, 2)"));
        assert!(parser.parse_str("Edge 1 - 2 : Color 1\nEdge 2 - 3 : Color 2\n").is_ok());
    }

    #[test]
    fn color_zero() {
        let coloring = lenient("Edge 1 - 2 : Color 0\nEdge 2 - 3 : Color 1\n");
        assert_eq!(coloring.color(Edge(1, 2)), Some(COLOR_ZERO));
        assert_eq!(coloring.num_colors, 1);
        assert!(ColoringParser::new(ParseMode::Strict)
            .parse_str("Edge 1 - 2 : Color 0\n")
            .is_err());
    }

    #[test]
    fn numbers_beyond_usize() {
        let text = "Edge 1 - 2 : Color 99999999999999999999999\nEdge 99999999999999999999999 - 0 : Color 1\nEdge 3 - 4 : Color 1\n";
        let coloring = lenient(text);
        assert_eq!(coloring.len(), 1);
        assert_eq!(coloring.color(Edge(3, 4)), Some(0));
        let err = ColoringParser::new(ParseMode::Strict)
            .parse_str(text)
            .unwrap_err();
        assert!(err.to_string().starts_with("Line 1: number too large"));
    }

    #[test]
    fn empty_output_has_no_colors() {
        let coloring = lenient("");
        assert!(coloring.is_empty());
        assert_eq!(coloring.num_colors, 0);
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = "Edge 0 - 3 : Color 1\nnoise\nEdge 0 - 4 : Color 2\nEdge 0 - 3 : Color 2\n";
        assert_eq!(lenient(text), lenient(text));
    }
}
