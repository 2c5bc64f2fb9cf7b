use std::collections::HashMap;

use tracing::debug;

use crate::column::{ColumnConfig, ColumnRef, IndexConfig};
use crate::error::ImportError;
use crate::file::Dialect;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Rows after the first one that take part in the header vote.
const SNIFF_ROWS: usize = 20;

/// Resolve every role in `config` to a cell index using the leading bytes of
/// the file. Returns the resolved roles and whether a header row was found.
/// The delimiter is sniffed from the sample and `"` is the quote character.
///
/// Header names that do not appear in the header row are dropped from the
/// result rather than reported; callers compare lengths when they need to
/// know every role resolved.
pub fn normalize(config: &ColumnConfig, head: &str) -> Result<(IndexConfig, bool), ImportError> {
    let lines = complete_lines(strip_bom(head));
    let delimiter = sniff_delimiter_lines(&lines);
    resolve(config, &Sample::parse(&lines, delimiter, b'"'))
}

/// Like [`normalize`], but the sample is split with the same delimiter and
/// quote the rows will be read with.
pub fn normalize_with_dialect(
    config: &ColumnConfig,
    head: &str,
    dialect: &Dialect,
) -> Result<(IndexConfig, bool), ImportError> {
    let (delimiter, quote) = dialect.validate()?;
    let lines = complete_lines(strip_bom(head));
    resolve(config, &Sample::parse(&lines, delimiter, quote))
}

fn resolve(config: &ColumnConfig, sample: &Sample) -> Result<(IndexConfig, bool), ImportError> {
    let has_header = sample.has_header();

    if !has_header {
        let mut index_config = IndexConfig::new();
        for (&column, field) in config {
            match field {
                ColumnRef::Index(index) => {
                    index_config.insert(column, *index);
                }
                ColumnRef::Name(_) => return Err(ImportError::NonIndexColumn(column)),
            }
        }
        return Ok((index_config, false));
    }

    let field_map: HashMap<String, usize> = sample
        .rows
        .first()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(index, name)| (name.trim().to_string(), index))
                .collect()
        })
        .unwrap_or_default();

    let mut index_config = IndexConfig::new();
    for (&column, field) in config {
        match field {
            ColumnRef::Index(index) => {
                index_config.insert(column, *index);
            }
            ColumnRef::Name(name) => match field_map.get(name.trim()) {
                Some(&index) => {
                    index_config.insert(column, index);
                }
                None => debug!(%column, name = %name, "header has no such column, dropping role"),
            },
        }
    }
    Ok((index_config, true))
}

/// Sniff whether the first line of `head` is a header row.
pub fn has_header(head: &str) -> bool {
    let lines = complete_lines(strip_bom(head));
    let delimiter = sniff_delimiter_lines(&lines);
    Sample::parse(&lines, delimiter, b'"').has_header()
}

/// Guess the field delimiter used by `head`. Defaults to a comma.
pub fn sniff_delimiter(head: &str) -> u8 {
    sniff_delimiter_lines(&complete_lines(head))
}

fn strip_bom(head: &str) -> &str {
    head.strip_prefix('\u{feff}').unwrap_or(head)
}

struct Sample {
    rows: Vec<Vec<String>>,
}

impl Sample {
    fn parse(lines: &[&str], delimiter: u8, quote: u8) -> Self {
        let text = lines.join("\n");
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .quote(quote)
            .from_reader(text.as_bytes());
        let rows = reader
            .records()
            .filter_map(Result::ok)
            .take(SNIFF_ROWS + 1)
            .map(|record| record.iter().map(str::to_string).collect())
            .collect();
        Sample { rows }
    }

    /// Votes column by column: a column whose body cells agree on a type
    /// (numeric, or a fixed length) votes for a header when the first row's
    /// cell breaks that pattern. A column no body row reached counts for a
    /// header, so a lone header line is still recognized.
    fn has_header(&self) -> bool {
        let Some((header, body)) = self.rows.split_first() else {
            return false;
        };
        let width = header.len();
        let mut types: Vec<Option<CellType>> = vec![None; width];
        let mut discarded = vec![false; width];

        for row in body.iter().filter(|row| row.len() == width) {
            for (col, cell) in row.iter().enumerate() {
                if discarded[col] {
                    continue;
                }
                let this = CellType::of(cell);
                match types[col] {
                    None => types[col] = Some(this),
                    Some(seen) if seen != this => discarded[col] = true,
                    Some(_) => {}
                }
            }
        }

        let votes: i32 = types
            .iter()
            .zip(&discarded)
            .enumerate()
            .filter(|(_, (_, gone))| !**gone)
            .map(|(col, (ty, _))| match ty {
                Some(ty) if CellType::of(&header[col]) == *ty => -1,
                _ => 1,
            })
            .sum();
        votes > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    Numeric,
    Length(usize),
}

impl CellType {
    fn of(cell: &str) -> Self {
        let trimmed = cell.trim();
        let numeric = trimmed.chars().any(|c| c.is_ascii_digit()) && trimmed.parse::<f64>().is_ok();
        if numeric {
            CellType::Numeric
        } else {
            CellType::Length(cell.chars().count())
        }
    }
}

/// Non-empty lines of `head`, without a trailing line cut off by sampling.
fn complete_lines(head: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = head.lines().collect();
    if lines.len() > 1 && !head.ends_with('\n') {
        lines.pop();
    }
    lines.retain(|line| !line.trim().is_empty());
    lines
}

fn sniff_delimiter_lines(lines: &[&str]) -> u8 {
    let mut best = (0usize, b',');
    for &candidate in &CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, candidate))
            .collect();
        let mut frequency: HashMap<usize, usize> = HashMap::new();
        for &count in counts.iter().filter(|&&c| c > 0) {
            *frequency.entry(count).or_default() += 1;
        }
        let consistent = frequency.values().copied().max().unwrap_or(0);
        if consistent > best.0 {
            best = (consistent, candidate);
        }
    }
    best.1
}

fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut quoted = false;
    let mut count = 0;
    for &b in line.as_bytes() {
        if b == b'"' {
            quoted = !quoted;
        } else if b == delimiter && !quoted {
            count += 1;
        }
    }
    count
}
