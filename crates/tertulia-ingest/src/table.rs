//! Delimiter detection and CSV normalization.
//!
//! Detection scores each candidate delimiter by how consistently it splits
//! a sample of lines into the header's field count. A file that no
//! candidate splits into at least two columns is rejected: a genuine
//! one-column file is indistinguishable from a wrong delimiter here.

use csv::{ReaderBuilder, StringRecord};

use crate::error::{IngestError, Result};

/// Candidates in priority order; earlier wins ties.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b';', b',', b'\t', b'|'];

/// Non-empty lines inspected by [`detect_delimiter`].
pub const SAMPLE_LINES: usize = 20;

/// Outcome of delimiter sniffing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub delimiter: u8,
    /// Fields in the header line.
    pub columns: usize,
    /// Fraction of sampled lines splitting into exactly `columns` fields.
    pub confidence: f64,
}

/// Detect the delimiter of `text`. `None` when no candidate yields two columns.
pub fn detect_delimiter(text: &str) -> Option<Detection> {
    let sample: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect();
    let header = sample.first()?;

    let mut best: Option<Detection> = None;
    for delimiter in DELIMITER_CANDIDATES {
        let columns = count_fields(header, delimiter);
        if columns < 2 {
            continue;
        }
        let consistent = sample
            .iter()
            .filter(|line| count_fields(line, delimiter) == columns)
            .count();
        let candidate = Detection {
            delimiter,
            columns,
            confidence: consistent as f64 / sample.len() as f64,
        };

        let better = match best {
            None => true,
            Some(b) => {
                candidate.confidence > b.confidence
                    || (candidate.confidence == b.confidence && candidate.columns > b.columns)
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Count fields in one line, ignoring delimiters inside double quotes.
fn count_fields(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut fields = 1;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            fields += 1;
        }
    }
    fields
}

/// Drop leading whitespace-only lines, returning how many were dropped.
fn skip_blank_lines(text: &str) -> (usize, &str) {
    let mut skipped = 0;
    let mut rest = text;
    while let Some((line, tail)) = rest.split_once('\n') {
        if !line.trim().is_empty() {
            break;
        }
        skipped += 1;
        rest = tail;
    }
    (skipped, rest)
}

/// A parsed CSV with trimmed, lower-cased headers.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub detection: Detection,
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
    /// 1-based line of the header in the uploaded file.
    pub header_line: usize,
}

impl CsvTable {
    /// Parse raw upload bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| IngestError::Encoding)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        if text.trim().is_empty() {
            return Err(IngestError::Empty);
        }

        // Detection samples from the first non-blank line; the reader must agree.
        let (skipped, text) = skip_blank_lines(text);
        let detection = detect_delimiter(text).ok_or(IngestError::SingleColumn)?;
        if detection.confidence < 1.0 {
            let shown = (detection.delimiter as char).escape_default().to_string();
            tracing::warn!(
                delimiter = %shown,
                confidence = detection.confidence,
                "Ragged CSV sample"
            );
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(detection.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        if headers.len() < 2 {
            return Err(IngestError::SingleColumn);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(record);
        }
        if rows.is_empty() {
            return Err(IngestError::Empty);
        }

        Ok(Self {
            detection,
            headers,
            rows,
            header_line: skipped + 1,
        })
    }

    /// 1-based line in the uploaded file where data row `index` starts.
    pub fn line(&self, index: usize) -> usize {
        self.rows
            .get(index)
            .and_then(|row| row.position())
            .map(|pos| pos.line() as usize + self.header_line - 1)
            .unwrap_or(self.header_line + 1 + index)
    }

    /// Index of the first header matching one of `names`, tried in order.
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h == name))
    }

    /// Cleaned cell: trimmed, `None` when missing or empty.
    pub fn cell<'a>(&self, row: &'a StringRecord, column: usize) -> Option<&'a str> {
        row.get(column).map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_comma() {
        let d = detect_delimiter("a,b,c\n1,2,3").unwrap();
        assert_eq!(d.delimiter, b',');
        assert_eq!(d.columns, 3);
        assert_eq!(d.confidence, 1.0);

        let table = CsvTable::parse(b"a,b,c\n1,2,3").unwrap();
        assert_eq!(table.headers, ["a", "b", "c"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_single_column_rejected() {
        assert!(detect_delimiter("onlycolumn\nval").is_none());
        assert!(matches!(
            CsvTable::parse(b"onlycolumn\nval"),
            Err(IngestError::SingleColumn)
        ));
    }

    #[test]
    fn test_semicolon_beats_comma_in_values() {
        let text = "IdLibro;Titulo;Genero\n1;Cien años de soledad;Novela, realismo\n2;Ficciones;Cuento";
        let d = detect_delimiter(text).unwrap();
        assert_eq!(d.delimiter, b';');
        assert_eq!(d.columns, 3);
    }

    #[test]
    fn test_tie_prefers_earlier_candidate() {
        let d = detect_delimiter("a;b,c\n1;2,3").unwrap();
        assert_eq!(d.delimiter, b';');
    }

    #[test]
    fn test_quoted_delimiters_ignored() {
        let text = "titulo|autor\n\"Uno, dos|tres\"|Ana\nOtro|Eva";
        let d = detect_delimiter(text).unwrap();
        assert_eq!(d.delimiter, b'|');
        assert_eq!(d.confidence, 1.0);
    }

    #[test]
    fn test_tab_and_pipe() {
        assert_eq!(detect_delimiter("a\tb\n1\t2").unwrap().delimiter, b'\t');
        assert_eq!(detect_delimiter("a|b\n1|2").unwrap().delimiter, b'|');
    }

    #[test]
    fn test_confidence_reflects_ragged_lines() {
        let d = detect_delimiter("a,b,c\n1,2,3\n4,5\n6,7,8").unwrap();
        assert_eq!(d.columns, 3);
        assert_eq!(d.confidence, 0.75);
    }

    #[test]
    fn test_headers_normalized() {
        let table = CsvTable::parse(b"\xEF\xBB\xBF IdAutor ; Nombre ;NACIONALIDAD\r\n1;Borges;AR\r\n").unwrap();
        assert_eq!(table.headers, ["idautor", "nombre", "nacionalidad"]);
        assert_eq!(table.column(&["nombrecompleto", "nombre"]), Some(1));
        assert_eq!(table.column(&["missing"]), None);
    }

    #[test]
    fn test_cells_cleaned() {
        let table = CsvTable::parse(b"id;nombre;tipo\n1;  Ana  ;\n2;Eva").unwrap();
        let first = &table.rows[0];
        assert_eq!(table.cell(first, 1), Some("Ana"));
        assert_eq!(table.cell(first, 2), None);
        // Short row: the missing cell is absent, not empty.
        assert_eq!(table.cell(&table.rows[1], 2), None);
    }

    #[test]
    fn test_leading_blank_lines_skipped_like_detection() {
        let text = "   \na;b\n1;2";
        assert_eq!(detect_delimiter(text).unwrap().columns, 2);

        let table = CsvTable::parse(text.as_bytes()).unwrap();
        assert_eq!(table.headers, ["a", "b"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.header_line, 2);
        assert_eq!(table.line(0), 3);
    }

    #[test]
    fn test_row_lines_follow_the_file() {
        let table = CsvTable::parse(b"\r\nid;nombre\n1;Ana\n\n2;Eva\n").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.line(0), 3);
        assert_eq!(table.line(1), 5);
    }

    #[test]
    fn test_rejects_non_utf8_and_empty() {
        assert!(matches!(
            CsvTable::parse(&[0xff, 0xfe, 0x00, 0x41]),
            Err(IngestError::Encoding)
        ));
        assert!(matches!(CsvTable::parse(b"  \n"), Err(IngestError::Empty)));
        assert!(matches!(CsvTable::parse(b"a;b\n"), Err(IngestError::Empty)));
    }
}
