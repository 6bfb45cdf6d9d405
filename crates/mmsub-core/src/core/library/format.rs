//! Reader for the line-oriented substructure text format.
//!
//! ```text
//! C  RH-PX                     header, starts a record
//!  2  Rh-PX                    declared atom count and pattern
//! -2                           parameter section
//!  1  1  2  2.3550  2.1000     bond: indices, coefficients
//!  2  2  1  5  00 00 H7  108.8086  0.1934
//!  2a 5  1  2                  alternate indices for the entry above
//! -3                           end of record
//! V  Rh  2.45 0.05             nonbonded pass-through
//! ```
//!
//! Fields are separated by whitespace, not by column position. A negative
//! coefficient written flush against the previous column (`108.8086-0.1934`)
//! is read as one token and rejected as an invalid number.

use super::entry::{Coefficients, ParameterEntry};
use super::error::{LoadError, LoadErrorKind};
use super::record::SubstructureRecord;
use crate::core::models::interaction::InteractionKind;
use crate::core::pattern::graph::PatternGraph;
use crate::core::types::registry::{AtomTypeRegistry, NonbondedRecord, TypePattern};
use std::collections::BTreeSet;
use tracing::{debug, warn};

const SECTION_OPEN: &str = "-2";
const SECTION_CLOSE: &str = "-3";

/// Everything read from one library text, before it is assembled.
#[derive(Debug, Default)]
pub(crate) struct ParsedText {
    pub records: Vec<SubstructureRecord>,
    pub nonbonded: Vec<(usize, NonbondedRecord)>,
    pub errors: Vec<LoadError>,
}

struct OpenRecord {
    label: String,
    line: usize,
    stage: Stage,
}

enum Stage {
    AwaitPattern,
    AwaitSection {
        atom_count: usize,
        pattern: PatternGraph,
    },
    Parameters {
        atom_count: usize,
        pattern: PatternGraph,
        entries: Vec<ParameterEntry>,
    },
}

enum State {
    Outside,
    InRecord(OpenRecord),
    /// A record failed; ignore lines until it closes.
    Skipping,
}

struct Reader<'a> {
    registry: &'a AtomTypeRegistry,
    parsed: ParsedText,
    state: State,
}

fn is_header(line: &str) -> bool {
    line.split_whitespace().next() == Some("C")
}

fn header_label(line: &str) -> String {
    line.trim_start()
        .strip_prefix('C')
        .unwrap_or_default()
        .trim()
        .to_string()
}

impl<'a> Reader<'a> {
    fn new(registry: &'a AtomTypeRegistry) -> Self {
        Self {
            registry,
            parsed: ParsedText::default(),
            state: State::Outside,
        }
    }

    fn error(&mut self, line: usize, record: Option<String>, kind: LoadErrorKind) {
        warn!(line, record = record.as_deref().unwrap_or(""), error = %kind, "Skipping invalid library content");
        self.parsed.errors.push(LoadError { line, record, kind });
    }

    /// Drops the open record. A failure on the closing `-3` itself leaves
    /// nothing to skip.
    fn fail_record(&mut self, line_num: usize, line: &str, label: String, kind: LoadErrorKind) {
        self.error(line_num, Some(label), kind);
        self.state = if line == SECTION_CLOSE {
            State::Outside
        } else {
            State::Skipping
        };
    }

    fn finish(mut self, last_line: usize) -> ParsedText {
        if let State::InRecord(open) = std::mem::replace(&mut self.state, State::Outside) {
            self.error(last_line, Some(open.label), LoadErrorKind::UnterminatedRecord);
        }
        self.parsed
    }

    fn line(&mut self, line_num: usize, raw: &str) {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        let state = std::mem::replace(&mut self.state, State::Outside);
        match state {
            State::Outside => self.outside(line_num, line),
            State::Skipping => {
                if is_header(line) {
                    self.open(line_num, line);
                } else if line != SECTION_CLOSE {
                    self.state = State::Skipping;
                }
            }
            State::InRecord(open) => {
                if is_header(line) {
                    self.error(line_num, Some(open.label), LoadErrorKind::UnterminatedRecord);
                    self.open(line_num, line);
                } else {
                    self.in_record(line_num, line, open);
                }
            }
        }
    }

    fn outside(&mut self, line_num: usize, line: &str) {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("C") => self.open(line_num, line),
            Some("V") => match tokens.next() {
                Some(symbol) => {
                    let record = NonbondedRecord {
                        symbol: symbol.to_string(),
                        fields: tokens.map(str::to_string).collect(),
                    };
                    self.parsed.nonbonded.push((line_num, record));
                }
                None => self.error(line_num, None, LoadErrorKind::MissingNonbondedSymbol),
            },
            _ => self.error(
                line_num,
                None,
                LoadErrorKind::UnexpectedLine(line.to_string()),
            ),
        }
    }

    fn open(&mut self, line_num: usize, line: &str) {
        self.state = State::InRecord(OpenRecord {
            label: header_label(line),
            line: line_num,
            stage: Stage::AwaitPattern,
        });
    }

    fn in_record(&mut self, line_num: usize, line: &str, open: OpenRecord) {
        let OpenRecord {
            label,
            line: header_line,
            stage,
        } = open;

        let next = match stage {
            Stage::AwaitPattern => self.pattern_line(line).map(|(atom_count, pattern)| {
                Stage::AwaitSection {
                    atom_count,
                    pattern,
                }
            }),
            Stage::AwaitSection {
                atom_count,
                pattern,
            } => {
                if line == SECTION_OPEN {
                    Ok(Stage::Parameters {
                        atom_count,
                        pattern,
                        entries: Vec::new(),
                    })
                } else {
                    Err(LoadErrorKind::MissingSectionDelimiter(line.to_string()))
                }
            }
            Stage::Parameters {
                atom_count,
                pattern,
                mut entries,
            } => {
                if line == SECTION_CLOSE {
                    let order = self.parsed.records.len();
                    debug!(label = %label, entries = entries.len(), order, "Loaded substructure record");
                    self.parsed.records.push(SubstructureRecord {
                        label,
                        atom_count,
                        pattern,
                        entries,
                        order,
                        line: header_line,
                    });
                    return;
                }
                parameter_line(self.registry, line_num, line, &pattern, &mut entries).map(|()| {
                    Stage::Parameters {
                        atom_count,
                        pattern,
                        entries,
                    }
                })
            }
        };

        match next {
            Ok(stage) => {
                self.state = State::InRecord(OpenRecord {
                    label,
                    line: header_line,
                    stage,
                })
            }
            Err(kind) => self.fail_record(line_num, line, label, kind),
        }
    }

    fn pattern_line(&self, line: &str) -> Result<(usize, PatternGraph), LoadErrorKind> {
        let (count, pattern) = line
            .split_once(char::is_whitespace)
            .ok_or(LoadErrorKind::MissingPattern)?;
        let atom_count: usize = count
            .parse()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| LoadErrorKind::InvalidAtomCount(count.to_string()))?;
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(LoadErrorKind::MissingPattern);
        }
        let graph = PatternGraph::parse(pattern, atom_count, self.registry)?;
        Ok((atom_count, graph))
    }
}

fn parse_index(token: &str, declared: usize) -> Result<usize, LoadErrorKind> {
    let index: usize = token
        .parse()
        .map_err(|_| LoadErrorKind::InvalidIndex(token.to_string()))?;
    if index == 0 || index > declared {
        return Err(LoadErrorKind::IndexOutOfRange { index, declared });
    }
    Ok(index)
}

fn parse_indices(
    tokens: &[&str],
    pattern: &PatternGraph,
) -> Result<Vec<usize>, LoadErrorKind> {
    let indices = tokens
        .iter()
        .map(|t| parse_index(t, pattern.len()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = BTreeSet::new();
    if let Some(&repeated) = indices.iter().find(|&&i| !seen.insert(i)) {
        return Err(LoadErrorKind::RepeatedIndex(repeated));
    }
    if !indices
        .windows(2)
        .all(|pair| pattern.requires_bond(pair[0], pair[1]))
    {
        return Err(LoadErrorKind::NotAnInteraction(indices));
    }
    Ok(indices)
}

fn parameter_line(
    registry: &AtomTypeRegistry,
    line_num: usize,
    line: &str,
    pattern: &PatternGraph,
    entries: &mut Vec<ParameterEntry>,
) -> Result<(), LoadErrorKind> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (tag, rest) = tokens
        .split_first()
        .ok_or_else(|| LoadErrorKind::UnexpectedLine(line.to_string()))?;

    let (digit, is_alternate) = match tag.strip_suffix('a') {
        Some(digit) => (digit, true),
        None => (*tag, false),
    };
    let kind = digit
        .parse::<u8>()
        .ok()
        .and_then(InteractionKind::from_tag)
        .ok_or_else(|| LoadErrorKind::UnknownClassTag(tag.to_string()))?;
    let arity = kind.arity();

    if is_alternate {
        if rest.len() != arity {
            return Err(LoadErrorKind::IndexCount {
                expected: arity,
                found: rest.len(),
            });
        }
        let alternate = parse_indices(rest, pattern)?;
        let primary = match entries.last_mut() {
            Some(entry) if entry.kind == kind && entry.alternate.is_none() => entry,
            _ => return Err(LoadErrorKind::OrphanAlternate),
        };
        let same_atoms = primary.indices.iter().collect::<BTreeSet<_>>()
            == alternate.iter().collect::<BTreeSet<_>>();
        if !same_atoms {
            return Err(LoadErrorKind::InvalidAlternate {
                primary: primary.indices.clone(),
                alternate,
            });
        }
        primary.alternate = Some(alternate);
        return Ok(());
    }

    if rest.len() < arity {
        return Err(LoadErrorKind::IndexCount {
            expected: arity,
            found: rest.len(),
        });
    }
    let indices = parse_indices(&rest[..arity], pattern)?;

    let tail = &rest[arity..];
    let expected = kind.coefficient_count();
    let (literal_tokens, value_tokens) = if tail.len() == expected {
        (&tail[..0], tail)
    } else if tail.len() == arity + expected {
        tail.split_at(arity)
    } else if tail.len() < expected {
        return Err(LoadErrorKind::CoefficientCount {
            expected,
            found: tail.len(),
        });
    } else {
        return Err(LoadErrorKind::LiteralCount {
            expected: arity,
            found: tail.len() - expected,
        });
    };

    let literals = literal_tokens
        .iter()
        .map(|t| registry.resolve(t))
        .collect::<Result<Vec<TypePattern>, _>>()?;
    let values = value_tokens
        .iter()
        .map(|t| {
            t.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| LoadErrorKind::InvalidNumber(t.to_string()))
        })
        .collect::<Result<Vec<f64>, _>>()?;
    let coefficients = Coefficients::from_values(kind, &values).ok_or(
        LoadErrorKind::CoefficientCount {
            expected,
            found: values.len(),
        },
    )?;

    entries.push(ParameterEntry {
        kind,
        indices,
        literals,
        coefficients,
        alternate: None,
        line: line_num,
    });
    Ok(())
}

/// Reads every record and nonbonded line of a library text.
///
/// Records with errors are dropped and their errors collected; the reader
/// resynchronizes at the record's closing `-3` or at the next header.
pub(crate) fn read_library_text(text: &str, registry: &AtomTypeRegistry) -> ParsedText {
    let mut reader = Reader::new(registry);
    let mut last_line = 0;
    for (index, line) in text.lines().enumerate() {
        last_line = index + 1;
        reader.line(last_line, line);
    }
    reader.finish(last_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> ParsedText {
        read_library_text(text, &AtomTypeRegistry::builtin())
    }

    fn kinds(parsed: &ParsedText) -> Vec<&LoadErrorKind> {
        parsed.errors.iter().map(|e| &e.kind).collect()
    }

    const TWO_RECORDS: &str = "\
# comment line
C  RH-PX
 2  Rh-PX
-2
 1  1  2  2.3550  2.1000
-3

C  ethane
 2  C3-C3
-2
 1  1  2  1.5230  4.4000
 1  1  2  C3 C3  1.5300  4.5000
-3
V  Rh  2.45  0.05
";

    #[test]
    fn reads_records_in_order() {
        let parsed = read(TWO_RECORDS);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert_eq!(parsed.records.len(), 2);

        let first = &parsed.records[0];
        assert_eq!(first.label, "RH-PX");
        assert_eq!(first.order, 0);
        assert_eq!(first.line, 2);
        assert_eq!(first.entries.len(), 1);
        assert_eq!(
            first.entries[0].coefficients,
            Coefficients::Bond {
                length: 2.3550,
                force_constant: 2.1
            }
        );

        let second = &parsed.records[1];
        assert_eq!(second.order, 1);
        assert_eq!(second.entries[1].specificity(), 2);
        assert_eq!(second.entries[1].line, 12);
    }

    #[test]
    fn collects_nonbonded_lines() {
        let parsed = read(TWO_RECORDS);
        assert_eq!(parsed.nonbonded.len(), 1);
        let (line, record) = &parsed.nonbonded[0];
        let expected = TWO_RECORDS
            .lines()
            .position(|l| l.starts_with("V "))
            .unwrap()
            + 1;
        assert_eq!(expected, 14);
        assert_eq!(*line, expected);
        assert_eq!(record.symbol, "Rh");
        assert_eq!(record.fields, vec!["2.45", "0.05"]);
    }

    #[test]
    fn bad_record_does_not_block_the_rest() {
        let text = "\
C  broken
 2  C3-Zz
-2
 1  1  2  1.0  1.0
-3
C  fine
 2  C3-C3
-2
 1  1  2  1.5  4.4
-3
";
        let parsed = read(text);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].label, "fine");
        assert_eq!(parsed.records[0].order, 0);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line, 2);
        assert_eq!(parsed.errors[0].record.as_deref(), Some("broken"));
        assert!(matches!(
            parsed.errors[0].kind,
            LoadErrorKind::UnknownAtomType(_)
        ));
    }

    #[test]
    fn header_inside_record_reports_unterminated_record() {
        let text = "\
C  first
 2  C3-C3
-2
 1  1  2  1.5  4.4
C  second
 2  C3-C3
-2
-3
";
        let parsed = read(text);
        assert_eq!(kinds(&parsed), vec![&LoadErrorKind::UnterminatedRecord]);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].label, "second");
    }

    #[test]
    fn end_of_text_inside_record_is_an_error() {
        let parsed = read("C  open\n 1  C3\n-2\n");
        assert_eq!(kinds(&parsed), vec![&LoadErrorKind::UnterminatedRecord]);
        assert_eq!(parsed.errors[0].line, 3);
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn missing_section_delimiter() {
        let parsed = read("C  x\n 2  C3-C3\n 1  1  2  1.5  4.4\n-3\n");
        assert_eq!(
            kinds(&parsed),
            vec![&LoadErrorKind::MissingSectionDelimiter(
                "1  1  2  1.5  4.4".to_string()
            )]
        );
    }

    #[test]
    fn record_failing_on_its_close_line_keeps_following_lines() {
        let parsed = read("C  x\n 2  C3-C3\n-3\nV  Rh  2.45  0.05\n");
        assert_eq!(
            kinds(&parsed),
            vec![&LoadErrorKind::MissingSectionDelimiter("-3".to_string())]
        );
        assert_eq!(parsed.nonbonded.len(), 1);
        assert_eq!(parsed.nonbonded[0].1.symbol, "Rh");
    }

    #[test]
    fn header_followed_by_close_line_keeps_next_record() {
        let parsed = read("C  y\n-3\nC  fine\n 2  C3-C3\n-2\n 1  1  2  1.5  4.4\n-3\n");
        assert_eq!(kinds(&parsed), vec![&LoadErrorKind::MissingPattern]);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].label, "fine");
    }

    #[test]
    fn rejects_bad_atom_count_and_missing_pattern() {
        let parsed = read("C  a\n x  C3\n-3\nC  b\n 2\n-3\n");
        assert_eq!(
            kinds(&parsed),
            vec![
                &LoadErrorKind::InvalidAtomCount("x".to_string()),
                &LoadErrorKind::MissingPattern
            ]
        );
    }

    fn single_record_error(params: &str) -> LoadErrorKind {
        let text = format!("C  r\n 3  C3-C3-C3\n-2\n{params}\n-3\n");
        let parsed = read(&text);
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.errors.len(), 1, "{:?}", parsed.errors);
        parsed.errors[0].kind.clone()
    }

    #[test]
    fn rejects_malformed_parameter_lines() {
        assert_eq!(
            single_record_error("3  1  2  1.0  1.0"),
            LoadErrorKind::UnknownClassTag("3".to_string())
        );
        assert_eq!(
            single_record_error("1  1  4  1.0  1.0"),
            LoadErrorKind::IndexOutOfRange {
                index: 4,
                declared: 3
            }
        );
        assert_eq!(
            single_record_error("1  x  2  1.0  1.0"),
            LoadErrorKind::InvalidIndex("x".to_string())
        );
        assert_eq!(
            single_record_error("2  1  2  1  1.0  1.0"),
            LoadErrorKind::RepeatedIndex(1)
        );
        assert_eq!(
            single_record_error("1  1  3  1.0  1.0"),
            LoadErrorKind::NotAnInteraction(vec![1, 3])
        );
        assert_eq!(
            single_record_error("1  1  2  1.0"),
            LoadErrorKind::CoefficientCount {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            single_record_error("1  1  2  C3  1.0  1.0"),
            LoadErrorKind::LiteralCount {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            single_record_error("2  1  2"),
            LoadErrorKind::IndexCount {
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            single_record_error("1  1  2  1.0  abc"),
            LoadErrorKind::InvalidNumber("abc".to_string())
        );
        assert_eq!(
            single_record_error("2  1  2  3  108.8086-0.1934"),
            LoadErrorKind::CoefficientCount {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            single_record_error("2  1  2  3  108.8086-0.1934  0.5"),
            LoadErrorKind::InvalidNumber("108.8086-0.1934".to_string())
        );
        assert!(matches!(
            single_record_error("1  1  2  C3 Qq  1.0  1.0"),
            LoadErrorKind::UnknownAtomType(_)
        ));
    }

    #[test]
    fn alternate_attaches_to_preceding_entry() {
        let parsed = read("C  r\n 3  C3-C3-C3\n-2\n 2  1  2  3  109.5  0.5\n 2a 3  2  1\n-3\n");
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let entry = &parsed.records[0].entries[0];
        assert_eq!(entry.alternate, Some(vec![3, 2, 1]));
    }

    #[test]
    fn rejects_orphan_and_mismatched_alternates() {
        assert_eq!(
            single_record_error("2a 1  2  3"),
            LoadErrorKind::OrphanAlternate
        );
        assert_eq!(
            single_record_error("1  1  2  1.0  1.0\n 2a 1  2  3"),
            LoadErrorKind::OrphanAlternate
        );
        assert_eq!(
            single_record_error("1  1  2  1.0  1.0\n 1a 2  3"),
            LoadErrorKind::InvalidAlternate {
                primary: vec![1, 2],
                alternate: vec![2, 3]
            }
        );
    }

    #[test]
    fn stray_line_outside_records() {
        let parsed = read("junk here\n");
        assert_eq!(
            kinds(&parsed),
            vec![&LoadErrorKind::UnexpectedLine("junk here".to_string())]
        );
    }
}
