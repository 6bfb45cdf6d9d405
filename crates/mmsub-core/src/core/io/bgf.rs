use crate::core::io::traits::MoleculeFile;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::{MoleculeError, MoleculeGraph};
use crate::core::models::topology::BondOrder;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BgfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Invalid connectivity: {0}")]
    Molecule(#[from] MoleculeError),
}

#[derive(Debug, Error)]
pub enum BgfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("CONECT line requires at least two atoms")]
    InvalidConectFormat,
    #[error("Invalid atom serial '{0}' in connectivity record")]
    InvalidSerial(String),
    #[error("Invalid bond order '{0}'")]
    InvalidBondOrder(String),
    #[error("ORDER line for atom {0} does not follow a CONECT line for the same atom")]
    OrderWithoutConect(usize),
    #[error("ORDER line lists {found} orders for {expected} bonded partners")]
    OrderCountMismatch { expected: usize, found: usize },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_serial(line_num: usize, field: &str) -> Result<usize, BgfError> {
    field.parse().map_err(|_| BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidSerial(field.to_string()),
    })
}

fn parse_serials(line_num: usize, fields: &[&str]) -> Result<Vec<usize>, BgfError> {
    fields.iter().map(|s| parse_serial(line_num, s)).collect()
}

/// Reader for BGF files: atoms with their force-field types plus
/// `CONECT`/`ORDER` connectivity. Coordinates and charges are ignored.
pub struct BgfFile;

impl MoleculeFile for BgfFile {
    type Error = BgfError;

    fn read_from(reader: &mut impl BufRead) -> Result<MoleculeGraph, Self::Error> {
        let mut molecule = MoleculeGraph::new();
        let mut serials: HashMap<usize, AtomId> = HashMap::new();
        let mut bonds: BTreeMap<(usize, usize), Option<BondOrder>> = BTreeMap::new();
        let mut last_conect: Option<(usize, Vec<usize>)> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = line.split_whitespace().next().unwrap_or_default();
            match record_type {
                "ATOM" | "HETATM" => {
                    let serial_str = slice_and_trim(&line, 7, 12);
                    let name_str = slice_and_trim(&line, 13, 18);
                    let ff_type_str = slice_and_trim(&line, 61, 66);

                    let serial: usize = serial_str.parse().map_err(|_| BgfError::Parse {
                        line: line_num,
                        kind: BgfParseErrorKind::InvalidInt {
                            columns: "8-12".into(),
                            value: serial_str.into(),
                        },
                    })?;
                    if name_str.is_empty() {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::MissingRequiredField {
                                columns: "14-18".into(),
                            },
                        });
                    }
                    if ff_type_str.is_empty() {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::MissingRequiredField {
                                columns: "62-66".into(),
                            },
                        });
                    }
                    if serials.contains_key(&serial) {
                        return Err(BgfError::Inconsistency(format!(
                            "Duplicate atom serial: {}",
                            serial
                        )));
                    }
                    serials.insert(serial, molecule.add_atom(name_str, ff_type_str));
                }
                "CONECT" => {
                    let parts: Vec<&str> = line.split_whitespace().skip(1).collect();
                    if parts.len() < 2 {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::InvalidConectFormat,
                        });
                    }
                    let serial_list = parse_serials(line_num, &parts)?;
                    let (origin, partners) = (serial_list[0], serial_list[1..].to_vec());
                    for &partner in &partners {
                        bonds
                            .entry((origin.min(partner), origin.max(partner)))
                            .or_insert(None);
                    }
                    last_conect = Some((origin, partners));
                }
                "ORDER" => {
                    let parts: Vec<&str> = line.split_whitespace().skip(1).collect();
                    let Some(first) = parts.first() else {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::InvalidConectFormat,
                        });
                    };
                    let origin = parse_serial(line_num, first)?;
                    let partners = match &last_conect {
                        Some((conect_origin, partners)) if *conect_origin == origin => partners,
                        _ => {
                            return Err(BgfError::Parse {
                                line: line_num,
                                kind: BgfParseErrorKind::OrderWithoutConect(origin),
                            });
                        }
                    };
                    let orders = &parts[1..];
                    if orders.len() != partners.len() {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::OrderCountMismatch {
                                expected: partners.len(),
                                found: orders.len(),
                            },
                        });
                    }
                    for (&partner, token) in partners.iter().zip(orders) {
                        let order: BondOrder = token.parse().map_err(|_| BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::InvalidBondOrder(token.to_string()),
                        })?;
                        let slot = bonds
                            .entry((origin.min(partner), origin.max(partner)))
                            .or_insert(None);
                        if slot.is_none() {
                            *slot = Some(order);
                        }
                    }
                }
                "END" => break,
                _ => {}
            }
        }

        if serials.is_empty() {
            return Err(BgfError::MissingRecord("ATOM/HETATM records".into()));
        }

        for ((a1_serial, a2_serial), order) in bonds {
            let (Some(&a1), Some(&a2)) = (serials.get(&a1_serial), serials.get(&a2_serial)) else {
                return Err(BgfError::Inconsistency(format!(
                    "Bond {}-{} references an unknown atom serial",
                    a1_serial, a2_serial
                )));
            };
            molecule.add_bond(a1, a2, order.unwrap_or_default())?;
        }
        Ok(molecule)
    }
}
