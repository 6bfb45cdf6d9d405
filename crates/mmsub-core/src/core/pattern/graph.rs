use super::error::PatternSyntaxError;
use super::token::{BondSpec, Token, TokenKind, tokenize};
use crate::core::models::topology::BondOrderSet;
use crate::core::types::registry::{AtomTypeRegistry, TypePattern};

/// A required (or, when `excluded`, forbidden) bond between two pattern atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondRelation {
    /// Local index of the other atom.
    pub partner: usize,
    /// Bond orders accepted on this edge.
    pub orders: BondOrderSet,
    /// The relation asserts absence of any bond with one of `orders`.
    pub excluded: bool,
    /// The relation was written as a `%k` back-reference.
    pub closure: bool,
}

/// One node of a substructure pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternAtom {
    /// Local index, 1-based.
    pub index: usize,
    pub atom_type: TypePattern,
    pub relations: Vec<BondRelation>,
}

impl PatternAtom {
    /// Number of bonds this atom must have in any match.
    pub fn required_degree(&self) -> usize {
        self.relations.iter().filter(|r| !r.excluded).count()
    }
}

/// The labeled graph of one substructure pattern.
///
/// Relations are stored on both endpoints, so every atom's relation list is
/// complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternGraph {
    atoms: Vec<PatternAtom>,
}

struct Parser<'a> {
    registry: &'a AtomTypeRegistry,
    declared: usize,
    atoms: Vec<PatternAtom>,
    /// Branch points: (atom index, position of the opening parenthesis).
    stack: Vec<(usize, usize)>,
    current: Option<usize>,
    pending: Option<(BondSpec, usize)>,
}

impl<'a> Parser<'a> {
    fn new(registry: &'a AtomTypeRegistry, declared: usize) -> Self {
        Self {
            registry,
            declared,
            atoms: Vec::with_capacity(declared),
            stack: Vec::new(),
            current: None,
            pending: None,
        }
    }

    fn run(mut self, tokens: Vec<Token>) -> Result<PatternGraph, PatternSyntaxError> {
        if tokens.is_empty() {
            return Err(PatternSyntaxError::Empty);
        }

        for token in tokens {
            match token.kind {
                TokenKind::Atom(symbol) => self.atom(&symbol, token.pos)?,
                TokenKind::Bond(spec) => self.bond(spec, token.pos)?,
                TokenKind::Open => self.open(token.pos)?,
                TokenKind::Close => self.close(token.pos)?,
                TokenKind::BackRef(index) => self.back_reference(index, token.pos)?,
            }
        }

        if let Some(&(_, pos)) = self.stack.last() {
            return Err(PatternSyntaxError::UnclosedBranch { pos });
        }
        if let Some((_, pos)) = self.pending {
            return Err(PatternSyntaxError::DanglingBond { pos });
        }
        if self.atoms.len() != self.declared {
            return Err(PatternSyntaxError::AtomCountMismatch {
                declared: self.declared,
                found: self.atoms.len(),
            });
        }
        Ok(PatternGraph { atoms: self.atoms })
    }

    fn atom(&mut self, symbol: &str, pos: usize) -> Result<(), PatternSyntaxError> {
        let index = self.atoms.len() + 1;
        if index > self.declared {
            return Err(PatternSyntaxError::IndexExceedsDeclared {
                pos,
                index,
                declared: self.declared,
            });
        }
        let atom_type =
            self.registry
                .resolve(symbol)
                .map_err(|e| PatternSyntaxError::UnknownAtomType {
                    pos,
                    symbol: e.symbol,
                })?;

        let link = match (self.current, self.pending.take()) {
            (None, None) if self.atoms.is_empty() => None,
            (Some(previous), Some((spec, _))) => Some((previous, spec)),
            _ => return Err(PatternSyntaxError::MissingBond { pos }),
        };

        self.atoms.push(PatternAtom {
            index,
            atom_type,
            relations: Vec::new(),
        });
        if let Some((previous, spec)) = link {
            self.relate(previous, index, spec, false, pos)?;
        }
        self.current = Some(index);
        Ok(())
    }

    fn bond(&mut self, spec: BondSpec, pos: usize) -> Result<(), PatternSyntaxError> {
        if self.pending.is_some() {
            return Err(PatternSyntaxError::ConsecutiveBonds { pos });
        }
        if self.current.is_none() {
            return Err(PatternSyntaxError::LeadingBond { pos });
        }
        self.pending = Some((spec, pos));
        Ok(())
    }

    fn open(&mut self, pos: usize) -> Result<(), PatternSyntaxError> {
        if let Some((_, bond_pos)) = self.pending {
            return Err(PatternSyntaxError::DanglingBond { pos: bond_pos });
        }
        match self.current {
            Some(current) => {
                self.stack.push((current, pos));
                Ok(())
            }
            None => Err(PatternSyntaxError::UnexpectedChar { pos, ch: '(' }),
        }
    }

    fn close(&mut self, pos: usize) -> Result<(), PatternSyntaxError> {
        if let Some((_, bond_pos)) = self.pending {
            return Err(PatternSyntaxError::DanglingBond { pos: bond_pos });
        }
        let (branch_point, _) = self
            .stack
            .pop()
            .ok_or(PatternSyntaxError::UnbalancedClose { pos })?;
        self.current = Some(branch_point);
        Ok(())
    }

    fn back_reference(&mut self, index: usize, pos: usize) -> Result<(), PatternSyntaxError> {
        let (current, spec) = match (self.current, self.pending.take()) {
            (Some(current), Some((spec, _))) => (current, spec),
            _ => return Err(PatternSyntaxError::MissingBond { pos }),
        };
        if index == 0 || index > self.atoms.len() {
            return Err(PatternSyntaxError::UndeclaredBackReference { pos, index });
        }
        if index == current {
            return Err(PatternSyntaxError::SelfReference { pos, index });
        }
        self.relate(current, index, spec, true, pos)
    }

    fn relate(
        &mut self,
        a: usize,
        b: usize,
        spec: BondSpec,
        closure: bool,
        pos: usize,
    ) -> Result<(), PatternSyntaxError> {
        if self.atoms[a - 1].relations.iter().any(|r| r.partner == b) {
            return Err(PatternSyntaxError::DuplicateRelation {
                pos,
                first: a.min(b),
                second: a.max(b),
            });
        }
        for (from, to) in [(a, b), (b, a)] {
            self.atoms[from - 1].relations.push(BondRelation {
                partner: to,
                orders: spec.orders,
                excluded: spec.excluded,
                closure,
            });
        }
        Ok(())
    }
}

impl PatternGraph {
    /// Parses a pattern string declaring exactly `declared` atoms.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternSyntaxError`] if the text is malformed, introduces
    /// more or fewer than `declared` atoms, uses a symbol the registry does not
    /// know, leaves a branch open, or back-references an undeclared index.
    pub fn parse(
        pattern: &str,
        declared: usize,
        registry: &AtomTypeRegistry,
    ) -> Result<Self, PatternSyntaxError> {
        let tokens = tokenize(pattern)?;
        Parser::new(registry, declared).run(tokens)
    }

    pub fn atoms(&self) -> &[PatternAtom] {
        &self.atoms
    }

    /// Returns the atom with the given 1-based local index.
    pub fn atom(&self, index: usize) -> Option<&PatternAtom> {
        index.checked_sub(1).and_then(|i| self.atoms.get(i))
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn relation(&self, a: usize, b: usize) -> Option<&BondRelation> {
        self.atom(a)?.relations.iter().find(|r| r.partner == b)
    }

    /// True if the pattern requires a bond between the two local atoms.
    pub fn requires_bond(&self, a: usize, b: usize) -> bool {
        self.relation(a, b).is_some_and(|r| !r.excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::BondOrder;

    const RH_PATTERN: &str = "Rh(-HX)(-PX)(-PX)(-HX){-:}C2(:HX:%1){=:}C2-C3";

    fn parse(pattern: &str, n: usize) -> Result<PatternGraph, PatternSyntaxError> {
        PatternGraph::parse(pattern, n, &AtomTypeRegistry::builtin())
    }

    #[test]
    fn parses_rhodium_pattern_into_nine_atoms() {
        let graph = parse(RH_PATTERN, 9).unwrap();
        assert_eq!(graph.len(), 9);
        let indices: Vec<usize> = graph.atoms().iter().map(|a| a.index).collect();
        assert_eq!(indices, (1..=9).collect::<Vec<_>>());

        // Rh carries two hydrides, two phosphines, the alkene carbon and the
        // back-referenced migrating hydrogen.
        assert_eq!(graph.atom(1).unwrap().relations.len(), 6);
        assert!(graph.requires_bond(1, 7));
        assert!(graph.relation(7, 1).unwrap().closure);
        assert!(!graph.relation(6, 7).unwrap().closure);

        let rh_c = graph.relation(1, 6).unwrap();
        assert!(rh_c.orders.contains(BondOrder::Single));
        assert!(rh_c.orders.contains(BondOrder::Aromatic));
        assert!(!rh_c.orders.contains(BondOrder::Double));

        assert_eq!(
            graph.atom(9).unwrap().atom_type,
            TypePattern::Exact("C3".to_string())
        );
        assert_eq!(
            graph.atom(2).unwrap().atom_type,
            TypePattern::Class("HX".to_string())
        );
    }

    #[test]
    fn every_declared_index_appears_exactly_once() {
        for (pattern, n) in [
            ("C3", 1),
            ("C3-C3", 2),
            ("C3(-H1)(-H1)-H1", 4),
            ("C2=C2(-00)-C2:CA:%1", 5),
            ("Rh(-PX)-PX!~%2", 3),
        ] {
            let graph = parse(pattern, n).unwrap();
            let mut seen: Vec<usize> = graph.atoms().iter().map(|a| a.index).collect();
            seen.sort_unstable();
            assert_eq!(seen, (1..=n).collect::<Vec<_>>(), "pattern {pattern}");
        }
    }

    #[test]
    fn relations_are_symmetric() {
        let graph = parse(RH_PATTERN, 9).unwrap();
        for atom in graph.atoms() {
            for rel in &atom.relations {
                let back = graph.relation(rel.partner, atom.index).unwrap();
                assert_eq!(back.orders, rel.orders);
                assert_eq!(back.excluded, rel.excluded);
            }
        }
    }

    #[test]
    fn exclusion_relation_does_not_count_towards_degree() {
        let graph = parse("Rh(-PX)-PX!~%2", 3).unwrap();
        assert!(graph.relation(3, 2).unwrap().excluded);
        assert!(!graph.requires_bond(2, 3));
        assert_eq!(graph.atom(3).unwrap().required_degree(), 1);
    }

    #[test]
    fn rejects_index_beyond_declared_count() {
        assert_eq!(
            parse("C3-C3-C3", 2),
            Err(PatternSyntaxError::IndexExceedsDeclared {
                pos: 6,
                index: 3,
                declared: 2
            })
        );
    }

    #[test]
    fn rejects_too_few_atoms() {
        assert_eq!(
            parse("C3-C3", 3),
            Err(PatternSyntaxError::AtomCountMismatch {
                declared: 3,
                found: 2
            })
        );
    }

    #[test]
    fn rejects_unclosed_branch_and_unbalanced_close() {
        assert_eq!(
            parse("C3(-H1", 2),
            Err(PatternSyntaxError::UnclosedBranch { pos: 2 })
        );
        assert_eq!(
            parse("C3-H1)", 2),
            Err(PatternSyntaxError::UnbalancedClose { pos: 5 })
        );
    }

    #[test]
    fn rejects_unknown_symbol() {
        assert_eq!(
            parse("C3-Xx", 2),
            Err(PatternSyntaxError::UnknownAtomType {
                pos: 3,
                symbol: "Xx".to_string()
            })
        );
    }

    #[test]
    fn rejects_bad_back_references() {
        assert_eq!(
            parse("C3-C3-%4", 2),
            Err(PatternSyntaxError::UndeclaredBackReference { pos: 6, index: 4 })
        );
        assert_eq!(
            parse("C3-C3-%0", 2),
            Err(PatternSyntaxError::UndeclaredBackReference { pos: 6, index: 0 })
        );
        assert_eq!(
            parse("C3-C3-%2", 2),
            Err(PatternSyntaxError::SelfReference { pos: 6, index: 2 })
        );
        assert_eq!(
            parse("C3-C3-%1", 2),
            Err(PatternSyntaxError::DuplicateRelation {
                pos: 6,
                first: 1,
                second: 2
            })
        );
    }

    #[test]
    fn requires_explicit_bond_operators() {
        assert_eq!(
            parse("C3(-H1)H1", 3),
            Err(PatternSyntaxError::MissingBond { pos: 7 })
        );
        assert_eq!(parse("-C3", 1), Err(PatternSyntaxError::LeadingBond { pos: 0 }));
        assert_eq!(
            parse("C3-=C3", 2),
            Err(PatternSyntaxError::ConsecutiveBonds { pos: 3 })
        );
        assert_eq!(
            parse("C3-C3-", 2),
            Err(PatternSyntaxError::DanglingBond { pos: 5 })
        );
        assert_eq!(
            parse("C3(-)", 1),
            Err(PatternSyntaxError::DanglingBond { pos: 3 })
        );
    }

    #[test]
    fn rejects_empty_pattern() {
        assert_eq!(parse("   ", 0), Err(PatternSyntaxError::Empty));
    }
}
