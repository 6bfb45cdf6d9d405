use super::error::PatternSyntaxError;
use crate::core::models::topology::{BondOrder, BondOrderSet};

/// A bond operator: the accepted orders and whether the bond must be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BondSpec {
    pub orders: BondOrderSet,
    pub excluded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Atom(String),
    Bond(BondSpec),
    Open,
    Close,
    BackRef(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset of the token's first character.
    pub pos: usize,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn next_token(&mut self) -> Result<Option<Token>, PatternSyntaxError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        let pos = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let kind = match ch {
            '(' => {
                self.pos += 1;
                TokenKind::Open
            }
            ')' => {
                self.pos += 1;
                TokenKind::Close
            }
            '%' => {
                self.pos += 1;
                let digits = self.take_while(|c| c.is_ascii_digit());
                if digits.is_empty() {
                    return Err(PatternSyntaxError::MissingBackReferenceIndex { pos });
                }
                let index = digits.parse().unwrap_or(usize::MAX);
                TokenKind::BackRef(index)
            }
            '!' => {
                self.pos += 1;
                let orders = self.bond_orders()?;
                TokenKind::Bond(BondSpec {
                    orders,
                    excluded: true,
                })
            }
            '-' | '=' | '#' | ':' | '~' | '{' => {
                let orders = self.bond_orders()?;
                TokenKind::Bond(BondSpec {
                    orders,
                    excluded: false,
                })
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                TokenKind::Atom(self.take_while(|c| c.is_ascii_alphanumeric() || c == '_'))
            }
            c => return Err(PatternSyntaxError::UnexpectedChar { pos, ch: c }),
        };

        Ok(Some(Token { kind, pos }))
    }

    fn bond_orders(&mut self) -> Result<BondOrderSet, PatternSyntaxError> {
        let pos = self.pos;
        match self.advance() {
            Some('~') => Ok(BondOrderSet::ANY),
            Some('{') => {
                let mut set = BondOrderSet::EMPTY;
                loop {
                    match self.advance() {
                        Some('}') => break,
                        Some('~') => set = set.union(BondOrderSet::ANY),
                        Some(c) => match BondOrder::from_symbol(c) {
                            Some(order) => set = set.with(order),
                            None => {
                                return Err(PatternSyntaxError::UnexpectedChar {
                                    pos: self.pos - 1,
                                    ch: c,
                                });
                            }
                        },
                        None => return Err(PatternSyntaxError::UnclosedOrderSet { pos }),
                    }
                }
                if set.is_empty() {
                    return Err(PatternSyntaxError::EmptyOrderSet { pos });
                }
                Ok(set)
            }
            Some(c) => BondOrder::from_symbol(c)
                .map(BondOrderSet::only)
                .ok_or(PatternSyntaxError::UnexpectedChar { pos, ch: c }),
            None => Err(PatternSyntaxError::DanglingBond { pos }),
        }
    }
}

/// Splits a pattern string into tagged tokens. Whitespace is ignored.
pub fn tokenize(input: &str) -> Result<Vec<Token>, PatternSyntaxError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
