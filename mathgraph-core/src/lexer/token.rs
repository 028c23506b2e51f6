use crate::node::{FuncKind, VarKind};

/// Tokens are simple things like numbers, identifiers, operators and
/// parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A numeric literal, kept as the exact text that was scanned.
    Num(String),
    Var(VarKind),
    Func(FuncKind),
    /// An identifier that is neither a known variable nor a function. The
    /// lexer lets it through; the parser rejects it.
    UnknownIdent(String),
    Plus,
    Minus,
    Times,
    Slash,
    Hat,
    OpenParen,
    CloseParen,
    /// Any other character. Also rejected by the parser.
    Unknown(char),
}

impl TokenKind {
    pub fn from_single_char(c: char) -> Option<TokenKind> {
        Some(match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Hat,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            _ => return None,
        })
    }

    pub(crate) fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Times
                | TokenKind::Slash
                | TokenKind::Hat
        )
    }

    /// Binding strength used by the shunting-yard stage; 0 for anything that
    /// is not a binary operator.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            TokenKind::Plus | TokenKind::Minus => 1,
            TokenKind::Times | TokenKind::Slash => 2,
            TokenKind::Hat => 3,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,

    /// The index of the first character of the token
    pub index: usize,
}
