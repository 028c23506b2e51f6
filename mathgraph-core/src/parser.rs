use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::{BinOp, Node};

/// When the expression is malformed, the parser will return this error.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    EmptyExpression,
    UnexpectedToken { index: usize },
    MissingOperand,
    TrailingOperand,
    UnmatchedParen,
}

/// Parses an expression all the way from text to a tree: lexing, implicit
/// multiplication insertion, then the two-stage shunting-yard conversion.
pub fn parse(expr: &str) -> Result<Node, ParseError> {
    let tokens: Vec<Token> = Lexer::new(expr).collect();
    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    let tokens = insert_implicit_mul(tokens);
    Parser::new(&tokens).parse()
}

/// Inserts a synthetic `*` token between adjacent tokens that read as a
/// product, in a single left-to-right pass:
///
/// - number or variable followed by a function, a variable or `(`
///   (`2sin(x)`, `2x`, `2(x+1)`)
/// - variable followed by a number (`x2`)
/// - `)` followed by a number, a variable, a function or `(`
///
/// Two adjacent numbers never occur because the lexer merges digit runs.
pub fn insert_implicit_mul(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());

    for token in tokens {
        if let Some(prev) = out.last() {
            if should_insert_mul(&prev.kind, &token.kind) {
                out.push(Token {
                    kind: TokenKind::Times,
                    index: token.index,
                });
            }
        }
        out.push(token);
    }
    out
}

fn should_insert_mul(prev: &TokenKind, curr: &TokenKind) -> bool {
    let prev_is_value = matches!(prev, TokenKind::Num(_) | TokenKind::Var(_));
    let curr_is_value_start = matches!(
        curr,
        TokenKind::Func(_) | TokenKind::Var(_) | TokenKind::OpenParen
    );

    if prev_is_value && curr_is_value_start {
        return true;
    }
    if matches!(prev, TokenKind::Var(_)) && matches!(curr, TokenKind::Num(_)) {
        return true;
    }
    if *prev == TokenKind::CloseParen
        && (curr_is_value_start || matches!(curr, TokenKind::Num(_)))
    {
        return true;
    }
    false
}

/// A parser converts a list of tokens into an AST (abstract syntax tree).
///
/// It runs the classic two stages: infix to postfix with an operator stack,
/// then postfix to tree with a value stack. Malformed input surfaces as a
/// `ParseError`, never a panic; the graph session turns such an error into a
/// constant-NaN function.
pub struct Parser<'a> {
    tokens: &'a [Token],
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &[Token]) -> Parser {
        Parser { tokens }
    }

    pub fn parse(self) -> Result<Node, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::EmptyExpression);
        }
        let postfix = shunting_yard(self.tokens)?;
        build_node(postfix)
    }
}

/// Decides whether the operator on top of the stack must be popped before
/// `new` is pushed. Equal precedence pops (left associativity), except `^`
/// against `^`, which keeps chained powers right-associative.
fn must_pop_before(new: &TokenKind, top: &TokenKind) -> bool {
    if !top.is_operator() {
        return false;
    }
    if *new == TokenKind::Hat && *top == TokenKind::Hat {
        return false;
    }
    top.precedence() >= new.precedence()
}

fn shunting_yard(tokens: &[Token]) -> Result<Vec<Token>, ParseError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Num(_) | TokenKind::Var(_) => output.push(token.clone()),
            TokenKind::Func(_) => operators.push(token.clone()),
            TokenKind::OpenParen => operators.push(token.clone()),
            TokenKind::CloseParen => {
                loop {
                    match operators.pop() {
                        Some(top) if top.kind == TokenKind::OpenParen => break,
                        Some(top) => output.push(top),
                        None => return Err(ParseError::UnmatchedParen),
                    }
                }
                // a function name right before the group binds to it
                if matches!(operators.last().map(|t| &t.kind), Some(TokenKind::Func(_))) {
                    if let Some(func) = operators.pop() {
                        output.push(func);
                    }
                }
            }
            kind if kind.is_operator() => {
                while operators
                    .last()
                    .map_or(false, |top| must_pop_before(kind, &top.kind))
                {
                    if let Some(top) = operators.pop() {
                        output.push(top);
                    }
                }
                operators.push(token.clone());
            }
            _ => {
                // unknown identifier or stray character
                return Err(ParseError::UnexpectedToken { index: token.index });
            }
        }
    }

    while let Some(top) = operators.pop() {
        if top.kind == TokenKind::OpenParen {
            return Err(ParseError::UnmatchedParen);
        }
        output.push(top);
    }
    Ok(output)
}

fn build_node(postfix: Vec<Token>) -> Result<Node, ParseError> {
    let mut stack: Vec<Node> = Vec::new();

    for token in postfix {
        match token.kind {
            TokenKind::Num(text) => stack.push(Node::Num(text)),
            TokenKind::Var(kind) => stack.push(Node::Var(kind)),
            TokenKind::Func(kind) => {
                let arg = stack.pop().ok_or(ParseError::MissingOperand)?;
                stack.push(Node::call(kind, arg));
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::Times | TokenKind::Slash => {
                let right = stack.pop().ok_or(ParseError::MissingOperand)?;
                let left = stack.pop().ok_or(ParseError::MissingOperand)?;
                let op = match token.kind {
                    TokenKind::Plus => BinOp::Add,
                    TokenKind::Minus => BinOp::Sub,
                    TokenKind::Times => BinOp::Mul,
                    TokenKind::Slash => BinOp::Div,
                    _ => unreachable!(),
                };
                stack.push(Node::binary(op, left, right));
            }
            TokenKind::Hat => {
                let exponent = stack.pop().ok_or(ParseError::MissingOperand)?;
                let base = stack.pop().ok_or(ParseError::MissingOperand)?;
                stack.push(Node::power(base, exponent));
            }
            _ => return Err(ParseError::UnexpectedToken { index: token.index }),
        }
    }

    let root = stack.pop().ok_or(ParseError::MissingOperand)?;
    if !stack.is_empty() {
        return Err(ParseError::TrailingOperand);
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{FuncKind, VarKind};

    #[test]
    fn it_respects_precedence() {
        let root = parse("2 + 3 * 4").unwrap();
        assert_eq!(
            root,
            Node::num("2") + Node::num("3") * Node::num("4")
        );
    }

    #[test]
    fn it_is_left_associative_for_subtraction_and_division() {
        let root = parse("10 - 2 - 3").unwrap();
        assert_eq!(
            root,
            Node::num("10") - Node::num("2") - Node::num("3")
        );
        assert!((parse("8 / 4 / 2").unwrap().eval(0.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn it_is_right_associative_for_powers() {
        let root = parse("2^3^2").unwrap();
        assert_eq!(
            root,
            Node::power(
                Node::num("2"),
                Node::power(Node::num("3"), Node::num("2"))
            )
        );
    }

    #[test]
    fn it_groups_with_parentheses() {
        let root = parse("(2 + 3) * 4").unwrap();
        assert_eq!(
            root,
            (Node::num("2") + Node::num("3")) * Node::num("4")
        );
    }

    #[test]
    fn it_binds_functions_to_their_parenthesized_group() {
        let root = parse("sin(x) + 1").unwrap();
        assert_eq!(
            root,
            Node::call(FuncKind::Sin, Node::Var(VarKind::X)) + Node::num("1")
        );
    }

    #[test]
    fn it_inserts_implicit_multiplication() {
        assert_eq!(
            parse("2x").unwrap(),
            Node::num("2") * Node::Var(VarKind::X)
        );
        assert_eq!(
            parse("3sin(x)").unwrap(),
            Node::num("3") * Node::call(FuncKind::Sin, Node::Var(VarKind::X))
        );
        assert_eq!(
            parse("x2").unwrap(),
            Node::Var(VarKind::X) * Node::num("2")
        );
        assert_eq!(
            parse("2(x + 1)").unwrap(),
            Node::num("2") * (Node::Var(VarKind::X) + Node::num("1"))
        );
        assert_eq!(
            parse("(x)(x)").unwrap(),
            Node::Var(VarKind::X) * Node::Var(VarKind::X)
        );
        assert_eq!(
            parse("(x)2").unwrap(),
            Node::Var(VarKind::X) * Node::num("2")
        );
    }

    #[test]
    fn it_gives_implicit_multiplication_ordinary_precedence() {
        // 1/2x is (1/2)*x here: the synthetic token is a plain `*`
        let root = parse("1/2x").unwrap();
        assert_eq!(
            root,
            Node::num("1") / Node::num("2") * Node::Var(VarKind::X)
        );
    }

    #[test]
    fn it_rejects_malformed_input_without_panicking() {
        assert_eq!(parse(""), Err(ParseError::EmptyExpression));
        assert_eq!(parse("   "), Err(ParseError::EmptyExpression));
        assert_eq!(parse("(1 + 2"), Err(ParseError::UnmatchedParen));
        assert_eq!(parse("1 + 2)"), Err(ParseError::UnmatchedParen));
        assert_eq!(parse("1 +"), Err(ParseError::MissingOperand));
        assert_eq!(parse("+ 1"), Err(ParseError::MissingOperand));
        assert_eq!(parse("sin"), Err(ParseError::MissingOperand));
        assert_eq!(parse("2 3"), Err(ParseError::TrailingOperand));
        assert_eq!(
            parse("2 + zzz"),
            Err(ParseError::UnexpectedToken { index: 4 })
        );
        assert_eq!(
            parse("2 # 3"),
            Err(ParseError::UnexpectedToken { index: 2 })
        );
    }

    #[test]
    fn it_has_no_unary_minus() {
        // a leading minus has nothing to bind to; callers degrade this to a
        // constant-NaN function
        assert_eq!(parse("-x"), Err(ParseError::MissingOperand));
    }
}
