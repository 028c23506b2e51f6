mod display;
mod eval;
mod simplify;

pub use self::eval::eval;
pub use self::simplify::simplify;

use std::ops::*;
use std::str::FromStr;

/// A variable that can appear in an expression. `E` and `Pi` are bound to
/// their usual constants during evaluation.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum VarKind {
    X,
    E,
    Pi,
}

impl VarKind {
    pub fn name(self) -> &'static str {
        match self {
            VarKind::X => "x",
            VarKind::E => "e",
            VarKind::Pi => "pi",
        }
    }
}

impl FromStr for VarKind {
    type Err = ();

    fn from_str(s: &str) -> Result<VarKind, ()> {
        Ok(match s {
            "x" => VarKind::X,
            "e" => VarKind::E,
            "pi" => VarKind::Pi,
            _ => return Err(()),
        })
    }
}

/// A list of all supported unary functions
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum FuncKind {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
    Exp,
    Abs,
}

impl FuncKind {
    pub fn name(self) -> &'static str {
        match self {
            FuncKind::Sqrt => "sqrt",
            FuncKind::Sin => "sin",
            FuncKind::Cos => "cos",
            FuncKind::Tan => "tan",
            FuncKind::Log => "log",
            FuncKind::Ln => "ln",
            FuncKind::Exp => "exp",
            FuncKind::Abs => "abs",
        }
    }
}

impl FromStr for FuncKind {
    type Err = ();

    fn from_str(s: &str) -> Result<FuncKind, ()> {
        Ok(match s {
            "sqrt" => FuncKind::Sqrt,
            "sin" => FuncKind::Sin,
            "cos" => FuncKind::Cos,
            "tan" => FuncKind::Tan,
            "log" => FuncKind::Log,
            "ln" => FuncKind::Ln,
            "exp" => FuncKind::Exp,
            "abs" => FuncKind::Abs,
            _ => return Err(()),
        })
    }
}

/// A binary arithmetic operator. Exponentiation is not one of these: it is
/// right-associative and visually distinct, so it gets its own node variant.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Precedence of exponentiation, one level above `Mul`/`Div`.
pub const POWER_PRECEDENCE: u8 = 3;

impl BinOp {
    pub fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
        }
    }
}

/// A node is an operation in the AST (abstract syntax tree).
///
/// Every node exclusively owns its children; there are no parent pointers and
/// no cycles. Numeric literals keep the text the user typed so that digits
/// can be appended to them one at a time.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Node {
    Num(String),
    Var(VarKind),
    Binary {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Power(Box<Node>, Box<Node>),
    Call(FuncKind, Box<Node>),

    /// An unfilled slot created by the structural editor. Valid anywhere a
    /// node is expected, but a tree that still contains one cannot be turned
    /// into a plotted function.
    Placeholder,
}

impl Node {
    pub fn num(text: impl Into<String>) -> Node {
        Node::Num(text.into())
    }

    pub fn binary(op: BinOp, left: Node, right: Node) -> Node {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn power(base: Node, exponent: Node) -> Node {
        Node::Power(Box::new(base), Box::new(exponent))
    }

    pub fn call(func: FuncKind, arg: Node) -> Node {
        Node::Call(func, Box::new(arg))
    }

    /// Whether the tree is free of placeholders and therefore evaluable.
    pub fn is_complete(&self) -> bool {
        match self {
            Node::Num(_) | Node::Var(_) => true,
            Node::Binary { left, right, .. } => left.is_complete() && right.is_complete(),
            Node::Power(base, exponent) => base.is_complete() && exponent.is_complete(),
            Node::Call(_, arg) => arg.is_complete(),
            Node::Placeholder => false,
        }
    }

    /// Evaluates the tree at a given value of `x`.
    pub fn eval(&self, x: f64) -> f64 {
        eval(self, x)
    }

    /// Applies the fixed set of local simplifications.
    pub fn simplify(self) -> Node {
        simplify(self)
    }
}

impl Add for Node {
    type Output = Node;

    fn add(self, rhs: Self) -> Self::Output {
        Node::binary(BinOp::Add, self, rhs)
    }
}

impl Sub for Node {
    type Output = Node;

    fn sub(self, rhs: Self) -> Self::Output {
        Node::binary(BinOp::Sub, self, rhs)
    }
}

impl Mul for Node {
    type Output = Node;

    fn mul(self, rhs: Self) -> Self::Output {
        Node::binary(BinOp::Mul, self, rhs)
    }
}

impl Div for Node {
    type Output = Node;

    fn div(self, rhs: Self) -> Self::Output {
        Node::binary(BinOp::Div, self, rhs)
    }
}
