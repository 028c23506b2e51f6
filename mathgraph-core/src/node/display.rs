use std::fmt;
use std::fmt::{Display, Write};

use super::{BinOp, FuncKind, Node};

/// Renders the canonical infix form.
///
/// A numeric coefficient directly multiplying a variable is written without
/// the operator (`2x`). `sqrt` keeps parentheses around its argument; the
/// other functions are written with a space (`sin x`). The same string is
/// shown in the function list and fed back through the flat parser.
impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Num(text) => f.write_str(text),
            Node::Var(kind) => f.write_str(kind.name()),
            Node::Binary { op, left, right } => {
                let is_implicit = *op == BinOp::Mul
                    && matches!(**left, Node::Num(_))
                    && matches!(**right, Node::Var(_));
                if is_implicit {
                    write!(f, "{}{}", left, right)
                } else {
                    write!(f, "{} {} {}", left, op.symbol(), right)
                }
            }
            Node::Power(base, exponent) => write!(f, "{}^{}", base, exponent),
            Node::Call(func, arg) => {
                if *func == FuncKind::Sqrt {
                    write!(f, "{}({})", func.name(), arg)
                } else {
                    write!(f, "{} {}", func.name(), arg)
                }
            }
            Node::Placeholder => f.write_char('?'),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{BinOp, FuncKind, Node, VarKind};
    use crate::parser::parse;

    #[test]
    fn it_renders_implicit_multiplication_without_an_operator() {
        let node = Node::num("2") * Node::Var(VarKind::X);
        assert_eq!(node.to_string(), "2x");

        // only the number-times-variable shape is implicit
        let node = Node::Var(VarKind::X) * Node::num("2");
        assert_eq!(node.to_string(), "x * 2");
    }

    #[test]
    fn it_renders_functions() {
        let sqrt = Node::call(FuncKind::Sqrt, Node::Var(VarKind::X));
        assert_eq!(sqrt.to_string(), "sqrt(x)");

        let sin = Node::call(FuncKind::Sin, Node::Var(VarKind::X));
        assert_eq!(sin.to_string(), "sin x");
    }

    #[test]
    fn it_renders_powers_and_placeholders() {
        let node = Node::power(Node::Var(VarKind::X), Node::Placeholder);
        assert_eq!(node.to_string(), "x^?");
    }

    #[test]
    fn it_renders_operators_with_spaces() {
        let node = Node::binary(BinOp::Add, Node::num("1"), Node::num("2"));
        assert_eq!(node.to_string(), "1 + 2");
    }

    #[test]
    fn it_round_trips_through_the_parser() {
        const CASES: [&str; 6] = [
            "1 + 2",
            "1 * 3 + 5",
            "2x",
            "3 * sin x",
            "2^3^2",
            "sqrt(16) + 1",
        ];
        for c in &CASES {
            let root = parse(c).unwrap();

            // format it and re-parse it to check if the value changed
            let formatted = root.to_string();
            let reparsed = parse(&formatted).unwrap();

            for &x in &[-2.0, -0.5, 0.0, 1.0, 3.0] {
                let ground_truth = root.eval(x);
                let result = reparsed.eval(x);
                assert!(
                    (result - ground_truth).abs() < 0.001,
                    "{} -> {} changed value at x={}",
                    c,
                    formatted,
                    x
                );
            }
        }
    }
}
