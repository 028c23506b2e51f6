use super::{BinOp, Node};

/// Applies a fixed set of local algebraic identities, bottom-up:
/// `x + 0`, `0 + x`, `x - 0`, `1 * x`, `x * 1`, `0 * x`, `x * 0` and `x^1`.
///
/// This is not a general simplifier. It exists so that trees produced from
/// coefficient templates read naturally (`1*x + 0` shows up as `x`); nothing
/// else is rewritten.
pub fn simplify(node: Node) -> Node {
    match node {
        Node::Binary { op, left, right } => {
            let left = simplify(*left);
            let right = simplify(*right);
            match op {
                BinOp::Add if is_literal(&right, 0.0) => left,
                BinOp::Add if is_literal(&left, 0.0) => right,
                BinOp::Sub if is_literal(&right, 0.0) => left,
                BinOp::Mul if is_literal(&left, 1.0) => right,
                BinOp::Mul if is_literal(&right, 1.0) => left,
                BinOp::Mul if is_literal(&left, 0.0) || is_literal(&right, 0.0) => Node::num("0"),
                _ => Node::binary(op, left, right),
            }
        }
        Node::Power(base, exponent) => {
            let base = simplify(*base);
            let exponent = simplify(*exponent);
            if is_literal(&exponent, 1.0) {
                base
            } else {
                Node::power(base, exponent)
            }
        }
        Node::Call(func, arg) => Node::call(func, simplify(*arg)),
        leaf => leaf,
    }
}

fn is_literal(node: &Node, value: f64) -> bool {
    if let Node::Num(text) = node {
        return text.parse::<f64>().map_or(false, |v| v == value);
    }
    false
}
