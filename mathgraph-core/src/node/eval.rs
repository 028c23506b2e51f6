use std::f64::consts::{E, PI};

use super::{BinOp, FuncKind, Node, VarKind};

/// Approximates the tree value at a given `x`.
///
/// Total over every tree: domain violations come back as `NaN` or an
/// infinity per IEEE-754, and a placeholder evaluates to `NaN`. This never
/// panics, so the result can be fed straight into curve rendering, which
/// treats non-finite samples as breaks in the curve.
pub fn eval(node: &Node, x: f64) -> f64 {
    match node {
        Node::Num(text) => text.parse().unwrap_or(f64::NAN),
        Node::Var(kind) => match kind {
            VarKind::X => x,
            VarKind::E => E,
            VarKind::Pi => PI,
        },
        Node::Binary { op, left, right } => {
            let l = eval(left, x);
            let r = eval(right, x);
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
            }
        }
        Node::Power(base, exponent) => eval(base, x).powf(eval(exponent, x)),
        Node::Call(func, arg) => {
            let v = eval(arg, x);
            match func {
                FuncKind::Sqrt => v.sqrt(),
                FuncKind::Sin => v.sin(),
                FuncKind::Cos => v.cos(),
                FuncKind::Tan => v.tan(),
                FuncKind::Log => v.log10(),
                FuncKind::Ln => v.ln(),
                FuncKind::Exp => v.exp(),
                FuncKind::Abs => v.abs(),
            }
        }
        Node::Placeholder => f64::NAN,
    }
}
