use mathgraph_core::node::{BinOp, FuncKind, Node, VarKind};
use mathgraph_core::parser::parse;
use rand::prelude::*;

struct RecursiveCtx {
    pub depth: u32,

    /// The minimum precedence the generated subtree's root operator may
    /// have, so the rendered text re-parses into the same shape.
    pub min_precedence: u8,

    /// Loose function application (`sin x`) swallows everything to its
    /// right, so those calls are only generated on the rightmost spine.
    pub rightmost: bool,
}

const ATOM: u8 = 4;

fn random_leaf() -> Node {
    let mut rng = thread_rng();
    match rng.gen_range(0..4) {
        0 => Node::Var(VarKind::X),
        1 => Node::Var(VarKind::Pi),
        2 => Node::num(rng.gen_range(0..100).to_string()),
        3 => Node::num(format!("{}.{}", rng.gen_range(0..10), rng.gen_range(0..100))),
        _ => unreachable!(),
    }
}

fn random_node(ctx: RecursiveCtx) -> Node {
    let mut rng = thread_rng();
    // limit the amount of node depth
    if ctx.depth < 5 && rng.gen_range(0..10) > 2 {
        match rng.gen_range(0..7) {
            0 | 1 if ctx.min_precedence <= 1 => {
                let op = if rng.gen() { BinOp::Add } else { BinOp::Sub };
                return Node::binary(
                    op,
                    random_node(ctx.for_operand(1, false)),
                    random_node(ctx.for_operand(2, ctx.rightmost)),
                );
            }
            2 | 3 if ctx.min_precedence <= 2 => {
                let op = if rng.gen() { BinOp::Mul } else { BinOp::Div };
                return Node::binary(
                    op,
                    random_node(ctx.for_operand(2, false)),
                    random_node(ctx.for_operand(3, ctx.rightmost)),
                );
            }
            4 if ctx.min_precedence <= 3 => {
                return Node::power(
                    random_node(ctx.for_operand(ATOM, false)),
                    random_node(ctx.for_operand(3, ctx.rightmost)),
                );
            }
            // sqrt keeps parentheses, so it is safe anywhere
            5 => {
                return Node::call(FuncKind::Sqrt, random_node(ctx.for_operand(0, true)));
            }
            6 if ctx.rightmost && ctx.min_precedence <= 1 => {
                const LOOSE: [FuncKind; 4] =
                    [FuncKind::Sin, FuncKind::Cos, FuncKind::Abs, FuncKind::Exp];
                let func = *LOOSE.choose(&mut rng).unwrap();
                return Node::call(func, random_node(ctx.for_operand(0, true)));
            }
            _ => {}
        }
    }
    random_leaf()
}

impl RecursiveCtx {
    fn new() -> Self {
        Self {
            depth: 0,
            min_precedence: 0,
            rightmost: true,
        }
    }

    fn for_operand(&self, min_precedence: u8, rightmost: bool) -> Self {
        Self {
            depth: self.depth + 1,
            min_precedence,
            rightmost,
        }
    }
}

fn main() {
    for i in 0..5000 {
        let node = random_node(RecursiveCtx::new());
        let formatted = node.to_string();

        if i % 500 == 0 {
            println!("Testing {}", formatted);
        }

        let reparsed = match parse(&formatted) {
            Ok(reparsed) => reparsed,
            Err(err) => panic!("failed to re-parse {:?}: {:?}", formatted, err),
        };

        for &x in &[-2.5, -1.0, 0.0, 0.5, 2.0] {
            let ground_truth = node.eval(x);
            let result = reparsed.eval(x);

            // NaN-to-NaN counts as agreement; both sides broke the same way
            if ground_truth.is_nan() && result.is_nan() {
                continue;
            }

            let mut is_equal = (result - ground_truth).abs() < 0.001;
            if ground_truth != 0.0 && ground_truth.is_finite() {
                let rel_error = ((result - ground_truth) / ground_truth).abs();
                is_equal |= rel_error < 0.001;
            }
            if ground_truth.is_infinite() {
                is_equal = result == ground_truth;
            }
            assert!(
                is_equal,
                "{} evaluated to {} before and {} after re-parsing at x={}",
                formatted, ground_truth, result, x
            );
        }
    }
    println!("5000 random expressions round-tripped");
}
