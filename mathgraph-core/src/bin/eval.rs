use std::env;

use mathgraph_core::parser::parse;

fn main() {
    let expr = env::args().skip(1).collect::<Vec<_>>().join(" ");
    println!("Original expression: {}", expr);

    let root_node = match parse(&expr) {
        Ok(node) => node,
        Err(err) => {
            println!("Parse error: {:?}", err);
            return;
        }
    };
    println!("Canonical form: {}", root_node);

    for &x in &[-2.0, -1.0, 0.0, 1.0, 2.0] {
        println!("f({}) = {}", x, root_node.eval(x));
    }
}
