use std::collections::HashMap;

use crate::node::Node;
use crate::parser::{parse, ParseError};

/// The shapes offered by the guided entry mode. Each one is a textual
/// formula over named coefficients that goes through the ordinary flat
/// parsing path.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum TemplateKind {
    /// a*x + b
    Linear,
    /// a*x^2 + b*x + c
    Quadratic,
    /// a*x^3 + b*x^2 + c*x + d
    Cubic,
    /// a/b * x + c
    Rational,
}

impl TemplateKind {
    pub fn coefficient_names(self) -> &'static [&'static str] {
        match self {
            TemplateKind::Linear => &["a", "b"],
            TemplateKind::Quadratic => &["a", "b", "c"],
            TemplateKind::Cubic => &["a", "b", "c", "d"],
            TemplateKind::Rational => &["a", "b", "c"],
        }
    }
}

/// A coefficient-template expression under construction. Coefficients are
/// kept as the raw text from the input fields; empty or missing ones fall
/// back to 1 for `a` and 0 for the rest.
#[derive(Debug, Clone)]
pub struct Template {
    pub kind: TemplateKind,
    coefficients: HashMap<String, String>,
}

impl Template {
    pub fn new(kind: TemplateKind) -> Template {
        Template {
            kind,
            coefficients: HashMap::new(),
        }
    }

    pub fn set_coefficient(&mut self, name: &str, value: &str) {
        self.coefficients.insert(name.to_string(), value.to_string());
    }

    fn coefficient(&self, name: &str, default: &str) -> String {
        self.coefficients
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// The expression text fed to the flat parser. Coefficients are wrapped
    /// in parentheses so they stay single factors.
    pub fn expression_string(&self) -> String {
        let a = self.coefficient("a", "1");
        let b = self.coefficient("b", "0");
        let c = self.coefficient("c", "0");
        let d = self.coefficient("d", "0");

        match self.kind {
            TemplateKind::Linear => format!("({})*x + ({})", a, b),
            TemplateKind::Quadratic => format!("({})*x^2 + ({})*x + ({})", a, b, c),
            TemplateKind::Cubic => {
                format!("({})*x^3 + ({})*x^2 + ({})*x + ({})", a, b, c, d)
            }
            TemplateKind::Rational => format!("({})/({}) * x + ({})", a, b, c),
        }
    }

    pub fn to_node(&self) -> Result<Node, ParseError> {
        parse(&self.expression_string())
    }

    /// The tree shown in the function list: parsed, then run through the
    /// local simplifications so default coefficients disappear.
    pub fn display_node(&self) -> Result<Node, ParseError> {
        self.to_node().map(Node::simplify)
    }
}
