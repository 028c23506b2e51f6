mod intersect;
mod template;
mod worker;

pub use self::intersect::{find_intersections, Point};
pub use self::template::{Template, TemplateKind};
pub use self::worker::IntersectionWorker;

use rand::Rng;
use tracing::warn;

use crate::editor::{EditorInput, EditorState};
use crate::node::{eval, Node};
use crate::parser::parse;

/// Reference screen width the original layout was tuned against, in pixels.
const SCREEN_WIDTH_PX: f32 = 1080.0;
/// Extra plotting units scanned past each visible edge, to catch
/// intersections that sit right at the border.
const EDGE_BUFFER: f64 = 5.0;
/// Every this many added functions, the session reports a milestone so the
/// embedding shell can run its own counted trigger.
const MILESTONE_EVERY: u64 = 5;

/// An opaque sRGB color assigned to a plotted curve.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    fn random() -> Color {
        let mut rng = rand::thread_rng();
        Color {
            r: rng.gen(),
            g: rng.gen(),
            b: rng.gen(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct FunctionId(u64);

/// A function frozen for plotting.
///
/// The body is fixed at creation time: editing the input afterwards only
/// affects the next function that gets added. A `None` body is the frozen
/// form of an expression that failed to parse; it evaluates to `NaN`
/// everywhere, which the renderer draws as an empty curve.
#[derive(Debug, Clone)]
pub struct PlotFunction {
    pub id: FunctionId,
    pub expression: String,
    body: Option<Node>,
    pub color: Color,
    pub visible: bool,
}

impl PlotFunction {
    /// Evaluates the frozen body at `x`. Never panics; non-finite results
    /// mark breaks in the curve.
    pub fn eval_at(&self, x: f64) -> f64 {
        match &self.body {
            Some(node) => eval(node, x),
            None => f64::NAN,
        }
    }

    /// The tree behind the curve, when the source parsed.
    pub fn display_node(&self) -> Option<&Node> {
        self.body.as_ref()
    }
}

/// Pan/zoom state in the pixels-per-unit model of the host canvas.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Viewport {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for Viewport {
    fn default() -> Viewport {
        Viewport {
            scale: 40.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Viewport {
    /// The world-coordinate x range covered by a screen `width` pixels wide.
    pub fn x_range(&self, width: f32) -> (f64, f64) {
        let half = width / 2.0;
        (
            ((-half - self.offset_x) / self.scale) as f64,
            ((half - self.offset_x) / self.scale) as f64,
        )
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SessionEvent {
    /// Fired on every fifth added function.
    MilestoneReached,
}

/// Why an add request was rejected. The session is unchanged in every case.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum AddError {
    /// The editable tree still contains a placeholder.
    Incomplete,
    /// There is nothing to add.
    Empty,
    /// A template produced text the parser does not accept.
    Malformed,
}

/// Owns the list of plotted functions, the single expression being composed,
/// and the viewport, and keeps the intersection set up to date through the
/// background worker.
///
/// All mutation happens through `&mut self` on the embedding thread; the
/// worker only ever sees owned snapshots of the function list.
pub struct GraphSession {
    functions: Vec<PlotFunction>,
    editor: EditorState,
    viewport: Viewport,
    next_id: u64,
    added_count: u64,
    worker: IntersectionWorker,
}

impl GraphSession {
    pub fn new() -> GraphSession {
        GraphSession {
            functions: Vec::new(),
            editor: EditorState::new(),
            viewport: Viewport::default(),
            next_id: 0,
            added_count: 0,
            worker: IntersectionWorker::new(),
        }
    }

    pub fn functions(&self) -> &[PlotFunction] {
        &self.functions
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Routes one key of the structural alphabet into the editor.
    pub fn input(&mut self, input: EditorInput) {
        self.editor = self.editor.apply(input);
    }

    /// Moves the editor cursor, e.g. after a tap on a rendered node.
    pub fn focus(&mut self, path: Vec<usize>) {
        self.editor = self.editor.with_focus(path);
    }

    /// Freezes the structurally edited tree into a plotted function and
    /// resets the editor. Rejected while the tree still has an empty slot.
    pub fn add_from_editor(&mut self) -> Result<Option<SessionEvent>, AddError> {
        let root = self.editor.root.clone();
        if !root.is_complete() {
            return Err(AddError::Incomplete);
        }
        let expression = root.to_string();
        let event = self.push_function(expression, Some(root));
        self.editor = EditorState::new();
        Ok(event)
    }

    /// Adds a function from flat text. A syntax error is not an error at
    /// this level: the curve is added with a constant-NaN evaluator, per the
    /// degradation contract of the flat path.
    pub fn add_from_text(&mut self, expr: &str) -> Result<Option<SessionEvent>, AddError> {
        if expr.trim().is_empty() {
            return Err(AddError::Empty);
        }
        let body = match parse(expr) {
            Ok(node) => Some(node),
            Err(err) => {
                warn!(?err, expr, "expression failed to parse, plotting as NaN");
                None
            }
        };
        Ok(self.push_function(expr.to_string(), body))
    }

    /// Adds a function built from a coefficient template. The displayed
    /// expression is the simplified form, so default coefficients vanish.
    pub fn add_from_template(&mut self, template: &Template) -> Result<Option<SessionEvent>, AddError> {
        let node = template.to_node().map_err(|_| AddError::Malformed)?;
        let expression = node.clone().simplify().to_string();
        Ok(self.push_function(expression, Some(node)))
    }

    fn push_function(&mut self, expression: String, body: Option<Node>) -> Option<SessionEvent> {
        let id = FunctionId(self.next_id);
        self.next_id += 1;
        self.functions.push(PlotFunction {
            id,
            expression,
            body,
            color: Color::random(),
            visible: true,
        });
        self.added_count += 1;
        self.recompute_intersections();

        if self.added_count % MILESTONE_EVERY == 0 {
            Some(SessionEvent::MilestoneReached)
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: FunctionId) {
        self.functions.retain(|f| f.id != id);
        self.recompute_intersections();
    }

    pub fn toggle_visibility(&mut self, id: FunctionId) {
        for f in &mut self.functions {
            if f.id == id {
                f.visible = !f.visible;
            }
        }
        self.recompute_intersections();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.recompute_intersections();
    }

    /// The most recently published intersection set. Derived data: it is
    /// recomputed from scratch by the worker after every relevant change and
    /// never patched incrementally.
    pub fn intersections(&self) -> Vec<Point> {
        self.worker.latest()
    }

    fn recompute_intersections(&self) {
        let (start, end) = self.viewport.x_range(SCREEN_WIDTH_PX);
        self.worker
            .submit(self.functions.clone(), start - EDGE_BUFFER, end + EDGE_BUFFER);
    }
}

impl Default for GraphSession {
    fn default() -> GraphSession {
        GraphSession::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::node::VarKind;
    use std::thread;
    use std::time::{Duration, Instant};

    /// Builds a standalone visible function for tests; malformed text gets
    /// the same constant-NaN body a session would give it.
    pub(crate) fn plot(expr: &str) -> PlotFunction {
        PlotFunction {
            id: FunctionId(0),
            expression: expr.to_string(),
            body: parse(expr).ok(),
            color: Color { r: 0, g: 0, b: 0 },
            visible: true,
        }
    }

    #[test]
    fn it_freezes_the_editor_tree_on_add() {
        let mut session = GraphSession::new();
        session.input(EditorInput::Digit('2'));
        session.input(EditorInput::Var(VarKind::X));

        session.add_from_editor().unwrap();
        assert_eq!(session.functions().len(), 1);
        assert_eq!(session.functions()[0].expression, "2x");
        assert!((session.functions()[0].eval_at(3.0) - 6.0).abs() < 1e-9);

        // the editor is reset for the next expression
        assert_eq!(session.editor().root, Node::Placeholder);
    }

    #[test]
    fn it_rejects_incomplete_trees_and_keeps_state() {
        let mut session = GraphSession::new();
        session.input(EditorInput::Digit('2'));
        session.input(EditorInput::Op(crate::node::BinOp::Add));

        let before = session.editor().clone();
        assert_eq!(session.add_from_editor(), Err(AddError::Incomplete));
        assert!(session.functions().is_empty());
        assert_eq!(session.editor(), &before);
    }

    #[test]
    fn it_rejects_an_empty_editor() {
        let mut session = GraphSession::new();
        assert_eq!(session.add_from_editor(), Err(AddError::Incomplete));
    }

    #[test]
    fn it_degrades_malformed_text_to_a_nan_function() {
        let mut session = GraphSession::new();
        session.add_from_text("2 +* x").unwrap();
        assert_eq!(session.functions().len(), 1);
        assert!(session.functions()[0].eval_at(1.0).is_nan());

        assert_eq!(session.add_from_text("   "), Err(AddError::Empty));
    }

    #[test]
    fn it_reports_a_milestone_every_fifth_add() {
        let mut session = GraphSession::new();
        for i in 1..=10u32 {
            let event = session.add_from_text("x").unwrap();
            if i % 5 == 0 {
                assert_eq!(event, Some(SessionEvent::MilestoneReached));
            } else {
                assert_eq!(event, None);
            }
        }
    }

    #[test]
    fn it_removes_and_toggles_functions() {
        let mut session = GraphSession::new();
        session.add_from_text("x").unwrap();
        session.add_from_text("x + 1").unwrap();
        let first = session.functions()[0].id;

        session.toggle_visibility(first);
        assert!(!session.functions()[0].visible);
        session.toggle_visibility(first);
        assert!(session.functions()[0].visible);

        session.remove(first);
        assert_eq!(session.functions().len(), 1);
        assert_eq!(session.functions()[0].expression, "x + 1");
    }

    #[test]
    fn it_adds_simplified_template_functions() {
        let mut session = GraphSession::new();
        let template = Template::new(TemplateKind::Linear);
        session.add_from_template(&template).unwrap();
        assert_eq!(session.functions()[0].expression, "x");
        assert!((session.functions()[0].eval_at(2.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn it_recomputes_intersections_in_the_background() {
        let mut session = GraphSession::new();
        session.add_from_text("x").unwrap();
        session.add_from_text("0 - x").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let points = session.intersections();
            if points.len() == 1 {
                assert!(points[0].x.abs() < 1e-3);
                assert!(points[0].y.abs() < 1e-3);
                break;
            }
            assert!(Instant::now() < deadline, "intersections never published");
            thread::sleep(Duration::from_millis(10));
        }

        // hiding one curve of the pair empties the set again
        let first = session.functions()[0].id;
        session.toggle_visibility(first);
        let deadline = Instant::now() + Duration::from_secs(5);
        while !session.intersections().is_empty() {
            assert!(Instant::now() < deadline, "intersections never cleared");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn it_maps_the_viewport_to_a_world_range() {
        let viewport = Viewport::default();
        let (start, end) = viewport.x_range(1080.0);
        assert!((start + 13.5).abs() < 1e-6);
        assert!((end - 13.5).abs() < 1e-6);

        let panned = Viewport {
            scale: 40.0,
            offset_x: 40.0,
            offset_y: 0.0,
        };
        let (start, end) = panned.x_range(1080.0);
        assert!((start + 14.5).abs() < 1e-6);
        assert!((end - 12.5).abs() < 1e-6);
    }
}
