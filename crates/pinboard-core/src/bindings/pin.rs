//! Pin bindings and the relaxation solver that keeps pinned shapes together.
//!
//! A pin binding ties a pin to a target at a fractional anchor of the
//! target's bounds. When any shape in a pin graph moves, the handler
//! collects the moved targets and, at the next operation boundary, relaxes
//! every other node of the graph toward the offsets recorded in the
//! bindings. Its own writes come back as change notifications and start a new
//! pass; once a pass moves nothing the pending set is cleared.

use super::{Binding, BindingProps};
use crate::config::RelaxationConfig;
use crate::editor::Editor;
use crate::handler::BindingHandler;
use crate::math::{average, point_in_rect};
use crate::shapes::{ShapeId, ShapeUpdate};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Type tag for pin bindings.
pub const PIN_BINDING: &str = "pin";

/// Properties of a pin binding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinBindingProps {
    /// Fractional point within the target's bounds, (0,0) = top-left.
    pub anchor: Point,
}

impl Default for PinBindingProps {
    fn default() -> Self {
        Self {
            anchor: Point::new(0.5, 0.5),
        }
    }
}

/// The pin graph reachable from a set of changed shapes.
///
/// Nodes are pins and their targets. `deltas[a][b]` is the desired page
/// offset `a - b`; every edge is stored in both directions.
#[derive(Debug, Clone, Default)]
pub struct RelaxationGraph {
    initial: BTreeMap<ShapeId, Point>,
    deltas: BTreeMap<ShapeId, BTreeMap<ShapeId, Vec2>>,
}

impl RelaxationGraph {
    /// Walk pin bindings outward from `changed`, recording page origins and
    /// desired offsets. Missing shapes and geometry are skipped.
    pub fn discover(editor: &dyn Editor, changed: &BTreeSet<ShapeId>) -> Self {
        let mut graph = Self::default();
        let mut to_check: Vec<ShapeId> = changed.iter().copied().collect();
        let mut visited = BTreeSet::new();

        while let Some(shape_id) = to_check.pop() {
            if editor.shape(shape_id).is_none() {
                continue;
            }
            if !visited.insert(shape_id) {
                continue;
            }

            for binding in editor.bindings_to_shape(shape_id, PIN_BINDING) {
                let pin_id = binding.from_id;
                if !visited.insert(pin_id) {
                    continue;
                }
                let Some(pin_origin) = editor.shape_page_origin(pin_id) else {
                    continue;
                };
                graph.initial.insert(pin_id, pin_origin);

                for pin_binding in editor.bindings_from_shape(pin_id, PIN_BINDING) {
                    let target = pin_binding.to_id;
                    let (Some(bounds), Some(transform)) = (
                        editor.shape_geometry(target),
                        editor.shape_page_transform(target),
                    ) else {
                        continue;
                    };
                    let BindingProps::Pin(props) = &pin_binding.props;
                    let page_anchor = transform * point_in_rect(bounds, props.anchor);
                    let origin = transform * Point::ZERO;

                    graph.initial.insert(target, origin);
                    graph.add_target_delta(pin_id, target, page_anchor - origin);

                    if !visited.contains(&target) {
                        to_check.push(target);
                    }
                }
            }
        }

        graph
    }

    fn add_target_delta(&mut self, from: ShapeId, to: ShapeId, delta: Vec2) {
        self.deltas.entry(from).or_default().insert(to, delta);
        self.deltas.entry(to).or_default().insert(from, -delta);
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.initial.len()
    }

    /// Page origin a node had when the graph was discovered.
    pub fn initial_position(&self, id: ShapeId) -> Option<Point> {
        self.initial.get(&id).copied()
    }

    /// Run `iterations` Jacobi steps. Nodes in `fixed` never move; every other
    /// node moves by the mean correction its neighbours ask for, all computed
    /// from the previous iterate.
    pub fn solve(&self, fixed: &BTreeSet<ShapeId>, iterations: usize) -> BTreeMap<ShapeId, Point> {
        let mut current = self.initial.clone();

        for _ in 0..iterations {
            let mut movements: BTreeMap<ShapeId, Vec<Vec2>> = BTreeMap::new();
            for (a_id, deltas) in &self.deltas {
                if fixed.contains(a_id) {
                    continue;
                }
                let Some(&a) = current.get(a_id) else {
                    continue;
                };
                for (b_id, target_delta) in deltas {
                    let Some(&b) = current.get(b_id) else {
                        continue;
                    };
                    movements
                        .entry(*a_id)
                        .or_default()
                        .push(*target_delta - (a - b));
                }
            }

            for (id, adjustments) in movements {
                if let Some(position) = current.get_mut(&id) {
                    *position += average(&adjustments);
                }
            }
        }

        current
    }
}

/// Handler for [`PIN_BINDING`] bindings.
#[derive(Debug, Clone, Default)]
pub struct PinBindingHandler {
    config: RelaxationConfig,
    changed_to_shapes: BTreeSet<ShapeId>,
}

impl PinBindingHandler {
    pub fn new(config: RelaxationConfig) -> Self {
        Self {
            config,
            changed_to_shapes: BTreeSet::new(),
        }
    }

    /// Targets that changed since the last pass that moved nothing.
    pub fn pending(&self) -> &BTreeSet<ShapeId> {
        &self.changed_to_shapes
    }

    /// One relaxation pass. Returns the updates to commit.
    fn relax(&self, editor: &dyn Editor) -> Vec<ShapeUpdate> {
        let graph = RelaxationGraph::discover(editor, &self.changed_to_shapes);
        let solved = graph.solve(&self.changed_to_shapes, self.config.iterations);

        let updates: Vec<_> = solved
            .into_iter()
            .filter_map(|(id, position)| {
                let initial = graph.initial_position(id)?;
                if (position - initial).hypot2() <= self.config.min_displacement_sq {
                    return None;
                }
                let parent_point = editor.point_in_parent_space(id, position)?;
                Some(ShapeUpdate::new(id).position(parent_point))
            })
            .collect();

        log::debug!(
            "Pin relaxation: {} fixed, {} nodes, {} moved",
            self.changed_to_shapes.len(),
            graph.len(),
            updates.len()
        );
        updates
    }
}

impl BindingHandler for PinBindingHandler {
    fn kind(&self) -> &'static str {
        PIN_BINDING
    }

    fn default_props(&self) -> BindingProps {
        BindingProps::Pin(PinBindingProps::default())
    }

    fn on_after_change_to_shape(&mut self, _editor: &mut dyn Editor, binding: &Binding) {
        self.changed_to_shapes.insert(binding.to_id);
    }

    fn on_before_delete_to_shape(&mut self, editor: &mut dyn Editor, binding: &Binding) {
        editor.delete_shapes(&[binding.from_id]);
    }

    fn on_operation_complete(&mut self, editor: &mut dyn Editor) {
        if self.changed_to_shapes.is_empty() {
            return;
        }

        let updates = self.relax(editor);
        if updates.is_empty() {
            self.changed_to_shapes.clear();
        } else {
            editor.update_shapes(updates);
        }
    }
}
