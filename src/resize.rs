//! Draggable split between the editor and output panes.
//!
//! Widths are in terminal columns. The divider column is the drag handle.

/// Minimum pane widths, divider width, and keyboard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLimits {
    pub min_editor: u16,
    pub min_output: u16,
    pub gutter: u16,
    pub step: u16,
}

impl Default for SplitLimits {
    fn default() -> Self {
        Self {
            min_editor: 25,
            min_output: 32,
            gutter: 1,
            step: 2,
        }
    }
}

/// Clamp a candidate editor width against the container.
///
/// When the container is too narrow for both minimums, `min_editor` wins.
pub fn clamp_editor_width(candidate: u16, container_width: u16, limits: SplitLimits) -> u16 {
    let upper = container_width.saturating_sub(limits.min_output);
    limits.min_editor.max(candidate.min(upper))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Shrink,
    Grow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitController {
    state: DragState,
    /// `None` until the user moves the split; the default is half the container.
    editor_width: Option<u16>,
    limits: SplitLimits,
}

impl Default for SplitController {
    fn default() -> Self {
        Self::new(SplitLimits::default())
    }
}

impl SplitController {
    pub const fn new(limits: SplitLimits) -> Self {
        Self {
            state: DragState::Idle,
            editor_width: None,
            limits,
        }
    }

    pub const fn state(&self) -> DragState {
        self.state
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging)
    }

    pub const fn limits(&self) -> SplitLimits {
        self.limits
    }

    /// Start dragging when `x` is on the handle column.
    pub fn pointer_down(&mut self, x: u16, handle_x: u16) -> bool {
        if x == handle_x {
            self.state = DragState::Dragging;
            true
        } else {
            false
        }
    }

    /// Stop dragging, wherever the pointer is.
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }

    /// Track the pointer while dragging. Returns true when the split moved.
    pub fn pointer_move(&mut self, x: u16, container_left: u16, container_width: u16) -> bool {
        if !self.is_dragging() {
            return false;
        }
        let candidate = x.saturating_sub(container_left);
        self.set_editor_width(candidate, container_width)
    }

    /// Keyboard resize by one step.
    pub fn step(&mut self, direction: StepDirection, container_width: u16) -> bool {
        let (current, _) = self.widths(container_width);
        let candidate = match direction {
            StepDirection::Shrink => current.saturating_sub(self.limits.step),
            StepDirection::Grow => current.saturating_add(self.limits.step),
        };
        self.set_editor_width(candidate, container_width)
    }

    /// `(editor, output)` widths; they sum to `container_width - gutter`.
    pub fn widths(&self, container_width: u16) -> (u16, u16) {
        let usable = container_width.saturating_sub(self.limits.gutter);
        let candidate = self.editor_width.unwrap_or(container_width / 2);
        let editor = clamp_editor_width(candidate, container_width, self.limits).min(usable);
        (editor, usable - editor)
    }

    /// Column of the divider inside the container.
    pub fn handle_x(&self, container_left: u16, container_width: u16) -> u16 {
        container_left + self.widths(container_width).0
    }

    fn set_editor_width(&mut self, candidate: u16, container_width: u16) -> bool {
        let clamped = clamp_editor_width(candidate, container_width, self.limits);
        let before = self.widths(container_width);
        self.editor_width = Some(clamped);
        before != self.widths(container_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pixel_limits() -> SplitLimits {
        SplitLimits {
            min_editor: 250,
            min_output: 320,
            gutter: 8,
            step: 20,
        }
    }

    #[test]
    fn test_clamp_respects_both_minimums() {
        let limits = pixel_limits();
        assert_eq!(clamp_editor_width(100, 1000, limits), 250);
        assert_eq!(clamp_editor_width(900, 1000, limits), 680);
        assert_eq!(clamp_editor_width(500, 1000, limits), 500);
    }

    #[test]
    fn test_clamp_small_container_prefers_editor_minimum() {
        assert_eq!(clamp_editor_width(400, 500, pixel_limits()), 250);
    }

    #[test]
    fn test_initial_split_is_half() {
        let split = SplitController::default();
        assert_eq!(split.widths(100), (50, 49));
    }

    #[test]
    fn test_pointer_down_off_handle_stays_idle() {
        let mut split = SplitController::default();
        assert!(!split.pointer_down(10, 50));
        assert_eq!(split.state(), DragState::Idle);
        assert!(!split.pointer_move(70, 0, 100));
        assert_eq!(split.widths(100).0, 50);
    }

    #[test]
    fn test_drag_moves_split_and_release_stops() {
        let mut split = SplitController::default();
        assert!(split.pointer_down(50, split.handle_x(0, 100)));
        assert!(split.pointer_move(60, 0, 100));
        assert_eq!(split.widths(100), (60, 39));

        split.pointer_up();
        assert_eq!(split.state(), DragState::Idle);
        assert!(!split.pointer_move(30, 0, 100));
        assert_eq!(split.widths(100).0, 60);
    }

    #[test]
    fn test_drag_is_relative_to_container_left() {
        let mut split = SplitController::default();
        split.pointer_down(55, 55);
        split.pointer_move(45, 5, 100);
        assert_eq!(split.widths(100).0, 40);
    }

    #[test]
    fn test_drag_clamps_to_output_minimum() {
        let mut split = SplitController::default();
        split.pointer_down(50, 50);
        split.pointer_move(99, 0, 100);
        assert_eq!(split.widths(100), (68, 31));
    }

    #[test]
    fn test_keyboard_step_applies_clamp() {
        let mut split = SplitController::default();
        assert!(split.step(StepDirection::Grow, 100));
        assert_eq!(split.widths(100).0, 52);
        for _ in 0..30 {
            split.step(StepDirection::Shrink, 100);
        }
        assert_eq!(split.widths(100).0, 25);
        assert!(!split.step(StepDirection::Shrink, 100));
    }

    #[test]
    fn test_widths_fit_tiny_container() {
        let split = SplitController::default();
        let (editor, output) = split.widths(20);
        assert_eq!(editor + output, 19);
    }

    proptest! {
        #[test]
        fn prop_clamp_stays_in_bounds(candidate in 0u16..4000, container in 0u16..4000) {
            let width = clamp_editor_width(candidate, container, pixel_limits());
            prop_assert!(width >= 250);
            prop_assert!(width <= 250.max(container.saturating_sub(320)));
        }

        #[test]
        fn prop_drag_widths_sum_to_usable(x in 0u16..300, container in 60u16..300) {
            let mut split = SplitController::default();
            split.pointer_down(split.handle_x(0, container), split.handle_x(0, container));
            split.pointer_move(x, 0, container);
            let (editor, output) = split.widths(container);
            prop_assert_eq!(editor + output, container - 1);
            prop_assert!(editor >= 25);
        }
    }
}
