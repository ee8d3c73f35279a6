//! Keyboard navigation state machine.
//!
//! Tracks whether the dropdown is open and which row is active. The machine
//! only decides; the [`Combobox`](crate::Combobox) carries out the resulting
//! [`NavEffect`] (toggling rows, scrolling the active row into view).

/// Keys the navigation machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Enter/Return
    Enter,
    /// Space
    Space,
    /// Escape
    Escape,
    /// Tab
    Tab,
    /// Home
    Home,
    /// End
    End,
}

/// Whether a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Handled; the host should suppress its default behavior.
    Consumed,
    /// Not handled; the host keeps its default behavior (e.g. focus moves on Tab).
    Ignored,
}

/// Dropdown phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavPhase {
    #[default]
    Closed,
    Open,
}

/// What the owner must do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    /// Nothing beyond a possible redraw.
    None,
    /// The dropdown opened.
    Opened,
    /// The dropdown closed.
    Closed,
    /// The active row changed; scroll it into view.
    Moved(usize),
    /// Toggle expansion of the row at this index.
    ToggleExpand(usize),
    /// Toggle selection of the row at this index.
    ToggleSelect(usize),
}

/// Result of feeding one key to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub result: EventResult,
    pub effect: NavEffect,
}

impl KeyOutcome {
    fn consumed(effect: NavEffect) -> Self {
        Self {
            result: EventResult::Consumed,
            effect,
        }
    }

    fn ignored() -> Self {
        Self {
            result: EventResult::Ignored,
            effect: NavEffect::None,
        }
    }
}

/// Open/closed phase plus the active row.
///
/// The stored active index may outlive the rows it pointed at (rows change
/// under it asynchronously); every read clamps it to the current row count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavState {
    phase: NavPhase,
    active: Option<usize>,
}

impl NavState {
    /// Creates a closed machine with no active row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    /// Whether the dropdown is open.
    pub fn is_open(&self) -> bool {
        self.phase == NavPhase::Open
    }

    /// Active row, clamped to `item_count`. `None` when no row is active.
    pub fn active_index(&self, item_count: usize) -> Option<usize> {
        let last = item_count.checked_sub(1)?;
        self.active.map(|index| index.min(last))
    }

    /// Sets the active row (pointer hover, query typed).
    pub fn set_active(&mut self, index: Option<usize>) {
        self.active = index;
    }

    /// Opens the dropdown. Returns true if it was closed.
    pub fn open(&mut self) -> bool {
        let changed = self.phase == NavPhase::Closed;
        self.phase = NavPhase::Open;
        changed
    }

    /// Closes the dropdown. Returns true if it was open.
    pub fn close(&mut self) -> bool {
        let changed = self.phase == NavPhase::Open;
        self.phase = NavPhase::Closed;
        changed
    }

    /// Flips the phase.
    pub fn toggle(&mut self) {
        self.phase = match self.phase {
            NavPhase::Open => NavPhase::Closed,
            NavPhase::Closed => NavPhase::Open,
        };
    }

    /// Feeds one key press.
    pub fn handle_key(&mut self, key: NavKey, item_count: usize) -> KeyOutcome {
        if self.phase == NavPhase::Closed {
            return match key {
                NavKey::Down | NavKey::Enter | NavKey::Space => {
                    self.phase = NavPhase::Open;
                    KeyOutcome::consumed(NavEffect::Opened)
                }
                _ => KeyOutcome::ignored(),
            };
        }

        let current = self.active_index(item_count);
        let last = item_count.checked_sub(1);

        match key {
            NavKey::Down => {
                let next = match current {
                    Some(index) => last.map(|last| (index + 1).min(last)),
                    None => last.map(|_| 0),
                };
                self.move_to(current, next)
            }
            NavKey::Up => {
                let next = last.map(|_| current.map_or(0, |index| index.saturating_sub(1)));
                self.move_to(current, next)
            }
            NavKey::Home => self.move_to(current, last.map(|_| 0)),
            NavKey::End => self.move_to(current, last),
            // Both horizontal arrows toggle expansion.
            NavKey::Left | NavKey::Right => match current {
                Some(index) => KeyOutcome::consumed(NavEffect::ToggleExpand(index)),
                None => KeyOutcome::consumed(NavEffect::None),
            },
            NavKey::Enter | NavKey::Space => match current {
                Some(index) if index < item_count => {
                    KeyOutcome::consumed(NavEffect::ToggleSelect(index))
                }
                _ => KeyOutcome::consumed(NavEffect::None),
            },
            NavKey::Escape => {
                self.phase = NavPhase::Closed;
                KeyOutcome::consumed(NavEffect::Closed)
            }
            NavKey::Tab => {
                self.phase = NavPhase::Closed;
                KeyOutcome {
                    result: EventResult::Ignored,
                    effect: NavEffect::Closed,
                }
            }
        }
    }

    fn move_to(&mut self, current: Option<usize>, next: Option<usize>) -> KeyOutcome {
        self.active = next;
        match next {
            Some(index) if next != current => KeyOutcome::consumed(NavEffect::Moved(index)),
            _ => KeyOutcome::consumed(NavEffect::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_machine() -> NavState {
        let mut nav = NavState::new();
        nav.open();
        nav
    }

    #[test]
    fn test_closed_opens_on_trigger_keys() {
        for key in [NavKey::Down, NavKey::Enter, NavKey::Space] {
            let mut nav = NavState::new();
            let outcome = nav.handle_key(key, 3);
            assert_eq!(outcome.effect, NavEffect::Opened);
            assert!(nav.is_open());
            assert_eq!(nav.active_index(3), None);
        }
    }

    #[test]
    fn test_closed_ignores_other_keys() {
        let mut nav = NavState::new();
        for key in [NavKey::Up, NavKey::Left, NavKey::Escape, NavKey::Home, NavKey::Tab] {
            assert_eq!(nav.handle_key(key, 3).result, EventResult::Ignored);
            assert!(!nav.is_open());
        }
    }

    #[test]
    fn test_move_next_and_prev_stop_at_edges() {
        let mut nav = open_machine();
        assert_eq!(nav.handle_key(NavKey::Down, 3).effect, NavEffect::Moved(0));
        assert_eq!(nav.handle_key(NavKey::Down, 3).effect, NavEffect::Moved(1));
        assert_eq!(nav.handle_key(NavKey::Down, 3).effect, NavEffect::Moved(2));
        assert_eq!(nav.handle_key(NavKey::Down, 3).effect, NavEffect::None);
        assert_eq!(nav.active_index(3), Some(2));

        nav.handle_key(NavKey::Up, 3);
        nav.handle_key(NavKey::Up, 3);
        assert_eq!(nav.handle_key(NavKey::Up, 3).effect, NavEffect::None);
        assert_eq!(nav.active_index(3), Some(0));
    }

    #[test]
    fn test_move_prev_from_none_activates_first() {
        let mut nav = open_machine();
        assert_eq!(nav.handle_key(NavKey::Up, 4).effect, NavEffect::Moved(0));
    }

    #[test]
    fn test_empty_list_keeps_no_active_row() {
        let mut nav = open_machine();
        for key in [NavKey::Down, NavKey::Up, NavKey::Home, NavKey::End] {
            let outcome = nav.handle_key(key, 0);
            assert_eq!(outcome.effect, NavEffect::None);
            assert_eq!(nav.active_index(0), None);
        }
        assert_eq!(nav.handle_key(NavKey::Enter, 0).effect, NavEffect::None);
        assert_eq!(nav.handle_key(NavKey::Right, 0).effect, NavEffect::None);
    }

    #[test]
    fn test_home_end() {
        let mut nav = open_machine();
        assert_eq!(nav.handle_key(NavKey::End, 10).effect, NavEffect::Moved(9));
        assert_eq!(nav.handle_key(NavKey::Home, 10).effect, NavEffect::Moved(0));
        assert_eq!(nav.handle_key(NavKey::Home, 10).effect, NavEffect::None);
    }

    #[test]
    fn test_left_and_right_both_toggle_expansion() {
        let mut nav = open_machine();
        nav.set_active(Some(1));
        assert_eq!(nav.handle_key(NavKey::Left, 3).effect, NavEffect::ToggleExpand(1));
        assert_eq!(nav.handle_key(NavKey::Right, 3).effect, NavEffect::ToggleExpand(1));
    }

    #[test]
    fn test_confirm_toggles_selection() {
        let mut nav = open_machine();
        nav.set_active(Some(2));
        assert_eq!(nav.handle_key(NavKey::Enter, 3).effect, NavEffect::ToggleSelect(2));
        assert_eq!(nav.handle_key(NavKey::Space, 3).effect, NavEffect::ToggleSelect(2));
    }

    #[test]
    fn test_cancel_and_tab_close() {
        let mut nav = open_machine();
        let outcome = nav.handle_key(NavKey::Escape, 3);
        assert_eq!(outcome, KeyOutcome::consumed(NavEffect::Closed));
        assert!(!nav.is_open());

        nav.open();
        let outcome = nav.handle_key(NavKey::Tab, 3);
        assert_eq!(outcome.result, EventResult::Ignored);
        assert_eq!(outcome.effect, NavEffect::Closed);
        assert!(!nav.is_open());
    }

    #[test]
    fn test_active_index_clamped_when_rows_shrink() {
        let mut nav = open_machine();
        nav.set_active(Some(8));
        assert_eq!(nav.active_index(4), Some(3));
        assert_eq!(nav.active_index(0), None);
        assert_eq!(nav.handle_key(NavKey::Up, 4).effect, NavEffect::Moved(2));
    }

    #[test]
    fn test_active_index_always_in_bounds() {
        let keys = [NavKey::Down, NavKey::Up, NavKey::Home, NavKey::End, NavKey::Down];
        for item_count in 0..5 {
            let mut nav = open_machine();
            for _ in 0..3 {
                for key in keys {
                    nav.handle_key(key, item_count);
                    if let Some(index) = nav.active_index(item_count) {
                        assert!(index < item_count);
                    }
                }
            }
        }
    }
}
