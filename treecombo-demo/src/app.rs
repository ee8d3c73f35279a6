//! Event loop - feeds crossterm events to the combobox and redraws.

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
};
use futures::StreamExt;
use log::{debug, trace};
use treecombo::{Combobox, EventResult, NavKey};

use crate::error::DemoError;
use crate::render;
use crate::terminal::TerminalGuard;

/// Lines scrolled per wheel notch.
const WHEEL_STEP: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Convert a crossterm KeyCode to a navigation key
fn convert_key(code: KeyCode) -> Option<NavKey> {
    match code {
        KeyCode::Up => Some(NavKey::Up),
        KeyCode::Down => Some(NavKey::Down),
        KeyCode::Left => Some(NavKey::Left),
        KeyCode::Right => Some(NavKey::Right),
        KeyCode::Enter => Some(NavKey::Enter),
        KeyCode::Char(' ') => Some(NavKey::Space),
        KeyCode::Esc => Some(NavKey::Escape),
        KeyCode::Tab => Some(NavKey::Tab),
        KeyCode::Home => Some(NavKey::Home),
        KeyCode::End => Some(NavKey::End),
        _ => None,
    }
}

/// What a key press means to the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    ClearSelection,
    ClearQuery,
    Type(char),
    Backspace,
    Nav(NavKey),
    None,
}

/// Maps a key press to an action. Space types into a non-empty query and
/// toggles the active row otherwise.
fn key_action(key: KeyEvent, query: &str) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => Action::Quit,
        KeyCode::Char('x') if ctrl => Action::ClearSelection,
        KeyCode::Char('u') if ctrl => Action::ClearQuery,
        KeyCode::Char(' ') if !query.is_empty() => Action::Type(' '),
        KeyCode::Char(c) if c != ' ' && !ctrl => Action::Type(c),
        KeyCode::Backspace => Action::Backspace,
        code => convert_key(code).map_or(Action::None, Action::Nav),
    }
}

pub struct App {
    combo: Combobox,
    query: String,
}

impl App {
    pub fn new(combo: Combobox) -> Self {
        Self {
            combo,
            query: String::new(),
        }
    }

    /// Runs until the user quits or the terminal closes.
    pub async fn run(mut self, terminal: &mut TerminalGuard) -> Result<(), DemoError> {
        let mut events = EventStream::new();
        let mut changes = self.combo.subscribe();

        let (_, height) = terminal.size()?;
        self.combo
            .set_viewport_height(render::viewport_rows(height) as u32);

        loop {
            let size = terminal.size()?;
            let view = self.combo.view();
            render::draw(terminal.stdout(), &view, size)?;
            self.combo.clear_dirty();

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        trace!("Crossterm event: {:?}", event);
                        if self.handle_event(event) == Flow::Quit {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        debug!("event loop finished");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => return self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => {
                    let offset = self.combo.scroll_offset();
                    self.combo.set_scroll_offset(offset.saturating_add(WHEEL_STEP));
                }
                MouseEventKind::ScrollUp => {
                    let offset = self.combo.scroll_offset();
                    self.combo.set_scroll_offset(offset.saturating_sub(WHEEL_STEP));
                }
                _ => {}
            },
            Event::Resize(_, height) => {
                self.combo
                    .set_viewport_height(render::viewport_rows(height) as u32);
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match key_action(key, &self.query) {
            Action::Quit => return Flow::Quit,
            Action::ClearSelection => self.combo.clear_selection(),
            Action::ClearQuery => self.edit_query(String::clear),
            Action::Type(c) => self.edit_query(|query| query.push(c)),
            Action::Backspace => self.edit_query(|query| {
                query.pop();
            }),
            Action::Nav(nav) => {
                let result = self.combo.handle_key(nav);
                trace!("{nav:?} -> {result:?}");
                // Escape on a closed dropdown leaves the demo.
                if nav == NavKey::Escape && result == EventResult::Ignored {
                    return Flow::Quit;
                }
            }
            Action::None => {}
        }
        Flow::Continue
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut String)) {
        edit(&mut self.query);
        self.combo.set_query(self.query.clone());
    }
}
