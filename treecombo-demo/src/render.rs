//! Draws a combobox view with crossterm.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use treecombo::{CheckState, ComboboxView, FlattenedRow, ViewStatus};

/// Lines above the dropdown.
pub const HEADER_ROWS: u16 = 3;
/// Lines below the dropdown.
pub const FOOTER_ROWS: u16 = 1;

const HELP: &str =
    "Up/Down move  Left/Right expand  Space/Enter select  Esc close  Ctrl+X clear  Ctrl+C quit";

/// Lines available to the dropdown on a terminal `height` lines tall.
pub fn viewport_rows(height: u16) -> u16 {
    height.saturating_sub(HEADER_ROWS + FOOTER_ROWS)
}

/// Draws one frame. Rows are one line tall.
pub fn draw(out: &mut impl Write, view: &ComboboxView, (width, height): (u16, u16)) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;

    let busy = if view.is_loading { "  (loading)" } else { "" };
    line(out, 0, width, &format!("Search: {}_{busy}", view.query), None)?;
    line(out, 1, width, &selection_summary(view), None)?;
    line(out, 2, width, &"-".repeat(width as usize), Some(Attribute::Dim))?;

    let body = viewport_rows(height) as u64;
    if !view.is_open {
        line(out, HEADER_ROWS, width, "Press Down to browse or type to search", Some(Attribute::Dim))?;
    } else {
        match view.status {
            ViewStatus::Loading => line(out, HEADER_ROWS, width, "Loading...", None)?,
            ViewStatus::Empty => line(out, HEADER_ROWS, width, "No results found.", None)?,
            ViewStatus::Ready => {
                for (item, row) in view.visible_rows() {
                    let Some(y) = item.offset_top.checked_sub(view.scroll_offset) else {
                        continue;
                    };
                    if y >= body {
                        continue;
                    }
                    let active = view.active_index == Some(item.index);
                    draw_row(out, HEADER_ROWS + y as u16, width, view, row, active)?;
                }
            }
        }
    }

    line(out, height.saturating_sub(1), width, HELP, Some(Attribute::Dim))?;
    out.flush()
}

fn draw_row(
    out: &mut impl Write,
    y: u16,
    width: u16,
    view: &ComboboxView,
    row: &FlattenedRow,
    active: bool,
) -> io::Result<()> {
    let check = match view.check_state(&row.id) {
        CheckState::Checked => "[x]",
        CheckState::Indeterminate => "[-]",
        CheckState::Unchecked => "[ ]",
    };
    let toggle = if !row.has_children {
        " "
    } else if view.is_row_loading(&row.id) {
        "~"
    } else if row.expanded {
        "v"
    } else {
        ">"
    };
    let text = format!("{}{toggle} {check} {}", "  ".repeat(row.depth), row.label);

    queue!(out, MoveTo(0, y))?;
    if active {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    if row.hidden_by_search {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    if row.search_match {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    queue!(out, Print(truncate(&text, width)), SetAttribute(Attribute::Reset))
}

fn line(
    out: &mut impl Write,
    y: u16,
    width: u16,
    text: &str,
    attribute: Option<Attribute>,
) -> io::Result<()> {
    queue!(out, MoveTo(0, y))?;
    if let Some(attribute) = attribute {
        queue!(out, SetAttribute(attribute))?;
    }
    queue!(out, Print(truncate(text, width)), SetAttribute(Attribute::Reset))
}

fn selection_summary(view: &ComboboxView) -> String {
    if view.selected.is_empty() {
        return "Nothing selected".to_string();
    }
    let shown: Vec<&str> = view.selected.iter().take(5).map(String::as_str).collect();
    let more = view.selected.len().saturating_sub(shown.len());
    if more > 0 {
        format!("{} selected: {} (+{more})", view.selected.len(), shown.join(", "))
    } else {
        format!("{} selected: {}", view.selected.len(), shown.join(", "))
    }
}

fn truncate(text: &str, width: u16) -> String {
    text.chars().take(width as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_rows() {
        assert_eq!(viewport_rows(24), 20);
        assert_eq!(viewport_rows(2), 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Vegetables", 3), "Veg");
        assert_eq!(truncate("Veg", 10), "Veg");
    }
}
