//! On-screen debug table.
//!
//! Every think the match paints two blocks of text: the current game time,
//! and a table with one column per [`DebugColumn`]. Each column supplies a
//! title and a list of `"<label>: <value>"` cells:
//!
//! ```text
//! +-------------------+------------------+
//! | CT                | T                |
//! +-------------------+------------------+
//! | DOOR: HP: 100.000 | VASE: HP: 12.500 |
//! | FLOWER: HP: 3.000 |                  |
//! +-------------------+------------------+
//! ```
//!
//! # Layout rules
//!
//! - A column's width is the widest of its title and its cells, counted in
//!   `char`s.
//! - A column with no cells has a blank title and width zero; it still
//!   occupies a two-space slot so the other columns do not shift.
//! - The table has as many body rows as its longest column; shorter columns
//!   are padded with blank cells.
//! - No columns at all renders nothing.
//!
//! Rendering is a pure function of the column contents: the same contents
//! always produce the same bytes. [`DebugMenu`] records a `blake3` digest of
//! every table it paints so callers can compare frames cheaply.

use garrison_host::prelude::*;
use tracing::trace;

use crate::config::OverlayConfig;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Something that can be shown as one row of a debug column.
pub trait Debuggable {
    /// Title of the column this item belongs in.
    fn debug_column_title(&self) -> String;

    /// Row label.
    fn debug_entity_name(&self) -> String;

    /// Row value.
    fn debug_current_value(&self) -> String;

    /// The full cell text, `"<label>: <value>"`.
    fn debug_cell(&self) -> String {
        format!("{}: {}", self.debug_entity_name(), self.debug_current_value())
    }
}

/// A titled column of cells, read fresh on every render.
pub trait DebugColumn {
    fn column_title(&self) -> String;

    fn cells(&self) -> Vec<String>;
}

/// A plain list of items; the title comes from its first item.
impl<T: Debuggable> DebugColumn for [T] {
    fn column_title(&self) -> String {
        self.first()
            .map(Debuggable::debug_column_title)
            .unwrap_or_default()
    }

    fn cells(&self) -> Vec<String> {
        self.iter().map(Debuggable::debug_cell).collect()
    }
}

impl<T: Debuggable> DebugColumn for Vec<T> {
    fn column_title(&self) -> String {
        self.as_slice().column_title()
    }

    fn cells(&self) -> Vec<String> {
        self.as_slice().cells()
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// One column after measuring.
struct Measured {
    title: String,
    cells: Vec<String>,
    width: usize,
}

impl Measured {
    fn of(column: &dyn DebugColumn) -> Self {
        let cells = column.cells();
        if cells.is_empty() {
            return Self {
                title: String::new(),
                cells,
                width: 0,
            };
        }
        let title = column.column_title();
        let width = cells
            .iter()
            .map(|c| c.chars().count())
            .fold(title.chars().count(), usize::max);
        Self { title, cells, width }
    }
}

/// Lay out `columns` as a bordered text table.
///
/// Returns `None` when there are no columns.
pub fn render_table(columns: &[&dyn DebugColumn]) -> Option<String> {
    if columns.is_empty() {
        return None;
    }
    let measured: Vec<Measured> = columns.iter().map(|c| Measured::of(*c)).collect();
    let rows = measured.iter().map(|m| m.cells.len()).max().unwrap_or(0);

    let mut border = String::from("+");
    let mut header = String::from("|");
    for m in &measured {
        border.push_str(&"-".repeat(m.width + 2));
        border.push('+');
        push_cell(&mut header, &m.title, m.width);
    }

    let mut lines = Vec::with_capacity(rows + 4);
    lines.push(border.clone());
    lines.push(header);
    lines.push(border.clone());
    for r in 0..rows {
        let mut line = String::from("|");
        for m in &measured {
            let cell = m.cells.get(r).map(String::as_str).unwrap_or("");
            push_cell(&mut line, cell, m.width);
        }
        lines.push(line);
    }
    lines.push(border);
    Some(lines.join("\n"))
}

fn push_cell(line: &mut String, text: &str, width: usize) {
    line.push(' ');
    line.push_str(&format!("{text:<width$}"));
    line.push_str(" |");
}

/// The game-time line, e.g. `"Game Time: 12.375"`.
pub fn format_game_time(seconds: f64) -> String {
    format!("Game Time: {seconds:.3}")
}

// ---------------------------------------------------------------------------
// DebugMenu
// ---------------------------------------------------------------------------

/// Paints the overlay and remembers what it painted last.
#[derive(Debug, Clone)]
pub struct DebugMenu {
    overlay: OverlayConfig,
    frames_rendered: u64,
    last_digest: Option<blake3::Hash>,
}

impl DebugMenu {
    pub fn new(overlay: OverlayConfig) -> Self {
        Self {
            overlay,
            frames_rendered: 0,
            last_digest: None,
        }
    }

    /// Paint the current game time above the table.
    pub fn display_game_time<H: Scheduler + ScreenText + ?Sized>(&self, host: &mut H) {
        let text = format_game_time(host.game_time());
        host.debug_screen_text(self.overlay.game_time.paint(text));
    }

    /// Render `columns` and paint the table, replacing the previous one.
    ///
    /// With no columns there is no table: a previously painted one is
    /// blanked out and `None` is returned.
    pub fn display_columns<H: ScreenText + ?Sized>(
        &mut self,
        host: &mut H,
        columns: &[&dyn DebugColumn],
    ) -> Option<blake3::Hash> {
        let Some(table) = render_table(columns) else {
            if self.last_digest.take().is_some() {
                host.debug_screen_text(self.overlay.table.paint(String::new()));
            }
            return None;
        };
        let digest = blake3::hash(table.as_bytes());
        trace!(digest = %digest.to_hex(), columns = columns.len(), "debug table rendered");
        host.debug_screen_text(self.overlay.table.paint(table));
        self.frames_rendered += 1;
        self.last_digest = Some(digest);
        Some(digest)
    }

    /// Tables painted so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Digest of the last table painted.
    pub fn last_frame_digest(&self) -> Option<blake3::Hash> {
        self.last_digest
    }

    pub fn overlay(&self) -> &OverlayConfig {
        &self.overlay
    }
}

impl Default for DebugMenu {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, &'static str);

    impl Debuggable for Row {
        fn debug_column_title(&self) -> String {
            "Stuff".to_owned()
        }
        fn debug_entity_name(&self) -> String {
            self.0.to_owned()
        }
        fn debug_current_value(&self) -> String {
            self.1.to_owned()
        }
    }

    #[test]
    fn no_columns_renders_nothing() {
        assert_eq!(render_table(&[]), None);
        let mut host = SimHost::new();
        let mut menu = DebugMenu::default();
        assert_eq!(menu.display_columns(&mut host, &[]), None);
        assert_eq!(host.screen_texts().count(), 0);
        assert_eq!(menu.frames_rendered(), 0);
    }

    #[test]
    fn list_column_takes_title_from_first_item() {
        let rows = vec![Row("a", "1"), Row("bb", "22")];
        assert_eq!(rows.column_title(), "Stuff");
        assert_eq!(rows.cells(), ["a: 1", "bb: 22"]);
        let table = render_table(&[&rows]).unwrap();
        assert_eq!(
            table,
            "+--------+\n| Stuff  |\n+--------+\n| a: 1   |\n| bb: 22 |\n+--------+"
        );
    }

    #[test]
    fn empty_list_is_a_blank_zero_width_slot() {
        let empty: Vec<Row> = Vec::new();
        let table = render_table(&[&empty]).unwrap();
        assert_eq!(table, "+--+\n|  |\n+--+\n+--+");
    }

    #[test]
    fn width_counts_chars_not_bytes() {
        let rows = vec![Row("é", "ü")];
        let table = render_table(&[&rows]).unwrap();
        // "é: ü" is four chars, under the five-char title.
        assert_eq!(table.lines().nth(3), Some("| é: ü  |"));
    }

    #[test]
    fn game_time_line_uses_three_decimals() {
        assert_eq!(format_game_time(0.0), "Game Time: 0.000");
        assert_eq!(format_game_time(12.3456), "Game Time: 12.346");
    }

    #[test]
    fn menu_paints_both_slots() {
        let mut host = SimHost::new();
        host.advance_clock(2.5);
        let mut menu = DebugMenu::default();
        let rows = vec![Row("x", "y")];

        menu.display_game_time(&mut host);
        let digest = menu.display_columns(&mut host, &[&rows]).unwrap();

        let overlay = OverlayConfig::default();
        let time = host
            .screen_text_at(overlay.game_time.x, overlay.game_time.y)
            .unwrap();
        assert_eq!(time.text, "Game Time: 2.500");
        assert_eq!(time.color, Rgb::new(255, 255, 128));
        let table = host.screen_text_at(overlay.table.x, overlay.table.y).unwrap();
        assert_eq!(blake3::hash(table.text.as_bytes()), digest);
        assert_eq!(table.duration, 0.125);
        assert_eq!(menu.last_frame_digest(), Some(digest));
        assert_eq!(menu.frames_rendered(), 1);
    }
}
