//! Running cursor and heading bookkeeping for one render.

/// Position of a level-2 heading at the time it was emitted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadingPosition {
    pub y: f64,
    pub page: usize,
}

/// Mutable layout state owned by a single render.
///
/// The state is created when a render starts and dropped with it; nothing is
/// shared between documents.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutState {
    cursor_y: f64,
    current_page: usize,
    top: f64,
    last_heading_level: u8,
    last_level2: Option<HeadingPosition>,
}

impl LayoutState {
    /// Creates the state for page 1 with the cursor at `top`.
    pub fn new(top: f64) -> Self {
        Self {
            cursor_y: top,
            current_page: 1,
            top,
            last_heading_level: 0,
            last_level2: None,
        }
    }

    /// Current vertical position on the active page.
    pub fn cursor(&self) -> f64 {
        self.cursor_y
    }

    /// Moves the cursor to `y`.
    pub fn set_cursor(&mut self, y: f64) {
        self.cursor_y = y;
    }

    /// 1-based number of the active page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Position the cursor returns to on a fresh page.
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Level of the heading emitted last, `0` once other content followed it.
    pub fn last_heading_level(&self) -> u8 {
        self.last_heading_level
    }

    /// Returns whether the previous block was a heading.
    pub fn follows_heading(&self) -> bool {
        self.last_heading_level > 0
    }

    /// The most recent level-2 heading, regardless of page.
    pub fn last_level2(&self) -> Option<HeadingPosition> {
        self.last_level2
    }

    /// The most recent level-2 heading if it sits on the active page.
    ///
    /// A position recorded on an earlier page is stale and ignored.
    pub fn level2_on_current_page(&self) -> Option<HeadingPosition> {
        self.last_level2
            .filter(|position| position.page == self.current_page)
    }

    /// Cursor position as a fraction of `page_height`.
    pub fn position_fraction(&self, page_height: f64) -> f64 {
        if page_height > 0.0 {
            self.cursor_y / page_height
        } else {
            0.0
        }
    }

    /// Distance between the cursor and `bottom`, never negative.
    pub fn remaining(&self, bottom: f64) -> f64 {
        (bottom - self.cursor_y).max(0.0)
    }

    /// Moves the cursor down by `delta` without passing `limit`.
    pub fn advance(&mut self, delta: f64, limit: f64) {
        self.cursor_y = (self.cursor_y + delta).min(limit);
    }

    /// Records that a new page was started.  The level-2 position is kept; it
    /// is invalidated by the page comparison in
    /// [`level2_on_current_page`](Self::level2_on_current_page).
    pub fn start_page(&mut self, page: usize) {
        self.current_page = page;
        self.cursor_y = self.top;
    }

    /// Records a heading of `level`; level-2 headings also store the cursor.
    pub fn record_heading(&mut self, level: u8) {
        if level == 2 {
            self.last_level2 = Some(HeadingPosition {
                y: self.cursor_y,
                page: self.current_page,
            });
        }
        self.last_heading_level = level;
    }

    /// Marks that non-heading content was emitted.
    pub fn clear_heading(&mut self) {
        self.last_heading_level = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level2_position_goes_stale_after_page_break() {
        let mut state = LayoutState::new(30.0);
        state.set_cursor(200.0);
        state.record_heading(2);
        assert_eq!(
            state.level2_on_current_page(),
            Some(HeadingPosition { y: 200.0, page: 1 })
        );

        state.start_page(2);
        assert_eq!(state.cursor(), 30.0);
        assert_eq!(state.level2_on_current_page(), None);
        assert_eq!(state.last_level2().map(|p| p.page), Some(1));
    }

    #[test]
    fn other_levels_do_not_touch_level2_position() {
        let mut state = LayoutState::new(30.0);
        state.record_heading(2);
        state.set_cursor(90.0);
        state.record_heading(3);
        assert_eq!(state.last_level2().map(|p| p.y), Some(30.0));
        assert_eq!(state.last_heading_level(), 3);
        state.clear_heading();
        assert!(!state.follows_heading());
    }

    #[test]
    fn advance_is_clamped() {
        let mut state = LayoutState::new(30.0);
        state.advance(500.0, 277.0);
        assert_eq!(state.cursor(), 277.0);
        assert_eq!(state.remaining(277.0), 0.0);
    }
}
