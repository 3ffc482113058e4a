// Rendering entrypoint
pub mod ladder; // snapshot -> rows actually shown
pub mod text;   // `size @ price` lines for non-interactive output
pub mod theme;  // injected colors/styles
pub mod tui;    // ratatui ladder widget + terminal setup

use crate::error::LadderResult;
use crate::market_data::book_state::BookState;

/// Draws the current book state. Called once per feed event.
pub trait LadderRenderer {
    fn render(&mut self, state: &BookState) -> LadderResult<()>;
}
