// Plain-text ladder for pipes, logs and dumb terminals
use std::io::Write;

use itertools::Itertools;

use super::ladder::{LadderRow, LadderView};
use super::LadderRenderer;
use crate::error::LadderResult;
use crate::market_data::book_state::BookState;

const ASK_RULE: &str = "---------------------";
const BID_RULE: &str = "=====================";

pub struct TextRenderer<W: Write> {
    out: W,
    depth: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, depth: usize) -> Self {
        Self { out, depth }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn format_side<'a>(rows: impl ExactSizeIterator<Item = &'a LadderRow>) -> String {
    if rows.len() == 0 {
        return "  (empty)".to_string();
    }
    rows.map(|r| format!("  {} @ {}", r.size, r.price)).join("\n")
}

/// Text form of one frame: asks, rule, bids, rule, status.
/// Asks are printed last-to-first so the best ask sits on the `---` rule, facing the best bid.
pub fn format_frame(view: &LadderView, status: &str) -> String {
    format!(
        "Asks\n{}\n{}\nBids\n{}\n{}\n{}\n",
        format_side(view.asks.iter().rev()),
        ASK_RULE,
        format_side(view.bids.iter()),
        BID_RULE,
        status
    )
}

impl<W: Write + Send> LadderRenderer for TextRenderer<W> {
    fn render(&mut self, state: &BookState) -> LadderResult<()> {
        let view = state
            .snapshot()
            .map(|s| LadderView::from_snapshot(s, self.depth))
            .unwrap_or_default();
        self.out.write_all(format_frame(&view, &state.status_line()).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
