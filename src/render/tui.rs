// Full-screen ladder: bids on the left, asks on the right, status line at the bottom.

use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
    Terminal,
};

use super::ladder::{LadderRow, LadderView};
use super::theme::Theme;
use super::LadderRenderer;
use crate::error::LadderResult;
use crate::market_data::book_state::BookState;
use crate::market_data::types::Side;

const MIN_PRICE_WIDTH: usize = 5;

pub struct LadderWidget<'a> {
    view: &'a LadderView,
    theme: &'a Theme,
    status: &'a str,
    is_error: bool,
}

impl<'a> LadderWidget<'a> {
    pub fn new(view: &'a LadderView, theme: &'a Theme, status: &'a str, is_error: bool) -> Self {
        Self { view, theme, status, is_error }
    }

    // Largest size on screen; row bars are drawn relative to it
    fn max_size(&self) -> Option<f64> {
        self.view
            .asks
            .iter()
            .chain(&self.view.bids)
            .filter_map(|r| r.size.parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.max(s))))
    }

    fn render_side(&self, side: Side, area: Rect, buf: &mut Buffer, max_size: Option<f64>) {
        if area.width == 0 || area.height < 2 {
            return;
        }
        let rows = self.view.rows(side);
        let color = self.theme.side_color(side);
        let header_style = self.theme.header.fg(color);

        let price_w = rows.iter().map(|r| r.price.len()).max().unwrap_or(0).max(MIN_PRICE_WIDTH) + 2;
        let price_w = price_w.min(area.width as usize);
        let size_w = area.width as usize - price_w;

        // Side label, then column names, mirrored around the centre line
        let (label, columns) = match side {
            Side::Bid => (
                format!("{:>w$}", side.label(), w = area.width as usize),
                format!("{:<sw$}{:>pw$} ", "Size", "Price", sw = size_w, pw = price_w.saturating_sub(1)),
            ),
            Side::Ask => (
                format!("{:<w$}", side.label(), w = area.width as usize),
                format!(" {:<pw$}{:>sw$}", "Price", "Size", pw = price_w.saturating_sub(1), sw = size_w),
            ),
        };
        buf.set_stringn(area.x, area.y, label, area.width as usize, header_style);
        buf.set_stringn(area.x, area.y + 1, columns, area.width as usize, self.theme.header);

        let size_style = Style::default().fg(color);
        for (i, row) in rows.iter().enumerate() {
            let y = area.y + 2 + i as u16;
            if y >= area.y + area.height {
                break;
            }
            self.render_row(side, row, area.x, y, (size_w, price_w), size_style, buf);

            if let Some(width) = bar_width(row, max_size, area.width) {
                let x = match side {
                    Side::Bid => area.x + area.width - width,
                    Side::Ask => area.x,
                };
                buf.set_style(Rect::new(x, y, width, 1), self.theme.row_highlight(side));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_row(
        &self,
        side: Side,
        row: &LadderRow,
        x: u16,
        y: u16,
        (size_w, price_w): (usize, usize),
        size_style: Style,
        buf: &mut Buffer,
    ) {
        let pad = price_w.saturating_sub(1);
        match side {
            Side::Bid => {
                buf.set_stringn(x, y, &row.size, size_w, size_style);
                let price = format!("{:>pad$} ", row.price);
                buf.set_stringn(x + size_w as u16, y, price, price_w, self.theme.price);
            }
            Side::Ask => {
                let price = format!(" {:<pad$}", row.price);
                buf.set_stringn(x, y, price, price_w, self.theme.price);
                let size = format!("{:>size_w$}", row.size);
                buf.set_stringn(x + price_w as u16, y, size, size_w, size_style);
            }
        }
    }
}

fn bar_width(row: &LadderRow, max_size: Option<f64>, width: u16) -> Option<u16> {
    let max = max_size?;
    let size = row.size.parse::<f64>().ok().filter(|s| s.is_finite() && *s > 0.0)?;
    let w = ((size / max).min(1.0) * f64::from(width)).round() as u16;
    (w > 0).then_some(w)
}

impl Widget for LadderWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.theme.background));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border)
            .title(self.theme.title.as_str());
        let inner = block.inner(area);
        block.render(area, buf);

        let [ladder, status] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
        let [bids, asks] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(ladder);

        let max_size = self.max_size();
        self.render_side(Side::Bid, bids, buf, max_size);
        self.render_side(Side::Ask, asks, buf, max_size);

        let status_style = if self.is_error { self.theme.error } else { self.theme.text };
        Paragraph::new(self.status).style(status_style).render(status, buf);
    }
}

pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
    depth: usize,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>, theme: Theme, depth: usize) -> Self {
        Self { terminal, theme, depth }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> LadderRenderer for TerminalRenderer<B> {
    fn render(&mut self, state: &BookState) -> LadderResult<()> {
        let view = state
            .snapshot()
            .map(|s| LadderView::from_snapshot(s, self.depth))
            .unwrap_or_default();
        let status = state.status_line();
        let is_error = state.last_error().is_some();
        let theme = &self.theme;

        self.terminal.draw(|frame| {
            frame.render_widget(LadderWidget::new(&view, theme, &status, is_error), frame.area());
        })?;
        Ok(())
    }
}

pub type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode + alternate screen. Pair with `restore_terminal`.
pub fn init_terminal() -> io::Result<CrosstermTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut CrosstermTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
