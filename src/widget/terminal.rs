//! Terminal renderer built on ratatui

use super::{ConnectionState, Renderer, Surfaces, Target, UiEvent};
use crate::view::{ChartView, RowView, Trend, X_AXIS_TITLE, Y_AXIS_TITLE};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

const HEADER_HEIGHT: u16 = 3;
const MIN_TABLE_HEIGHT: u16 = 5;
const MIN_CHART_HEIGHT: u16 = 8;
const MIN_WIDTH: u16 = 40;
const SYMBOL_WIDTH: u16 = 14;

/// Draws the price table and the chart into a terminal frame
///
/// Renderer calls only update state; [`TerminalRenderer::draw`] paints it.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    width: u16,
    height: u16,
    rows: Vec<RowView>,
    chart: Option<ChartView>,
    highlighted: Vec<String>,
    connection: ConnectionState,
    /// Where the table landed on the last draw, for hit testing
    table_area: Rect,
}

impl TerminalRenderer {
    /// Renderer for a terminal of the given size
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    pub fn chart(&self) -> Option<&ChartView> {
        self.chart.as_ref()
    }

    pub fn is_highlighted(&self, symbol: &str) -> bool {
        self.highlighted.iter().any(|s| s == symbol)
    }

    /// Resolve a terminal cell to what is drawn there
    pub fn target_at(&self, column: u16, row: u16) -> Target {
        let area = self.table_area;
        // border + header line
        let first_row = area.y + 2;
        let symbol_x = area.x + 1;

        if row < first_row || column < symbol_x || column >= symbol_x + SYMBOL_WIDTH {
            return Target::Other;
        }

        match self.rows.get((row - first_row) as usize) {
            Some(view) if row < area.bottom().saturating_sub(1) => {
                Target::SymbolLabel(view.symbol.clone())
            }
            _ => Target::Other,
        }
    }

    /// Paint the current state
    pub fn draw(&mut self, frame: &mut Frame) {
        let table_height = (self.rows.len() as u16 + 3).max(MIN_TABLE_HEIGHT);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Length(table_height),
                Constraint::Min(0),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.table_area = chunks[1];
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let (status, color) = match self.connection {
            ConnectionState::Open => ("● OPEN", Color::Green),
            ConnectionState::Closed => ("○ CLOSED", Color::Red),
        };
        let selected = self.chart.as_ref().map_or("-", |c| c.symbol.as_str());
        let text = format!(
            " {} | Chart: {} | click a symbol to chart it, q to quit",
            status, selected
        );

        let header = Paragraph::new(text)
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL).title(" Crypto Ticker "));
        frame.render_widget(header, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let rows = self.rows.iter().map(|row| {
            let mut symbol_style = Style::default().add_modifier(Modifier::BOLD);
            if self.is_highlighted(&row.symbol) {
                symbol_style = symbol_style.bg(Color::LightGreen).fg(Color::Black);
            }
            let change_style = match row.trend {
                Trend::Up => Style::default().fg(Color::Green),
                Trend::Down => Style::default().fg(Color::Red),
                Trend::Flat => Style::default(),
            };

            Row::new(vec![
                Cell::from(row.symbol.clone()).style(symbol_style),
                Cell::from(row.price_text.clone()),
                Cell::from(row.change_cell()).style(change_style),
            ])
        });

        let header = Row::new(vec!["Symbol", "Price", "Change"])
            .style(Style::default().fg(Color::Yellow));

        let table = Table::new(
            rows,
            [
                Constraint::Length(SYMBOL_WIDTH),
                Constraint::Length(16),
                Constraint::Min(20),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Prices "));

        frame.render_widget(table, area);
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect) {
        let Some(chart) = self.chart.as_ref() else {
            let empty = Paragraph::new(" No chart yet")
                .block(Block::default().borders(Borders::ALL).title(" Chart "));
            frame.render_widget(empty, area);
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", chart.symbol));

        let Some((lo, hi)) = chart.value_range() else {
            let waiting = Paragraph::new(format!(" Waiting for {} prices", chart.symbol))
                .block(block);
            frame.render_widget(waiting, area);
            return;
        };

        let points: Vec<(f64, f64)> = chart
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| (i as f64, *v))
            .collect();

        let (r, g, b) = chart.style.rgb;
        let dataset = Dataset::default()
            .name(chart.symbol.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Rgb(r, g, b)))
            .data(&points);

        let pad = ((hi - lo) * 0.1).max(hi.abs() * 0.0005).max(1e-4);
        let (y_lo, y_hi) = (lo - pad, hi + pad);
        let y_labels: Vec<Line> = [y_lo, (y_lo + y_hi) / 2.0, y_hi]
            .into_iter()
            .map(|v| Line::from(ChartView::y_tick(v)))
            .collect();

        let x_max = chart.values.len().saturating_sub(1).max(1) as f64;
        let x_ticks: Vec<Line> = x_labels(&chart.labels)
            .into_iter()
            .map(Line::from)
            .collect();

        let widget = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title(X_AXIS_TITLE)
                    .bounds([0.0, x_max])
                    .labels(x_ticks),
            )
            .y_axis(
                Axis::default()
                    .title(Y_AXIS_TITLE)
                    .bounds([y_lo, y_hi])
                    .labels(y_labels),
            );

        frame.render_widget(widget, area);
    }
}

/// First, middle and last labels, without repeats
fn x_labels(labels: &[String]) -> Vec<String> {
    let mut picked: Vec<String> = Vec::with_capacity(3);
    if labels.is_empty() {
        return picked;
    }
    for index in [0, labels.len() / 2, labels.len() - 1] {
        let label = &labels[index];
        if picked.last() != Some(label) {
            picked.push(label.clone());
        }
    }
    picked
}

impl Renderer for TerminalRenderer {
    fn surfaces(&self) -> Surfaces {
        let wide = self.width >= MIN_WIDTH;
        Surfaces {
            table: wide && self.height >= HEADER_HEIGHT + MIN_TABLE_HEIGHT,
            chart: wide && self.height >= HEADER_HEIGHT + MIN_TABLE_HEIGHT + MIN_CHART_HEIGHT,
        }
    }

    fn render_row(&mut self, row: &RowView) {
        match self.rows.iter_mut().find(|r| r.symbol == row.symbol) {
            Some(existing) => *existing = row.clone(),
            None => self.rows.push(row.clone()),
        }
    }

    fn render_chart(&mut self, chart: &ChartView) {
        self.chart = Some(chart.clone());
    }

    fn set_highlight(&mut self, symbol: &str, highlighted: bool) {
        self.highlighted.retain(|s| s != symbol);
        if highlighted {
            self.highlighted.push(symbol.to_string());
        }
    }

    fn connection_changed(&mut self, state: ConnectionState) {
        self.connection = state;
    }
}

/// Turns pointer moves into enter/leave events for symbol labels
#[derive(Debug, Default)]
pub struct HoverTracker {
    current: Option<String>,
}

impl HoverTracker {
    pub fn moved(&mut self, target: Target) -> Vec<UiEvent> {
        let next = match target {
            Target::SymbolLabel(symbol) => Some(symbol),
            Target::Other => None,
        };
        if next == self.current {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);
        if let Some(previous) = self.current.take() {
            events.push(UiEvent::Leave(Target::SymbolLabel(previous)));
        }
        if let Some(symbol) = &next {
            events.push(UiEvent::Enter(Target::SymbolLabel(symbol.clone())));
        }
        self.current = next;
        events
    }
}
