use anyhow::{Context, Result};
use bansos_analytics::charts::{Orientation, Quadrant, QuadrantChart, RankingChart, TrendView};
use bansos_analytics::filter::full_range;
use bansos_analytics::{export_csv, render, Config, DataContext, FilterState, RenderPayload, YearRange};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Ranking,
    Quadrant,
    Detail,
    Filters,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Overview,
        Page::Ranking,
        Page::Quadrant,
        Page::Detail,
        Page::Filters,
    ];

    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::Ranking,
            Page::Ranking => Page::Quadrant,
            Page::Quadrant => Page::Detail,
            Page::Detail => Page::Filters,
            Page::Filters => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::Filters,
            Page::Ranking => Page::Overview,
            Page::Quadrant => Page::Ranking,
            Page::Detail => Page::Quadrant,
            Page::Filters => Page::Detail,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Ringkasan",
            Page::Ranking => "Ranking TOPSIS",
            Page::Quadrant => "Kuadran",
            Page::Detail => "Data Detail",
            Page::Filters => "Filter",
        }
    }
}

pub struct App<'a> {
    ctx: &'a DataContext,
    config: &'a Config,
    pub regions: Vec<String>,
    pub filter: FilterState,
    pub payload: RenderPayload,
    pub current_page: Page,
    pub region_state: TableState,
    pub detail_state: TableState,
    pub status: Option<String>,
}

impl<'a> App<'a> {
    /// Fails when the first render does (e.g. no rank-1 region)
    pub fn new(ctx: &'a DataContext, config: &'a Config) -> bansos_analytics::Result<Self> {
        let filter = FilterState::default_for(ctx);
        let payload = render(ctx, &filter)?;

        let mut region_state = TableState::default();
        let regions = ctx.regions();
        if !regions.is_empty() {
            region_state.select(Some(0));
        }
        let mut detail_state = TableState::default();
        if !ctx.ranking.is_empty() {
            detail_state.select(Some(0));
        }

        Ok(Self {
            ctx,
            config,
            regions,
            filter,
            payload,
            current_page: Page::Overview,
            region_state,
            detail_state,
            status: None,
        })
    }

    /// Re-render from scratch after any change to the filter
    pub fn refresh(&mut self) -> bansos_analytics::Result<()> {
        self.payload = render(self.ctx, &self.filter)?;
        Ok(())
    }

    pub fn toggle_selected_region(&mut self) -> bansos_analytics::Result<()> {
        if let Some(region) = self.region_state.selected().and_then(|i| self.regions.get(i)) {
            let region = region.clone();
            self.filter.toggle_region(&region);
            self.refresh()?;
        }
        Ok(())
    }

    /// Shift one end of the year range, staying inside the data bounds
    pub fn shift_years(&mut self, from_delta: i32, to_delta: i32) -> bansos_analytics::Result<()> {
        let bounds = full_range(self.ctx);
        let from = (self.filter.years.from + from_delta).clamp(bounds.from, bounds.to);
        let to = (self.filter.years.to + to_delta).clamp(bounds.from, bounds.to);
        if from > to {
            return Ok(());
        }
        self.filter.years = YearRange::new(from, to);
        self.refresh()
    }

    pub fn reset_filters(&mut self) -> bansos_analytics::Result<()> {
        self.filter = FilterState::default_for(self.ctx);
        self.status = Some("Filter dikembalikan ke Top 5".to_string());
        self.refresh()
    }

    pub fn export(&mut self) {
        let path = self.config.export_path();
        let result = export_csv(&self.ctx.ranking)
            .map_err(anyhow::Error::from)
            .and_then(|file| {
                std::fs::write(&path, &file.bytes)
                    .with_context(|| format!("failed to write {}", path.display()))
            });
        self.status = Some(match result {
            Ok(()) => {
                info!("exported ranking table to {}", path.display());
                format!("✓ Tersimpan: {}", path.display())
            }
            Err(e) => format!("✗ Export gagal: {}", e),
        });
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn active_state(&mut self) -> (&mut TableState, usize) {
        match self.current_page {
            Page::Filters => (&mut self.region_state, self.regions.len()),
            _ => (&mut self.detail_state, self.payload.table.rows.len()),
        }
    }

    pub fn next(&mut self) {
        let (state, len) = self.active_state();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (state, len) = self.active_state();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char(' ') if app.current_page == Page::Filters => {
                    app.toggle_selected_region()?
                }
                KeyCode::Char('[') => app.shift_years(-1, 0)?,
                KeyCode::Char(']') => app.shift_years(1, 0)?,
                KeyCode::Char('{') => app.shift_years(0, -1)?,
                KeyCode::Char('}') => app.shift_years(0, 1)?,
                KeyCode::Char('r') => app.reset_filters()?,
                KeyCode::Char('e') => app.export(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Overview => render_overview(f, chunks[1], app),
        Page::Ranking => render_ranking(f, chunks[1], &app.payload.ranking),
        Page::Quadrant => render_quadrant(f, chunks[1], &app.payload.quadrant),
        Page::Detail => render_detail(f, chunks[1], app),
        Page::Filters => render_filters(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled(
        "🛡️ Jabar Bansos Analytics  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let years = app.payload.sidebar.selected_years;
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("{} wilayah, {}-{}", app.filter.regions.len(), years.from, years.to),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(chunks[0]);

    for (kpi, slot) in app.payload.kpis.cards().iter().zip(cards.iter()) {
        let text = vec![
            Line::from(Span::styled(
                kpi.value.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(kpi.delta.clone(), Style::default().fg(Color::Green))),
        ];
        let card = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(format!(" {} ", kpi.label)),
        );
        f.render_widget(card, *slot);
    }

    render_trend(f, chunks[1], &app.payload.trend);
}

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
];

fn render_trend(f: &mut Frame, area: Rect, view: &TrendView) {
    let chart = match view {
        TrendView::Notice { message } => {
            let notice = Paragraph::new(Span::styled(message.clone(), Style::default().fg(Color::Yellow)))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" 📈 Tren Penyaluran Bansos "));
            f.render_widget(notice, area);
            return;
        }
        TrendView::Chart(chart) => chart,
    };

    let data: Vec<Vec<(f64, f64)>> = chart
        .series
        .iter()
        .map(|s| s.points.iter().map(|p| (p.x, p.y)).collect())
        .collect();

    let (x_min, x_max) = bounds(data.iter().flatten().map(|p| p.0));
    let (_, y_max) = bounds(data.iter().flatten().map(|p| p.1));
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .zip(data.iter())
        .enumerate()
        .map(|(i, (s, points))| {
            Dataset::default()
                .name(s.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(points)
        })
        .collect();

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" 📈 {} ", chart.subtitle)),
        )
        .x_axis(
            Axis::default()
                .title(chart.x_axis.label.clone())
                .bounds([x_min, x_max.max(x_min + 1.0)])
                .labels(vec![
                    Span::raw(format!("{:.0}", x_min)),
                    Span::raw(format!("{:.0}", x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_axis.label.clone())
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(bansos_analytics::format::format_number(y_max, 0)),
                ]),
        );

    f.render_widget(widget, area);
}

fn render_ranking(f: &mut Frame, area: Rect, chart: &RankingChart) {
    let max_score = chart.bars.iter().map(|b| b.score).fold(0.0_f64, f64::max);
    let bar_width = area.width.saturating_sub(46).max(10) as f64;

    let rows = chart.bars.iter().map(|b| {
        let len = if max_score > 0.0 {
            ((b.score / max_score) * bar_width).round() as usize
        } else {
            0
        };
        Row::new(vec![
            Cell::from(format!("#{}", b.rank)),
            Cell::from(truncate(&b.region, 22)),
            Cell::from(format!("{:.4}", b.score)),
            Cell::from("█".repeat(len)).style(Style::default().fg(viridis(b.intensity))),
        ])
    });

    let header = Row::new(vec!["Rank", "Wilayah", "Skor", chart.x_axis.label.as_str()])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .height(1);

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" 🏆 {} - Top 10 ", chart.title)),
    );

    f.render_widget(table, area);
}

fn render_quadrant(f: &mut Frame, area: Rect, chart: &QuadrantChart) {
    let quadrants = [
        (Quadrant::EffectiveStable, Color::Green),
        (Quadrant::EffectiveVolatile, Color::Yellow),
        (Quadrant::LaggingStable, Color::Cyan),
        (Quadrant::LaggingVolatile, Color::Red),
    ];

    let (x_min, x_max) = bounds(chart.points.iter().map(|p| p.x));
    let (y_min, y_max) = bounds(chart.points.iter().map(|p| p.y));
    let (x_min, x_max) = pad(x_min, x_max);
    let (y_min, y_max) = pad(y_min, y_max);

    let groups: Vec<Vec<(f64, f64)>> = quadrants
        .iter()
        .map(|(q, _)| {
            chart
                .points
                .iter()
                .filter(|p| p.quadrant == *q)
                .map(|p| (p.x, p.y))
                .collect()
        })
        .collect();

    let lines: Vec<(String, Vec<(f64, f64)>)> = chart
        .reference_lines
        .iter()
        .filter(|l| l.value.is_finite())
        .map(|l| {
            let points = match l.orientation {
                Orientation::Horizontal => vec![(x_min, l.value), (x_max, l.value)],
                Orientation::Vertical => vec![(l.value, y_min), (l.value, y_max)],
            };
            (l.label.clone(), points)
        })
        .collect();

    let mut datasets: Vec<Dataset> = quadrants
        .iter()
        .zip(groups.iter())
        .map(|((q, color), points)| {
            Dataset::default()
                .name(q.label())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect();
    for (label, points) in &lines {
        datasets.push(
            Dataset::default()
                .name(label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(points),
        );
    }

    let widget = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(format!(" 🧩 {} ", chart.title)))
        .x_axis(
            Axis::default()
                .title(chart.x_axis.label.clone())
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", x_min)),
                    Span::raw(format!("{:.1}", x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_axis.label.clone())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.0}", y_min)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );

    f.render_widget(widget, area);
}

fn render_detail(f: &mut Frame, area: Rect, app: &mut App) {
    let table = &app.payload.table;
    let header_cells = table.columns.iter().map(|h| {
        Cell::from(h.clone()).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = table.rows.iter().map(|r| {
        let cells: Vec<Cell> = r
            .cells()
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let cell = Cell::from(text.to_string());
                if i == 2 {
                    let bg = hex_color(&r.gradient).unwrap_or(Color::Reset);
                    cell.style(Style::default().bg(bg).fg(Color::Black))
                } else {
                    cell
                }
            })
            .collect();
        Row::new(cells).height(1)
    });

    let widget = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(15),
            Constraint::Length(20),
            Constraint::Length(15),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" 📋 Data Detail Perhitungan ('e' = download CSV) "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(widget, area, &mut app.detail_state);
}

fn render_filters(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let rows = app.regions.iter().map(|region| {
        let selected = app.filter.is_selected(region);
        let (mark, style) = if selected {
            ("[x]", Style::default().fg(Color::Green))
        } else {
            ("[ ]", Style::default().fg(Color::DarkGray))
        };
        Row::new(vec![Cell::from(mark), Cell::from(region.clone())]).style(style)
    });

    let list = Table::new(rows, [Constraint::Length(4), Constraint::Min(10)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Pilih Wilayah untuk Analisis Tren (Space) "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");
    f.render_stateful_widget(list, chunks[0], &mut app.region_state);

    let sidebar = &app.payload.sidebar;
    let mut lines = vec![
        Line::from(Span::styled(
            "Rentang Tahun",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "  {} - {}   (data: {} - {})",
            sidebar.selected_years.from,
            sidebar.selected_years.to,
            sidebar.year_bounds.from,
            sidebar.year_bounds.to
        )),
        Line::from("  [ / ]  geser tahun awal"),
        Line::from("  { / }  geser tahun akhir"),
        Line::from("  r      kembali ke Top 5"),
        Line::from(""),
        Line::from(Span::styled(
            "Metodologi",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ];
    for note in &sidebar.methodology {
        lines.push(Line::from(format!("  - {}", note)));
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Sidebar "));
    f.render_widget(panel, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(format!(" {} ", status), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw("| "));
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("Space", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Wilayah | "));
    status_spans.push(Span::styled("[ ] { }", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Tahun | "));
    status_spans.push(Span::styled("e", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Export | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit  "));
    status_spans.push(Span::styled(app.payload.footer.clone(), Style::default().fg(Color::DarkGray)));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// (min, max) over finite values, (0, 1) when there are none
fn bounds<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo.is_finite() {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let margin = ((hi - lo) * 0.05).max(1.0);
    (lo - margin, hi + margin)
}

/// Rough Viridis: dark purple -> teal -> yellow
fn viridis(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let stops = [(68.0, 1.0, 84.0), (33.0, 145.0, 140.0), (253.0, 231.0, 37.0)];
    let (a, b, u) = if t < 0.5 {
        (stops[0], stops[1], t * 2.0)
    } else {
        (stops[1], stops[2], (t - 0.5) * 2.0)
    };
    let mix = |x: f64, y: f64| (x + (y - x) * u).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bansos_analytics::{RankingRecord, TimeSeriesRecord};

    fn context() -> DataContext {
        let ts = |region: &str, year: i32, realized: f64| TimeSeriesRecord {
            region: region.to_string(),
            year,
            realized,
        };
        let rk = |region: &str, rank: u32, score: f64| RankingRecord {
            region: region.to_string(),
            rank,
            score,
            volume: 100.0,
            effectiveness: 90.0,
            growth: 1.0,
            stability: 10.0,
        };
        DataContext::new(
            vec![ts("A", 2022, 1.0), ts("A", 2023, 2.0), ts("B", 2024, 3.0)],
            vec![rk("A", 1, 0.9), rk("B", 2, 0.4)],
        )
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Overview;
        for _ in 0..Page::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, Page::Overview);
        assert_eq!(Page::Overview.previous(), Page::Filters);
    }

    #[test]
    fn test_toggle_region_rerenders() {
        let ctx = context();
        let config = Config::default();
        let mut app = App::new(&ctx, &config).unwrap();
        assert!(!app.payload.trend.is_notice());

        // deselect A then B: nothing left to plot
        app.current_page = Page::Filters;
        app.toggle_selected_region().unwrap();
        app.next();
        app.toggle_selected_region().unwrap();
        assert!(app.filter.regions.is_empty());
        assert!(app.payload.trend.is_notice());

        app.reset_filters().unwrap();
        assert_eq!(app.filter.regions.len(), 2);
    }

    #[test]
    fn test_shift_years_stays_in_bounds() {
        let ctx = context();
        let config = Config::default();
        let mut app = App::new(&ctx, &config).unwrap();

        app.shift_years(-1, 0).unwrap();
        assert_eq!(app.filter.years, YearRange::new(2022, 2024));
        app.shift_years(1, 0).unwrap();
        app.shift_years(1, 0).unwrap();
        app.shift_years(1, 0).unwrap();
        assert_eq!(app.filter.years, YearRange::new(2024, 2024));
        app.shift_years(0, -1).unwrap();
        assert_eq!(app.filter.years, YearRange::new(2024, 2024));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context();
        let config = Config::with_data_dir(dir.path());
        let mut app = App::new(&ctx, &config).unwrap();
        app.export();
        let written = std::fs::read_to_string(dir.path().join("Laporan_SPK_Bansos_Jabar.csv")).unwrap();
        assert!(written.starts_with("Wilayah,Ranking"));
        assert!(app.status.unwrap().starts_with('✓'));
    }

    #[test]
    fn test_color_helpers() {
        assert_eq!(hex_color("#00441b"), Some(Color::Rgb(0x00, 0x44, 0x1b)));
        assert_eq!(hex_color("00441b"), None);
        assert_eq!(viridis(0.0), Color::Rgb(68, 1, 84));
        assert_eq!(viridis(1.0), Color::Rgb(253, 231, 37));
        assert_eq!(truncate("Kabupaten Bandung Barat", 10), "Kabupat...");
    }
}
