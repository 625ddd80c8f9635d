//! Ratatui-based terminal dashboard.
//!
//! The TUI provides a campaign multi-select panel and tabbed views over the
//! computed aggregates: KPI cards plus funnel, spend-over-time and day-wise
//! charts, per-campaign tables, and the raw cleaned rows.

use std::collections::HashSet;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use plotters::style::RGBColor;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Terminal,
};

use crate::app::pipeline::{self, CleanedData, DashboardData};
use crate::cli::RunArgs;
use crate::data::DataSource;
use crate::domain::{RoasTier, WEEKDAY_LABELS};
use crate::error::AppError;
use crate::report::{fmt_count, fmt_pct, fmt_ratio, fmt_usd, fmt_usd_opt, truncate};

mod charts;

use charts::BarChart;

/// Start the TUI.
pub fn run(args: &RunArgs) -> Result<(), AppError> {
    let source = DataSource::from_args(args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(source, args)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Overview,
    Spend,
    Campaigns,
    Weekday,
    Data,
}

impl Tab {
    const ALL: [Tab; 5] = [Tab::Overview, Tab::Spend, Tab::Campaigns, Tab::Weekday, Tab::Data];

    fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Spend => "Spend",
            Tab::Campaigns => "Campaigns",
            Tab::Weekday => "Weekday",
            Tab::Data => "Data",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

struct CampaignChoice {
    name: String,
    selected: bool,
}

struct App {
    source: DataSource,
    cleaned: CleanedData,
    choices: Vec<CampaignChoice>,
    cursor: usize,
    tab: Tab,
    data: DashboardData,
    status: String,
    data_scroll: u16,
}

impl App {
    fn new(mut source: DataSource, args: &RunArgs) -> Result<Self, AppError> {
        let cleaned = pipeline::load_and_clean(&mut source)?;
        let status = format!(
            "Loaded {} rows from {}.",
            cleaned.rows_used,
            source.describe()
        );

        let preset: HashSet<String> = args.campaigns.iter().cloned().collect();
        let choices = cleaned
            .campaigns
            .iter()
            .map(|name| CampaignChoice {
                selected: preset.is_empty() || preset.contains(name),
                name: name.clone(),
            })
            .collect();

        let mut app = Self {
            source,
            cleaned,
            choices,
            cursor: 0,
            tab: Tab::Overview,
            data: pipeline::recompute(&[], &HashSet::new()),
            status,
            data_scroll: 0,
        };
        app.recompute_data();
        Ok(app)
    }

    fn selection(&self) -> HashSet<String> {
        self.choices
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.name.clone())
            .collect()
    }

    fn recompute_data(&mut self) {
        self.data = pipeline::recompute(&self.cleaned.records, &self.selection());
        self.data_scroll = 0;
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.choices.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(choice) = self.choices.get_mut(self.cursor) {
                    choice.selected = !choice.selected;
                    let name = choice.name.clone();
                    let state = if choice.selected { "on" } else { "off" };
                    self.recompute_data();
                    self.status = format!("{name}: {state}");
                }
            }
            KeyCode::Char('a') => {
                for choice in &mut self.choices {
                    choice.selected = true;
                }
                self.recompute_data();
                self.status = "All campaigns selected.".to_string();
            }
            KeyCode::Char('n') => {
                for choice in &mut self.choices {
                    choice.selected = false;
                }
                self.recompute_data();
                self.status = "No campaigns selected.".to_string();
            }
            KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Right | KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::PageDown => {
                if self.tab == Tab::Data {
                    self.data_scroll = self.data_scroll.saturating_add(10);
                }
            }
            KeyCode::PageUp => {
                if self.tab == Tab::Data {
                    self.data_scroll = self.data_scroll.saturating_sub(10);
                }
            }
            _ => {}
        }
        false
    }

    /// Re-fetch past the cache and rebuild the selector, keeping the current
    /// selection for campaigns that still exist. A failed refresh keeps the
    /// old data on screen and surfaces the error in the status line.
    fn reload(&mut self) {
        self.source.invalidate();
        let cleaned = match pipeline::load_and_clean(&mut self.source) {
            Ok(cleaned) => cleaned,
            Err(err) => {
                self.status = format!("Refresh failed: {err}");
                return;
            }
        };

        let previously_on = self.selection();
        let had_choices = !self.choices.is_empty();
        self.choices = cleaned
            .campaigns
            .iter()
            .map(|name| CampaignChoice {
                selected: !had_choices || previously_on.contains(name),
                name: name.clone(),
            })
            .collect();
        self.cursor = self.cursor.min(self.choices.len().saturating_sub(1));
        self.cleaned = cleaned;
        self.recompute_data();
        self.status = format!(
            "Refreshed: {} rows from {}.",
            self.cleaned.rows_used,
            self.source.describe()
        );
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("adash", Style::default().fg(Color::Cyan)),
            Span::raw(" — campaign performance dashboard"),
        ]));

        let dates = match (self.cleaned.stats.date_min, self.cleaned.stats.date_max) {
            (Some(min), Some(max)) => format!("{min} → {max}"),
            _ => "-".to_string(),
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{} | rows: {}/{} | skipped: {} | dates: {dates} | selected: {}/{}",
                self.source.describe(),
                self.cleaned.rows_used,
                self.cleaned.rows_read,
                self.cleaned.row_errors.len(),
                self.choices.iter().filter(|c| c.selected).count(),
                self.choices.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(area);

        self.draw_campaign_panel(frame, chunks[0]);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(chunks[1]);

        let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, main[0]);

        match self.tab {
            Tab::Overview => self.draw_overview(frame, main[1]),
            Tab::Spend => self.draw_spend(frame, main[1]),
            Tab::Campaigns => self.draw_campaigns(frame, main[1]),
            Tab::Weekday => self.draw_weekday(frame, main[1]),
            Tab::Data => self.draw_data(frame, main[1]),
        }
    }

    fn draw_campaign_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .choices
            .iter()
            .map(|choice| {
                let mark = if choice.selected { "[x]" } else { "[ ]" };
                let style = if choice.selected {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Span::styled(
                    format!("{mark} {}", truncate(&choice.name, 24)),
                    style,
                ))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Campaigns").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.cursor));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_overview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let kpis = &self.data.kpis;
        self.draw_kpi_row(
            frame,
            chunks[0],
            &[
                ("Total Spend", fmt_usd(kpis.total_spend)),
                ("Total Impressions", fmt_count(kpis.total_impressions)),
                ("Average ROAS", fmt_ratio(kpis.avg_roas)),
            ],
        );
        self.draw_kpi_row(
            frame,
            chunks[1],
            &[
                ("Average CTR", fmt_pct(kpis.avg_ctr)),
                ("Avg CPA", fmt_usd_opt(kpis.avg_cpa)),
                ("Total Revenue", fmt_usd(kpis.total_revenue)),
            ],
        );
        self.draw_funnel(frame, chunks[2]);
    }

    fn draw_kpi_row(&self, frame: &mut ratatui::Frame<'_>, area: Rect, cards: &[(&str, String)]) {
        let constraints: Vec<Constraint> = cards
            .iter()
            .map(|_| Constraint::Ratio(1, cards.len() as u32))
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (chunk, (title, value)) in chunks.iter().zip(cards) {
            let p = Paragraph::new(Line::from(Span::styled(
                value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().title(*title).borders(Borders::ALL));
            frame.render_widget(p, *chunk);
        }
    }

    fn draw_funnel(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let funnel = &self.data.funnel;
        let block = Block::default().title("Conversion Funnel").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let bar_width = inner.width.saturating_sub(34).max(10) as f64;
        let scale = |count: f64| -> usize {
            if funnel.impressions > 0.0 {
                ((count / funnel.impressions) * bar_width).ceil() as usize
            } else {
                0
            }
        };

        let stages = [
            ("Impressions", funnel.impressions, String::new(), Color::Cyan),
            (
                "Clicks",
                funnel.clicks,
                format!("{:.2}% CTR", funnel.ctr_pct),
                Color::LightBlue,
            ),
            (
                "Conversions",
                funnel.conversions as f64,
                format!("{:.2}% CVR", funnel.cvr_pct),
                Color::Green,
            ),
        ];

        let mut lines: Vec<Line> = Vec::new();
        for (label, count, note, color) in stages {
            lines.push(Line::from(vec![
                Span::raw(format!("{label:<12} {:>12}  ", fmt_count(count))),
                Span::styled("█".repeat(scale(count)), Style::default().fg(color)),
                Span::styled(
                    if note.is_empty() { note } else { format!("  {note}") },
                    Style::default().fg(Color::Gray),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn draw_spend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Daily Ad Spend").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let labels: Vec<String> = self
            .data
            .spend_by_date
            .iter()
            .map(|(date, _)| date.format("%m-%d").to_string())
            .collect();
        let values: Vec<Option<f64>> = self
            .data
            .spend_by_date
            .iter()
            .map(|(_, spend)| Some(*spend))
            .collect();

        let chart = BarChart {
            labels: &labels,
            values: &values,
            y_label: "spend (USD)",
            color: RGBColor(0, 255, 255),
            fmt_y: fmt_axis_usd,
        };
        frame.render_widget(chart, inner);
    }

    fn draw_campaigns(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        self.draw_roas_by_campaign(frame, chunks[0]);
        self.draw_revenue_share(frame, chunks[1]);
        self.draw_performance(frame, chunks[2]);
    }

    fn draw_roas_by_campaign(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("ROAS by Campaign").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let max_roas = self
            .data
            .roas_by_campaign
            .iter()
            .map(|c| c.roas)
            .fold(0.0f64, f64::max);
        let bar_width = inner.width.saturating_sub(40).max(10) as f64;

        let mut lines: Vec<Line> = Vec::new();
        for row in &self.data.roas_by_campaign {
            let w = if max_roas > 0.0 {
                ((row.roas / max_roas) * bar_width).ceil() as usize
            } else {
                0
            };
            lines.push(Line::from(vec![
                Span::raw(format!("{:<26} {:>6.2} ", truncate(&row.campaign, 26), row.roas)),
                Span::styled("█".repeat(w), Style::default().fg(tier_color(row.tier))),
                Span::styled(
                    format!(" {}", row.tier.display_name()),
                    Style::default().fg(Color::Gray),
                ),
            ]));
        }
        if lines.is_empty() {
            lines.push(no_data_line());
        }

        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn draw_revenue_share(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Revenue Share by Campaign")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let total: f64 = self.data.revenue_share.iter().map(|(_, v)| v).sum();
        let bar_width = inner.width.saturating_sub(48).max(10) as f64;

        let mut lines: Vec<Line> = Vec::new();
        for (campaign, revenue) in &self.data.revenue_share {
            let share = if total > 0.0 { revenue / total } else { 0.0 };
            lines.push(Line::from(vec![
                Span::raw(format!(
                    "{:<26} {:>13} {:>5.1}% ",
                    truncate(campaign, 26),
                    fmt_usd(*revenue),
                    share * 100.0
                )),
                Span::styled(
                    "█".repeat((share * bar_width).ceil() as usize),
                    Style::default().fg(Color::Magenta),
                ),
            ]));
        }
        if lines.is_empty() {
            lines.push(no_data_line());
        }

        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn draw_performance(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Campaign Performance (CTR / CPA / ROAS)")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            format!("{:<26} {:>8} {:>10} {:>8}", "campaign", "ctr", "cpa", "roas"),
            Style::default().fg(Color::Gray),
        )));
        for row in &self.data.performance {
            let roas_style = match row.roas {
                Some(roas) => Style::default().fg(tier_color(RoasTier::classify(roas))),
                None => Style::default().fg(Color::Gray),
            };
            lines.push(Line::from(vec![
                Span::raw(format!(
                    "{:<26} {:>8} {:>10} ",
                    truncate(&row.campaign, 26),
                    fmt_pct(row.ctr),
                    fmt_usd_opt(row.cpa),
                )),
                Span::styled(format!("{:>8}", fmt_ratio(row.roas)), roas_style),
            ]));
        }
        if self.data.performance.is_empty() {
            lines.push(no_data_line());
        }

        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn draw_weekday(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Day-wise ROAS").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let labels: Vec<String> = WEEKDAY_LABELS
            .iter()
            .map(|label| label[..3].to_string())
            .collect();

        let chart = BarChart {
            labels: &labels,
            values: &self.data.weekday_roas,
            y_label: "mean ROAS",
            color: RGBColor(0, 255, 0),
            fmt_y: fmt_axis_ratio,
        };
        frame.render_widget(chart, inner);
    }

    fn draw_data(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("Raw Data ({} rows)", self.data.rows.len()))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            format!(
                "{:<11} {:<22} {:>12} {:>6} {:>10} {:>12} {:>8} {:>11} {:>8}",
                "date", "campaign", "cost", "roas", "cpa", "value", "ctr", "impr", "clicks"
            ),
            Style::default().fg(Color::Gray),
        )));

        for record in &self.data.rows {
            lines.push(Line::from(Span::raw(format!(
                "{:<11} {:<22} {:>12} {:>6} {:>10} {:>12} {:>8} {:>11} {:>8}",
                record.date.to_string(),
                truncate(&record.campaign, 22),
                fmt_usd_opt(record.cost),
                fmt_ratio(record.roas),
                fmt_usd_opt(record.cpa),
                fmt_usd_opt(record.conversion_value),
                fmt_pct(record.ctr),
                record.impressions.map(fmt_count).unwrap_or_else(|| "-".to_string()),
                record.link_clicks.map(fmt_count).unwrap_or_else(|| "-".to_string()),
            ))));
        }
        if self.data.rows.is_empty() {
            lines.push(no_data_line());
        }

        let p = Paragraph::new(Text::from(lines)).scroll((self.data_scroll, 0));
        frame.render_widget(p, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  space toggle  a all  n none  ←/→ tab  r refresh  PgUp/PgDn scroll  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn tier_color(tier: RoasTier) -> Color {
    match tier {
        RoasTier::High => Color::Green,
        RoasTier::Medium => Color::Yellow,
        RoasTier::Low => Color::Red,
    }
}

fn no_data_line() -> Line<'static> {
    Line::from(Span::styled(
        "No data for the current selection.",
        Style::default().fg(Color::Yellow),
    ))
}

fn fmt_axis_usd(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_ratio(v: f64) -> String {
    format!("{v:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_cycle_in_both_directions() {
        let mut tab = Tab::Overview;
        for _ in 0..Tab::ALL.len() {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Overview);
        assert_eq!(Tab::Overview.prev(), Tab::Data);
    }

    #[test]
    fn tier_colors_follow_the_classifier() {
        assert_eq!(tier_color(RoasTier::classify(3.5)), Color::Green);
        assert_eq!(tier_color(RoasTier::classify(2.0)), Color::Yellow);
        assert_eq!(tier_color(RoasTier::classify(0.2)), Color::Red);
    }
}
