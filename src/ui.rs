//! Terminal UI rendering for the experiment runner.
//!
//! Minimal chrome: a title line, the page body, one status line with the
//! keys that work on the current page. Selected grid cells use the REVERSED
//! modifier so they adapt to the terminal theme.
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state. Layout helpers are public because the update
//! loop maps mouse positions to grid cells with the same geometry.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::grid::Cell;
use crate::render::{GridView, PageView, RenderState, TaskBody, TaskScreen};
use crate::task::{CodeTemplate, Group, Table, TaskKind};
use crate::tea::{Notification, NotificationLevel};

const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SUCCESS: Color = Color::Green;

const MIN_COL_WIDTH: usize = 4;
const MAX_COL_WIDTH: usize = 14;
const PANE_GAP: u16 = 2;

/// Where each grid cell lands on screen.
///
/// A table is either shown whole or not at all: when the area is too small
/// no cell is hit-testable and the pane shows a notice instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridGeometry {
    pub area: Rect,
    pub rows: usize,
    /// Width of each column including the trailing gap.
    pub col_widths: Vec<u16>,
    pub header: bool,
    pub fits: bool,
}

impl GridGeometry {
    pub fn new(area: Rect, table: &Table, show_header: bool) -> Self {
        let col_widths = column_widths(table, show_header);
        let width: u16 = col_widths.iter().sum();
        let height = table.row_count() + usize::from(show_header);

        Self {
            area,
            rows: table.row_count(),
            fits: width <= area.width && height <= area.height as usize,
            col_widths,
            header: show_header,
        }
    }

    pub fn cols(&self) -> usize {
        self.col_widths.len()
    }

    /// Columns and lines the whole table needs.
    pub fn required_size(&self) -> (u16, u16) {
        (
            self.col_widths.iter().sum(),
            self.rows as u16 + self.header_rows(),
        )
    }

    fn header_rows(&self) -> u16 {
        u16::from(self.header)
    }

    /// Cell under the terminal position, if one is rendered there.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<Cell> {
        let top = self.area.y + self.header_rows();
        if !self.fits || x < self.area.x || y < top {
            return None;
        }
        let row = (y - top) as usize;
        if row >= self.rows {
            return None;
        }

        let mut left = self.area.x;
        for (col, width) in self.col_widths.iter().enumerate() {
            if x < left + width {
                return Some(Cell::new(row, col));
            }
            left += width;
        }
        None
    }

    /// Top-left terminal position of a rendered cell.
    pub fn cell_origin(&self, cell: Cell) -> Option<(u16, u16)> {
        if !self.fits || cell.row >= self.rows || cell.col >= self.cols() {
            return None;
        }
        let x: u16 = self.col_widths[..cell.col].iter().sum();
        Some((
            self.area.x + x,
            self.area.y + self.header_rows() + cell.row as u16,
        ))
    }
}

/// Widest value of each column plus one space, within the width bounds.
fn column_widths(table: &Table, show_header: bool) -> Vec<u16> {
    let mut widest = vec![0; table.col_count()];
    let header = show_header.then(|| table.header()).into_iter();
    for row in header.chain(table.rows().iter().map(Vec::as_slice)) {
        for (width, value) in widest.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }
    widest
        .into_iter()
        .map(|w| (w + 1).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH) as u16)
        .collect()
}

/// Title, body and status line areas.
pub fn page_layout(area: Rect) -> (Rect, Rect, Rect) {
    let [title, _, body, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);
    (title, body, status)
}

/// Split a task body into (grid pane, text pane). The grid pane is as wide
/// as the table; read tasks put the code on the left, write tasks put the
/// table on the left.
pub fn task_panes(body: Rect, kind: TaskKind, grid_width: u16) -> (Rect, Rect) {
    match kind {
        TaskKind::Read => {
            let [text, _, grid] = Layout::horizontal([
                Constraint::Fill(1),
                Constraint::Length(PANE_GAP),
                Constraint::Length(grid_width),
            ])
            .areas(body);
            (grid, text)
        }
        TaskKind::Write => {
            let [grid, _, text] = Layout::horizontal([
                Constraint::Length(grid_width),
                Constraint::Length(PANE_GAP),
                Constraint::Fill(1),
            ])
            .areas(body);
            (grid, text)
        }
    }
}

/// Task header line and the area below it.
fn task_sections(body: Rect) -> (Rect, Rect) {
    let [header, _, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(body);
    (header, content)
}

/// Grid geometry and text pane of a task's content area.
fn task_content(content: Rect, kind: TaskKind, table: &Table, show_header: bool) -> (GridGeometry, Rect) {
    let grid_width = column_widths(table, show_header).iter().sum();
    let (grid, text) = task_panes(content, kind, grid_width);
    (GridGeometry::new(grid, table, show_header), text)
}

pub fn task_grid_geometry(area: Rect, kind: TaskKind, table: &Table, show_header: bool) -> GridGeometry {
    let (_, body, _) = page_layout(area);
    let (_, content) = task_sections(body);
    task_content(content, kind, table, show_header).0
}

/// Main render function - entry point for all UI drawing.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let (title, body, status) = page_layout(frame.area());

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("syntaxlab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", state.path), Style::default().fg(COLOR_TEXT_MUTED)),
        ])),
        title,
    );

    let keys: Vec<(&str, &str, bool)> = match &state.page {
        PageView::Metadata { id, group } => {
            render_metadata(frame, body, id, *group);
            vec![("Tab", "group", true), ("Enter", "start", !id.trim().is_empty()), ("Esc", "quit", true)]
        }
        PageView::Consent { accepted } => {
            render_consent(frame, body, *accepted);
            vec![("Space", "agree", true), ("Enter", "continue", *accepted)]
        }
        PageView::Preparation { password, unlocked } => {
            render_preparation(frame, body, password);
            vec![("Enter", "start tasks", *unlocked)]
        }
        PageView::Task(screen) => {
            render_task(frame, body, screen);
            if screen.completed {
                vec![("Enter", "continue", true)]
            } else if screen.kind == TaskKind::Read {
                vec![("click/drag", "highlight", true), ("Enter", "submit", screen.can_submit)]
            } else {
                vec![("type", "answer", true), ("Enter", "submit", screen.can_submit)]
            }
        }
        PageView::End { id } => {
            render_end(frame, body, id);
            vec![("q", "quit", true)]
        }
    };
    frame.render_widget(Paragraph::new(keymap_line(&keys)), status);

    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, frame.area());
    }
}

fn keymap_line(keys: &[(&str, &str, bool)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, desc, enabled)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(COLOR_TEXT_MUTED)));
        }
        let (key_style, desc_style) = if *enabled {
            (Style::default().fg(COLOR_TEXT_DIMMED), Style::default().fg(COLOR_TEXT_MUTED))
        } else {
            let off = Style::default().fg(COLOR_TEXT_MUTED).add_modifier(Modifier::CROSSED_OUT);
            (off, off)
        };
        spans.push(Span::styled(key.to_string(), key_style));
        spans.push(Span::styled(format!(" {desc}"), desc_style));
    }
    Line::from(spans)
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().add_modifier(Modifier::BOLD)))
}

fn input_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(COLOR_TEXT_DIMMED)),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ])
}

fn render_metadata(frame: &mut Frame, area: Rect, id: &str, group: Group) {
    let mut group_spans = vec![Span::styled("Group: ", Style::default().fg(COLOR_TEXT_DIMMED))];
    for option in Group::ALL {
        let style = if option == group {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(COLOR_TEXT_MUTED)
        };
        group_spans.push(Span::styled(format!(" {} ", option.as_str()), style));
        group_spans.push(Span::raw(" "));
    }
    let lines = vec![
        heading("Experiment setup"),
        Line::default(),
        input_line("Participant id", id),
        Line::from(group_spans),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_consent(frame: &mut Frame, area: Rect, accepted: bool) {
    let checkbox = if accepted { "[x]" } else { "[ ]" };
    let lines = vec![
        heading("Experiment Consent"),
        Line::default(),
        Line::from(
            "Thank you for participating in a controlled experiment on the syntax used to select \
             cells in tables. You will be asked to perform tasks in either Jayvee or Python with pandas.",
        ),
        Line::default(),
        Line::from(
            "Participation is voluntary and all data collected is treated confidentially. \
             You can stop at any time without adverse effects.",
        ),
        Line::default(),
        Line::from(format!(
            "{checkbox} I have read and understand the consent form and wish to participate."
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_preparation(frame: &mut Frame, area: Rect, password: &str) {
    let lines = vec![
        heading("Preparation"),
        Line::default(),
        Line::from("During the tasks you may use the pandas documentation on selection by position"),
        Line::from("and the Jayvee cell range documentation. Please do not use other resources."),
        Line::default(),
        Line::from("When you think your solution is correct, submit it. Time and correctness are"),
        Line::from("measured; if unsure, favor correctness over speed."),
        Line::default(),
        input_line("Task password", password),
        Line::default(),
        Line::from(Span::styled(
            "Please do not continue until told to. The tasks start once you continue.",
            Style::default().fg(COLOR_TEXT_DIMMED),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_end(frame: &mut Frame, area: Rect, id: &str) {
    let lines = vec![
        heading("Thank you for participating."),
        Line::default(),
        Line::from(format!("Participant id: {id}")),
        Line::from("Please let the experiment host know that you are done."),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_task(frame: &mut Frame, area: Rect, screen: &TaskScreen) {
    let (header, body) = task_sections(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("Task {} of {}", screen.index + 1, screen.total),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", screen.language.display_name()),
                Style::default().fg(COLOR_TEXT_DIMMED),
            ),
        ])),
        header,
    );

    if screen.completed {
        let lines = vec![
            Line::from(Span::styled(
                "Your solution is submitted.",
                Style::default().fg(COLOR_SUCCESS),
            )),
            Line::default(),
            Line::from("Once you are ready for your next task, press Enter to continue."),
        ];
        frame.render_widget(Paragraph::new(lines), body);
        return;
    }

    let (geometry, text_area) = task_content(body, screen.kind, &screen.grid.table, screen.grid.show_header);
    render_grid(frame, &geometry, &screen.grid);
    let text = match &screen.body {
        TaskBody::Read { code } => code.lines().map(|l| Line::from(l.to_string())).collect(),
        TaskBody::Write { template, answer } => template_lines(template, answer),
    };
    frame.render_widget(Paragraph::new(text), text_area);
}

fn template_lines(template: &CodeTemplate, answer: &str) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = template
        .code_before
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect();
    lines.push(Line::from(vec![
        Span::raw(template.line_before.clone()),
        Span::styled(
            answer.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED),
        ),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        Span::raw(template.line_after.clone()),
    ]));
    lines.extend(template.code_after.lines().map(|l| Line::from(l.to_string())));
    lines
}

fn render_grid(frame: &mut Frame, geometry: &GridGeometry, grid: &GridView) {
    if !geometry.fits {
        let (width, height) = geometry.required_size();
        let notice = Paragraph::new(vec![
            Line::from(Span::styled(
                "The table does not fit.",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Enlarge the terminal so the table gets {width}x{height} cells.")),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(notice, geometry.area);
        return;
    }

    let cell_text = |col: usize, value: &str| {
        let width = geometry.col_widths[col] as usize;
        format!("{:<width$}", truncate(value, width - 1))
    };
    let mut lines: Vec<Line> = Vec::with_capacity(geometry.rows + 1);

    if geometry.header {
        let style = Style::default().fg(COLOR_TEXT_DIMMED).add_modifier(Modifier::BOLD);
        lines.push(Line::from(
            grid.table
                .header()
                .iter()
                .enumerate()
                .map(|(c, name)| Span::styled(cell_text(c, name), style))
                .collect::<Vec<_>>(),
        ));
    }

    for (r, row) in grid.table.rows().iter().enumerate() {
        let spans: Vec<Span> = row
            .iter()
            .enumerate()
            .map(|(c, value)| {
                let style = if grid.selected.contains(&Cell::new(r, c)) {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Span::styled(cell_text(c, value), style)
            })
            .collect();
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), geometry.area);
}

/// Render notification message on the bottom line of the screen.
fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(COLOR_SUCCESS),
        )),
    };

    frame.render_widget(Paragraph::new(line), notification_area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}~", truncated)
    }
}
