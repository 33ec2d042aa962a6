//! Dashboard rendering.
//!
//! Two stages:
//! - [`render`] projects the model into a [`Frame`] of styled lines. It is
//!   pure, so tests assert on its text.
//! - [`paint`] writes a frame to the terminal with crossterm.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::queue::types::Queue;
use crate::queue::units::{format_bytes, format_rate, format_utilization};
use crate::queue::view::{Status, ViewMode};
use crate::stream::connection::ConnectionState;
use crate::tui::input::KEY_HINTS;
use crate::tui::model::DashboardModel;
use crate::tui::notifications::Phase;
use crate::tui::theme::{Theme, Token};

pub const EMPTY_PLACEHOLDER: &str = "No matching queues";
const TITLE: &str = "RouterOS Queue Monitor";
const CARD_WIDTH: usize = 38;
const CARD_GAP: usize = 2;
const GAUGE_WIDTH: usize = 20;

// ──────────────────── frame model ────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub token: Token,
    pub bold: bool,
    pub dim: bool,
}

impl Span {
    #[must_use]
    pub fn new(text: impl Into<String>, token: Token) -> Self {
        Self {
            text: text.into(),
            token,
            bold: false,
            dim: false,
        }
    }

    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Token::Neutral)
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    fn width(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    #[must_use]
    pub const fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    fn pad_to(mut self, width: usize) -> Self {
        let current = self.width();
        if current < width {
            self.spans.push(Span::plain(" ".repeat(width - current)));
        }
        self
    }
}

/// One full screen of styled lines. The last line is the footer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<Line>,
}

impl Frame {
    /// Plain text, one terminal row per line.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.text().contains(needle))
    }

    /// Lines that fit in `rows`, keeping the footer on the last row.
    #[must_use]
    pub fn fit(&self, rows: usize) -> Vec<&Line> {
        if self.lines.len() <= rows || rows == 0 {
            return self.lines.iter().take(rows.max(1)).collect();
        }
        let mut out: Vec<&Line> = self.lines.iter().take(rows - 1).collect();
        if let Some(footer) = self.lines.last() {
            out.push(footer);
        }
        out
    }
}

// ──────────────────── helpers ────────────────────

fn clip(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let clipped = clip(text, width);
    let fill = width.saturating_sub(clipped.chars().count());
    format!("{clipped}{}", " ".repeat(fill))
}

/// Horizontal utilization bar, capped at 100%.
#[must_use]
pub fn render_gauge(utilization: f64, width: usize) -> String {
    let ratio = utilization.clamp(0.0, 100.0) / 100.0;
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!(
        "[{}{}]",
        "█".repeat(filled),
        "░".repeat(width.saturating_sub(filled))
    )
}

fn or_zero_rate(value: &str) -> &str {
    if value.is_empty() { "0 Mbps" } else { value }
}

// ──────────────────── sections ────────────────────

fn header(model: &DashboardModel) -> Line {
    let token = match model.connection.state() {
        ConnectionState::Connected => Token::Success,
        ConnectionState::Connecting => Token::Warning,
        _ => Token::Danger,
    };
    let updated = model
        .last_update
        .map_or_else(|| "--:--:--".to_string(), |t| t.format("%H:%M:%S").to_string());
    Line::new(vec![
        Span::new(TITLE, Token::Accent).bold(),
        Span::plain("  "),
        Span::new(format!("● {}", model.connection.indicator()), token),
        Span::plain("  "),
        Span::new(format!("Last update: {updated}"), Token::Muted),
    ])
}

fn stats_bar(model: &DashboardModel) -> Line {
    let s = &model.stats;
    Line::new(vec![
        Span::new("Queues ", Token::Muted),
        Span::plain(s.total_queues.to_string()).bold(),
        Span::new("   Upload ", Token::Muted),
        Span::plain(or_zero_rate(&s.total_upload)).bold(),
        Span::new("   Download ", Token::Muted),
        Span::plain(or_zero_rate(&s.total_download)).bold(),
        Span::new("   High utilization ", Token::Muted),
        Span::plain(s.high_utilization.to_string()).bold(),
    ])
}

fn toolbar(model: &DashboardModel, viewport: Viewport) -> Line {
    let search = if model.search.focused {
        Span::new(format!("{}_", model.search.input), Token::Accent)
    } else if model.search.input.is_empty() {
        Span::new("(press / to search)", Token::Muted)
    } else {
        Span::plain(model.search.input.clone())
    };
    let mut spans = vec![
        Span::new("View ", Token::Muted),
        Span::plain(model.view.label()),
        Span::new("  Filter ", Token::Muted),
        Span::plain(model.filter.label()),
        Span::new("  Sort ", Token::Muted),
        Span::plain(model.sort.label()),
        Span::new("  Search ", Token::Muted),
        search,
    ];
    if viewport.overflows() {
        spans.push(Span::new(
            format!(
                "  Rows {}-{} of {}",
                viewport.offset + 1,
                (viewport.offset + viewport.height).min(viewport.total),
                viewport.total
            ),
            Token::Muted,
        ));
    }
    Line::new(spans)
}

fn card(queue: &Queue) -> Vec<Line> {
    let status = Status::from_utilization(queue.utilization);
    let token = Token::for_status(status);
    let inner = CARD_WIDTH - 2;
    let label = status.label();
    let name_width = inner.saturating_sub(label.len() + 1);
    vec![
        Line::new(vec![
            Span::plain(format!("{} ", pad(&queue.name, name_width))).bold(),
            Span::new(label, token),
        ]),
        Line::new(vec![
            Span::new("rate ", Token::Muted),
            Span::plain(pad(&format_rate(&queue.rate), 13)),
            Span::new("max ", Token::Muted),
            Span::plain(pad(&format_rate(&queue.max_limit), 13)),
        ]),
        Line::new(vec![
            Span::new("bytes ", Token::Muted),
            Span::plain(pad(&format_bytes(queue.bytes), 12)),
            Span::new("util ", Token::Muted),
            Span::new(format_utilization(queue.utilization), token),
        ]),
        Line::new(vec![Span::new(
            render_gauge(queue.utilization, GAUGE_WIDTH),
            token,
        )]),
    ]
}

fn grid(queues: &[Queue], cols: u16) -> Vec<Line> {
    let per_row = (usize::from(cols) / (CARD_WIDTH + CARD_GAP)).max(1);
    let mut lines = Vec::new();
    for chunk in queues.chunks(per_row) {
        let cards: Vec<Vec<Line>> = chunk.iter().map(card).collect();
        let height = cards.iter().map(Vec::len).max().unwrap_or(0);
        for row in 0..height {
            let mut spans = Vec::new();
            for (i, c) in cards.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::plain(" ".repeat(CARD_GAP)));
                }
                let cell = c.get(row).cloned().unwrap_or_default();
                let cell = if i + 1 < cards.len() {
                    cell.pad_to(CARD_WIDTH)
                } else {
                    cell
                };
                spans.extend(cell.spans);
            }
            lines.push(Line::new(spans));
        }
        lines.push(Line::blank());
    }
    lines
}

const LIST_COLUMNS: [(&str, usize); 6] = [
    ("Name", 24),
    ("Rate", 14),
    ("Max limit", 14),
    ("Bytes", 11),
    ("Utilization", 12),
    ("Status", 8),
];

fn list_heading() -> Line {
    Line::new(
        LIST_COLUMNS
            .iter()
            .map(|(name, width)| Span::new(pad(name, *width), Token::Muted).bold())
            .collect(),
    )
}

fn list(queues: &[Queue]) -> Vec<Line> {
    queues
        .iter()
        .map(|q| {
            let status = Status::from_utilization(q.utilization);
            let token = Token::for_status(status);
            Line::new(vec![
                Span::plain(pad(&q.name, LIST_COLUMNS[0].1)),
                Span::plain(pad(&format_rate(&q.rate), LIST_COLUMNS[1].1)),
                Span::plain(pad(&format_rate(&q.max_limit), LIST_COLUMNS[2].1)),
                Span::plain(pad(&format_bytes(q.bytes), LIST_COLUMNS[3].1)),
                Span::new(pad(&format_utilization(q.utilization), LIST_COLUMNS[4].1), token),
                Span::new(status.label(), token),
            ])
        })
        .collect()
}

fn notifications(model: &DashboardModel) -> Vec<Line> {
    model
        .notifications
        .items()
        .iter()
        .map(|n| {
            let title = Span::new(format!("[{}] ", n.title), Token::for_severity(n.severity)).bold();
            let message = Span::plain(n.message.clone());
            match n.phase {
                Phase::Visible => Line::new(vec![title, message]),
                Phase::Leaving => Line::new(vec![title.dim(), message.dim()]),
            }
        })
        .collect()
}

fn splash(model: &DashboardModel) -> Frame {
    let rows = usize::from(model.terminal_size.1);
    let mut lines = vec![Line::blank(); rows / 3];
    lines.push(Line::new(vec![Span::new(TITLE, Token::Accent).bold()]));
    lines.push(Line::new(vec![Span::new(
        "Connecting to the monitoring service...",
        Token::Muted,
    )]));
    Frame { lines }
}

// ──────────────────── entrypoints ────────────────────

/// Project the model into a frame.
///
/// The queue area scrolls under the fixed header; the footer always stays on
/// the last row.
#[must_use]
pub fn render(model: &DashboardModel) -> Frame {
    if model.splash {
        return splash(model);
    }

    let visible = model.visible_queues();
    let area = queue_area(model, &visible);
    let viewport = viewport_for(model, &area);

    let cols = model.terminal_size.0;
    let mut lines = vec![
        header(model),
        stats_bar(model),
        toolbar(model, viewport),
        Line::new(vec![Span::new(
            "─".repeat(usize::from(cols)),
            Token::Muted,
        )]),
    ];
    lines.extend(notifications(model));
    lines.extend(area.heading);
    lines.extend(
        area.rows
            .into_iter()
            .skip(viewport.offset)
            .take(viewport.height),
    );
    lines.push(Line::new(vec![Span::new(KEY_HINTS, Token::Muted)]));
    Frame { lines }
}

// ──────────────────── viewport ────────────────────

/// Rows above the queue area: header, stats, toolbar, separator.
const CHROME_ROWS: usize = 4;
const FOOTER_ROWS: usize = 1;

/// Visible window over the scrollable queue area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub offset: usize,
    pub height: usize,
    pub total: usize,
}

impl Viewport {
    #[must_use]
    pub const fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.height)
    }

    #[must_use]
    pub const fn overflows(&self) -> bool {
        self.total > self.height
    }
}

struct QueueArea {
    /// Column heading pinned above the rows (list view).
    heading: Option<Line>,
    rows: Vec<Line>,
}

fn queue_area(model: &DashboardModel, visible: &[Queue]) -> QueueArea {
    if visible.is_empty() {
        return QueueArea {
            heading: None,
            rows: vec![Line::new(vec![Span::new(EMPTY_PLACEHOLDER, Token::Muted)])],
        };
    }
    match model.view {
        ViewMode::Grid => QueueArea {
            heading: None,
            rows: grid(visible, model.terminal_size.0),
        },
        ViewMode::List => QueueArea {
            heading: Some(list_heading()),
            rows: list(visible),
        },
    }
}

fn viewport_for(model: &DashboardModel, area: &QueueArea) -> Viewport {
    let fixed = CHROME_ROWS
        + model.notifications.len()
        + usize::from(area.heading.is_some())
        + FOOTER_ROWS;
    let height = usize::from(model.terminal_size.1)
        .saturating_sub(fixed)
        .max(1);
    let total = area.rows.len();
    Viewport {
        offset: model.scroll.min(total.saturating_sub(height)),
        height,
        total,
    }
}

/// Viewport the next frame will use for `model`.
#[must_use]
pub fn viewport(model: &DashboardModel) -> Viewport {
    let visible = model.visible_queues();
    viewport_for(model, &queue_area(model, &visible))
}

/// Draw a frame, clipping to the terminal size.
pub fn paint<W: Write>(out: &mut W, frame: &Frame, theme: Theme, size: (u16, u16)) -> io::Result<()> {
    let (cols, rows) = size;
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in frame.fit(usize::from(rows)).into_iter().enumerate() {
        queue!(out, MoveTo(0, row as u16))?;
        let mut remaining = usize::from(cols);
        for span in &line.spans {
            if remaining == 0 {
                break;
            }
            if let Some(color) = theme.color(span.token) {
                queue!(out, SetForegroundColor(color))?;
            }
            if span.bold {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            if span.dim {
                queue!(out, SetAttribute(Attribute::Dim))?;
            }
            let text = clip(&span.text, remaining);
            remaining = remaining.saturating_sub(text.chars().count());
            queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
        }
    }
    out.flush()
}
