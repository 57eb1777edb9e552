//! Day tooltip: hover intent, placement and content.
//!
//! The board script in `ui::INDEX_HTML` mirrors `HoverIntent` timings and
//! `place_tooltip` geometry in the browser; change both together.

use crate::calendar::mood_color;
use crate::models::CalendarDay;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

pub const SHOW_DELAY: Duration = Duration::from_millis(100);
pub const HIDE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverPhase<C> {
    Idle,
    PendingShow { cell: C, due: Instant },
    Visible { cell: C },
    PendingHide { cell: C, due: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverAction<C> {
    Show(C),
    Hide,
}

/// Debounced show/hide for the board tooltip.
///
/// The value only moves when told what time it is, so the same machine runs
/// under real timers (`HoverDriver`) and in tests with hand-picked instants.
#[derive(Debug, Clone)]
pub struct HoverIntent<C> {
    phase: HoverPhase<C>,
    tooltip_visible: bool,
}

impl<C> Default for HoverIntent<C> {
    fn default() -> Self {
        Self {
            phase: HoverPhase::Idle,
            tooltip_visible: false,
        }
    }
}

impl<C: Clone + PartialEq> HoverIntent<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &HoverPhase<C> {
        &self.phase
    }

    pub fn is_tooltip_visible(&self) -> bool {
        self.tooltip_visible
    }

    /// Cell the pointer is currently over or just left.
    pub fn active_cell(&self) -> Option<&C> {
        match &self.phase {
            HoverPhase::Idle => None,
            HoverPhase::PendingShow { cell, .. }
            | HoverPhase::Visible { cell }
            | HoverPhase::PendingHide { cell, .. } => Some(cell),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.phase {
            HoverPhase::PendingShow { due, .. } | HoverPhase::PendingHide { due, .. } => Some(*due),
            _ => None,
        }
    }

    pub fn enter(&mut self, cell: C, now: Instant) {
        if let HoverPhase::PendingHide { cell: current, .. } = &self.phase {
            if *current == cell && self.tooltip_visible {
                self.phase = HoverPhase::Visible { cell };
                return;
            }
        }
        self.phase = HoverPhase::PendingShow {
            cell,
            due: now + SHOW_DELAY,
        };
    }

    pub fn leave(&mut self, now: Instant) {
        let phase = std::mem::replace(&mut self.phase, HoverPhase::Idle);
        self.phase = match phase {
            HoverPhase::Idle => HoverPhase::Idle,
            HoverPhase::PendingShow { cell, .. }
            | HoverPhase::Visible { cell }
            | HoverPhase::PendingHide { cell, .. } => {
                if self.tooltip_visible {
                    HoverPhase::PendingHide {
                        cell,
                        due: now + HIDE_DELAY,
                    }
                } else {
                    HoverPhase::Idle
                }
            }
        };
    }

    pub fn click_outside(&mut self) -> Option<HoverAction<C>> {
        self.phase = HoverPhase::Idle;
        if std::mem::take(&mut self.tooltip_visible) {
            Some(HoverAction::Hide)
        } else {
            None
        }
    }

    /// Fires whichever timer is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<HoverAction<C>> {
        match &self.phase {
            HoverPhase::PendingShow { cell, due } if *due <= now => {
                let cell = cell.clone();
                self.phase = HoverPhase::Visible { cell: cell.clone() };
                self.tooltip_visible = true;
                Some(HoverAction::Show(cell))
            }
            HoverPhase::PendingHide { due, .. } if *due <= now => {
                self.phase = HoverPhase::Idle;
                self.tooltip_visible = false;
                Some(HoverAction::Hide)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverEvent<C> {
    Enter(C),
    Leave,
    ClickOutside,
}

/// Runs a `HoverIntent` on tokio timers.
///
/// Pointer events go in through the handle, show/hide actions come out of the
/// receiver returned by `spawn`. Dropping the handle stops the task.
pub struct HoverDriver<C> {
    events: mpsc::UnboundedSender<HoverEvent<C>>,
    task: JoinHandle<()>,
}

impl<C> HoverDriver<C>
where
    C: Clone + PartialEq + Send + std::fmt::Debug + 'static,
{
    pub fn spawn() -> (Self, mpsc::UnboundedReceiver<HoverAction<C>>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_hover(event_rx, action_tx));
        (
            Self {
                events: event_tx,
                task,
            },
            action_rx,
        )
    }

    pub fn enter(&self, cell: C) {
        let _ = self.events.send(HoverEvent::Enter(cell));
    }

    pub fn leave(&self) {
        let _ = self.events.send(HoverEvent::Leave);
    }

    pub fn click_outside(&self) {
        let _ = self.events.send(HoverEvent::ClickOutside);
    }
}

impl<C> Drop for HoverDriver<C> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_hover<C>(
    mut events: mpsc::UnboundedReceiver<HoverEvent<C>>,
    actions: mpsc::UnboundedSender<HoverAction<C>>,
) where
    C: Clone + PartialEq + std::fmt::Debug,
{
    let mut intent = HoverIntent::new();
    loop {
        let deadline = intent.next_deadline();
        let action = tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                debug!(?event, "hover event");
                match event {
                    HoverEvent::Enter(cell) => {
                        intent.enter(cell, Instant::now());
                        None
                    }
                    HoverEvent::Leave => {
                        intent.leave(Instant::now());
                        None
                    }
                    HoverEvent::ClickOutside => intent.click_outside(),
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                intent.poll(Instant::now())
            }
        };

        if let Some(action) = action {
            if actions.send(action).is_err() {
                break;
            }
        }
    }
}

pub const EDGE_MARGIN: f64 = 10.0;
pub const CELL_GAP: f64 = 8.0;

/// Viewport-relative box, as reported by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

/// Document coordinates for the tooltip's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub side: Side,
}

/// Centres the tooltip above the cell, keeps it `EDGE_MARGIN` away from both
/// viewport edges and flips it below the cell when it would clip the top.
/// A tooltip wider than the viewport keeps its left edge on screen.
pub fn place_tooltip(cell: Rect, tooltip: Size, viewport: Viewport) -> Placement {
    let center_x = cell.left + viewport.scroll_x + cell.width / 2.0;
    let cell_top = cell.top + viewport.scroll_y;

    let mut left = center_x - tooltip.width / 2.0;
    let right_limit = viewport.width - tooltip.width - EDGE_MARGIN;
    if left > right_limit {
        left = right_limit;
    }
    if left < EDGE_MARGIN {
        left = EDGE_MARGIN;
    }

    let above = cell_top - tooltip.height - CELL_GAP;
    if above < viewport.scroll_y + EDGE_MARGIN {
        Placement {
            left,
            top: cell_top + cell.height + CELL_GAP,
            side: Side::Below,
        }
    } else {
        Placement {
            left,
            top: above,
            side: Side::Above,
        }
    }
}

pub const MAX_LISTED_TYPES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreChip {
    pub score: u8,
    pub count: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub date_label: String,
    pub average_score: Option<f64>,
    pub entries_count: u32,
    /// Highest score first.
    pub chips: Vec<ScoreChip>,
    pub mood_types: Vec<String>,
    pub more_types: bool,
}

impl TooltipContent {
    pub fn for_day(day: &CalendarDay) -> Self {
        let date_label = day.date.format("%B %-d, %Y").to_string();
        if !day.has_data || day.entries_count == 0 {
            return Self {
                date_label,
                average_score: None,
                entries_count: 0,
                chips: Vec::new(),
                mood_types: Vec::new(),
                more_types: false,
            };
        }

        let mut counts = [0u32; 5];
        for point in &day.entries {
            if (1..=5).contains(&point.score) {
                counts[usize::from(point.score - 1)] += 1;
            }
        }
        let chips = (1..=5u8)
            .rev()
            .filter_map(|score| {
                let count = counts[usize::from(score - 1)];
                (count > 0).then(|| ScoreChip {
                    score,
                    count,
                    color: mood_color(i64::from(score)),
                })
            })
            .collect();

        Self {
            date_label,
            average_score: Some(day.average_score),
            entries_count: day.entries_count,
            chips,
            mood_types: day.mood_types.iter().take(MAX_LISTED_TYPES).cloned().collect(),
            more_types: day.mood_types.len() > MAX_LISTED_TYPES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TooltipPhase {
    Hidden,
    /// Rendered invisibly so the layout engine can measure it.
    Measuring,
    Shown(Placement),
}

/// Two-phase tooltip render: content first, placement once the size is known.
#[derive(Debug, Clone)]
pub struct TooltipView {
    phase: TooltipPhase,
    content: Option<TooltipContent>,
}

impl Default for TooltipView {
    fn default() -> Self {
        Self {
            phase: TooltipPhase::Hidden,
            content: None,
        }
    }
}

impl TooltipView {
    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }

    pub fn begin(&mut self, content: TooltipContent) {
        self.content = Some(content);
        self.phase = TooltipPhase::Measuring;
    }

    /// Places a measured tooltip. Ignored unless a measurement is pending.
    pub fn reveal(&mut self, measured: Size, cell: Rect, viewport: Viewport) -> Option<Placement> {
        if self.phase != TooltipPhase::Measuring {
            return None;
        }
        let placement = place_tooltip(cell, measured, viewport);
        self.phase = TooltipPhase::Shown(placement);
        Some(placement)
    }

    pub fn hide(&mut self) {
        self.phase = TooltipPhase::Hidden;
        self.content = None;
    }
}
