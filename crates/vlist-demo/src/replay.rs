#![forbid(unsafe_code)]

//! Deterministic scroll replay.
//!
//! Builds a chat panel over a synthetic conversation, starts at the newest
//! message and scrolls up one step per simulated tick until the history is
//! exhausted and the viewport reaches the top. Each tick prints one frame.

use std::io::{self, Write};
use std::time::Duration;

use vlist_chat::{
    ChatClock, ChatPanel, ChatPanelConfig, MockHistory, PanelView, TickReport, synthetic_backlog,
};
use vlist_core::config::apply_env_with;
use vlist_core::{ConfigError, VirtualListConfig, VisibleWindow};
use web_time::Instant;

use crate::cli::Opts;

/// Simulated time per replayed event.
pub const TICK: Duration = Duration::from_millis(100);

/// History page latency.
pub const PAGE_DELAY: Duration = Duration::from_millis(300);

/// Messages per history page.
pub const PAGE_SIZE: usize = 20;

/// Messages shown before any paging.
pub const INITIAL_MESSAGES: usize = 30;

/// Upper bound on replayed events.
pub const MAX_STEPS: usize = 10_000;

/// Spacing between synthetic messages.
const MESSAGE_SPACING_SECS: u64 = 17 * 60;

/// Wall clock of the newest synthetic message (2024-06-15T12:00:00Z).
const NEWEST_UNIX: u64 = 1_718_452_800;

/// One replayed event.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub step: usize,
    pub elapsed_ms: u128,
    pub offset: f64,
    pub window: VisibleWindow,
    pub rows: usize,
    pub messages: usize,
    pub fired: bool,
    pub loading: bool,
    pub report: TickReport,
    /// First rendered row, if any.
    pub top_row: Option<String>,
}

impl Frame {
    /// One-line rendering for the terminal.
    #[must_use]
    pub fn to_line(&self) -> String {
        let mut flags = String::new();
        if self.fired {
            flags.push_str(" fired");
        }
        if self.report.prepended > 0 {
            flags.push_str(&format!(" +{}", self.report.prepended));
        }
        if self.report.replies > 0 {
            flags.push_str(" reply");
        }
        if self.report.failed {
            flags.push_str(" failed");
        }
        if self.report.exhausted {
            flags.push_str(" exhausted");
        }
        if self.loading {
            flags.push_str(" loading");
        }
        format!(
            "{:>4} t={:>6}ms off={:>9.1} rows={}..{}/{} msgs={}{} | {}",
            self.step,
            self.elapsed_ms,
            self.offset,
            self.window.start,
            self.window.end,
            self.rows,
            self.messages,
            flags,
            self.top_row.as_deref().unwrap_or("")
        )
    }
}

/// Outcome of a full replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub messages: usize,
    pub pages: usize,
    pub reached_top: bool,
}

/// List geometry from defaults, `VLIST_*` (read through `get_env`) and then
/// the demo options.
pub fn list_config<F>(opts: &Opts, get_env: F) -> (VirtualListConfig, Vec<ConfigError>)
where
    F: FnMut(&str) -> Option<String>,
{
    let parsed = apply_env_with(ChatPanelConfig::default().list, get_env);
    let mut config = parsed.config;
    if let Some(h) = opts.item_height {
        config = config.with_item_height(h);
    }
    if let Some(n) = opts.overscan {
        config = config.with_overscan(n);
    }
    (config, parsed.errors)
}

/// Panel over `opts.messages` synthetic messages, attached and measured.
pub fn build_panel(opts: &Opts, list: VirtualListConfig, t0: Instant) -> ChatPanel {
    let all = synthetic_backlog(opts.messages, NEWEST_UNIX, MESSAGE_SPACING_SECS);
    let split = all.len().saturating_sub(INITIAL_MESSAGES);
    let (older, newest) = all.split_at(split);
    let history = MockHistory::new(older.to_vec(), PAGE_SIZE).with_delay(PAGE_DELAY);
    let config = ChatPanelConfig {
        list,
        width: opts.width,
        ..ChatPanelConfig::default()
    };
    let mut panel = ChatPanel::new(config, history, ChatClock::new(t0, NEWEST_UNIX))
        .with_messages(newest.to_vec());
    panel.attach_manual();
    panel.on_resize(opts.height);
    panel
}

/// Replay the scroll, writing one line per frame to `out`.
pub fn run<W: Write>(
    opts: &Opts,
    list: VirtualListConfig,
    out: &mut W,
) -> io::Result<ReplaySummary> {
    let t0 = Instant::now();
    let distance = list.threshold_distance();
    let mut panel = build_panel(opts, list, t0);
    let mut now = t0;
    let mut pages = 0;
    let mut steps = 0;

    if !panel.messages().is_empty() {
        let _ = panel.send("Where did we leave off?", now);
    }

    while steps < MAX_STEPS {
        let finished = panel.history().is_exhausted() && !panel.is_loading();
        let at_top = panel.scroll_offset() <= 0.0;
        if at_top && finished {
            break;
        }
        steps += 1;
        if at_top && !panel.is_loading() {
            // Stalled at the top after a small page or a failure: step out
            // of the load band so the next event crosses it again.
            panel.on_scroll(distance);
        }

        let target = (panel.scroll_offset() - opts.step).max(0.0);
        let outcome = panel.on_scroll(target);
        now += TICK;
        let report = panel.tick(now);
        if report.prepended > 0 {
            pages += 1;
        }

        let fired = outcome.load.request().is_some();
        let frame = capture(&panel, steps, now.duration_since(t0), fired, report);
        writeln!(out, "{}", frame.to_line())?;
    }

    let summary = ReplaySummary {
        steps,
        messages: panel.messages().len(),
        pages,
        reached_top: panel.scroll_offset() <= 0.0 && panel.history().is_exhausted(),
    };
    tracing::info!(
        steps = summary.steps,
        messages = summary.messages,
        pages = summary.pages,
        reached_top = summary.reached_top,
        "replay finished"
    );
    Ok(summary)
}

fn capture(
    panel: &ChatPanel,
    step: usize,
    elapsed: Duration,
    fired: bool,
    report: TickReport,
) -> Frame {
    let (window, top_row, loading) = match panel.view() {
        PanelView::Empty(text) => (VisibleWindow::EMPTY, Some(text.to_string()), false),
        PanelView::Rows { slice, loading } => {
            let window = slice.window();
            (window, slice.output.into_iter().next(), loading)
        }
    };
    Frame {
        step,
        elapsed_ms: elapsed.as_millis(),
        offset: panel.scroll_offset(),
        window,
        rows: panel.rows().len(),
        messages: panel.messages().len(),
        fired,
        loading,
        report,
        top_row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlist_core::LoadEdge;

    fn opts(messages: usize) -> Opts {
        Opts {
            messages,
            item_height: Some(100.0),
            overscan: Some(5),
            ..Opts::default()
        }
    }

    #[test]
    fn replay_reaches_top_and_loads_everything() {
        let opts = opts(150);
        let (list, _) = list_config(&opts, |_| None);
        let mut out = Vec::new();
        let summary = run(&opts, list, &mut out).expect("replay");
        assert!(summary.reached_top);
        // The sent message and its reply come on top of the synthetic ones.
        assert_eq!(summary.messages, 152);
        assert_eq!(summary.pages, 6);
        assert!(summary.steps < MAX_STEPS);

        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.lines().count(), summary.steps);
        assert!(text.contains(" fired"));
        assert!(text.contains(" exhausted"));
    }

    #[test]
    fn empty_conversation_finishes_immediately() {
        let opts = opts(0);
        let (list, _) = list_config(&opts, |_| None);
        let mut out = Vec::new();
        let summary = run(&opts, list, &mut out).expect("replay");
        assert_eq!(summary.messages, 0);
        assert_eq!(summary.steps, 0);
        assert!(summary.reached_top);
        assert!(out.is_empty());
    }

    #[test]
    fn list_config_layers_env_under_options() {
        let env = |key: &str| match key {
            "VLIST_LOAD_EDGE" => Some("bottom".to_string()),
            "VLIST_ITEM_HEIGHT" => Some("40".to_string()),
            "VLIST_OVERSCAN" => Some("lots".to_string()),
            _ => None,
        };
        let (list, errors) = list_config(&opts(10), env);
        assert_eq!(list.load_edge, LoadEdge::Bottom);
        // Options win over the environment.
        assert_eq!(list.item_height, 100.0);
        assert_eq!(list.overscan, 5);
        assert_eq!(errors.len(), 1);

        let (defaults, errors) = list_config(&Opts::default(), |_| None);
        assert_eq!(defaults, ChatPanelConfig::default().list);
        assert!(errors.is_empty());
    }

    #[test]
    fn frame_line_lists_flags() {
        let frame = Frame {
            step: 3,
            elapsed_ms: 300,
            offset: 120.0,
            window: VisibleWindow::new(0, 12),
            rows: 40,
            messages: 38,
            fired: true,
            loading: true,
            report: TickReport {
                prepended: 20,
                ..TickReport::default()
            },
            top_row: Some("── 2024-06-15 ──".into()),
        };
        let line = frame.to_line();
        assert!(line.contains("rows=0..12/40"));
        assert!(line.contains(" fired +20 loading"));
        assert!(line.ends_with("| ── 2024-06-15 ──"));
    }
}
