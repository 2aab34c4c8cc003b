//! Replay command: drives the scheduler with scripted input.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tl_core::load_trace;
use tl_render::{
    FlameChartPane, FrameClock, FrameHandle, FrameReport, InputEvent, RecordingSurface,
    Scheduler,
};
use tokio::time::MissedTickBehavior;

use crate::Config;

/// Frame clock fed by a tokio interval. A requested frame fires on the next
/// tick; the scheduler keeps at most one frame outstanding.
#[derive(Debug, Default)]
struct IntervalClock {
    next: u64,
    pending: Option<FrameHandle>,
}

impl IntervalClock {
    fn take(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameClock for IntervalClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle::new(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Reads a JSON array of input events.
pub fn load_script(path: &Path) -> Result<Vec<InputEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid replay script {}", path.display()))
}

pub fn run<W: Write>(writer: &mut W, trace: &Path, script: &Path, config: &Config) -> Result<()> {
    let roots =
        load_trace(trace).with_context(|| format!("failed to load {}", trace.display()))?;
    let events = load_script(script)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start frame clock")?;
    runtime.block_on(async {
        let surface = RecordingSurface::new(config.width, config.height)
            .with_pixel_ratio(config.pixel_ratio);
        let options = config.scheduler_options();
        let pane_height = config.height - options.axis_height;
        let mut scheduler = Scheduler::new(surface, IntervalClock::default(), options);
        let pane = scheduler.add_pane(
            Box::new(FlameChartPane::new(config.flame_style())),
            pane_height,
        );
        scheduler.set_data(pane, &roots);

        let period =
            Duration::from_secs_f64(1.0 / f64::from(config.frame_rate)).max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events = events.into_iter();

        loop {
            ticker.tick().await;
            let due = scheduler.clock_mut().take();
            if let Some(report) = due.and_then(|handle| scheduler.on_frame(handle)) {
                write_report(writer, &report)?;
            }
            for event in scheduler.drain_events() {
                tracing::debug!(?event, "chart event");
            }
            match events.next() {
                Some(event) => scheduler.handle_input(event),
                None if scheduler.is_idle() => break,
                None => {}
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}

/// Writes one line per committed frame.
pub fn write_report<W: Write>(writer: &mut W, report: &FrameReport) -> Result<()> {
    writeln!(
        writer,
        "frame {} {} panes={} commands={} regions={}",
        report.frame,
        report.kind.as_str(),
        report.panes,
        report.commands,
        report.regions
    )?;
    Ok(())
}
