use crate::{
    cli::ReplayArgs,
    host::SimulatedHost,
    session::{Session, Step},
};
use anyhow::Result;
use inscroll::{Coordinator, Effect, Options, Platform, RawEvent};
use std::{io::Write, time::Duration};
use tracing::info;

/// Counts from one replay run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub steps: usize,
    pub ticks: u64,
    pub effects: usize,
    /// Host time covered by the clock steps.
    pub elapsed: Duration,
}

pub fn handle(args: ReplayArgs) -> Result<()> {
    let options = Options::load_or_default(args.config.as_deref())?;
    let session = Session::load(&args.session)?;

    let stdout = std::io::stdout();
    let summary = replay(options, args.platform, &session, &mut stdout.lock())?;
    info!(
        steps = summary.steps,
        ticks = summary.ticks,
        effects = summary.effects,
        "Replay finished"
    );
    Ok(())
}

/// Runs every step of `session`, writing one line per effect to `out`.
pub fn replay(
    options: Options,
    platform: Option<Platform>,
    session: &Session,
    out: &mut impl Write,
) -> Result<Summary> {
    let platform = platform.or(options.platform).unwrap_or_default();
    let host = SimulatedHost::new(options.multiline_measure_style.as_ref());
    let mut coordinator = Coordinator::for_platform(options, platform);
    let tick_interval = coordinator.profile().tick_source().interval();
    let mut summary = Summary::default();
    let mut now = Duration::ZERO;

    info!(%platform, steps = session.steps.len(), "Replaying session");
    for (index, step) in session.steps.iter().enumerate() {
        let label = index + 1;
        summary.steps += 1;
        match step {
            Step::Raw(raw) => {
                let effects = coordinator.handle(raw.clone());
                summary.effects += run_effects(&mut coordinator, &host, label, effects, out)?;
            },
            Step::Clock(clock) => {
                for _ in 0..clock.frames() {
                    now += clock.step(tick_interval);
                    summary.ticks += 1;
                    let effects = coordinator.tick(now);
                    summary.effects +=
                        run_effects(&mut coordinator, &host, label, effects, out)?;
                }
            },
        }
    }
    summary.elapsed = now;
    Ok(summary)
}

/// Prints `effects` and feeds the host's replies back until it goes quiet.
fn run_effects(
    coordinator: &mut Coordinator,
    host: &SimulatedHost,
    label: usize,
    effects: Vec<Effect>,
    out: &mut impl Write,
) -> Result<usize> {
    let mut count = 0;
    let mut queue = effects;
    while !queue.is_empty() {
        let replies: Vec<RawEvent> = queue.iter().filter_map(|e| host.execute(e)).collect();
        for effect in &queue {
            writeln!(out, "[{label}] {effect:?}")?;
        }
        count += queue.len();
        queue = replies
            .into_iter()
            .flat_map(|reply| coordinator.handle(reply))
            .collect();
    }
    Ok(count)
}
