//! The tick loop and its lifecycle.
//!
//! An [`Agent`] owns a source, a renderer and the asset catalog. Running it
//! goes through init → configure → start → run → stop → teardown. The source
//! and renderer are held by guards while running, so they are released on
//! every exit path, including a failure while the other one is being opened.

use crate::catalog::AssetCatalog;
use crate::config::{Config, ConfigError};
use crate::core::{Pipeline, SelectError, TickReport};
use crate::render::{RenderError, Renderer};
use crate::session::SessionLog;
use crate::source::{RangeSource, SourceError};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Errors that end a run.
#[derive(Debug)]
pub enum AgentError {
    Config(ConfigError),
    Source(SourceError),
    Render(RenderError),
    Select(SelectError),
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentError::Config(e) => write!(f, "{e}"),
            AgentError::Source(e) => write!(f, "{e}"),
            AgentError::Render(e) => write!(f, "{e}"),
            AgentError::Select(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ConfigError> for AgentError {
    fn from(e: ConfigError) -> Self {
        AgentError::Config(e)
    }
}

impl From<SourceError> for AgentError {
    fn from(e: SourceError) -> Self {
        AgentError::Source(e)
    }
}

impl From<RenderError> for AgentError {
    fn from(e: RenderError) -> Self {
        AgentError::Render(e)
    }
}

impl From<SelectError> for AgentError {
    fn from(e: SelectError) -> Self {
        AgentError::Select(e)
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The external stop flag was raised
    Requested,
    /// The source went offline
    SourceOffline,
    /// The configured tick limit was reached
    TickLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Requested => write!(f, "stop requested"),
            StopReason::SourceOffline => write!(f, "source offline"),
            StopReason::TickLimit => write!(f, "tick limit reached"),
        }
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub reason: StopReason,
    pub session: SessionLog,
    pub last_report: Option<TickReport>,
}

/// Options for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Skip the pause between ticks
    pub fast: bool,
}

/// Started source, stopped again on drop.
struct RunningSource<'a, S: RangeSource + ?Sized>(&'a mut S);

impl<'a, S: RangeSource + ?Sized> RunningSource<'a, S> {
    fn start(source: &'a mut S) -> Result<Self, SourceError> {
        source.start()?;
        tracing::info!("Source '{}' started", source.name());
        Ok(Self(source))
    }
}

impl<S: RangeSource + ?Sized> Deref for RunningSource<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.0
    }
}

impl<S: RangeSource + ?Sized> DerefMut for RunningSource<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.0
    }
}

impl<S: RangeSource + ?Sized> Drop for RunningSource<'_, S> {
    fn drop(&mut self) {
        self.0.stop();
        tracing::info!("Source '{}' stopped", self.0.name());
    }
}

/// Opened renderer, closed again on drop.
struct OpenRenderer<'a, R: Renderer + ?Sized>(&'a mut R);

impl<'a, R: Renderer + ?Sized> OpenRenderer<'a, R> {
    fn open(renderer: &'a mut R) -> Result<Self, RenderError> {
        renderer.open()?;
        Ok(Self(renderer))
    }
}

impl<R: Renderer + ?Sized> Drop for OpenRenderer<'_, R> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Source, renderer and catalog wired to the pipeline.
pub struct Agent<S: RangeSource, R: Renderer> {
    config: Config,
    source: S,
    renderer: R,
    catalog: AssetCatalog,
}

impl<S: RangeSource, R: Renderer> Agent<S, R> {
    /// Validate the configuration and assemble an agent.
    pub fn new(
        config: Config,
        source: S,
        renderer: R,
        catalog: AssetCatalog,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(AgentError::Select(SelectError::EmptyCatalog));
        }
        Ok(Self {
            config,
            source,
            renderer,
            catalog,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run until `stop` is raised, the source goes offline, or the tick
    /// limit is reached.
    pub fn run(
        &mut self,
        stop: &AtomicBool,
        options: &RunOptions,
    ) -> Result<RunOutcome, AgentError> {
        let mut pipeline = Pipeline::new(&self.config.pipeline);
        let mut session = SessionLog::new(self.source.name());
        let dt = self.config.dt_secs;
        let pause = if options.fast {
            Duration::ZERO
        } else {
            self.config.tick_interval
        };

        tracing::info!(
            "Running with {} assets, selection by {}, dt={}s",
            self.catalog.len(),
            pipeline.selection_mode(),
            dt
        );

        let mut source = RunningSource::start(&mut self.source)?;
        let mut renderer = OpenRenderer::open(&mut self.renderer)?;
        let mut last_report = None;

        let reason = loop {
            if stop.load(Ordering::SeqCst) {
                break StopReason::Requested;
            }
            if !source.is_online() {
                break StopReason::SourceOffline;
            }
            if options.max_ticks.is_some_and(|max| pipeline.ticks() >= max) {
                break StopReason::TickLimit;
            }

            let sample = match source.next_sample() {
                Ok(sample) => sample,
                Err(SourceError::Offline) => break StopReason::SourceOffline,
                Err(e) if e.is_transient() => {
                    tracing::warn!("{e}");
                    session.record_read_failure();
                    None
                }
                Err(e) => return Err(e.into()),
            };

            let report = pipeline.tick(sample, dt, self.catalog.len())?;
            if let Some(asset) = self.catalog.get(report.asset_index) {
                renderer.0.render(asset);
            }
            tracing::info!("{report}");
            session.record(&report);
            last_report = Some(report);

            if !pause.is_zero() {
                thread::sleep(pause);
            }
        };

        tracing::info!("Loop finished: {reason}");
        drop(renderer);
        drop(source);

        Ok(RunOutcome {
            reason,
            session,
            last_report,
        })
    }
}
