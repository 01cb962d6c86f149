//! Keyboard-steered simulated distance.
//!
//! A point is moved around a 2-D arena by direction commands; the reading is
//! its distance to the flower at the arena centre, scaled from pixels to
//! centimeters. Commands arrive on a channel so a stdin reader thread (or a
//! test) can drive the source without blocking the tick loop.
//!
//! Commands (one per line): `left`/`a`, `right`/`d`, `up`/`w`, `down`/`s`,
//! `stop`/`x`, `quit`/`q`.

use crate::source::types::{RangeSample, RangeSource, SourceError};
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::thread;

/// Heading of the steered point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit vector in screen coordinates (y grows downwards).
    fn unit(&self) -> (f64, f64) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
        }
    }
}

/// A steering command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCommand {
    /// Keep moving in this direction until told otherwise
    Go(Direction),
    Stop,
    Quit,
}

impl MoveCommand {
    /// Parse one input line. Unknown input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let command = match line.trim().to_lowercase().as_str() {
            "left" | "a" | "h" => MoveCommand::Go(Direction::Left),
            "right" | "d" | "l" => MoveCommand::Go(Direction::Right),
            "up" | "w" | "k" => MoveCommand::Go(Direction::Up),
            "down" | "s" | "j" => MoveCommand::Go(Direction::Down),
            "stop" | "x" | "" => MoveCommand::Stop,
            "quit" | "q" | "exit" => MoveCommand::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Arena geometry and motion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractiveConfig {
    /// Arena width and height in pixels
    pub arena: (f64, f64),
    /// Starting position of the point
    pub start: (f64, f64),
    /// Speed in pixels per second
    pub move_speed: f64,
    /// Centimeters per pixel; 0.4 maps 150 px onto a 60 cm far threshold
    pub cm_per_px: f64,
    /// Seconds of motion per sample
    pub step_secs: f64,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            arena: (800.0, 600.0),
            start: (100.0, 100.0),
            move_speed: 200.0,
            cm_per_px: 0.4,
            step_secs: 1.0 / 30.0,
        }
    }
}

impl InteractiveConfig {
    pub fn target(&self) -> (f64, f64) {
        (self.arena.0 / 2.0, self.arena.1 / 2.0)
    }
}

/// [`RangeSource`] fed by [`MoveCommand`]s.
pub struct InteractiveSource {
    config: InteractiveConfig,
    commands: Receiver<MoveCommand>,
    position: (f64, f64),
    heading: Option<Direction>,
    running: bool,
    quit: bool,
}

impl InteractiveSource {
    pub fn new(config: InteractiveConfig, commands: Receiver<MoveCommand>) -> Self {
        Self {
            position: config.start,
            config,
            commands,
            heading: None,
            running: false,
            quit: false,
        }
    }

    /// Source steered from standard input.
    pub fn from_stdin(config: InteractiveConfig) -> Self {
        Self::new(config, spawn_stdin_reader())
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Distance from the point to the target, in pixels.
    pub fn distance_px(&self) -> f64 {
        let (tx, ty) = self.config.target();
        (self.position.0 - tx).hypot(self.position.1 - ty)
    }

    fn drain_commands(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(MoveCommand::Go(direction)) => self.heading = Some(direction),
                Ok(MoveCommand::Stop) => self.heading = None,
                Ok(MoveCommand::Quit) | Err(TryRecvError::Disconnected) => {
                    self.quit = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
    }

    fn step(&mut self) {
        if let Some(direction) = self.heading {
            let (dx, dy) = direction.unit();
            let distance = self.config.move_speed * self.config.step_secs;
            let (w, h) = self.config.arena;
            self.position.0 = (self.position.0 + dx * distance).clamp(0.0, w);
            self.position.1 = (self.position.1 + dy * distance).clamp(0.0, h);
        }
    }
}

impl RangeSource for InteractiveSource {
    fn name(&self) -> &'static str {
        "interactive"
    }

    fn start(&mut self) -> Result<(), SourceError> {
        if self.running {
            return Err(SourceError::AlreadyRunning);
        }
        self.running = true;
        Ok(())
    }

    fn next_sample(&mut self) -> Result<RangeSample, SourceError> {
        if !self.running {
            return Err(SourceError::Offline);
        }
        self.drain_commands();
        if self.quit {
            return Err(SourceError::Offline);
        }
        self.step();
        Ok(Some(self.distance_px() * self.config.cm_per_px))
    }

    fn is_online(&self) -> bool {
        self.running && !self.quit
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

/// Read commands from stdin on a background thread.
///
/// The channel disconnects when stdin reaches EOF, which the source treats
/// as a quit.
pub fn spawn_stdin_reader() -> Receiver<MoveCommand> {
    let (sender, receiver) = bounded(64);
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match MoveCommand::parse(&line) {
                Some(command) => {
                    if sender.send(command).is_err() || command == MoveCommand::Quit {
                        break;
                    }
                }
                None => tracing::warn!("Unknown command: {}", line.trim()),
            }
        }
    });
    receiver
}
