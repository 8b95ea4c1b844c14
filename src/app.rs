use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use log::{debug, info};

use crate::audio::{AudioBackend, AudioContext};
use crate::config::world_size;
use crate::constants::{KEY_HOLD_WINDOW_MS, MAX_FRAME_TIME};
use crate::game::{GamePhase, GameState};
use crate::rendering::{GameGrid, OutputTarget, draw_game};
use crate::terminal_io::{EventSource, InputAdapter};

/// Frame driver: input, simulate, sound, render, strictly in that order.
pub struct App<S: EventSource, B: AudioBackend> {
    state: GameState,
    target: OutputTarget,
    events: S,
    input: InputAdapter,
    audio: AudioContext<B>,
    grid: GameGrid,
    frame_budget: Duration,
    max_frames: Option<u64>,
    headless: bool,
}

impl<S: EventSource, B: AudioBackend> App<S, B> {
    pub fn new(
        state: GameState,
        target: OutputTarget,
        events: S,
        audio: AudioContext<B>,
        (cols, rows): (u16, u16),
        frame_budget: Duration,
        max_frames: Option<u64>,
    ) -> Self {
        let headless = matches!(target, OutputTarget::ScreenBuffer(_));
        App {
            state,
            target,
            events,
            input: InputAdapter::new(Duration::from_millis(KEY_HOLD_WINDOW_MS)),
            audio,
            grid: GameGrid::new(cols, rows),
            frame_budget,
            max_frames,
            headless,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    pub fn audio(&self) -> &AudioContext<B> {
        &self.audio
    }

    /// Runs until quit or the frame limit. Returns the number of frames played.
    pub fn run(&mut self) -> io::Result<u64> {
        self.grid.clear_screen_manual(&mut self.target)?;

        let epoch = Instant::now();
        let mut last_frame = epoch;
        let mut frame: u64 = 0;

        while self.max_frames.is_none_or(|max| frame < max) {
            let frame_start = Instant::now();
            // Headless runs use a synthetic clock so scripted input replays the same way.
            let (now, dt) = if self.headless {
                (
                    epoch + self.frame_budget * frame as u32,
                    self.frame_budget.as_secs_f64().min(MAX_FRAME_TIME),
                )
            } else {
                let dt = frame_start.duration_since(last_frame).as_secs_f64();
                (frame_start, dt.min(MAX_FRAME_TIME))
            };
            last_frame = frame_start;

            self.step(frame, dt, now)?;
            frame += 1;

            if self.input.quit_requested() {
                break;
            }
            if !self.headless {
                let spent = frame_start.elapsed();
                if spent < self.frame_budget {
                    thread::sleep(self.frame_budget - spent);
                }
            }
        }

        self.audio.silence();
        info!(
            "Frame loop ended after {} frames (score {}, high score {}).",
            frame, self.state.score, self.state.high_score
        );
        Ok(frame)
    }

    /// One full frame.
    pub fn step(&mut self, frame: u64, dt: f64, now: Instant) -> io::Result<()> {
        for event in self.events.poll_events(frame)? {
            self.input.handle_event(&event, now);
        }

        if let Some((cols, rows)) = self.input.take_resize() {
            let (width, height) = world_size(cols, rows);
            self.state.set_bounds(width, height);
            self.grid.resize(cols, rows);
            self.grid.clear_screen_manual(&mut self.target)?;
        }

        let controls = self.input.take_controls(now);
        let phase_before = self.state.phase;
        self.state.apply_controls(&controls);
        self.state.simulate(dt);
        if self.state.phase != phase_before {
            debug!("Phase {:?} -> {:?} on frame {}", phase_before, self.state.phase, frame);
        }

        self.route_sounds();

        draw_game(&mut self.grid, &self.state);
        self.grid.render(&mut self.target)?;
        self.target.execute_move_to(MoveTo(0, 0))?;
        if self.headless {
            self.target.log_frame();
        }
        Ok(())
    }

    fn route_sounds(&mut self) {
        for event in self.state.drain_sounds() {
            self.audio.play(event);
        }
        let playing = self.state.phase == GamePhase::Playing;
        let ship = &self.state.ship;
        self.audio.set_thrust(playing && ship.is_alive && ship.is_thrusting);
        self.audio.set_ufo(playing && self.state.ufos.active_count() > 0);
    }
}
