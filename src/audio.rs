use std::io::{self, Write};

use log::{debug, info, warn};

/// One-shot triggers emitted by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    Shoot,
    Explosion,
    Hyperspace,
    UfoSpawn,
}

/// Looping sounds that are switched on and off rather than fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loop {
    Thrust,
    UfoHum,
}

/// Output device behind the [`AudioContext`].
pub trait AudioBackend {
    fn play(&mut self, event: SoundEvent);
    fn start_loop(&mut self, sound: Loop);
    fn stop_loop(&mut self, sound: Loop);
}

/// Owns the loop state so repeated on/off requests reach the backend only once.
pub struct AudioContext<B: AudioBackend> {
    backend: B,
    thrust_playing: bool,
    ufo_playing: bool,
}

impl<B: AudioBackend> AudioContext<B> {
    pub fn new(backend: B) -> Self {
        AudioContext {
            backend,
            thrust_playing: false,
            ufo_playing: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn play(&mut self, event: SoundEvent) {
        if event == SoundEvent::UfoSpawn {
            self.ufo_on();
        }
        self.backend.play(event);
    }

    pub fn thrust_on(&mut self) {
        if !self.thrust_playing {
            self.backend.start_loop(Loop::Thrust);
            self.thrust_playing = true;
        }
    }

    pub fn thrust_off(&mut self) {
        if self.thrust_playing {
            self.backend.stop_loop(Loop::Thrust);
            self.thrust_playing = false;
        }
    }

    pub fn ufo_on(&mut self) {
        if !self.ufo_playing {
            self.backend.start_loop(Loop::UfoHum);
            self.ufo_playing = true;
        }
    }

    pub fn ufo_off(&mut self) {
        if self.ufo_playing {
            self.backend.stop_loop(Loop::UfoHum);
            self.ufo_playing = false;
        }
    }

    pub fn set_thrust(&mut self, on: bool) {
        if on { self.thrust_on() } else { self.thrust_off() }
    }

    pub fn set_ufo(&mut self, on: bool) {
        if on { self.ufo_on() } else { self.ufo_off() }
    }

    pub fn silence(&mut self) {
        self.thrust_off();
        self.ufo_off();
    }
}

/// Terminal backend: explosions ring the bell, everything else is only logged.
pub struct TerminalBell {
    enabled: bool,
}

impl TerminalBell {
    pub fn new(enabled: bool) -> Self {
        TerminalBell { enabled }
    }
}

impl AudioBackend for TerminalBell {
    fn play(&mut self, event: SoundEvent) {
        debug!("Sound: {:?}", event);
        if self.enabled && event == SoundEvent::Explosion {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
                warn!("Failed to ring terminal bell: {}", e);
            }
        }
    }

    fn start_loop(&mut self, sound: Loop) {
        info!("Loop started: {:?}", sound);
    }

    fn stop_loop(&mut self, sound: Loop) {
        info!("Loop stopped: {:?}", sound);
    }
}

/// Records every backend call in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<String>,
}

impl AudioBackend for RecordingBackend {
    fn play(&mut self, event: SoundEvent) {
        self.calls.push(format!("play {:?}", event));
    }

    fn start_loop(&mut self, sound: Loop) {
        self.calls.push(format!("start {:?}", sound));
    }

    fn stop_loop(&mut self, sound: Loop) {
        self.calls.push(format!("stop {:?}", sound));
    }
}
