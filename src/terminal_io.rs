use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement};
use log::{error, info, warn};

use crate::game::Controls;

/// Somewhere frame input comes from: the real terminal or a scripted track.
pub trait EventSource {
    /// Every event that is ready for `frame`, without blocking.
    fn poll_events(&mut self, frame: u64) -> io::Result<Vec<Event>>;
}

// --- Live terminal events ---
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll_events(&mut self, _frame: u64) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
        }
        Ok(events)
    }
}

// --- Terminal session: raw mode for the lifetime of the value ---
pub struct TerminalSession {
    enhanced_keys: bool,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, Hide) {
            error!("Failed to hide cursor: {}", e);
            let _ = disable_raw_mode();
            return Err(e);
        }
        // Release events make held keys precise; without them the hold window takes over.
        let enhanced_keys = match supports_keyboard_enhancement() {
            Ok(true) => execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .map(|_| true)
            .unwrap_or_else(|e| {
                warn!("Keyboard enhancement unavailable: {}", e);
                false
            }),
            _ => false,
        };
        info!("Raw mode enabled (key release events: {}).", enhanced_keys);
        Ok(TerminalSession { enhanced_keys })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.enhanced_keys {
            if let Err(e) = execute!(stdout, PopKeyboardEnhancementFlags) {
                error!("Failed to restore keyboard flags on exit: {}", e);
            }
        }
        if let Err(e) = execute!(stdout, Show) {
            error!("Failed to show cursor on exit: {}", e);
        }
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode on exit: {}", e);
        }
        info!("Terminal restored.");
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    /// Start a game, fly around a little, shoot, jump, pause and resume.
    pub fn demo_track() -> Self {
        let press = |code: KeyCode| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        let mut events: HashMap<u64, Vec<Event>> = HashMap::new();
        events.insert(1, vec![press(KeyCode::Char(' '))]);
        for frame in 5..40 {
            events.entry(frame).or_default().push(press(KeyCode::Up));
        }
        for frame in 10..20 {
            events.entry(frame).or_default().push(press(KeyCode::Right));
        }
        for frame in (20..120).step_by(15) {
            events.entry(frame).or_default().push(press(KeyCode::Char(' ')));
        }
        events.entry(60).or_default().push(press(KeyCode::Char('h')));
        events.entry(90).or_default().push(press(KeyCode::Char('p')));
        events.entry(100).or_default().push(press(KeyCode::Char('p')));
        SimulatedInput::new(events)
    }
}

impl EventSource for SimulatedInput {
    fn poll_events(&mut self, frame: u64) -> io::Result<Vec<Event>> {
        Ok(self.events.remove(&frame).unwrap_or_default())
    }
}

// --- InputAdapter: device events to per-frame Controls ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Action {
    Thrust,
    RotateLeft,
    RotateRight,
    Fire,
    Hyperspace,
    Pause,
    Quit,
}

fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    match key.code {
        KeyCode::Up => Some(Action::Thrust),
        KeyCode::Left => Some(Action::RotateLeft),
        KeyCode::Right => Some(Action::RotateRight),
        KeyCode::Esc => Some(Action::Pause),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Some(Action::Thrust),
            'a' => Some(Action::RotateLeft),
            'd' => Some(Action::RotateRight),
            ' ' => Some(Action::Fire),
            'h' => Some(Action::Hyperspace),
            'p' => Some(Action::Pause),
            'q' => Some(Action::Quit),
            _ => None,
        },
        _ => None,
    }
}

pub struct InputAdapter {
    held: HashMap<Action, Instant>,
    pressed: Vec<Action>,
    hold_window: Duration,
    quit: bool,
    resized: Option<(u16, u16)>,
}

impl InputAdapter {
    pub fn new(hold_window: Duration) -> Self {
        InputAdapter {
            held: HashMap::new(),
            pressed: Vec::new(),
            hold_window,
            quit: false,
            resized: None,
        }
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Key(key) => {
                let Some(action) = action_for(key) else {
                    return;
                };
                match key.kind {
                    KeyEventKind::Press => {
                        self.held.insert(action, now);
                        self.pressed.push(action);
                        if action == Action::Quit {
                            info!("Quit requested.");
                            self.quit = true;
                        }
                    }
                    KeyEventKind::Repeat => {
                        self.held.insert(action, now);
                    }
                    KeyEventKind::Release => {
                        self.held.remove(&action);
                    }
                }
            }
            Event::Resize(width, height) => {
                info!("Terminal resized to {}x{}", width, height);
                self.resized = Some((*width, *height));
            }
            _ => {}
        }
    }

    fn is_held(&self, action: Action) -> bool {
        self.held.contains_key(&action)
    }

    /// Builds this frame's controls. Continuous intents start from neutral and are
    /// re-derived from the held-key table; edge-triggered presses are consumed.
    pub fn take_controls(&mut self, now: Instant) -> Controls {
        let window = self.hold_window;
        self.held.retain(|_, last_seen| now.saturating_duration_since(*last_seen) <= window);

        let mut rotation = 0.0;
        if self.is_held(Action::RotateLeft) {
            rotation = -1.0;
        }
        if self.is_held(Action::RotateRight) {
            rotation = 1.0;
        }
        let mut controls = Controls {
            thrust: self.is_held(Action::Thrust),
            rotation,
            ..Controls::default()
        };
        for action in self.pressed.drain(..) {
            match action {
                Action::Fire => {
                    controls.fire = true;
                    controls.confirm = true;
                }
                Action::Hyperspace => controls.hyperspace = true,
                Action::Pause => controls.pause = true,
                _ => {}
            }
        }
        controls
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn take_resize(&mut self) -> Option<(u16, u16)> {
        self.resized.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn adapter() -> InputAdapter {
        InputAdapter::new(Duration::from_millis(100))
    }

    #[test]
    fn held_thrust_expires_without_repeats() {
        let mut input = adapter();
        let start = Instant::now();
        input.handle_event(&key(KeyCode::Up, KeyEventKind::Press), start);
        assert!(input.take_controls(start).thrust);
        assert!(input.take_controls(start + Duration::from_millis(50)).thrust);
        assert!(!input.take_controls(start + Duration::from_millis(200)).thrust);
    }

    #[test]
    fn default_window_bridges_the_initial_repeat_delay() {
        let mut input = InputAdapter::new(Duration::from_millis(crate::constants::KEY_HOLD_WINDOW_MS));
        let start = Instant::now();
        input.handle_event(&key(KeyCode::Left, KeyEventKind::Press), start);
        for ms in (0..=500).step_by(16) {
            assert_eq!(input.take_controls(start + Duration::from_millis(ms)).rotation, -1.0);
        }
        let first_repeat = start + Duration::from_millis(520);
        input.handle_event(&key(KeyCode::Left, KeyEventKind::Repeat), first_repeat);
        assert_eq!(input.take_controls(first_repeat + Duration::from_millis(16)).rotation, -1.0);
    }

    #[test]
    fn release_clears_held_key() {
        let mut input = adapter();
        let now = Instant::now();
        input.handle_event(&key(KeyCode::Char('a'), KeyEventKind::Press), now);
        assert_eq!(input.take_controls(now).rotation, -1.0);
        input.handle_event(&key(KeyCode::Char('a'), KeyEventKind::Release), now);
        assert_eq!(input.take_controls(now).rotation, 0.0);
    }

    #[test]
    fn right_wins_when_both_rotations_held() {
        let mut input = adapter();
        let now = Instant::now();
        input.handle_event(&key(KeyCode::Left, KeyEventKind::Press), now);
        input.handle_event(&key(KeyCode::Right, KeyEventKind::Press), now);
        assert_eq!(input.take_controls(now).rotation, 1.0);
    }

    #[test]
    fn fire_is_edge_triggered() {
        let mut input = adapter();
        let now = Instant::now();
        input.handle_event(&key(KeyCode::Char(' '), KeyEventKind::Press), now);
        let first = input.take_controls(now);
        assert!(first.fire && first.confirm);
        input.handle_event(&key(KeyCode::Char(' '), KeyEventKind::Repeat), now);
        assert!(!input.take_controls(now).fire);
    }

    #[test]
    fn pause_hyperspace_and_quit_keys() {
        let mut input = adapter();
        let now = Instant::now();
        input.handle_event(&key(KeyCode::Esc, KeyEventKind::Press), now);
        input.handle_event(&key(KeyCode::Char('H'), KeyEventKind::Press), now);
        let controls = input.take_controls(now);
        assert!(controls.pause && controls.hyperspace);
        assert!(!input.quit_requested());
        input.handle_event(
            &Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            now,
        );
        assert!(input.quit_requested());
    }

    #[test]
    fn resize_is_reported_once() {
        let mut input = adapter();
        input.handle_event(&Event::Resize(100, 40), Instant::now());
        assert_eq!(input.take_resize(), Some((100, 40)));
        assert_eq!(input.take_resize(), None);
    }

    #[test]
    fn scripted_track_hands_out_each_frame_once() {
        let mut track = SimulatedInput::demo_track();
        assert_eq!(track.poll_events(1).unwrap().len(), 1);
        assert!(track.poll_events(1).unwrap().is_empty());
        assert!(track.poll_events(3).unwrap().is_empty());
    }
}
