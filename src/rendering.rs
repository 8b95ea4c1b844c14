use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
};

use crate::constants::*;
use crate::entities::{Asteroid, Bullet, Ship, Ufo};
use crate::game::{GamePhase, GameState};
use crate::types::Vector2D;

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer.get(y as usize).map(|row| row.iter().collect()).unwrap_or_default()
    }

    pub fn contains(&self, text: &str) -> bool {
        (0..self.height).any(|y| self.row(y).contains(text))
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            },
        }
    }

    /// Debug runs dump the finished frame into the log.
    pub fn log_frame(&self) {
        if let OutputTarget::ScreenBuffer(sb) = self {
            sb.print_to_log();
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            },
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

// --- GameGrid: the frame being composed, one char per terminal cell ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if width != self.width || height != self.height {
            *self = GameGrid::new(width, height);
        }
    }

    pub fn set_char(&mut self, x: i32, y: i32, c: char) {
        if x >= 0 && y >= 0 && (x as u16) < self.width && (y as u16) < self.height {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn get_char(&self, x: u16, y: u16) -> Option<char> {
        self.grid.get(y as usize)?.get(x as usize).copied()
    }

    pub fn put_str(&mut self, x: i32, y: i32, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.set_char(x + i as i32, y, c);
        }
    }

    /// Writes `text` horizontally centred on row `y`.
    pub fn put_centered(&mut self, y: i32, text: &str) {
        let x = self.width as i32 / 2 - text.chars().count() as i32 / 2;
        self.put_str(x, y, text);
    }

    /// Bresenham line between two cells.
    pub fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), c: char) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let step_x = if x < to.0 { 1 } else { -1 };
        let step_y = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_char(x, y, c);
            if x == to.0 && y == to.1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += step_x;
            }
            if e2 <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.grid.get(y as usize).map(|row| row.iter().collect()).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        for row in self.grid.iter_mut() {
            row.fill(' ');
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.row(y))?;
        }
        stdout.flush()
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(self.width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        stdout.flush()
    }
}

// --- World to terminal mapping ---
pub fn to_cell(point: Vector2D) -> (i32, i32) {
    (
        (point.x / CELL_WIDTH).floor() as i32,
        (point.y / CELL_HEIGHT).floor() as i32,
    )
}

/// Character that best follows a segment's slope on screen.
pub fn line_glyph(from: Vector2D, to: Vector2D) -> char {
    let dx = (to.x - from.x) / CELL_WIDTH;
    let dy = (to.y - from.y) / CELL_HEIGHT;
    if dy.abs() < dx.abs() * 0.5 {
        '-'
    } else if dx.abs() < dy.abs() * 0.5 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

fn draw_segment(grid: &mut GameGrid, from: Vector2D, to: Vector2D) {
    grid.draw_line(to_cell(from), to_cell(to), line_glyph(from, to));
}

fn draw_closed(grid: &mut GameGrid, points: &[Vector2D]) {
    for (i, &from) in points.iter().enumerate() {
        let to = points[(i + 1) % points.len()];
        draw_segment(grid, from, to);
    }
}

pub fn draw_ship(grid: &mut GameGrid, ship: &Ship) {
    if !ship.is_alive {
        return;
    }
    if ship.is_invulnerable() && (ship.invulnerable_time * INVULNERABLE_BLINK_RATE) as i64 % 2 == 0 {
        return;
    }

    draw_closed(grid, &ship.hull());
    if let Some([left, tip, right]) = ship.flame() {
        draw_segment(grid, left, tip);
        draw_segment(grid, tip, right);
    }
    let (nose_x, nose_y) = to_cell(ship.hull()[0]);
    grid.set_char(nose_x, nose_y, 'A');
}

pub fn draw_asteroid(grid: &mut GameGrid, asteroid: &Asteroid) {
    if !asteroid.is_active {
        return;
    }
    draw_closed(grid, &asteroid.outline());
}

pub fn draw_bullet(grid: &mut GameGrid, bullet: &Bullet) {
    if !bullet.is_active {
        return;
    }
    let (x, y) = to_cell(bullet.position);
    grid.set_char(x, y, if bullet.from_player { '*' } else { 'o' });
}

pub fn draw_ufo(grid: &mut GameGrid, ufo: &Ufo) {
    if !ufo.is_active {
        return;
    }
    for (from, to) in ufo.segments() {
        draw_segment(grid, from, to);
    }
}

fn draw_hud(grid: &mut GameGrid, state: &GameState) {
    let lives = "A ".repeat(state.ship.lives as usize);
    let hud = format!(
        "Score: {}  High: {}  Level: {}  Lives: {}",
        state.score, state.high_score, state.level, lives.trim_end()
    );
    grid.put_str(1, 0, &hud);
}

fn draw_menu(grid: &mut GameGrid) {
    let title_art = [
        r"    _   ___ _____ ___ ___  ___ ___ ___  ___ ",
        r"   /_\ / __|_   _| __| _ \/ _ \_ _|   \/ __|",
        r"  / _ \\__ \ | | | _||   / (_) | || |) \__ \",
        r" /_/ \_\___/ |_| |___|_|_\\___/___|___/|___/",
    ];
    let top = grid.height as i32 / 2 - 6;
    for (i, line) in title_art.iter().enumerate() {
        grid.put_centered(top + i as i32, line);
    }

    let middle = grid.height as i32 / 2;
    grid.put_centered(middle, "Press SPACE to Start");
    grid.put_centered(middle + 2, "Arrows/WASD: fly   Space: fire   H: hyperspace");
    grid.put_centered(middle + 3, "P/Esc: pause   Q: quit");
}

fn draw_game_over(grid: &mut GameGrid, state: &GameState) {
    let middle = grid.height as i32 / 2;
    grid.put_centered(middle - 3, "GAME OVER");
    grid.put_centered(middle - 1, &format!("Final Score: {}", state.score));
    if state.showing_high_score {
        grid.put_centered(middle + 1, "NEW HIGH SCORE!");
    }
    grid.put_centered(middle + 3, "Press SPACE to Play Again");
}

/// Composes one frame from a read-only view of the game.
pub fn draw_game(grid: &mut GameGrid, state: &GameState) {
    grid.clear();
    match state.phase {
        GamePhase::Menu => draw_menu(grid),
        GamePhase::Playing | GamePhase::Paused => {
            for asteroid in state.asteroids.active() {
                draw_asteroid(grid, asteroid);
            }
            for ufo in state.ufos.active() {
                draw_ufo(grid, ufo);
            }
            for bullet in state.bullets.active() {
                draw_bullet(grid, bullet);
            }
            draw_ship(grid, &state.ship);
            draw_hud(grid, state);
            if state.phase == GamePhase::Paused {
                grid.put_centered(grid.height as i32 / 2, "PAUSED");
            }
        }
        GamePhase::GameOver => draw_game_over(grid, state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AsteroidSize;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn state() -> GameState {
        GameState::new(80.0 * CELL_WIDTH, 24.0 * CELL_HEIGHT, Box::new(StdRng::seed_from_u64(3))).unwrap()
    }

    fn grid_text(grid: &GameGrid) -> String {
        (0..grid.height).map(|y| grid.row(y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut grid = GameGrid::new(10, 10);
        grid.draw_line((1, 1), (6, 4), '#');
        assert_eq!(grid.get_char(1, 1), Some('#'));
        assert_eq!(grid.get_char(6, 4), Some('#'));
    }

    #[test]
    fn off_grid_writes_are_clipped() {
        let mut grid = GameGrid::new(4, 4);
        grid.draw_line((-5, -5), (10, 10), '#');
        grid.put_str(2, 3, "long text");
        assert_eq!(grid.get_char(0, 0), Some('#'));
        assert_eq!(grid.row(3), "  lo");
    }

    #[test]
    fn glyphs_follow_slope() {
        let origin = Vector2D::ZERO;
        assert_eq!(line_glyph(origin, Vector2D::new(80.0, 0.0)), '-');
        assert_eq!(line_glyph(origin, Vector2D::new(0.0, 80.0)), '|');
        assert_eq!(line_glyph(origin, Vector2D::new(80.0, 160.0)), '\\');
        assert_eq!(line_glyph(origin, Vector2D::new(80.0, -160.0)), '/');
    }

    #[test]
    fn menu_shows_start_prompt() {
        let mut grid = GameGrid::new(80, 24);
        draw_game(&mut grid, &state());
        assert!(grid_text(&grid).contains("Press SPACE to Start"));
    }

    #[test]
    fn playing_frame_has_hud_and_rocks() {
        let mut game = state();
        game.start_new_game();
        let mut grid = GameGrid::new(80, 24);
        draw_game(&mut grid, &game);
        let text = grid_text(&grid);
        assert!(grid.row(0).contains("Score: 0"));
        assert!(grid.row(0).contains("Lives: A A A"));
        assert!(text.chars().any(|c| matches!(c, '-' | '|' | '/' | '\\')));
    }

    #[test]
    fn paused_banner_and_game_over_flag() {
        let mut game = state();
        game.start_new_game();
        game.pause();
        let mut grid = GameGrid::new(80, 24);
        draw_game(&mut grid, &game);
        assert!(grid_text(&grid).contains("PAUSED"));

        game.game_over();
        game.showing_high_score = true;
        draw_game(&mut grid, &game);
        let text = grid_text(&grid);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("NEW HIGH SCORE!"));
    }

    #[test]
    fn inactive_entities_draw_nothing() {
        let mut grid = GameGrid::new(20, 20);
        let mut rng = StdRng::seed_from_u64(1);
        let mut rock = Asteroid::new(Vector2D::new(80.0, 160.0), AsteroidSize::Large, &mut rng);
        rock.destroy();
        draw_asteroid(&mut grid, &rock);
        draw_bullet(&mut grid, &Bullet::default());
        draw_ufo(&mut grid, &Ufo::default());
        let mut ship = Ship::new(Vector2D::new(80.0, 160.0));
        ship.is_alive = false;
        draw_ship(&mut grid, &ship);
        assert!(grid_text(&grid).chars().all(|c| c == ' ' || c == '\n'));
    }

    #[test]
    fn grid_renders_into_screen_buffer() {
        let mut grid = GameGrid::new(12, 3);
        grid.put_str(0, 1, "hello");
        let mut target = OutputTarget::ScreenBuffer(ScreenBuffer::new(12, 3));
        grid.render(&mut target).unwrap();
        match target {
            OutputTarget::ScreenBuffer(sb) => assert!(sb.row(1).starts_with("hello")),
            OutputTarget::Stdout(_) => unreachable!(),
        }
    }
}
