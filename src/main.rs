use anyhow::Result;
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};
use the_way::{Action, Direction, Flow, Game, GameConfig, Levels, Mark};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const HUD_ROWS: usize = 2;
const INPUT_HOLD_MS: u64 = 160;

const INSTRUCTIONS: [&str; 10] = [
    "Collect all coins to find the exit!",
    "Avoid monsters.",
    "",
    "Use rams to break the wall:",
    "while moving press SPACE to break the wall.",
    "",
    "GOOD LUCK!",
    "",
    "",
    "Press F2 to start.",
];
const CONTROLS: &str = "Left: j  Right: l  Up: i  Down: k  Break wall: Space";

/// Collect every coin, find the door, avoid the monsters.
#[derive(Parser)]
#[command(name = "the-way", version)]
struct Cli {
    /// Number of levels to play
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    levels: u32,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: &'static str,
    color: Color,
}

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_banner: Option<String>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: "  ",
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            last_banner: None,
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

/// Turns key events into actions. Terminals that cannot report key releases
/// get one synthesised after the key has not been seen for a while.
struct KeyTracker {
    reports_release: bool,
    last_seen: [Option<Instant>; 4],
}

impl KeyTracker {
    fn new(reports_release: bool) -> Self {
        Self {
            reports_release,
            last_seen: [None; 4],
        }
    }

    fn translate(&mut self, key: KeyEvent, actions: &mut Vec<Action>) {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if let Some(dir) = dir_for_key(key.code) {
                    self.last_seen[dir.index()] = Some(Instant::now());
                    actions.push(Action::Press(dir));
                    return;
                }
                if key.kind == KeyEventKind::Repeat {
                    return;
                }
                match key.code {
                    KeyCode::Char(' ') => actions.push(Action::BreakWall),
                    KeyCode::F(2) => actions.push(Action::Restart),
                    KeyCode::F(3) => actions.push(Action::NextLevel),
                    KeyCode::Esc | KeyCode::Char('q') => actions.push(Action::Exit),
                    _ => {}
                }
            }
            KeyEventKind::Release => {
                if let Some(dir) = dir_for_key(key.code) {
                    self.last_seen[dir.index()] = None;
                    actions.push(Action::Release(dir));
                }
            }
        }
    }

    fn expire(&mut self, actions: &mut Vec<Action>) {
        if self.reports_release {
            return;
        }
        let hold = Duration::from_millis(INPUT_HOLD_MS);
        for dir in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            let idx = dir.index();
            if let Some(t) = self.last_seen[idx] {
                if t.elapsed() > hold {
                    self.last_seen[idx] = None;
                    actions.push(Action::Release(dir));
                }
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;
    let reports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if reports_release {
        stdout.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }

    let result = run(&mut stdout, cli.levels, reports_release);

    if reports_release {
        stdout.execute(PopKeyboardEnhancementFlags)?;
    }
    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout, levels: u32, reports_release: bool) -> Result<()> {
    let mut rng = rand::thread_rng();
    let (term_w, term_h) = terminal::size()?;
    let config = GameConfig::default().with_maze_size(
        term_w as usize / CELL_W,
        (term_h as usize).saturating_sub(HUD_ROWS),
    );
    let mut game = Game::new(Levels::new(levels), config, &mut rng)?;
    log::info!(
        "starting {} level(s) on a {}x{} maze",
        game.levels_total(),
        game.grid().width(),
        game.grid().height()
    );

    if !instructions_loop(stdout)? {
        return Ok(());
    }

    let mut renderer = Renderer::new(game.grid().width(), game.grid().height());
    let mut keys = KeyTracker::new(reports_release);
    let frame_time = Duration::from_micros(1_000_000 / game.config().tick_rate.max(1));
    let mut actions = Vec::new();

    loop {
        let frame_start = Instant::now();
        game.tick(&mut rng)?;
        render(stdout, &game, &mut renderer)?;

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => keys.translate(key, &mut actions),
                Event::Resize(_, _) => renderer.needs_full = true,
                _ => {}
            }
        }
        keys.expire(&mut actions);
        for action in actions.drain(..) {
            if game.apply(action, &mut rng)? == Flow::Exit {
                return Ok(());
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Shows how to play until F2 starts the game. Returns false on exit.
fn instructions_loop(stdout: &mut Stdout) -> io::Result<bool> {
    let (term_w, term_h) = terminal::size()?;
    stdout.queue(Clear(ClearType::All))?;
    let top = (term_h / 2).saturating_sub(INSTRUCTIONS.len() as u16 / 2);
    for (row, line) in INSTRUCTIONS.iter().enumerate() {
        print_centered(stdout, term_w, top + row as u16, line, Color::Blue)?;
    }
    print_centered(stdout, term_w, term_h.saturating_sub(1), CONTROLS, Color::Green)?;
    stdout.flush()?;

    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::F(2) => return Ok(true),
                KeyCode::Esc | KeyCode::Char('q') => return Ok(false),
                _ => {}
            }
        }
    }
}

fn render(stdout: &mut Stdout, game: &Game, renderer: &mut Renderer) -> io::Result<()> {
    let grid = game.grid();
    if renderer.last.len() != grid.width() * grid.height() {
        *renderer = Renderer::new(grid.width(), grid.height());
    }
    let needed_h = (grid.height() + HUD_ROWS) as u16;
    let needed_w = (grid.width() * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    if let Some((banner, color)) = banner_for(game) {
        if renderer.last_banner.as_deref() != Some(banner.as_str()) {
            stdout.queue(Clear(ClearType::All))?;
            print_centered(stdout, term_w, term_h / 2, &banner, color)?;
            let help = if game.is_level_passed() && !game.is_game_passed() {
                "Esc: exit  F3: next level"
            } else {
                "Esc: exit  F2: restart"
            };
            print_centered(stdout, term_w, term_h / 2 + 2, help, Color::Blue)?;
            print_centered(stdout, term_w, term_h / 2 + 3, &stats_line(game), Color::Red)?;
            stdout.flush()?;
            renderer.last_banner = Some(banner);
            renderer.needs_full = true;
        }
        return Ok(());
    }
    if renderer.last_banner.take().is_some() {
        stdout.queue(Clear(ClearType::All))?;
        renderer.needs_full = true;
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        stdout.queue(Clear(ClearType::All))?;
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = format!(
        "Level {}/{}  {}  (Esc: exit  F2: restart)",
        game.level().level,
        game.levels_total(),
        stats_line(game)
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y + grid.height() as u16))?;
        stdout.queue(SetForegroundColor(Color::Green))?;
        stdout.queue(Print(CONTROLS))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for (mark, pos) in grid.iter() {
        let cell = cell_for(mark);
        let idx = pos.y * grid.width() + pos.x;
        if renderer.needs_full || cell != renderer.last[idx] {
            renderer.last[idx] = cell;
            draw_cell(stdout, renderer, pos.x, pos.y, cell)?;
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn banner_for(game: &Game) -> Option<(String, Color)> {
    if game.is_game_over() {
        Some(("Game over...".to_string(), Color::Red))
    } else if game.is_game_passed() {
        Some(("Game passed. Congratulations!".to_string(), Color::Green))
    } else if game.is_level_passed() {
        Some((format!("Level {} passed!", game.level().level), Color::Green))
    } else {
        None
    }
}

fn stats_line(game: &Game) -> String {
    format!(
        "Rams left: {}  Coins collected: {}({})",
        game.robot().rams(),
        game.robot().coins,
        game.level().coins
    )
}

fn cell_for(mark: Mark) -> Cell {
    match mark {
        Mark::Wall => Cell {
            glyph: "██",
            color: Color::DarkRed,
        },
        Mark::Path | Mark::Unvisited => Cell {
            glyph: "  ",
            color: Color::Reset,
        },
        Mark::Coin => Cell {
            glyph: "● ",
            color: Color::Yellow,
        },
        Mark::Door => Cell {
            glyph: "🚪",
            color: Color::Green,
        },
        Mark::Monster => Cell {
            glyph: "👾",
            color: Color::Magenta,
        },
        Mark::Robot => Cell {
            glyph: "🤖",
            color: Color::Cyan,
        },
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(cell.glyph))?;
    let w = UnicodeWidthStr::width(cell.glyph);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn print_centered(stdout: &mut Stdout, term_w: u16, row: u16, text: &str, color: Color) -> io::Result<()> {
    let w = UnicodeWidthStr::width(text) as u16;
    stdout.queue(MoveTo(term_w.saturating_sub(w) / 2, row))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    stdout.queue(ResetColor)?;
    Ok(())
}

fn dir_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Char('j') | KeyCode::Left => Some(Direction::Left),
        KeyCode::Char('l') | KeyCode::Right => Some(Direction::Right),
        KeyCode::Char('i') | KeyCode::Up => Some(Direction::Up),
        KeyCode::Char('k') | KeyCode::Down => Some(Direction::Down),
        _ => None,
    }
}

