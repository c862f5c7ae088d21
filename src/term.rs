use std::io::{self, Stdout, Write, stdout};
use std::sync::Once;
use std::time::Duration;

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll, read};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use crate::error::{GameError, Result};

/// A key after platform decoding. Letters arrive lower-cased, arrow keys as
/// a single value regardless of how the terminal encoded them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Char(char),
    /// Ctrl+C. Raw mode turns it into an ordinary key press.
    Interrupt,
    /// The terminal was resized; everything on screen may be garbage.
    Resize,
    Other,
}

/// What the game needs from a terminal. Output is buffered until `flush`.
pub trait Terminal {
    fn set_cursor(&mut self, x: u16, y: u16) -> io::Result<()>;
    fn set_color(&mut self, color: Color) -> io::Result<()>;
    fn print(&mut self, text: &str) -> io::Result<()>;
    fn clear_screen(&mut self) -> io::Result<()>;
    fn hide_cursor(&mut self) -> io::Result<()>;
    fn show_cursor(&mut self) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;

    /// Never blocks. `None` when nothing is buffered.
    fn poll_key(&mut self) -> io::Result<Option<Key>>;
    fn read_key_blocking(&mut self) -> io::Result<Key>;

    fn print_at(&mut self, x: u16, y: u16, text: &str) -> io::Result<()> {
        self.set_cursor(x, y)?;
        self.print(text)
    }
}

/// The real terminal. Owning one means raw mode and the alternate screen
/// are active; dropping it puts the terminal back.
pub struct TermManager {
    stdout: Stdout,
    #[cfg(unix)]
    _signals: SignalGuard,
}

impl TermManager {
    pub fn new(min_width: u16, min_height: u16) -> Result<Self> {
        let (width, height) = terminal::size()?;
        if width < min_width || height < min_height {
            return Err(GameError::TerminalTooSmall {
                actual_width: width,
                actual_height: height,
                needed_width: min_width,
                needed_height: min_height,
            });
        }

        install_panic_hook();
        #[cfg(unix)]
        let signals = SignalGuard::new()?;

        terminal::enable_raw_mode()?;
        // From here on, Drop undoes whatever got enabled.
        let mut term = TermManager {
            stdout: stdout(),
            #[cfg(unix)]
            _signals: signals,
        };
        execute!(term.stdout, EnterAlternateScreen, cursor::Hide, cursor::DisableBlinking)?;
        term.clear_screen()?;
        tracing::info!(width, height, "terminal session started");

        Ok(term)
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        let _ = self.stdout.flush();
        restore_terminal();
        tracing::info!("terminal session restored");
    }
}

impl Terminal for TermManager {
    fn set_cursor(&mut self, x: u16, y: u16) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(x, y))
    }

    fn set_color(&mut self, color: Color) -> io::Result<()> {
        queue!(self.stdout, style::SetForegroundColor(color))
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        queue!(self.stdout, style::Print(text))
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        execute!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        execute!(self.stdout, cursor::Hide)
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        execute!(self.stdout, cursor::Show)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        while poll(Duration::ZERO)? {
            if let Some(key) = decode(read()?) {
                return Ok(Some(key));
            }
        }

        Ok(None)
    }

    fn read_key_blocking(&mut self) -> io::Result<Key> {
        loop {
            if let Some(key) = decode(read()?) {
                return Ok(key);
            }
        }
    }
}

/// Turns a crossterm event into a logical key. Releases, mouse and focus
/// events carry nothing for the game.
fn decode(event: Event) -> Option<Key> {
    match event {
        Event::Key(key) => decode_key(key),
        Event::Resize(_, _) => Some(Key::Resize),
        _ => None,
    }
}

fn decode_key(key: KeyEvent) -> Option<Key> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let decoded = match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Char('c') | KeyCode::Char('C')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Key::Interrupt
        }
        KeyCode::Char(ch) => Key::Char(ch.to_ascii_lowercase()),
        _ => Key::Other,
    };
    Some(decoded)
}

fn restore_terminal() {
    let mut out = stdout();
    let _ = execute!(
        out,
        style::ResetColor,
        cursor::EnableBlinking,
        cursor::Show,
        LeaveAlternateScreen
    );
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

/// Restores the terminal when the process is told to go away from outside.
#[cfg(unix)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGQUIT])?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::warn!(signal, "termination signal received, restoring terminal");
                restore_terminal();
                std::process::exit(128 + signal);
            }
        });

        Ok(SignalGuard { handle, thread: Some(thread) })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
