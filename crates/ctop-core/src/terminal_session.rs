#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! RAII management of the terminal modes the dashboard needs: raw mode for
//! single-key input without echo, the alternate screen so the user's
//! scrollback survives, a hidden cursor and disabled auto-wrap so overlong
//! table rows are cut at the right edge instead of spilling onto the next
//! row.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Every mode change is tracked** - each optional mode has a flag that is
//!    set only once the mode was actually enabled.
//! 2. **Drop restores previous state** - modes are disabled in reverse order.
//! 3. **Panic safety** - a panic hook performs best-effort cleanup before the
//!    previous hook prints the panic message.
//! 4. **Signals** - SIGINT/SIGTERM restore the terminal and exit with
//!    `128 + signal`.
//!
//! # Cleanup Order
//!
//! 1. Re-enable line wrap (if disabled)
//! 2. Show cursor (if hidden)
//! 3. Leave alternate screen (if enabled)
//! 4. Exit raw mode (always)
//! 5. Flush stdout
//!
//! # Usage
//!
//! ```no_run
//! use ctop_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let session = TerminalSession::new(SessionOptions::dashboard())?;
//! // ... draw frames ...
//! drop(session); // terminal restored
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Terminal session configuration options.
///
/// All options default to `false`; [`SessionOptions::dashboard`] enables the
/// full-screen set.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Enable alternate screen buffer (`CSI ? 1049 h`).
    pub alternate_screen: bool,

    /// Hide the cursor while the session is alive (`CSI ? 25 l`).
    pub hide_cursor: bool,

    /// Disable auto-wrap (`CSI ? 7 l`) so long lines are clipped.
    pub disable_line_wrap: bool,
}

impl SessionOptions {
    /// Options for a full-screen refreshing dashboard.
    #[must_use]
    pub fn dashboard() -> Self {
        Self {
            alternate_screen: true,
            hide_cursor: true,
            disable_line_wrap: true,
        }
    }
}

/// A terminal session that manages raw mode and cleanup.
///
/// # Contract
///
/// - **Exclusive ownership**: only one `TerminalSession` should exist at a
///   time.
/// - **Raw mode entry**: creating a session enters raw mode (no line
///   buffering, no echo).
/// - **Cleanup guarantee**: dropping the session (normally or via panic)
///   restores the terminal.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
    cursor_hidden: bool,
    line_wrap_disabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or one of the modes cannot be enabled.
    /// Modes enabled before the failure are rolled back by `Drop`.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        #[cfg(unix)]
        let signal_guard = acquire_then_enable(SignalGuard::new, crossterm::terminal::enable_raw_mode)?;
        #[cfg(not(unix))]
        crossterm::terminal::enable_raw_mode()?;
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
            cursor_hidden: false,
            line_wrap_disabled: false,
            #[cfg(unix)]
            signal_guard: Some(signal_guard),
        };

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen enabled");
        }

        if options.hide_cursor {
            crossterm::execute!(stdout, crossterm::cursor::Hide)?;
            session.cursor_hidden = true;
        }

        if options.disable_line_wrap {
            crossterm::execute!(stdout, crossterm::terminal::DisableLineWrap)?;
            session.line_wrap_disabled = true;
        }

        Ok(session)
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();

        if self.line_wrap_disabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::EnableLineWrap);
            self.line_wrap_disabled = false;
        }

        if self.cursor_hidden {
            let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
            self.cursor_hidden = false;
        }

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Acquire `guard`, then run `enable`. Raw mode is only entered once nothing
/// else can fail before the session exists to undo it.
#[cfg_attr(not(unix), allow(dead_code))]
fn acquire_then_enable<G>(
    guard: impl FnOnce() -> io::Result<G>,
    enable: impl FnOnce() -> io::Result<()>,
) -> io::Result<G> {
    let guard = guard()?;
    enable()?;
    Ok(guard)
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();

    let _ = crossterm::execute!(stdout, crossterm::terminal::EnableLineWrap);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                #[cfg(feature = "tracing")]
                tracing::warn!(signal, "termination signal received, cleaning up");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
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
