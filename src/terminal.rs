//! Scoped single-keystroke terminal input.
//!
//! `,` expects one keystroke at a time with no line buffering and no echo.
//! The guard switches the terminal into that mode for as long as it lives
//! and restores the saved settings on drop, which covers every exit path of
//! a run.
//!
//! On Unix this is a cbreak setup: canonical input and echo are off, while
//! signal keys (Ctrl+C) and output post-processing (`\n` to `\r\n`) keep
//! working. Elsewhere crossterm's raw mode is the closest available mode.

use std::io::{self, IsTerminal};

use tracing::{debug, warn};

/// Byte produced by Ctrl+C when the terminal does not turn it into a signal.
pub const CTRL_C: u8 = 0x03;

#[cfg(unix)]
mod imp {
    use std::io;
    use std::os::fd::{AsFd, OwnedFd};

    use nix::sys::termios::{
        tcgetattr, tcsetattr, LocalFlags, SetArg, SpecialCharacterIndices, Termios,
    };
    use tracing::{debug, warn};

    /// Holds the terminal in cbreak mode until dropped.
    #[derive(Debug)]
    pub struct CbreakGuard {
        fd: OwnedFd,
        saved: Termios,
    }

    impl CbreakGuard {
        pub fn acquire() -> io::Result<Self> {
            Self::acquire_fd(io::stdin())
        }

        /// Switch the terminal behind `fd`; the descriptor is duplicated so
        /// the guard can restore it later.
        pub fn acquire_fd(fd: impl AsFd) -> io::Result<Self> {
            let fd = fd.as_fd().try_clone_to_owned()?;
            let saved = tcgetattr(&fd)?;

            let mut cbreak = saved.clone();
            cbreak.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
            cbreak.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
            cbreak.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
            tcsetattr(&fd, SetArg::TCSANOW, &cbreak)?;
            debug!("cbreak mode enabled");

            Ok(Self { fd, saved })
        }
    }

    impl Drop for CbreakGuard {
        fn drop(&mut self) {
            match tcsetattr(&self.fd, SetArg::TCSANOW, &self.saved) {
                Ok(()) => debug!("terminal mode restored"),
                Err(e) => warn!(error = %e, "failed to restore terminal mode"),
            }
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use std::io;

    use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};
    use tracing::{debug, warn};

    /// Holds the console in raw mode until dropped.
    #[derive(Debug)]
    pub struct CbreakGuard {
        // Raw mode was already on when the guard was created; leave it on.
        was_enabled: bool,
    }

    impl CbreakGuard {
        pub fn acquire() -> io::Result<Self> {
            let was_enabled = is_raw_mode_enabled()?;
            if !was_enabled {
                enable_raw_mode()?;
                debug!("raw mode enabled");
            }
            Ok(Self { was_enabled })
        }
    }

    impl Drop for CbreakGuard {
        fn drop(&mut self) {
            if self.was_enabled {
                return;
            }
            match disable_raw_mode() {
                Ok(()) => debug!("raw mode restored"),
                Err(e) => warn!(error = %e, "failed to restore terminal mode"),
            }
        }
    }
}

pub use imp::CbreakGuard;

/// Keystroke input only helps when a person is typing input for `,`.
pub fn wants_raw_mode(program: &str, allowed: bool) -> bool {
    let wanted = allowed && program.contains(',') && io::stdin().is_terminal();
    if !wanted && allowed && program.contains(',') {
        debug!("stdin is not a terminal; leaving input mode alone");
    }
    wanted
}

/// Acquire the guard, falling back to line-buffered input on failure.
pub fn try_acquire() -> Option<CbreakGuard> {
    match CbreakGuard::acquire() {
        Ok(g) => Some(g),
        Err(e) => {
            warn!(error = %e, "could not switch terminal mode; input stays line buffered");
            None
        }
    }
}
