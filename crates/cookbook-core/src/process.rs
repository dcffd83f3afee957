//! Child process execution
//!
//! The external tool runs with the caller's stdin, stdout and stderr so
//! interactive flows (JSON staging editors, prompts, pagers) behave as if the
//! tool had been started directly.

use std::io;
use std::process::{Command, ExitStatus, Stdio};
#[cfg(unix)]
use std::sync::Mutex;
use tracing::info;

use crate::error::{Error, Result};
use crate::router::Invocation;

/// Starts a resolved invocation and reports its exit status
pub trait Launcher {
    fn launch(&self, invocation: &Invocation) -> Result<i32>;
}

/// Runs invocations as real child processes, blocking until they exit
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, invocation: &Invocation) -> Result<i32> {
        info!(command = %invocation, "starting external tool");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.prefix)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Held across spawn and wait; the child gets the original dispositions back.
        let guard = InterruptGuard::install();
        guard.restore_in_child(&mut command);

        let mut child = command.spawn().map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => Error::ExecutableNotFound(invocation.program.clone()),
            _ => Error::Spawn {
                program: invocation.program.clone(),
                source,
            },
        })?;

        let status = child.wait().map_err(|source| Error::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        Ok(exit_code(status))
    }
}

/// Exit code of a finished child; signal deaths map to `128 + signo`
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(unix)]
type Dispositions = [(libc::c_int, libc::sighandler_t); 2];

/// Active guard count and the dispositions saved by the first guard
#[cfg(unix)]
static INTERRUPTS: Mutex<Option<(usize, Dispositions)>> = Mutex::new(None);

/// Ignores SIGINT and SIGQUIT in this process while a child runs.
///
/// The terminal delivers the interrupt to the whole foreground process group;
/// the child handles it and we relay whatever status it exits with. Guards
/// nest across threads: the first saves the original dispositions, the last
/// restores them.
struct InterruptGuard {
    #[cfg(unix)]
    original: Dispositions,
}

#[cfg(unix)]
impl InterruptGuard {
    fn install() -> Self {
        let mut state = INTERRUPTS.lock().unwrap_or_else(|e| e.into_inner());
        let original = match state.as_mut() {
            Some((count, original)) => {
                *count += 1;
                *original
            }
            None => {
                let original = [libc::SIGINT, libc::SIGQUIT]
                    .map(|sig| (sig, unsafe { libc::signal(sig, libc::SIG_IGN) }));
                *state = Some((1, original));
                original
            }
        };
        Self { original }
    }

    /// Reset the child's SIGINT/SIGQUIT before exec. Only an inherited
    /// SIG_IGN survives exec, so everything else becomes SIG_DFL.
    fn restore_in_child(&self, command: &mut Command) {
        use std::os::unix::process::CommandExt;

        let original = self.original;
        // SAFETY: signal(2) is async-signal-safe and nothing is allocated.
        unsafe {
            command.pre_exec(move || {
                for (sig, handler) in original {
                    let handler = if handler == libc::SIG_IGN {
                        libc::SIG_IGN
                    } else {
                        libc::SIG_DFL
                    };
                    libc::signal(sig, handler);
                }
                Ok(())
            });
        }
    }
}

#[cfg(not(unix))]
impl InterruptGuard {
    fn install() -> Self {
        Self {}
    }

    fn restore_in_child(&self, _command: &mut Command) {}
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            let mut state = INTERRUPTS.lock().unwrap_or_else(|e| e.into_inner());
            if let Some((count, original)) = state.as_mut() {
                *count -= 1;
                if *count == 0 {
                    for (sig, handler) in *original {
                        if handler != libc::SIG_ERR {
                            unsafe {
                                libc::signal(sig, handler);
                            }
                        }
                    }
                    *state = None;
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh(script: &str) -> Invocation {
        Invocation {
            program: PathBuf::from("/bin/sh"),
            prefix: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
            args: vec![],
        }
    }

    #[test]
    fn test_exit_codes_are_relayed() {
        assert_eq!(SystemLauncher.launch(&sh("exit 0")).unwrap(), 0);
        assert_eq!(SystemLauncher.launch(&sh("exit 2")).unwrap(), 2);
        assert_eq!(SystemLauncher.launch(&sh("exit 77")).unwrap(), 77);
    }

    #[test]
    fn test_signal_death_maps_to_128_plus_signo() {
        let code = SystemLauncher.launch(&sh("kill -TERM $$")).unwrap();
        assert_eq!(code, 128 + libc::SIGTERM);
    }

    #[test]
    fn test_child_keeps_default_interrupt_handling() {
        // An ignored SIGINT inherited from our own parent (background jobs) is kept
        let inherited = InterruptGuard::install().original[0].1;
        if inherited == libc::SIG_IGN {
            return;
        }

        // The parent ignores SIGINT while waiting; the child must not inherit that
        let code = SystemLauncher.launch(&sh("kill -INT $$; exit 0")).unwrap();
        assert_eq!(code, 128 + libc::SIGINT);
    }

    #[test]
    fn test_guards_nest_and_restore() {
        let outer = InterruptGuard::install();
        let inner = InterruptGuard::install();
        assert_eq!(outer.original, inner.original);
        drop(inner);

        let current = unsafe { libc::signal(libc::SIGINT, libc::SIG_IGN) };
        assert_eq!(current, libc::SIG_IGN);
        drop(outer);
    }

    #[test]
    fn test_missing_program() {
        let invocation = Invocation {
            program: PathBuf::from("/definitely/not/here/python"),
            prefix: vec![],
            args: vec!["recipe".into(), "list".into()],
        };
        assert!(matches!(
            SystemLauncher.launch(&invocation),
            Err(Error::ExecutableNotFound(_))
        ));
    }
}
