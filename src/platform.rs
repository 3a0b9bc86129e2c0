//! Opening reports with the desktop's default handler.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Command line that opens `target` with the platform's default handler.
fn opener_command(target: &Path) -> Command {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("rundll32");
        c.arg("url.dll,FileProtocolHandler");
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command.arg(target);
    command
}

/// Open `path` in the default browser without waiting for it to exit.
///
/// # Errors
///
/// Returns an error if the opener cannot be started.
pub fn open_in_browser(path: &Path) -> io::Result<()> {
    log::debug!("Opening {}", path.display());
    opener_command(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
}
