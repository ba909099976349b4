//! Read-eval loop over any line source.

use crate::console::dispatcher::{Console, Flow};
use crate::storage::RecordStorage;
use log::info;
use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "(hbnb) ";

/// Runs commands from `input` until `quit` or end of input.
///
/// The prompt is written only when `interactive` is set, so piped sessions
/// produce command output alone.
pub fn run<S, R, W>(
    console: &mut Console<S>,
    mut input: R,
    output: &mut W,
    interactive: bool,
) -> io::Result<()>
where
    S: RecordStorage,
    R: BufRead,
    W: Write,
{
    info!("event=console_start module=console status=ok interactive={interactive}");
    let mut line = String::new();
    let mut commands = 0usize;
    loop {
        if interactive {
            write!(output, "{PROMPT}")?;
            output.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            if interactive {
                writeln!(output)?;
            }
            break;
        }

        commands += 1;
        let flow = console.execute_line(&line, output)?;
        output.flush()?;
        if flow == Flow::Quit {
            break;
        }
    }
    info!("event=console_stop module=console status=ok commands={commands}");
    Ok(())
}
