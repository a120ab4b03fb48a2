//! Commands typed at the `midbg` prompt.

use strum::{Display, EnumString};

/// Summary printed by `help`.
pub(crate) const HELP: &str = "\
commands:
  next, n         step over the current line
  step, s         step into the call on the current line
  finish, fin     run until the current function returns
  continue, c     resume until the next stop
  locals          show the locals of the current frame
  frames, bt      show the call stack
  where           show where the program stopped
  stop, quit, q   ask the debugger to quit
  abort           kill the debugger
  help            show this summary
";

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub(crate) enum UserCommand {
    #[strum(to_string = "next", serialize = "n")]
    Next,
    #[strum(to_string = "step", serialize = "s")]
    Step,
    #[strum(to_string = "finish", serialize = "fin")]
    Finish,
    #[strum(to_string = "continue", serialize = "c")]
    Continue,
    #[strum(to_string = "locals")]
    Locals,
    #[strum(to_string = "frames", serialize = "bt")]
    Frames,
    #[strum(to_string = "where")]
    Where,
    #[strum(to_string = "stop", serialize = "quit", serialize = "q")]
    Stop,
    #[strum(to_string = "abort")]
    Abort,
    #[strum(to_string = "help", serialize = "?")]
    Help,
}

/// Parses a trimmed input line; blank lines yield `None`.
pub(crate) fn parse_line(line: &str) -> Option<Result<UserCommand, String>> {
    let word = line.trim();
    if word.is_empty() {
        return None;
    }
    Some(
        word.parse()
            .map_err(|_| format!("unknown command '{word}'; type 'help' for a list")),
    )
}
