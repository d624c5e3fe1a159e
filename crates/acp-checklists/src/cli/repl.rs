//! Interactive checklist session.
//!
//! Reads one command per line and redraws the active tab after every change.
//! Input and output are generic so the loop runs the same on a terminal and
//! in tests.

use std::io::{BufRead, Write};
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::app::{App, Effect, Intent};
use crate::checklist::ItemKey;
use crate::error::{Error, Result};
use crate::render::{ScreenView, WelcomeView};
use crate::tab::TabId;

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  <s>-<i>       toggle item i of section s (e.g. 0-1)
  s <n>         toggle the checkbox of section n
  reset         clear the checklist (asks for confirmation)
  yes | no      answer the reset confirmation
  tab <ID>      open a tab (aircraft, NOTICE, LIENS, RECAP, FAVORI)
  fav <ID>      toggle the favorite tab
  unfav         forget the favorite tab
  scroll <n>    record the scroll offset of the view
  close         hide the skipped-items warning
  show          redraw the active tab
  help          show this help
  quit          leave
";

/// A line typed in the session that could not be understood.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The first word is not a command.
    #[error("unknown command '{0}', type 'help' for the list")]
    Unknown(String),

    /// The command needs an argument.
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    /// A numeric argument did not parse.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// The argument is not a tab or an item key.
    #[error(transparent)]
    Invalid(#[from] Error),
}

/// One session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Flip an item.
    Toggle(ItemKey),
    /// Click a section checkbox.
    Section(usize),
    /// Ask for a reset.
    Reset,
    /// Confirm the reset.
    Yes,
    /// Cancel the reset.
    No,
    /// Open a tab.
    Tab(TabId),
    /// Toggle the favorite.
    Favorite(TabId),
    /// Forget the favorite.
    Unfavorite,
    /// Record a scroll offset.
    Scroll(u32),
    /// Hide the warning.
    Close,
    /// Redraw.
    Show,
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

impl ReplCommand {
    /// The application intent behind this command, if any.
    #[must_use]
    pub fn intent(&self) -> Option<Intent> {
        let intent = match self {
            Self::Toggle(key) => Intent::ToggleItem(*key),
            Self::Section(section) => Intent::ToggleSection(*section),
            Self::Reset => Intent::RequestReset,
            Self::Yes => Intent::ConfirmReset,
            Self::No => Intent::CancelReset,
            Self::Tab(tab) => Intent::SwitchTab(tab.clone()),
            Self::Favorite(tab) => Intent::SelectFavorite(tab.clone()),
            Self::Unfavorite => Intent::ClearFavorite,
            Self::Scroll(offset) => Intent::Scrolled(*offset),
            Self::Close => Intent::DismissWarning,
            Self::Show | Self::Help | Self::Quit => return None,
        };
        Some(intent)
    }
}

impl FromStr for ReplCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(Self::Show);
        };
        let argument = words.next();

        let command = match first.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => Self::Quit,
            "h" | "help" | "?" => Self::Help,
            "show" | "ls" => Self::Show,
            "reset" => Self::Reset,
            "y" | "yes" => Self::Yes,
            "n" | "no" => Self::No,
            "close" => Self::Close,
            "unfav" => Self::Unfavorite,
            "s" | "section" => Self::Section(number(argument, "section")?),
            "scroll" => Self::Scroll(number(argument, "scroll")?),
            "t" | "tab" => {
                let tab = argument.ok_or(CommandError::MissingArgument("tab"))?;
                Self::Tab(tab.parse()?)
            }
            "fav" => {
                let tab = argument.ok_or(CommandError::MissingArgument("fav"))?;
                Self::Favorite(tab.parse()?)
            }
            _ if first.contains('-') => Self::Toggle(first.parse()?),
            _ => return Err(CommandError::Unknown(first.to_string())),
        };
        Ok(command)
    }
}

fn number<T: FromStr>(
    argument: Option<&str>,
    command: &'static str,
) -> std::result::Result<T, CommandError> {
    let argument = argument.ok_or(CommandError::MissingArgument(command))?;
    argument
        .parse()
        .map_err(|_| CommandError::InvalidNumber(argument.to_string()))
}

fn describe(effect: Effect) -> String {
    match effect {
        Effect::ScrollToTop => "(back to top)".to_string(),
        Effect::ScrollTo(offset) => format!("(scroll restored to {offset})"),
        Effect::ScrollIntoView(key) => format!("(next: {key})"),
    }
}

fn draw<W: Write>(app: &App, output: &mut W) -> Result<()> {
    let screen = app.screen()?;
    write!(output, "{}", ScreenView(&screen))?;
    Ok(())
}

/// Run the session until `quit` or end of input.
///
/// The welcome card is printed once, on the first session ever.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails, or if the
/// application fails for another reason than a rejected command. Rejected
/// commands are reported in the output and the session goes on.
pub fn run<R: BufRead, W: Write>(app: &mut App, mut input: R, mut output: W) -> Result<()> {
    if app.welcome_pending() {
        writeln!(output, "{}", WelcomeView)?;
        app.dispatch(Intent::DismissWelcome)?;
    }
    draw(app, &mut output)?;

    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let command = match line.parse::<ReplCommand>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(output, "error: {err}")?;
                continue;
            }
        };
        debug!(?command, "Session command");

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => write!(output, "{HELP}")?,
            ReplCommand::Show => draw(app, &mut output)?,
            other => {
                let Some(intent) = other.intent() else {
                    continue;
                };
                let redraw = !matches!(intent, Intent::Scrolled(_));
                match app.dispatch(intent) {
                    Ok(effects) => {
                        for effect in effects {
                            writeln!(output, "{}", describe(effect))?;
                        }
                        if redraw {
                            draw(app, &mut output)?;
                        }
                    }
                    Err(err) if err.is_rejected_input() => writeln!(output, "error: {err}")?,
                    Err(err) => return Err(err),
                }
            }
        }
    }

    output.flush()?;
    Ok(())
}
