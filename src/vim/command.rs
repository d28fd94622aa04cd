use thiserror::Error;

use crate::wizard::steps::Step;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Back,
    Goto(Step),
    Submit,
    Retry,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("No such step: {0} (use 1-4)")]
    BadStep(String),
}

pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let input = input.trim().to_lowercase();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).unwrap_or("");

    match cmd {
        "next" | "n" => Ok(Command::Next),
        "back" | "prev" | "b" => Ok(Command::Back),
        "goto" | "g" | "step" => arg
            .parse::<u8>()
            .ok()
            .and_then(Step::from_number)
            .map(Command::Goto)
            .ok_or_else(|| CommandError::BadStep(arg.to_string())),
        "submit" | "w" => Ok(Command::Submit),
        "retry" | "r" | "reload" => Ok(Command::Retry),
        "help" | "h" | "?" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "" => Err(CommandError::Unknown("empty command".to_string())),
        other => match other.parse::<u8>().ok().and_then(Step::from_number) {
            // `:3` is shorthand for `:goto 3`
            Some(step) => Ok(Command::Goto(step)),
            None => Err(CommandError::Unknown(other.to_string())),
        },
    }
}
