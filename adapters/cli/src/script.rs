//! Parser for the scripted input sequences fed to the step loop.
//!
//! A script is a comma-separated list of actions. Each action is a direction
//! made of `U`, `D`, `L`, `R` (each letter at most once, e.g. `UR`), `W` to
//! stand still or `E` to interact, optionally followed by `*count`:
//!
//! ```text
//! R*30,DR*4,E,W*10
//! ```

use thiserror::Error;
use tilequest_core::MovementVector;

const ACTION_DELIMITER: char = ',';
const REPEAT_DELIMITER: char = '*';

/// Single input applied by the step loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// Advance one step with the given movement input.
    Move(MovementVector),
    /// Request interaction with the current target.
    Interact,
}

/// Parsed input script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Script {
    steps: Vec<(Action, u32)>,
}

impl Script {
    /// Parses the textual script representation.
    pub(crate) fn parse(value: &str) -> Result<Self, ScriptError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let steps = trimmed
            .split(ACTION_DELIMITER)
            .map(parse_step)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    /// Expands repeat counts into the flat action sequence.
    pub(crate) fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.steps
            .iter()
            .flat_map(|&(action, count)| std::iter::repeat(action).take(count as usize))
    }
}

/// Errors raised while parsing a script.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// Two delimiters followed each other or the script ended with one.
    #[error("script contains an empty action")]
    EmptyAction,
    /// The action token is not a known direction or command.
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    /// A direction letter appears more than once in one action.
    #[error("direction repeated in '{0}'")]
    RepeatedDirection(String),
    /// The repeat count is not a positive integer.
    #[error("invalid repeat count in '{0}'")]
    InvalidRepeat(String),
}

fn parse_step(token: &str) -> Result<(Action, u32), ScriptError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ScriptError::EmptyAction);
    }

    let (name, count) = match token.split_once(REPEAT_DELIMITER) {
        Some((name, count)) => {
            let count = count
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|count| *count > 0)
                .ok_or_else(|| ScriptError::InvalidRepeat(token.to_owned()))?;
            (name.trim(), count)
        }
        None => (token, 1),
    };

    Ok((parse_action(name)?, count))
}

fn parse_action(name: &str) -> Result<Action, ScriptError> {
    let upper = name.to_ascii_uppercase();
    match upper.as_str() {
        "E" => return Ok(Action::Interact),
        "W" => return Ok(Action::Move(MovementVector::ZERO)),
        "" => return Err(ScriptError::EmptyAction),
        _ => {}
    }

    let mut seen = String::with_capacity(4);
    let (mut x, mut y) = (0_i8, 0_i8);
    for letter in upper.chars() {
        let (dx, dy) = match letter {
            'U' => (0, -1),
            'D' => (0, 1),
            'L' => (-1, 0),
            'R' => (1, 0),
            _ => return Err(ScriptError::UnknownAction(name.to_owned())),
        };
        if seen.contains(letter) {
            return Err(ScriptError::RepeatedDirection(name.to_owned()));
        }
        seen.push(letter);
        x += dx;
        y += dy;
    }
    Ok(Action::Move(MovementVector::new(x, y)))
}
