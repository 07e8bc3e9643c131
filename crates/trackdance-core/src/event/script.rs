// Trackdance Event Scripts
// Line-oriented timed input scripts for replaying sessions

use std::fmt;

use crate::button::{Button, ButtonEvent, Timestamp};

/// What happens at one point of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    Button { button: Button, pressed: bool },
    /// Extra scan tick at exactly this time
    Tick,
    Encoder { clockwise: bool },
    ToggleMode,
}

/// One timed script line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptEvent {
    pub time: Timestamp,
    pub action: ScriptAction,
}

impl ScriptEvent {
    /// The button event, if this line is a press or release
    pub fn button_event(&self) -> Option<ButtonEvent> {
        match self.action {
            ScriptAction::Button { button, pressed } => Some(ButtonEvent {
                button,
                pressed,
                time: self.time,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            ScriptAction::Button { button, pressed } => write!(
                f,
                "{} {} {}",
                self.time,
                if pressed { "press" } else { "release" },
                button
            ),
            ScriptAction::Tick => write!(f, "{} tick", self.time),
            ScriptAction::Encoder { clockwise } => write!(
                f,
                "{} encoder {}",
                self.time,
                if clockwise { "cw" } else { "ccw" }
            ),
            ScriptAction::ToggleMode => write!(f, "{} toggle-mode", self.time),
        }
    }
}

/// Why a script line was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptErrorKind {
    #[error("invalid time '{0}'")]
    InvalidTime(String),

    #[error("time {time} is before the previous event at {previous}")]
    TimeWentBackwards { time: Timestamp, previous: Timestamp },

    #[error("missing action")]
    MissingAction,

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(String),

    #[error("unknown button '{0}'")]
    UnknownButton(String),

    #[error("encoder direction must be cw or ccw, got '{0}'")]
    InvalidDirection(String),

    #[error("unexpected '{0}' at end of line")]
    TrailingInput(String),
}

/// Script parse error with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ScriptError {
    pub line: usize,
    pub kind: ScriptErrorKind,
}

/// Parse a whole script. Blank lines and `#` comments are skipped; times
/// must never decrease.
pub fn parse_script(input: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    let mut events = Vec::new();
    let mut previous: Option<Timestamp> = None;

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let Some(event) = parse_line(raw).map_err(|kind| ScriptError { line, kind })? else {
            continue;
        };

        if let Some(previous) = previous {
            if event.time < previous {
                return Err(ScriptError {
                    line,
                    kind: ScriptErrorKind::TimeWentBackwards {
                        time: event.time,
                        previous,
                    },
                });
            }
        }
        previous = Some(event.time);
        events.push(event);
    }

    log::debug!("parsed {} script events", events.len());
    Ok(events)
}

/// Parse one line; `Ok(None)` for blank and comment lines
pub fn parse_line(raw: &str) -> Result<Option<ScriptEvent>, ScriptErrorKind> {
    let content = raw.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }

    let mut words = content.split_whitespace();
    let time_str = words.next().ok_or(ScriptErrorKind::MissingAction)?;
    let time: Timestamp = time_str
        .parse()
        .map_err(|_| ScriptErrorKind::InvalidTime(time_str.to_string()))?;

    let verb = words.next().ok_or(ScriptErrorKind::MissingAction)?;
    let action = match verb {
        "press" | "release" => {
            let name = words
                .next()
                .ok_or_else(|| ScriptErrorKind::MissingArgument(verb.to_string()))?;
            let button: Button = name
                .parse()
                .map_err(|_| ScriptErrorKind::UnknownButton(name.to_string()))?;
            ScriptAction::Button {
                button,
                pressed: verb == "press",
            }
        }
        "tick" => ScriptAction::Tick,
        "encoder" => {
            let direction = words
                .next()
                .ok_or_else(|| ScriptErrorKind::MissingArgument(verb.to_string()))?;
            let clockwise = match direction {
                "cw" => true,
                "ccw" => false,
                other => return Err(ScriptErrorKind::InvalidDirection(other.to_string())),
            };
            ScriptAction::Encoder { clockwise }
        }
        "toggle-mode" => ScriptAction::ToggleMode,
        other => return Err(ScriptErrorKind::UnknownAction(other.to_string())),
    };

    if let Some(extra) = words.next() {
        return Err(ScriptErrorKind::TrailingInput(extra.to_string()));
    }

    Ok(Some(ScriptEvent { time, action }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_actions() {
        let script = "\
# right button double tap
0 press right
40 release right
90 press right   # second contact
130 release right
200 tick
250 encoder cw
260 encoder ccw
300 toggle-mode
";
        let events = parse_script(script).unwrap();
        assert_eq!(events.len(), 8);
        assert_eq!(
            events[0].button_event(),
            Some(ButtonEvent::press(Button::Right, 0))
        );
        assert_eq!(events[4].action, ScriptAction::Tick);
        assert_eq!(events[5].action, ScriptAction::Encoder { clockwise: true });
        assert_eq!(events[6].action, ScriptAction::Encoder { clockwise: false });
        assert_eq!(events[7].action, ScriptAction::ToggleMode);
        assert_eq!(events[7].button_event(), None);
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# nothing"), Ok(None));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_script("0 press right\n\n5 press thumb\n").unwrap_err();
        assert_eq!(
            err,
            ScriptError {
                line: 3,
                kind: ScriptErrorKind::UnknownButton("thumb".to_string()),
            }
        );
        assert_eq!(err.to_string(), "line 3: unknown button 'thumb'");
    }

    #[test]
    fn test_time_must_not_decrease() {
        let err = parse_script("100 press left\n50 release left\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(
            err.kind,
            ScriptErrorKind::TimeWentBackwards {
                time: 50,
                previous: 100
            }
        );
        // Equal times are fine
        assert!(parse_script("100 press left\n100 release left\n").is_ok());
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_line("soon press left"),
            Err(ScriptErrorKind::InvalidTime("soon".to_string()))
        );
        assert_eq!(parse_line("10"), Err(ScriptErrorKind::MissingAction));
        assert_eq!(
            parse_line("10 wiggle"),
            Err(ScriptErrorKind::UnknownAction("wiggle".to_string()))
        );
        assert_eq!(
            parse_line("10 press"),
            Err(ScriptErrorKind::MissingArgument("press".to_string()))
        );
        assert_eq!(
            parse_line("10 encoder up"),
            Err(ScriptErrorKind::InvalidDirection("up".to_string()))
        );
        assert_eq!(
            parse_line("10 tick now"),
            Err(ScriptErrorKind::TrailingInput("now".to_string()))
        );
    }

    #[test]
    fn test_display_matches_input_format() {
        let event = parse_line("75 release back").unwrap().unwrap();
        assert_eq!(event.to_string(), "75 release back");
    }
}
