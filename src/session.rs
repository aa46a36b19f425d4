use std::fmt;

use crate::error::ValidationError;

/// Interaction mode of the drawing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Draw,
    Edit,
}

impl Mode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context passed with every command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub mode: Mode,
}

impl Session {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Fails unless the session is in `mode`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ModeMismatch` naming `command`.
    pub fn require(&self, mode: Mode, command: &'static str) -> Result<(), ValidationError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(ValidationError::ModeMismatch {
                command,
                mode: self.mode.as_str(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn require_names_command_and_current_mode() {
        let session = Session::new(Mode::Edit);
        assert!(session.require(Mode::Edit, "reshape").is_ok());
        let err = session.require(Mode::Draw, "addNode").unwrap_err();
        assert_eq!(err.to_string(), "command `addNode` is not allowed in edit mode");
    }
}
