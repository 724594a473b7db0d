// Session UI state
//
// One enum instead of independent "busy" and "form visible" flags. The form
// can stay open while a request is in flight, so that case carries it.

use super::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    FormOpen,
    AwaitingResponse { form_open: bool },
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::AwaitingResponse { .. })
    }

    pub fn form_open(&self) -> bool {
        match self {
            SessionState::Idle => false,
            SessionState::FormOpen => true,
            SessionState::AwaitingResponse { form_open } => *form_open,
        }
    }

    /// Enter the busy state. Only one request may be in flight.
    pub fn begin_request(&mut self) -> Result<(), SessionError> {
        *self = match *self {
            SessionState::Idle => SessionState::AwaitingResponse { form_open: false },
            SessionState::FormOpen => SessionState::AwaitingResponse { form_open: true },
            SessionState::AwaitingResponse { .. } => return Err(SessionError::Busy),
        };
        Ok(())
    }

    /// Leave the busy state, back to the form if it was open
    pub fn finish_request(&mut self) {
        if let SessionState::AwaitingResponse { form_open } = *self {
            *self = if form_open {
                SessionState::FormOpen
            } else {
                SessionState::Idle
            };
        }
    }

    pub fn open_form(&mut self) {
        *self = match *self {
            SessionState::Idle | SessionState::FormOpen => SessionState::FormOpen,
            SessionState::AwaitingResponse { .. } => SessionState::AwaitingResponse { form_open: true },
        };
    }

    pub fn close_form(&mut self) {
        *self = match *self {
            SessionState::Idle | SessionState::FormOpen => SessionState::Idle,
            SessionState::AwaitingResponse { .. } => SessionState::AwaitingResponse { form_open: false },
        };
    }
}
