//! Output of one command sent to the device.

/// What a device printed in reply to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Output with the command echo and trailing prompt removed.
    pub result: String,

    /// Everything read up to and including the prompt.
    pub raw_result: String,

    /// Failure marker the device printed, if it rejected the command.
    pub failure_message: Option<String>,
}

impl Response {
    pub fn new(result: impl Into<String>, raw_result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            raw_result: raw_result.into(),
            failure_message: None,
        }
    }

    pub fn with_failure(mut self, marker: impl Into<String>) -> Self {
        self.failure_message = Some(marker.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }
}
