use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FeedbackError {
    #[error("Feedback cannot be empty")]
    Empty,
}

/// Accepts a piece of user feedback. There is nowhere to send it, so it is
/// only logged.
pub fn submit(text: &str) -> Result<String, FeedbackError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FeedbackError::Empty);
    }
    log::info!("Feedback submitted: {}", text);
    Ok(text.to_string())
}
