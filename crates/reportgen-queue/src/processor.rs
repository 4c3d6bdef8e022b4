use reportgen_core::generator::BoxFuture;

/// Handles the payload of one queue message.
pub trait MessageProcessor: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn process_message<'a>(&'a self, payload: &'a str) -> BoxFuture<'a, Result<(), Self::Error>>;

    /// Whether a message that failed with `err` could succeed if redelivered.
    fn is_transient(&self, err: &Self::Error) -> bool;
}
