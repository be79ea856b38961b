use crate::libserver::ConnId;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("connection closed")]
    Closed,

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("binary frames are not part of the protocol")]
    Binary,

    #[error("payload not expected at this step")]
    Unexpected,

    #[error("peer did not answer in time")]
    Timeout,

    #[error("connection {0} is already waiting for an opponent")]
    AlreadyQueued(ConnId),

    #[error("matchmaking queue lock poisoned")]
    QueuePoisoned,
}
