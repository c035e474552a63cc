use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email delivery is not configured")]
    NotConfigured,

    #[error("Email transport failed: {0}")]
    Transport(String),

    #[error("Email provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
