#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("no text provided")]
    EmptyInput,

    #[error("{0}")]
    Upstream(String),

    #[error("bad model catalog: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl CalcError {
    /// True for errors caused by the caller's input rather than by this
    /// process or the upstream API. An unknown model id counts as an
    /// invalid parameter.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownModel(_) | Self::InvalidParameter { .. } | Self::EmptyInput
        )
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::UnknownModel(_) | Self::InvalidParameter { .. })
    }
}

#[cfg(feature = "network")]
impl From<reqwest::Error> for CalcError {
    fn from(e: reqwest::Error) -> Self {
        CalcError::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
