use std::time::Duration;

/// A caller's logo, as received.
#[derive(Clone, PartialEq, Eq)]
pub enum UserLogo {
    Bytes(Vec<u8>),
    /// Bare base64 or a data URL.
    Base64(String),
}

impl std::fmt::Debug for UserLogo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Self::Base64(s) => write!(f, "Base64({} chars)", s.len()),
        }
    }
}

/// Input to [`super::SearchEngine::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub name: String,
    pub nice_class: Option<u32>,
    /// Overrides the configured default threshold.
    pub threshold: Option<f32>,
    pub user_logo: Option<UserLogo>,
    /// Overrides the configured search deadline.
    pub deadline: Option<Duration>,
}

impl SearchRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nice_class: None,
            threshold: None,
            user_logo: None,
            deadline: None,
        }
    }

    pub fn with_nice_class(mut self, class: u32) -> Self {
        self.nice_class = Some(class);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_logo(mut self, logo: UserLogo) -> Self {
        self.user_logo = Some(logo);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
