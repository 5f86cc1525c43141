/// Worker source code handed to a [`ChannelFactory`](crate::ChannelFactory)
///
/// An empty script is accepted; it is up to the platform channel to decide
/// what running nothing means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub code: String,
}

impl Script {
    /// Create a new script from source code
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Source code as a string slice
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Check if the script has no code
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl From<String> for Script {
    fn from(code: String) -> Self {
        Self { code }
    }
}

impl From<&str> for Script {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}
