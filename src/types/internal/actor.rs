/// Authenticated actor as supplied by the upstream identity collaborator
///
/// The core never derives identity itself; the HTTP layer maps gateway
/// headers into this struct and passes it through every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            is_admin,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Human-facing label for system notes and audit descriptions
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Client metadata captured at the transport boundary for audit writes
///
/// The audit logger discards `ip_address` for anonymous incidents regardless
/// of what is supplied here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMeta {
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }
}
