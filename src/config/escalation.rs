//! Escalation contact configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Contact details surfaced in escalation replies.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationConfig {
    /// Support mailbox the mailto link is addressed to
    #[serde(default = "default_support_email")]
    pub support_email: String,

    /// Support phone number shown alongside the link
    #[serde(default = "default_support_phone")]
    pub support_phone: String,
}

impl EscalationConfig {
    /// Validate escalation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.support_email.contains('@') {
            return Err(ValidationError::InvalidSupportEmail);
        }
        Ok(())
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            support_email: default_support_email(),
            support_phone: default_support_phone(),
        }
    }
}

fn default_support_email() -> String {
    "rajashree.rpf@gmail.com".to_string()
}

fn default_support_phone() -> String {
    "+91 98765 43210".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(EscalationConfig::default().validate().is_ok());
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        let config = EscalationConfig {
            support_email: "not-an-email".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
