// ============================================================================
// Ledger Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(uuid::Uuid),

    #[error("Customer name cannot be empty")]
    EmptyName,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl LedgerError {
    /// Short label used for failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            LedgerError::CustomerNotFound(_) => "not_found",
            LedgerError::EmptyName => "empty_name",
            LedgerError::Store(_) => "store",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_includes_id() {
        let id = uuid::Uuid::new_v4();
        let err = LedgerError::CustomerNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
        assert_eq!(err.reason(), "not_found");
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err: LedgerError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.to_string(), "disk on fire");
        assert_eq!(err.reason(), "store");
    }
}
