/// Load status of a data-backed panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    /// Fetch outstanding; render the skeleton.
    Loading,
    Ready(T),
    /// Fetch failed; the message is shown in place of the content.
    Failed(String),
}

impl<T> Default for PanelState<T> {
    fn default() -> Self {
        PanelState::Loading
    }
}

impl<T> PanelState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PanelState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PanelState::Ready(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            PanelState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PanelState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => PanelState::Ready(data),
            Err(e) => PanelState::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_is_distinct_from_loading() {
        let loading: PanelState<u8> = PanelState::default();
        let failed: PanelState<u8> = PanelState::from_result(Err("boom"));
        assert!(loading.is_loading() && loading.error().is_none());
        assert!(!failed.is_loading());
        assert_eq!(failed.error(), Some("boom"));
        assert_eq!(PanelState::from_result::<&str>(Ok(3)).data(), Some(&3));
    }
}
