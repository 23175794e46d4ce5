/// Result of an asynchronous request, as far as rendering cares.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome<T> {
    Pending,
    Success(T),
    Failure(String),
}

impl<T> RequestOutcome<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestOutcome::Pending)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RequestOutcome::Failure(_))
    }
}

/// Per-view request counter. Only the completion carrying the latest
/// generation may update the view.
#[derive(Debug, Default, Clone)]
pub struct RequestGeneration {
    latest: u64,
}

impl RequestGeneration {
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_generation_is_current() {
        let mut generation = RequestGeneration::default();
        let first = generation.begin();
        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        assert_eq!(generation.latest(), 2);
    }

    #[test]
    fn outcome_accessors() {
        let pending: RequestOutcome<u8> = RequestOutcome::Pending;
        assert!(pending.is_pending());
        assert!(!RequestOutcome::Success(3u8).is_pending());
        assert!(RequestOutcome::<u8>::Failure("x".into()).is_failure());
    }
}
