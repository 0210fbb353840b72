/// Edge-triggered visibility detector for the last rendered quote card.
///
/// Reports `true` when the sentinel enters the viewport. A different
/// sentinel (the list grew) counts as a new element, so it reports again
/// if it is already visible when first observed.
#[derive(Debug, Default)]
pub struct SentinelObserver {
    observed: Option<usize>,
    visible: bool,
}

impl SentinelObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current sentinel index and its visibility after a render.
    pub fn observe(&mut self, sentinel: Option<usize>, visible: bool) -> bool {
        if sentinel != self.observed {
            self.observed = sentinel;
            self.visible = false;
        }
        let entered = sentinel.is_some() && visible && !self.visible;
        self.visible = visible;
        entered
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_on_entering_view() {
        let mut observer = SentinelObserver::new();
        assert!(!observer.observe(Some(19), false));
        assert!(observer.observe(Some(19), true));
    }

    #[test]
    fn test_steady_visibility_reports_once() {
        let mut observer = SentinelObserver::new();
        assert!(observer.observe(Some(19), true));
        assert!(!observer.observe(Some(19), true));
        assert!(!observer.observe(Some(19), true));
    }

    #[test]
    fn test_leaving_and_reentering_reports_again() {
        let mut observer = SentinelObserver::new();
        assert!(observer.observe(Some(19), true));
        assert!(!observer.observe(Some(19), false));
        assert!(observer.observe(Some(19), true));
    }

    #[test]
    fn test_new_sentinel_already_visible_reports() {
        let mut observer = SentinelObserver::new();
        assert!(observer.observe(Some(19), true));
        assert!(observer.observe(Some(24), true));
    }

    #[test]
    fn test_no_sentinel_never_reports() {
        let mut observer = SentinelObserver::new();
        assert!(!observer.observe(None, true));
    }
}
