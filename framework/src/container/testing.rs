//! Thread-local container overrides for tests
//!
//! ```rust,ignore
//! use ember::testing::TestContainer;
//!
//! #[test]
//! fn uses_fake_mailer() {
//!     let _guard = TestContainer::fake();
//!     TestContainer::bind::<dyn Mailer>(Arc::new(FakeMailer::default()));
//!
//!     // App::make::<dyn Mailer>() now returns the fake on this thread
//! }
//! ```

use super::{Container, TEST_CONTAINER};
use std::any::Any;
use std::sync::Arc;

/// Entry point for faking container bindings in tests
pub struct TestContainer;

/// Clears the thread-local overrides when dropped
#[must_use = "overrides are removed as soon as the guard is dropped"]
pub struct TestContainerGuard {
    _private: (),
}

impl Drop for TestContainerGuard {
    fn drop(&mut self) {
        TEST_CONTAINER.with(|c| *c.borrow_mut() = None);
    }
}

impl TestContainer {
    /// Start overriding bindings on the current thread
    pub fn fake() -> TestContainerGuard {
        TEST_CONTAINER.with(|c| *c.borrow_mut() = Some(Container::new()));
        TestContainerGuard { _private: () }
    }

    fn with_mut(f: impl FnOnce(&mut Container)) {
        TEST_CONTAINER.with(|c| {
            let mut slot = c.borrow_mut();
            f(slot.get_or_insert_with(Container::new));
        });
    }

    pub fn instance<T: Any + Send + Sync>(value: T) {
        Self::with_mut(|c| c.instance(value));
    }

    pub fn bind<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) {
        Self::with_mut(|c| c.bind(instance));
    }

    pub fn factory<T, F>(factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        Self::with_mut(|c| c.factory(factory));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::App;

    #[derive(Clone, Debug, PartialEq)]
    struct Region(&'static str);

    #[test]
    fn test_override_shadows_global_and_is_cleared() {
        App::instance(Region("global"));

        {
            let _guard = TestContainer::fake();
            TestContainer::instance(Region("fake"));
            assert_eq!(App::get::<Region>(), Some(Region("fake")));
        }

        assert_eq!(App::get::<Region>(), Some(Region("global")));
    }

    #[test]
    fn test_override_is_thread_local() {
        let _guard = TestContainer::fake();
        TestContainer::instance(42u64);

        let seen_elsewhere = std::thread::spawn(App::get::<u64>).join().unwrap();
        assert_eq!(App::get::<u64>(), Some(42));
        assert_eq!(seen_elsewhere, None);
    }
}
