//! Application Container for Dependency Injection
//!
//! This module provides Laravel-like service container capabilities:
//! - Instances: a pre-built value shared by every resolution
//! - Singletons: built lazily on first resolution, then shared
//! - Factories: new instance per resolution
//! - Trait bindings: bind `dyn Trait` to an implementation
//! - Named bindings: string keys next to type keys
//! - Test faking: swap implementations in tests
//! - Service Providers: bootstrap services with register/boot lifecycle
//!
//! # Example
//!
//! ```rust,ignore
//! use ember::{App, Container};
//!
//! let mut container = Container::new();
//! container.bind::<dyn Mailer>(Arc::new(SmtpMailer::new(&host)));
//! container.singleton(|_| RateLimiter::new(100));
//! App::install(container);
//!
//! let mailer = App::resolve::<dyn Mailer>()?;
//! ```

pub mod provider;
pub mod registry;
pub mod testing;

pub use provider::{Publishable, ServiceProvider};
pub use registry::{ProviderRegistry, ProviderState};

use crate::error::FrameworkError;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Global application container. Readers take a cheap `Arc` snapshot and
/// release the lock before any resolver runs; writers copy on write.
static APP_CONTAINER: OnceLock<RwLock<Arc<Container>>> = OnceLock::new();

// Thread-local test overrides for isolated testing
thread_local! {
    pub(crate) static TEST_CONTAINER: RefCell<Option<Container>> = const { RefCell::new(None) };
}

/// Type-erased resolved value. Always holds an `Arc<T>` so that unsized
/// targets (`dyn Trait`) can be stored and recovered.
type Erased = Arc<dyn Any + Send + Sync>;

type Resolver = Arc<dyn Fn(&Container) -> Erased + Send + Sync>;

#[derive(Clone)]
enum Binding {
    /// Pre-built value
    Instance(Erased),

    /// Built once on first resolution. The cell is shared between clones of
    /// the container, so every clone sees the same instance.
    Singleton {
        resolver: Resolver,
        cell: Arc<OnceLock<Erased>>,
    },

    /// Built on every resolution
    Factory(Resolver),
}

impl Binding {
    fn resolve(&self, container: &Container) -> Erased {
        match self {
            Binding::Instance(value) => value.clone(),
            Binding::Singleton { resolver, cell } => {
                cell.get_or_init(|| resolver(container)).clone()
            }
            Binding::Factory(resolver) => resolver(container),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Binding::Instance(_) => "instance",
            Binding::Singleton { .. } => "singleton",
            Binding::Factory(_) => "factory",
        }
    }
}

/// Key a binding is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingKey {
    /// `TypeId` of `Arc<T>` for the bound type `T`
    Type(TypeId),
    /// String identifier
    Named(String),
}

impl BindingKey {
    fn of<T: ?Sized + 'static>() -> Self {
        BindingKey::Type(TypeId::of::<Arc<T>>())
    }
}

#[derive(Clone)]
struct Entry {
    label: String,
    binding: Binding,
}

/// Description of one binding, for introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    pub label: String,
    pub kind: &'static str,
}

/// The main service container
///
/// Stores type-erased bindings keyed by type or by name.
#[derive(Clone, Default)]
pub struct Container {
    entries: HashMap<BindingKey, Entry>,
}

fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Erased {
    Arc::new(value)
}

fn recover<T: ?Sized + Send + Sync + 'static>(erased: Erased) -> Option<Arc<T>> {
    erased.downcast_ref::<Arc<T>>().cloned()
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert<T: ?Sized + 'static>(&mut self, key: BindingKey, binding: Binding) {
        let label = match &key {
            BindingKey::Named(name) => name.clone(),
            BindingKey::Type(_) => std::any::type_name::<T>().to_string(),
        };
        self.entries.insert(key, Entry { label, binding });
    }

    /// Register a pre-built value shared across all resolutions
    ///
    /// # Example
    /// ```
    /// use ember::Container;
    ///
    /// let mut container = Container::new();
    /// container.instance(String::from("shared"));
    /// assert_eq!(container.get::<String>(), Some("shared".to_string()));
    /// ```
    pub fn instance<T: Any + Send + Sync>(&mut self, value: T) {
        self.bind(Arc::new(value));
    }

    /// Register a lazily built singleton
    ///
    /// The closure runs at most once, on first resolution; every later
    /// resolution returns the same `Arc`.
    pub fn singleton<T, F>(&mut self, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.bind_singleton::<T, _>(move |c| Arc::new(factory(c)));
    }

    /// Register a factory closure (new instance per resolution)
    pub fn factory<T, F>(&mut self, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.bind_factory::<T, _>(move |c| Arc::new(factory(c)));
    }

    /// Bind a shared value to a type, which may be a trait object
    ///
    /// # Example
    /// ```rust,ignore
    /// container.bind::<dyn Mailer>(Arc::new(SmtpMailer::new()));
    /// ```
    pub fn bind<T: ?Sized + Send + Sync + 'static>(&mut self, instance: Arc<T>) {
        self.insert::<T>(BindingKey::of::<T>(), Binding::Instance(erase(instance)));
    }

    /// Bind a type to a lazily built singleton
    pub fn bind_singleton<T, F>(&mut self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Arc<T> + Send + Sync + 'static,
    {
        self.insert::<T>(
            BindingKey::of::<T>(),
            Binding::Singleton {
                resolver: Arc::new(move |c: &Container| erase(factory(c))),
                cell: Arc::new(OnceLock::new()),
            },
        );
    }

    /// Bind a type to a factory
    pub fn bind_factory<T, F>(&mut self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Arc<T> + Send + Sync + 'static,
    {
        self.insert::<T>(
            BindingKey::of::<T>(),
            Binding::Factory(Arc::new(move |c: &Container| erase(factory(c)))),
        );
    }

    /// Bind a shared value under a string key
    pub fn bind_named<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: impl Into<String>,
        instance: Arc<T>,
    ) {
        self.insert::<T>(
            BindingKey::Named(name.into()),
            Binding::Instance(erase(instance)),
        );
    }

    /// Bind a lazily built singleton under a string key
    pub fn singleton_named<T, F>(&mut self, name: impl Into<String>, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Arc<T> + Send + Sync + 'static,
    {
        self.insert::<T>(
            BindingKey::Named(name.into()),
            Binding::Singleton {
                resolver: Arc::new(move |c: &Container| erase(factory(c))),
                cell: Arc::new(OnceLock::new()),
            },
        );
    }

    /// Resolve a binding - returns `Arc<T>`
    ///
    /// # Example
    /// ```rust,ignore
    /// let mailer: Arc<dyn Mailer> = container.make::<dyn Mailer>().unwrap();
    /// ```
    pub fn make<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let entry = self.entries.get(&BindingKey::of::<T>())?;
        recover(entry.binding.resolve(self))
    }

    /// Resolve a concrete type by value (requires Clone)
    pub fn get<T: Any + Send + Sync + Clone>(&self) -> Option<T> {
        self.make::<T>().map(|value| T::clone(&value))
    }

    /// Resolve a named binding
    ///
    /// Returns `None` if the name is unbound or bound to another type.
    pub fn make_named<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        let entry = self.entries.get(&BindingKey::Named(name.to_string()))?;
        recover(entry.binding.resolve(self))
    }

    /// Resolve a binding, returning an error if not found
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, FrameworkError> {
        self.make::<T>()
            .ok_or_else(FrameworkError::service_not_found::<T>)
    }

    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, FrameworkError> {
        self.make_named::<T>(name)
            .ok_or_else(|| FrameworkError::named_service_not_found(name))
    }

    /// Check if a type is bound
    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        self.entries.contains_key(&BindingKey::of::<T>())
    }

    pub fn has_named(&self, name: &str) -> bool {
        self.entries
            .contains_key(&BindingKey::Named(name.to_string()))
    }

    /// Move every binding of `other` into this container, replacing clashes
    pub fn extend(&mut self, other: Container) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Describe every binding, sorted by label
    pub fn bindings(&self) -> Vec<BindingInfo> {
        let mut infos: Vec<BindingInfo> = self
            .entries
            .values()
            .map(|entry| BindingInfo {
                label: entry.label.clone(),
                kind: entry.binding.kind(),
            })
            .collect();
        infos.sort_by(|a, b| a.label.cmp(&b.label));
        infos
    }
}

fn global() -> &'static RwLock<Arc<Container>> {
    APP_CONTAINER.get_or_init(|| RwLock::new(Arc::new(Container::new())))
}

fn snapshot() -> Arc<Container> {
    global().read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Check the thread-local test container first, then the global one
///
/// Neither the thread-local borrow nor the global lock is held while `f`
/// runs, so resolvers may call back into `App`.
fn lookup<R>(f: impl Fn(&Container) -> Option<R>) -> Option<R> {
    let overridden = TEST_CONTAINER.with(|c| c.borrow().clone());
    if let Some(container) = overridden {
        if let Some(found) = f(&container) {
            return Some(found);
        }
    }
    f(&snapshot())
}

/// Application container facade
///
/// Provides static methods for service registration and resolution.
/// Uses a global container with thread-local test overrides.
///
/// Resolver closures receive the container they are resolved from and may
/// resolve their dependencies through it or through `App`.
pub struct App;

impl App {
    /// Initialize the application container
    pub fn init() {
        global();
    }

    /// Merge a fully bootstrapped container into the global one
    pub fn install(container: Container) {
        Self::with_mut(|c| c.extend(container));
    }

    /// Run a closure with mutable access to the global container
    pub fn with_mut<R>(f: impl FnOnce(&mut Container) -> R) -> R {
        let mut guard = global().write().unwrap_or_else(|e| e.into_inner());
        f(Arc::make_mut(&mut guard))
    }

    /// Run a closure against a snapshot of the global container
    pub fn with<R>(f: impl FnOnce(&Container) -> R) -> R {
        f(&snapshot())
    }

    pub fn instance<T: Any + Send + Sync>(value: T) {
        Self::with_mut(|c| c.instance(value));
    }

    pub fn singleton<T, F>(factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        Self::with_mut(|c| c.singleton(factory));
    }

    pub fn factory<T, F>(factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        Self::with_mut(|c| c.factory(factory));
    }

    pub fn bind<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) {
        Self::with_mut(|c| c.bind(instance));
    }

    pub fn bind_factory<T, F>(factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Arc<T> + Send + Sync + 'static,
    {
        Self::with_mut(|c| c.bind_factory(factory));
    }

    /// Resolve a concrete type by value
    pub fn get<T: Any + Send + Sync + Clone>() -> Option<T> {
        lookup(|c| c.get::<T>())
    }

    /// Resolve a binding - returns `Arc<T>`
    pub fn make<T: ?Sized + Send + Sync + 'static>() -> Option<Arc<T>> {
        lookup(|c| c.make::<T>())
    }

    pub fn make_named<T: ?Sized + Send + Sync + 'static>(name: &str) -> Option<Arc<T>> {
        lookup(|c| c.make_named::<T>(name))
    }

    /// Resolve a binding, returning an error if not found
    ///
    /// This allows using the `?` operator in handlers:
    ///
    /// ```rust,ignore
    /// pub async fn index(_req: Request) -> Response {
    ///     let photos = App::resolve::<PhotoStore>()?;
    ///     // ...
    /// }
    /// ```
    pub fn resolve<T: ?Sized + Send + Sync + 'static>() -> Result<Arc<T>, FrameworkError> {
        Self::make::<T>().ok_or_else(FrameworkError::service_not_found::<T>)
    }

    pub fn has<T: ?Sized + 'static>() -> bool {
        lookup(|c| c.has::<T>().then_some(())).is_some()
    }

    /// Number of bindings in the global container
    pub fn binding_count() -> usize {
        Self::with(Container::len)
    }
}
