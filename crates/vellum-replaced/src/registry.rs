//! Replacement registry: ordered, first-match dispatch over probes.
//!
//! Each probe looks at an element and either declines or builds a
//! [`Replacement`]. Probes are consulted in registration order and the
//! first one that answers wins, however specific a later probe might be.
//! New kinds of replaced content plug in by registering another probe; the
//! registry knows nothing about them in advance.
//!
//! The registry is an ordinary value built during startup and handed to
//! the layout engine. Registration needs `&mut self`; resolution needs only
//! `&self`, so one registry can serve many documents and threads at once.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::dom::Element;
use crate::image::ImageProbe;
use crate::loader::ResourceDecoder;
use crate::replacement::Replacement;
use crate::url::Url;

// -----------------------------------------------------------------------
// ResolveContext
// -----------------------------------------------------------------------

/// Collaborators a probe may need while building a replacement.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    decoder: &'a dyn ResourceDecoder,
    base_url: Option<&'a Url>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(decoder: &'a dyn ResourceDecoder) -> Self {
        Self {
            decoder,
            base_url: None,
        }
    }

    /// Resolve relative resource attributes against `base`.
    pub fn with_base_url(mut self, base: &'a Url) -> Self {
        self.base_url = Some(base);
        self
    }

    pub fn decoder(&self) -> &'a dyn ResourceDecoder {
        self.decoder
    }

    pub fn base_url(&self) -> Option<&'a Url> {
        self.base_url
    }
}

impl fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("base_url", &self.base_url.map(|u| u.to_string()))
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------
// ReplacementProbe
// -----------------------------------------------------------------------

/// Recognises one kind of replaced element.
///
/// A probe must not fail for a well-formed element. When it recognises the
/// element but the resource cannot be loaded, it still returns a
/// replacement and lets that replacement carry the absence.
pub trait ReplacementProbe: Send + Sync {
    /// Short name used in logs and [`Registry::probe_names`].
    fn name(&self) -> &str;

    /// Return a replacement for `element`, or `None` to decline.
    fn probe(&self, element: &Element, cx: &ResolveContext<'_>) -> Option<Box<dyn Replacement>>;
}

/// Adapter turning a closure into a probe.
struct FnProbe<F> {
    name: String,
    f: F,
}

impl<F> ReplacementProbe for FnProbe<F>
where
    F: Fn(&Element, &ResolveContext<'_>) -> Option<Box<dyn Replacement>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn probe(&self, element: &Element, cx: &ResolveContext<'_>) -> Option<Box<dyn Replacement>> {
        (self.f)(element, cx)
    }
}

// -----------------------------------------------------------------------
// Registry
// -----------------------------------------------------------------------

/// Ordered list of probes. Insertion order is dispatch priority; probes
/// are never sorted or deduplicated.
#[derive(Default)]
pub struct Registry {
    probes: Vec<Box<dyn ReplacementProbe>>,
    /// Set by the first `resolve`; registering afterwards is a bug.
    dispatched: AtomicBool,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in probes (`<img>`).
    pub fn with_builtin_probes() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ImageProbe));
        registry
    }

    /// Append `probe`. It is consulted after every probe registered
    /// before it.
    ///
    /// Registration belongs to the setup phase. Registering once
    /// resolution has started trips a debug assertion.
    pub fn register(&mut self, probe: Box<dyn ReplacementProbe>) {
        let started = *self.dispatched.get_mut();
        debug_assert!(
            !started,
            "probe `{}` registered after resolution started",
            probe.name()
        );
        if started {
            log::error!("probe `{}` registered after resolution started", probe.name());
        }
        log::debug!(
            "registered replacement probe `{}` at position {}",
            probe.name(),
            self.probes.len()
        );
        self.probes.push(probe);
    }

    /// Register a closure as a probe.
    pub fn register_fn<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&Element, &ResolveContext<'_>) -> Option<Box<dyn Replacement>>
            + Send
            + Sync
            + 'static,
    {
        self.register(Box::new(FnProbe {
            name: name.to_string(),
            f,
        }));
    }

    /// Find the replacement for `element`.
    ///
    /// Probes run in registration order; the first `Some` is returned and
    /// no later probe is invoked. `None` means the element is not
    /// replaced and should be laid out as ordinary content.
    pub fn resolve(&self, element: &Element, cx: &ResolveContext<'_>) -> Option<Box<dyn Replacement>> {
        self.dispatched.store(true, Ordering::Relaxed);
        self.probes.iter().find_map(|probe| {
            let replacement = probe.probe(element, cx)?;
            log::trace!("<{}> replaced by probe `{}`", element.tag(), probe.name());
            Some(replacement)
        })
    }

    /// Number of registered probes.
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Probe names in dispatch order.
    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("probes", &self.probe_names())
            .finish()
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
