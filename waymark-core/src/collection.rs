//! Process-wide, copy-on-write snapshot of all action descriptors.
//!
//! Readers clone an `Arc` and never block each other for longer than that
//! clone. A rebuild produces a whole new collection and swaps it in, so a
//! reader holding an old snapshot keeps seeing a consistent set.

use crate::descriptor::ActionDescriptor;
use crate::descriptor_provider::{ActionDescriptorProvider, ActionDescriptorProviderContext};
use crate::diagnostics;
use crate::discovery::ChangeSource;
use crate::error::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// Immutable set of descriptors.
#[derive(Debug)]
pub struct ActionDescriptorCollection {
    pub items: Vec<ActionDescriptor>,
    /// Incremented on every successful rebuild.
    pub version: u64,
}

impl ActionDescriptorCollection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.items.iter()
    }
}

struct Published {
    collection: Arc<ActionDescriptorCollection>,
    source_version: u64,
}

pub struct ActionDescriptorCollectionProvider {
    providers: Vec<Arc<dyn ActionDescriptorProvider>>,
    change_source: Arc<dyn ChangeSource>,
    current: RwLock<Option<Published>>,
}

impl ActionDescriptorCollectionProvider {
    pub fn new(
        mut providers: Vec<Arc<dyn ActionDescriptorProvider>>,
        change_source: Arc<dyn ChangeSource>,
    ) -> Self {
        providers.sort_by_key(|p| p.order());
        Self {
            providers,
            change_source,
            current: RwLock::new(None),
        }
    }

    /// Current snapshot, rebuilt first if the change source moved on.
    ///
    /// If the rebuild fails the previous snapshot stays published and the
    /// error is returned.
    pub fn action_descriptors(&self) -> Result<Arc<ActionDescriptorCollection>> {
        let source_version = self.change_source.version();

        if let Some(published) = self.current.read().as_ref() {
            if published.source_version == source_version {
                return Ok(Arc::clone(&published.collection));
            }
        }

        let mut current = self.current.write();
        // Another caller may have rebuilt while we waited.
        if let Some(published) = current.as_ref() {
            if published.source_version == source_version {
                return Ok(Arc::clone(&published.collection));
            }
        }

        let version = current.as_ref().map_or(0, |p| p.collection.version) + 1;
        let items = match self.build() {
            Ok(items) => items,
            Err(e) => {
                waymark_log::error!("Rebuilding action descriptors failed: {}", e);
                return Err(e);
            }
        };

        diagnostics::log_action_descriptors(&items);
        let collection = Arc::new(ActionDescriptorCollection { items, version });
        waymark_log::info!(
            "Published {} action descriptors (version {})",
            collection.len(),
            version
        );
        *current = Some(Published {
            collection: Arc::clone(&collection),
            source_version,
        });
        Ok(collection)
    }

    fn build(&self) -> Result<Vec<ActionDescriptor>> {
        let mut context = ActionDescriptorProviderContext::default();
        for provider in &self.providers {
            provider.on_providers_executing(&mut context)?;
        }
        for provider in self.providers.iter().rev() {
            provider.on_providers_executed(&mut context)?;
        }
        Ok(context.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    #[derive(Default)]
    struct Counter(AtomicU64);

    impl ChangeSource for Counter {
        fn version(&self) -> u64 {
            self.0.load(Ordering::Acquire)
        }
    }

    #[derive(Default)]
    struct Flaky {
        fail: AtomicBool,
        builds: AtomicU64,
    }

    impl ActionDescriptorProvider for Flaky {
        fn order(&self) -> i32 {
            0
        }

        fn on_providers_executing(&self, context: &mut ActionDescriptorProviderContext) -> Result<()> {
            if self.fail.load(Ordering::Acquire) {
                return Err(Error::AttributeRouting(vec!["broken".into()]));
            }
            let n = self.builds.fetch_add(1, Ordering::AcqRel);
            context.results.push(ActionDescriptor::new(format!("build {n}")));
            Ok(())
        }
    }

    fn setup() -> (Arc<Counter>, Arc<Flaky>, ActionDescriptorCollectionProvider) {
        let source = Arc::new(Counter::default());
        let flaky = Arc::new(Flaky::default());
        let provider = ActionDescriptorCollectionProvider::new(
            vec![Arc::clone(&flaky) as Arc<dyn ActionDescriptorProvider>],
            Arc::clone(&source) as Arc<dyn ChangeSource>,
        );
        (source, flaky, provider)
    }

    #[test]
    fn test_snapshot_cached_until_change() {
        let (source, flaky, provider) = setup();

        let first = provider.action_descriptors().unwrap();
        let again = provider.action_descriptors().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(flaky.builds.load(Ordering::Acquire), 1);

        source.0.fetch_add(1, Ordering::AcqRel);
        let rebuilt = provider.action_descriptors().unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(rebuilt.version, 2);
        assert_eq!(first.items[0].display_name, "build 0");
        assert_eq!(rebuilt.items[0].display_name, "build 1");
    }

    #[test]
    fn test_failed_rebuild_keeps_previous() {
        let (source, flaky, provider) = setup();
        let first = provider.action_descriptors().unwrap();

        flaky.fail.store(true, Ordering::Release);
        source.0.fetch_add(1, Ordering::AcqRel);
        assert!(provider.action_descriptors().is_err());

        flaky.fail.store(false, Ordering::Release);
        source.0.fetch_sub(1, Ordering::AcqRel);
        let same = provider.action_descriptors().unwrap();
        assert!(Arc::ptr_eq(&first, &same));
    }
}
