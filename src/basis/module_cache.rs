use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{BasisModule, ModuleGenerator, ModuleRequest};

type Slot = Arc<Mutex<Option<Arc<BasisModule>>>>;

/// Memoizing module factory keyed by module name.
///
/// Each key owns a slot with its own lock, so concurrent requests for the same key
/// build the module once while requests for other keys proceed.
/// A failed build leaves the slot empty and the next request tries again.
#[derive(Debug, Default)]
pub struct ModuleCache<G> {
    generator: G,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<G: ModuleGenerator> ModuleCache<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Return the module for the request, building it on the first request of its key
    pub fn load(&self, request: &ModuleRequest) -> anyhow::Result<Arc<BasisModule>> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .map_err(|_| anyhow::anyhow!("Module cache lock is poisoned"))?;
            slots.entry(request.module_name.clone()).or_default().clone()
        };

        let mut module = slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Lock of module {} is poisoned", request.module_name))?;

        if let Some(cached) = module.as_ref() {
            anyhow::ensure!(
                cached.type_name == request.type_name,
                "Module {} was built for {}, not {}",
                request.module_name,
                cached.type_name,
                request.type_name
            );
            log::debug!("module {} loaded from cache", request.module_name);
            return Ok(cached.clone());
        }

        let built = Arc::new(self.generator.generate(request)?);
        *module = Some(built.clone());
        Ok(built)
    }

    /// Number of built modules
    pub fn len(&self) -> usize {
        self.built_modules().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, module_name: &str) -> bool {
        self.built_modules().iter().any(|name| name == module_name)
    }

    /// Names of the modules built so far.
    /// Slots are inspected after the key map is released, so a pending build only delays the caller.
    fn built_modules(&self) -> Vec<String> {
        let slots: Vec<(String, Slot)> = match self.slots.lock() {
            Ok(slots) => slots
                .iter()
                .map(|(name, slot)| (name.clone(), slot.clone()))
                .collect(),
            Err(_) => return vec![],
        };
        slots
            .into_iter()
            .filter(|(_, slot)| slot.lock().map(|m| m.is_some()).unwrap_or(false))
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::ModuleCache;
    use crate::basis::{BasisModule, InProcessGenerator, ModuleGenerator, ModuleRequest};

    /// Fails on the first call, then delegates
    #[derive(Default)]
    struct FlakyGenerator {
        calls: AtomicUsize,
    }

    impl ModuleGenerator for FlakyGenerator {
        fn generate(&self, request: &ModuleRequest) -> anyhow::Result<BasisModule> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("compiler crashed");
            }
            InProcessGenerator.generate(request)
        }
    }

    /// Holds the build of `BasisHandler<Slow>` until released
    #[derive(Default)]
    struct GatedGenerator {
        started: AtomicBool,
        released: AtomicBool,
    }

    impl ModuleGenerator for GatedGenerator {
        fn generate(&self, request: &ModuleRequest) -> anyhow::Result<BasisModule> {
            if request.type_name == "BasisHandler<Slow>" {
                self.started.store(true, Ordering::SeqCst);
                while !self.released.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            InProcessGenerator.generate(request)
        }
    }

    #[test]
    fn counting_during_a_build_does_not_block_other_keys() {
        let cache = ModuleCache::new(GatedGenerator::default());
        thread::scope(|scope| {
            let slow = scope.spawn(|| cache.load(&ModuleRequest::new("BasisHandler<Slow>", vec![])));
            while !cache.generator().started.load(Ordering::SeqCst) {
                thread::yield_now();
            }
            // waits for the slow slot
            let counting = scope.spawn(|| cache.len());
            thread::sleep(Duration::from_millis(20));

            let fast = ModuleRequest::new("BasisHandler<Fast>", vec![]);
            assert!(cache.load(&fast).is_ok());
            assert!(!counting.is_finished());

            cache.generator().released.store(true, Ordering::SeqCst);
            assert!(slow.join().unwrap().is_ok());
            assert!(counting.join().unwrap() >= 1);
        });
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ModuleCache::new(FlakyGenerator::default());
        let request = ModuleRequest::new("BasisHandler<X>", vec![]);
        assert!(cache.load(&request).is_err());
        assert!(cache.is_empty());
        assert!(cache.load(&request).is_ok());
        assert!(cache.contains(&request.module_name));
        assert_eq!(cache.generator().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn key_collision_with_another_type_is_an_error() {
        let cache = ModuleCache::new(InProcessGenerator);
        let request = ModuleRequest::new("BasisHandler<X>", vec![]);
        cache.load(&request).unwrap();
        let mut forged = ModuleRequest::new("BasisHandler<Y>", vec![]);
        forged.module_name = request.module_name.clone();
        assert!(cache.load(&forged).is_err());
        assert_eq!(cache.len(), 1);
    }
}
