//! Scene windows and the per-size scene window cache

use crate::bank::Bank;
use crate::entry::SceneAttrs;
use crate::types::WindowId;
use std::collections::HashMap;

/// Scene window following the cursor track
pub type SceneBank = Bank<SceneAttrs>;

/// Scene windows memoized by page size
///
/// Creating a scene window has a host-side cost, so each size is built once
/// on first request and reused afterwards.
#[derive(Debug, Default)]
pub struct SceneBankCache {
    banks: HashMap<usize, SceneBank>,
}

impl SceneBankCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene window of `page_size`, built with `create` if not cached yet
    pub fn get_or_create(
        &mut self,
        page_size: usize,
        create: impl FnOnce(usize) -> SceneBank,
    ) -> &mut SceneBank {
        self.banks.entry(page_size).or_insert_with(|| {
            log::debug!("Bank scenes: creating window of {}", page_size);
            create(page_size)
        })
    }

    pub fn get(&self, page_size: usize) -> Option<&SceneBank> {
        self.banks.get(&page_size)
    }

    /// Cached window with id `window`
    pub(crate) fn find_mut(&mut self, window: WindowId) -> Option<&mut SceneBank> {
        self.banks.values_mut().find(|bank| bank.id() == window)
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneBank> {
        self.banks.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::tests::RecordingHost;
    use crate::host::HostCollection;
    use crate::navigator::PageNavigator;
    use crate::scheduler::FollowUpScheduler;

    fn scene_bank(page_size: usize) -> SceneBank {
        Bank::new(
            "scenes",
            WindowId::next(),
            page_size,
            Box::new(RecordingHost::default()) as Box<dyn HostCollection>,
            FollowUpScheduler::system(),
        )
    }

    #[test]
    fn test_scene_banks_are_memoized_by_size() {
        let mut cache = SceneBankCache::new();
        let mut created = 0;

        let first = cache
            .get_or_create(8, |size| {
                created += 1;
                scene_bank(size)
            })
            .id();
        let again = cache
            .get_or_create(8, |size| {
                created += 1;
                scene_bank(size)
            })
            .id();
        assert_eq!(first, again);
        assert_eq!(created, 1);

        let other = cache.get_or_create(4, scene_bank);
        assert_eq!(other.page_size(), 4);
        assert_ne!(other.id(), first);
        assert_eq!(cache.len(), 2);

        assert!(cache.find_mut(first).is_some());
        assert!(cache.find_mut(WindowId::next()).is_none());
    }
}
