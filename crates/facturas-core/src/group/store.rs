use super::model::{GroupId, GroupRecord, Provenance};

/// In-memory collection of groups, the single source of truth for views.
///
/// Groups are unique by `id` and kept sorted by `base_name` after every
/// mutation. Nothing here performs I/O.
#[derive(Debug, Clone, Default)]
pub struct GroupStore {
    groups: Vec<GroupRecord>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups ordered by `base_name`.
    pub fn list(&self) -> &[GroupRecord] {
        &self.groups
    }

    pub fn get(&self, id: GroupId) -> Option<&GroupRecord> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn ids(&self) -> Vec<GroupId> {
        self.groups.iter().map(|g| g.id).collect()
    }

    /// Replaces the group with the same id, or appends it.
    pub fn upsert(&mut self, record: GroupRecord) {
        match self.groups.iter_mut().find(|g| g.id == record.id) {
            Some(existing) => *existing = record,
            None => self.groups.push(record),
        }
        self.sort();
    }

    /// Removes the group with `id`, if present.
    pub fn remove(&mut self, id: GroupId) -> Option<GroupRecord> {
        let index = self.groups.iter().position(|g| g.id == id)?;
        Some(self.groups.remove(index))
    }

    pub fn remove_all(&mut self) {
        self.groups.clear();
    }

    /// Folds the groups returned by an analyze call into the store.
    ///
    /// Manual groups always survive. The previous auto groups are superseded
    /// by `groups`, which carries the backend's full grouping for the session.
    /// A returned group that is known here as manual stays manual.
    pub fn merge_analysis(&mut self, groups: Vec<GroupRecord>) {
        self.groups.retain(|g| g.is_manual());
        for mut group in groups {
            if self.get(group.id).is_some_and(GroupRecord::is_manual) {
                group.created_by = Provenance::Manual;
            }
            self.upsert(group);
        }
    }

    fn sort(&mut self) {
        self.groups.sort_by(|a, b| a.base_name.cmp(&b.base_name));
    }
}
