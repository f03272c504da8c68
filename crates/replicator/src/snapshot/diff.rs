use crate::wire::{TypeId, TypeIdList};

/// Three-way partition of two ascending type id sets.
///
/// The vectors are reused between calls so a decoder diffing thousands of
/// entities per pass does not allocate once warmed up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeIdDiff {
    /// In `from` but not in `to`.
    pub removed: Vec<TypeId>,
    /// In `to` but not in `from`.
    pub added: Vec<TypeId>,
    /// In both.
    pub same: Vec<TypeId>,
}

impl TypeIdDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both inputs must be strictly ascending. Other inputs produce an
    /// unspecified partition.
    pub fn compute(&mut self, from: &[TypeId], to: &[TypeId]) {
        self.removed.clear();
        self.added.clear();
        self.same.clear();

        let mut from_index = 0;
        let mut to_index = 0;

        while from_index < from.len() && to_index < to.len() {
            let from_id = from[from_index];
            let to_id = to[to_index];

            if from_id == to_id {
                self.same.push(to_id);
                from_index += 1;
                to_index += 1;
            } else if to_id > from_id {
                // `to` is sorted, so `from_id` can no longer show up in it
                self.removed.push(from_id);
                from_index += 1;
            } else {
                self.added.push(to_id);
                to_index += 1;
            }
        }

        self.added.extend_from_slice(&to[to_index..]);
        self.removed.extend_from_slice(&from[from_index..]);

        log::trace!(
            "type id diff [{}] -> [{}]: added [{}], removed [{}], same [{}]",
            TypeIdList(from),
            TypeIdList(to),
            TypeIdList(&self.added),
            TypeIdList(&self.removed),
            TypeIdList(&self.same)
        );
    }

    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

pub fn diff(from: &[TypeId], to: &[TypeId]) -> TypeIdDiff {
    let mut result = TypeIdDiff::new();
    result.compute(from, to);
    result
}
