use super::entry::{Category, PlacementEntry, PlacementExtra};
use crate::formats::lit::LightmapPart;
use crate::history::{CommandLog, ObjectRef};
use glam::{Mat4, Vec3};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    pub fn cube(half_extent: f32) -> Self {
        Self { min: Vec3::splat(-half_extent), max: Vec3::splat(half_extent) }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut any = false;
        for point in points {
            min = min.min(point);
            max = max.max(point);
            any = true;
        }
        if !any {
            return Self { min: Vec3::ZERO, max: Vec3::ZERO };
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self::from_points(self.corners().into_iter().map(|corner| matrix.transform_point3(corner)))
    }

    /// Slab test; returns the entry distance along `direction` when the ray hits.
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv = direction.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;
        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element();
        if near.is_nan() || far.is_nan() || far < near.max(0.0) {
            return None;
        }
        Some(near.max(0.0))
    }
}

/// Local-space bounds of catalog models, keyed by category and object id.
#[derive(Debug, Clone)]
pub struct ModelBounds {
    models: HashMap<(Category, i32), Aabb>,
    fallback: Aabb,
}

impl Default for ModelBounds {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ModelBounds {
    pub fn new(fallback_extent: f32) -> Self {
        Self { models: HashMap::new(), fallback: Aabb::cube(fallback_extent) }
    }

    pub fn register(&mut self, category: Category, object_id: i32, bounds: Aabb) {
        self.models.insert((category, object_id), bounds);
    }

    pub fn get(&self, category: Category, object_id: i32) -> Aabb {
        self.models.get(&(category, object_id)).copied().unwrap_or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Identity of a live world object; survives removal and reinsertion through undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub handle: ObjectHandle,
    pub entry: PlacementEntry,
    pub transform: Mat4,
    pub bounds: Aabb,
    pub lightmaps: Vec<LightmapPart>,
}

impl WorldObject {
    fn refresh(&mut self, category: Category, models: &ModelBounds) {
        self.transform = self.entry.placement.matrix();
        self.bounds = match &self.entry.extra {
            PlacementExtra::Water { min, max } => Aabb::new(*min, *max),
            _ => models.get(category, self.entry.object_id).transformed(&self.transform),
        };
    }
}

/// Ordered objects of one category. A position in this list is an object's index; it
/// only holds between structural edits.
///
/// `order` interleaves the live objects with the handles of removed ones, each left where
/// it was taken out. A detached object's index is the number of live objects ahead of it,
/// so two removals at the same index still reinsert in their original order.
#[derive(Debug, Clone)]
pub struct WorldCollection {
    category: Category,
    objects: Vec<WorldObject>,
    order: Vec<ObjectHandle>,
}

impl WorldCollection {
    pub fn new(category: Category) -> Self {
        Self { category, objects: Vec::new(), order: Vec::new() }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorldObject> {
        self.objects.get(index)
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.iter()
    }

    pub fn position_of(&self, handle: ObjectHandle) -> Option<usize> {
        self.objects.iter().position(|object| object.handle == handle)
    }

    /// Entries that came from `file`, in their file order.
    pub fn file_entries(&self, file: usize) -> Vec<&PlacementEntry> {
        let mut entries: Vec<&PlacementEntry> =
            self.objects.iter().map(|object| &object.entry).filter(|entry| entry.origin.file == file).collect();
        entries.sort_by_key(|entry| entry.origin.local);
        entries
    }

    fn next_local(&self, file: usize) -> usize {
        self.objects.iter().filter(|object| object.entry.origin.file == file).count()
    }

    fn rank(&self, handle: ObjectHandle) -> Option<usize> {
        self.order.iter().position(|other| *other == handle)
    }

    /// Whether `target` sits after order slot `rank`. Handles this list never held are
    /// left alone; resolving them fails later as a stale slot.
    fn follows(&self, target: &ObjectRef, rank: usize) -> bool {
        self.rank(target.handle).is_some_and(|other| other > rank)
    }

    /// Finds the order slot for an object about to become live at `index`. A detached
    /// object keeps its slot when that slot still lines up with `index`; anything else goes
    /// just ahead of the live object currently at `index`.
    fn order_slot(&mut self, index: usize, handle: ObjectHandle) -> usize {
        if let Some(rank) = self.rank(handle) {
            let live: HashSet<ObjectHandle> = self.objects.iter().map(|object| object.handle).collect();
            let ahead = self.order[..rank].iter().filter(|other| live.contains(*other)).count();
            if ahead == index {
                return rank;
            }
            self.order.remove(rank);
        }
        let rank = match self.objects.get(index) {
            Some(next) => self.rank(next.handle).expect("live objects are always ordered"),
            None => self.order.len(),
        };
        self.order.insert(rank, handle);
        rank
    }

    fn insert(&mut self, index: usize, object: WorldObject, log: &mut CommandLog) {
        assert!(index <= self.objects.len(), "insert at {index} past end of {} list", self.category);
        let origin = object.entry.origin;
        for other in self.objects.iter_mut() {
            if other.entry.origin.file == origin.file && other.entry.origin.local >= origin.local {
                other.entry.origin.local += 1;
            }
        }
        let rank = self.order_slot(index, object.handle);
        self.objects.insert(index, object);
        log.repair_inserted(self.category, |target| self.follows(target, rank));
    }

    fn take(&mut self, index: usize, log: &mut CommandLog) -> WorldObject {
        let object = self.objects.remove(index);
        let origin = object.entry.origin;
        for other in self.objects.iter_mut() {
            if other.entry.origin.file == origin.file && other.entry.origin.local > origin.local {
                other.entry.origin.local -= 1;
            }
        }
        let rank = self.rank(object.handle).expect("live objects are always ordered");
        log.repair_removed(self.category, |target| self.follows(target, rank));
        object
    }

    fn push(&mut self, object: WorldObject) -> usize {
        self.order.push(object.handle);
        self.objects.push(object);
        self.objects.len() - 1
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.order.clear();
    }

    fn forget_detached(&mut self) {
        let live: HashSet<ObjectHandle> = self.objects.iter().map(|object| object.handle).collect();
        self.order.retain(|handle| live.contains(handle));
    }
}

/// Every category's collection plus what is needed to derive object data.
#[derive(Debug, Clone)]
pub struct WorldCollections {
    collections: Vec<WorldCollection>,
    models: ModelBounds,
    next_handle: u64,
}

impl Default for WorldCollections {
    fn default() -> Self {
        Self::new(ModelBounds::default())
    }
}

impl WorldCollections {
    pub fn new(models: ModelBounds) -> Self {
        let collections = Category::ALL.iter().map(|category| WorldCollection::new(*category)).collect();
        Self { collections, models, next_handle: 1 }
    }

    pub fn get(&self, category: Category) -> &WorldCollection {
        &self.collections[category.index()]
    }

    pub fn models(&self) -> &ModelBounds {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut ModelBounds {
        &mut self.models
    }

    pub fn total_len(&self) -> usize {
        self.collections.iter().map(WorldCollection::len).sum()
    }

    pub fn target(&self, category: Category, index: usize) -> Option<ObjectRef> {
        let object = self.get(category).get(index)?;
        Some(ObjectRef { category, object_id: index, handle: object.handle })
    }

    pub fn next_local(&self, category: Category, file: usize) -> usize {
        self.get(category).next_local(file)
    }

    pub fn build(&mut self, category: Category, entry: PlacementEntry) -> WorldObject {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        let mut object = WorldObject {
            handle,
            entry,
            transform: Mat4::IDENTITY,
            bounds: Aabb::cube(0.0),
            lightmaps: Vec::new(),
        };
        object.refresh(category, &self.models);
        object
    }

    /// Appends without touching history; used while populating a freshly loaded scene.
    pub(crate) fn push_loaded(&mut self, category: Category, object: WorldObject) -> usize {
        self.collections[category.index()].push(object)
    }

    pub(crate) fn insert(
        &mut self,
        category: Category,
        index: usize,
        object: WorldObject,
        log: &mut CommandLog,
    ) {
        self.collections[category.index()].insert(index, object, log);
    }

    pub(crate) fn take(&mut self, category: Category, index: usize, log: &mut CommandLog) -> WorldObject {
        self.collections[category.index()].take(index, log)
    }

    /// Replaces the entry in place and recomputes derived data; not a structural edit.
    pub(crate) fn replace(&mut self, category: Category, index: usize, entry: PlacementEntry) -> bool {
        let collection = &mut self.collections[category.index()];
        let Some(object) = collection.objects.get_mut(index) else {
            return false;
        };
        object.entry = entry;
        object.refresh(category, &self.models);
        true
    }

    pub(crate) fn clear(&mut self, category: Category) {
        self.collections[category.index()].clear();
    }

    /// Drops the order slots of removed objects once no command can bring them back.
    pub(crate) fn forget_detached(&mut self) {
        self.collections.iter_mut().for_each(WorldCollection::forget_detached);
    }

    pub(crate) fn refresh_all(&mut self) {
        for collection in &mut self.collections {
            let category = collection.category;
            for object in &mut collection.objects {
                object.refresh(category, &self.models);
            }
        }
    }

    /// Resolves a command target, panicking when the slot no longer holds the object the
    /// command captured: that can only happen if index repair missed a structural edit.
    pub(crate) fn resolve_mut(&mut self, target: &ObjectRef) -> &mut WorldObject {
        let collection = &mut self.collections[target.category.index()];
        let holds =
            collection.objects.get(target.object_id).is_some_and(|object| object.handle == target.handle);
        assert!(
            holds,
            "{} command targets object {:?} at index {}, but that slot holds {:?} ({} objects)",
            target.category,
            target.handle,
            target.object_id,
            collection.objects.get(target.object_id).map(|object| object.handle),
            collection.objects.len()
        );
        &mut collection.objects[target.object_id]
    }

    pub(crate) fn modify(&mut self, target: &ObjectRef, edit: impl FnOnce(&mut PlacementEntry)) {
        let category = target.category;
        let models = &self.models;
        let collection = &mut self.collections[category.index()];
        let holds =
            collection.objects.get(target.object_id).is_some_and(|object| object.handle == target.handle);
        assert!(holds, "{} command targets a stale slot at index {}", category, target.object_id);
        let object = &mut collection.objects[target.object_id];
        edit(&mut object.entry);
        object.refresh(category, models);
    }

    pub(crate) fn remove_target(&mut self, target: &ObjectRef, log: &mut CommandLog) -> WorldObject {
        self.resolve_mut(target);
        self.take(target.category, target.object_id, log)
    }

    pub(crate) fn insert_target(&mut self, target: &ObjectRef, object: WorldObject, log: &mut CommandLog) {
        assert_eq!(object.handle, target.handle, "{} command reinserting a different object", target.category);
        self.insert(target.category, target.object_id, object, log);
    }

    pub fn pick(&self, origin: Vec3, direction: Vec3) -> Option<(Category, usize, f32)> {
        let mut best: Option<(Category, usize, f32)> = None;
        for collection in &self.collections {
            for (index, object) in collection.objects.iter().enumerate() {
                if let Some(distance) = object.bounds.ray_distance(origin, direction) {
                    if best.map_or(true, |(_, _, closest)| distance < closest) {
                        best = Some((collection.category, index, distance));
                    }
                }
            }
        }
        best
    }
}
