mod collection;
mod entry;
pub mod loader;

pub use collection::{Aabb, ModelBounds, ObjectHandle, WorldCollection, WorldCollections, WorldObject};
pub use entry::{Category, EntryOrigin, MonsterSpawn, Placement, PlacementEntry, PlacementExtra, SpawnTuple};
pub use loader::{load_scene, LoadedScene, SceneLoadHandle, SceneLoadRequest, SceneLoader};

use crate::formats::lit::LightmapFile;
use crate::history::{Command, CommandLog, ObjectRef};
use glam::{IVec2, Vec3};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFileKind {
    Placement { map_cell: IVec2 },
    Zone,
}

/// A decoded source file; `EntryOrigin::file` indexes into the context's file list.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFile {
    pub path: PathBuf,
    pub kind: SceneFileKind,
}

/// Working copy of a property panel edit. Created by [`SceneContext::begin_edit`] and
/// applied through [`SceneContext::commit_edit`], which records the matching command.
#[derive(Debug, Clone)]
pub struct EditSession {
    target: ObjectRef,
    before: PlacementEntry,
    pub entry: PlacementEntry,
}

impl EditSession {
    pub fn category(&self) -> Category {
        self.target.category
    }

    pub fn before(&self) -> &PlacementEntry {
        &self.before
    }

    pub fn is_dirty(&self) -> bool {
        !self.before.same_values(&self.entry)
    }
}

/// One open scene document: its source files, the live per-category collections and the
/// undo history over them.
#[derive(Debug, Clone, Default)]
pub struct SceneContext {
    files: Vec<SceneFile>,
    world: WorldCollections,
    history: CommandLog,
}

impl SceneContext {
    pub fn new(models: ModelBounds) -> Self {
        Self { files: Vec::new(), world: WorldCollections::new(models), history: CommandLog::new() }
    }

    pub fn from_loaded(scene: LoadedScene, models: ModelBounds) -> Self {
        let mut context = Self::new(models);
        for cell in scene.cells {
            let file = context.files.len();
            let kind = SceneFileKind::Placement { map_cell: cell.map_cell };
            context.files.push(SceneFile { path: cell.path, kind });
            for block in cell.placements.blocks {
                let lightmaps = match block.category {
                    Category::Decoration => cell.object_lightmaps.as_ref(),
                    Category::Construction => cell.building_lightmaps.as_ref(),
                    _ => None,
                };
                for mut entry in block.entries {
                    entry.origin.file = file;
                    context.push_loaded(block.category, entry, lightmaps);
                }
            }
        }
        if let Some((path, zone)) = scene.zone {
            let file = context.files.len();
            context.files.push(SceneFile { path, kind: SceneFileKind::Zone });
            for (local, spawn) in zone.spawn_points.into_iter().enumerate() {
                let mut entry = PlacementEntry { description: spawn.name, ..PlacementEntry::default() };
                entry.placement.position = spawn.position;
                entry.origin = EntryOrigin { file, local };
                context.push_loaded(Category::SpawnPoint, entry, None);
            }
        }
        log::info!(
            "[scene] context ready: {} files, {} objects",
            context.files.len(),
            context.world.total_len()
        );
        context
    }

    fn push_loaded(&mut self, category: Category, entry: PlacementEntry, lightmaps: Option<&LightmapFile>) {
        let local = entry.origin.local;
        let mut object = self.world.build(category, entry);
        if let Some(parts) = lightmaps.and_then(|file| file.parts_for(local)) {
            object.lightmaps = parts.to_vec();
        }
        self.world.push_loaded(category, object);
    }

    pub fn files(&self) -> &[SceneFile] {
        &self.files
    }

    pub fn file_for_cell(&self, cell: IVec2) -> Option<usize> {
        self.files.iter().position(|file| file.kind == SceneFileKind::Placement { map_cell: cell })
    }

    pub fn world(&self) -> &WorldCollections {
        &self.world
    }

    pub fn collection(&self, category: Category) -> &WorldCollection {
        self.world.get(category)
    }

    pub fn history(&self) -> &CommandLog {
        &self.history
    }

    /// Registers model bounds and recomputes every object's bounding volume.
    pub fn register_model(&mut self, category: Category, object_id: i32, bounds: Aabb) {
        self.world.models_mut().register(category, object_id, bounds);
        self.world.refresh_all();
    }

    /// Appends `entry` to its category list without recording a command. The entry takes
    /// the next local slot of its origin file.
    pub fn add(&mut self, category: Category, mut entry: PlacementEntry) -> usize {
        entry.origin.local = self.world.next_local(category, entry.origin.file);
        let index = self.world.get(category).len();
        self.add_at(category, index, entry, false)
    }

    /// Inserts `entry` at `index`, or with `reindex_only` overwrites the existing slot and
    /// recomputes its derived data without a structural edit.
    pub fn add_at(
        &mut self,
        category: Category,
        index: usize,
        entry: PlacementEntry,
        reindex_only: bool,
    ) -> usize {
        if reindex_only {
            let replaced = self.world.replace(category, index, entry);
            assert!(replaced, "reindex of {category} slot {index} which does not exist");
            return index;
        }
        let object = self.world.build(category, entry);
        self.world.insert(category, index, object, &mut self.history);
        index
    }

    /// Removes the object at `index`. Unless the history itself is driving the removal, a
    /// `Removed` command is pushed before the list changes.
    pub fn remove_at(
        &mut self,
        category: Category,
        index: usize,
        undo_originated: bool,
    ) -> Option<PlacementEntry> {
        let target = self.world.target(category, index)?;
        if !undo_originated {
            let snapshot = self.world.get(category).get(index).cloned().map(Box::new);
            self.history.append(Command::Removed { target, detached: snapshot });
        }
        let object = self.world.take(category, index, &mut self.history);
        log::debug!("[scene] removed {category} {index} ({} left)", self.world.get(category).len());
        Some(object.entry)
    }

    /// Empties one category. Recorded commands may point into it, so the history is reset.
    pub fn clear(&mut self, category: Category) {
        self.world.clear(category);
        self.world.forget_detached();
        self.history.clear();
        log::info!("[scene] cleared {category}; history reset");
    }

    /// Adds a new object at the end of its list and records `Added`.
    pub fn place(&mut self, category: Category, entry: PlacementEntry) -> usize {
        let index = self.add(category, entry);
        if let Some(target) = self.world.target(category, index) {
            self.history.append(Command::Added { target, detached: None });
        }
        index
    }

    pub fn set_placement(&mut self, category: Category, index: usize, placement: Placement) -> bool {
        let Some((target, object)) = self.lookup(category, index) else {
            return false;
        };
        let old = object.entry.placement;
        if old == placement {
            return false;
        }
        self.world.modify(&target, |entry| entry.placement = placement);
        self.history.append(Command::Positioned { target, old, new: placement });
        true
    }

    pub fn edit_values(&mut self, category: Category, index: usize, values: PlacementEntry) -> bool {
        let Some((target, object)) = self.lookup(category, index) else {
            return false;
        };
        if object.entry.same_values(&values) {
            return false;
        }
        let old = Box::new(object.entry.clone());
        self.world.modify(&target, |entry| entry.assign_values(&values));
        self.history.append(Command::ValueChanged { target, old, new: Box::new(values) });
        true
    }

    /// Swaps the catalog model (or character) the object refers to.
    pub fn change_object(&mut self, category: Category, index: usize, object_id: i32) -> bool {
        let Some((target, object)) = self.lookup(category, index) else {
            return false;
        };
        let old = object.entry.object_id;
        if old == object_id {
            return false;
        }
        self.world.modify(&target, |entry| entry.object_id = object_id);
        self.history.append(Command::ObjectChanged { target, old, new: object_id });
        true
    }

    pub fn remove_lightmap(&mut self, category: Category, index: usize) -> bool {
        let Some(target) = self.world.target(category, index) else {
            return false;
        };
        let parts = std::mem::take(&mut self.world.resolve_mut(&target).lightmaps);
        if parts.is_empty() {
            return false;
        }
        self.history.append(Command::LightmapRemoved { target, parts });
        true
    }

    fn lookup(&self, category: Category, index: usize) -> Option<(ObjectRef, &WorldObject)> {
        let target = self.world.target(category, index)?;
        Some((target, self.world.get(category).get(index)?))
    }

    /// Records a command whose effect the caller has already applied.
    pub fn push(&mut self, command: Command) {
        self.history.append(command);
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.world)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.world)
    }

    pub fn select(&self, category: Category, index: usize) -> Option<&WorldObject> {
        self.world.get(category).get(index)
    }

    pub fn begin_edit(&self, category: Category, index: usize) -> Option<EditSession> {
        let (target, object) = self.lookup(category, index)?;
        Some(EditSession { target, before: object.entry.clone(), entry: object.entry.clone() })
    }

    /// Applies a finished edit session, recording `Positioned` when only the placement
    /// changed and `ValueChanged` otherwise. Returns false for an unchanged session or an
    /// object that has since been removed.
    pub fn commit_edit(&mut self, session: EditSession) -> bool {
        if !session.is_dirty() {
            return false;
        }
        let EditSession { target, before, entry } = session;
        let Some(object_id) = self.world.get(target.category).position_of(target.handle) else {
            return false;
        };
        let target = ObjectRef { object_id, ..target };
        let mut probe = entry.clone();
        probe.placement = before.placement;
        if before.same_values(&probe) {
            let (old, new) = (before.placement, entry.placement);
            self.world.modify(&target, |current| current.placement = new);
            self.history.append(Command::Positioned { target, old, new });
        } else {
            self.world.modify(&target, |current| current.assign_values(&entry));
            self.history.append(Command::ValueChanged { target, old: Box::new(before), new: Box::new(entry) });
        }
        true
    }

    pub fn pick(&self, origin: Vec3, direction: Vec3) -> Option<(Category, usize, f32)> {
        self.world.pick(origin, direction)
    }
}
