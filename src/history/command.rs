use crate::formats::lit::LightmapPart;
use crate::scene::{Category, ObjectHandle, Placement, PlacementEntry, WorldCollections, WorldObject};

use super::CommandLog;

/// Where a command's object currently sits. `object_id` is rewritten by index repair
/// whenever another edit shifts the category's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRef {
    pub category: Category,
    pub object_id: usize,
    pub handle: ObjectHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Added,
    Removed,
    Positioned,
    ValueChanged,
    ObjectChanged,
    LightmapRemoved,
}

/// A reversible edit. Each variant keeps the old value for undo and the new value for redo.
///
/// `Added` and `Removed` hold the detached object while it is out of the list and
/// `None` while it is live.
#[derive(Debug, Clone)]
pub enum Command {
    Added { target: ObjectRef, detached: Option<Box<WorldObject>> },
    Removed { target: ObjectRef, detached: Option<Box<WorldObject>> },
    Positioned { target: ObjectRef, old: Placement, new: Placement },
    ValueChanged { target: ObjectRef, old: Box<PlacementEntry>, new: Box<PlacementEntry> },
    ObjectChanged { target: ObjectRef, old: i32, new: i32 },
    LightmapRemoved { target: ObjectRef, parts: Vec<LightmapPart> },
}

impl Command {
    pub fn target(&self) -> &ObjectRef {
        match self {
            Command::Added { target, .. }
            | Command::Removed { target, .. }
            | Command::Positioned { target, .. }
            | Command::ValueChanged { target, .. }
            | Command::ObjectChanged { target, .. }
            | Command::LightmapRemoved { target, .. } => target,
        }
    }

    pub(crate) fn target_mut(&mut self) -> &mut ObjectRef {
        match self {
            Command::Added { target, .. }
            | Command::Removed { target, .. }
            | Command::Positioned { target, .. }
            | Command::ValueChanged { target, .. }
            | Command::ObjectChanged { target, .. }
            | Command::LightmapRemoved { target, .. } => target,
        }
    }

    pub fn category(&self) -> Category {
        self.target().category
    }

    pub fn object_id(&self) -> usize {
        self.target().object_id
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Added { .. } => CommandKind::Added,
            Command::Removed { .. } => CommandKind::Removed,
            Command::Positioned { .. } => CommandKind::Positioned,
            Command::ValueChanged { .. } => CommandKind::ValueChanged,
            Command::ObjectChanged { .. } => CommandKind::ObjectChanged,
            Command::LightmapRemoved { .. } => CommandKind::LightmapRemoved,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind() {
            CommandKind::Added => "Added",
            CommandKind::Removed => "Removed",
            CommandKind::Positioned => "Positioned",
            CommandKind::ValueChanged => "Value Changed",
            CommandKind::ObjectChanged if self.category().is_character() => "Character Changed",
            CommandKind::ObjectChanged => "Object Changed",
            CommandKind::LightmapRemoved => "Lightmap Removed",
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.category().label(), self.name())
    }

    pub(crate) fn undo(&mut self, world: &mut WorldCollections, log: &mut CommandLog) {
        match self {
            Command::Added { target, detached } => {
                *detached = Some(Box::new(world.remove_target(target, log)));
            }
            Command::Removed { target, detached } => {
                let object = detached.take().expect("removed command holds its object while undone");
                world.insert_target(target, *object, log);
            }
            Command::Positioned { target, old, .. } => world.modify(target, |entry| entry.placement = *old),
            Command::ValueChanged { target, old, .. } => world.modify(target, |entry| entry.assign_values(old)),
            Command::ObjectChanged { target, old, .. } => world.modify(target, |entry| entry.object_id = *old),
            Command::LightmapRemoved { target, parts } => world.resolve_mut(target).lightmaps = parts.clone(),
        }
    }

    pub(crate) fn redo(&mut self, world: &mut WorldCollections, log: &mut CommandLog) {
        match self {
            Command::Added { target, detached } => {
                let object = detached.take().expect("added command holds its object while undone");
                world.insert_target(target, *object, log);
            }
            Command::Removed { target, detached } => {
                *detached = Some(Box::new(world.remove_target(target, log)));
            }
            Command::Positioned { target, new, .. } => world.modify(target, |entry| entry.placement = *new),
            Command::ValueChanged { target, new, .. } => world.modify(target, |entry| entry.assign_values(new)),
            Command::ObjectChanged { target, new, .. } => world.modify(target, |entry| entry.object_id = *new),
            Command::LightmapRemoved { target, .. } => world.resolve_mut(target).lightmaps.clear(),
        }
    }
}
