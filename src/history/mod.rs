use crate::scene::{Category, WorldCollections};

mod command;

pub use command::{Command, CommandKind, ObjectRef};

pub const HISTORY_CAPACITY: usize = 100;

/// Linear undo history with a fixed number of slots.
///
/// Slots `0..=current` are undoable, slots after `current` are redoable until the next
/// append discards them. Used slots always form a contiguous prefix.
#[derive(Debug, Clone)]
pub struct CommandLog {
    slots: Vec<Option<Command>>,
    current: Option<usize>,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLog {
    pub fn new() -> Self {
        Self { slots: vec![None; HISTORY_CAPACITY], current: None }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the most recently applied command, `None` when nothing is left to undo.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn len(&self) -> usize {
        self.slots.iter().take_while(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.slots.get(index)?.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.slots.iter().map_while(Option::as_ref)
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.get(self.next_slot()).is_some()
    }

    pub fn undo_label(&self) -> Option<String> {
        self.current.and_then(|current| self.get(current)).map(Command::label)
    }

    pub fn redo_label(&self) -> Option<String> {
        self.get(self.next_slot()).map(Command::label)
    }

    fn next_slot(&self) -> usize {
        self.current.map_or(0, |current| current + 1)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.current = None;
    }

    /// Installs `command` after `current`. Redoable entries are discarded; when every
    /// slot is in use the oldest entry is evicted.
    pub fn append(&mut self, command: Command) {
        let capacity = self.slots.len();
        if self.current == Some(capacity - 1) {
            if let Some(evicted) = &self.slots[0] {
                log::debug!("[history] full; evicting {} to append {}", evicted.label(), command.label());
            }
            self.slots.rotate_left(1);
            self.slots[capacity - 1] = Some(command);
            return;
        }
        let next = self.next_slot();
        for slot in &mut self.slots[next..] {
            *slot = None;
        }
        log::debug!("[history] append {} at {next}", command.label());
        self.slots[next] = Some(command);
        self.current = Some(next);
    }

    pub(crate) fn undo(&mut self, world: &mut WorldCollections) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let mut command = self.slots[current].take().expect("undoable slots are contiguous");
        log::debug!("[history] undo {} at {current}", command.label());
        command.undo(world, self);
        self.slots[current] = Some(command);
        self.current = current.checked_sub(1);
        true
    }

    pub(crate) fn redo(&mut self, world: &mut WorldCollections) -> bool {
        let next = self.next_slot();
        let Some(mut command) = self.slots.get_mut(next).and_then(Option::take) else {
            return false;
        };
        log::debug!("[history] redo {} at {next}", command.label());
        self.current = Some(next);
        command.redo(world, self);
        self.slots[next] = Some(command);
        true
    }

    /// A `category` object left its list. Targets for which `shifted` holds moved down one
    /// slot.
    pub(crate) fn repair_removed(&mut self, category: Category, shifted: impl Fn(&ObjectRef) -> bool) {
        for target in self.targets_mut(category) {
            if shifted(target) {
                target.object_id -= 1;
            }
        }
    }

    /// An object was inserted into `category`. Targets for which `shifted` holds moved up
    /// one slot.
    pub(crate) fn repair_inserted(&mut self, category: Category, shifted: impl Fn(&ObjectRef) -> bool) {
        for target in self.targets_mut(category) {
            if shifted(target) {
                target.object_id += 1;
            }
        }
    }

    fn targets_mut(&mut self, category: Category) -> impl Iterator<Item = &mut ObjectRef> {
        self.slots.iter_mut().flatten().map(Command::target_mut).filter(move |target| target.category == category)
    }
}
