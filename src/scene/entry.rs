use glam::{IVec2, Mat4, Quat, Vec3};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Decoration,
    Construction,
    Npc,
    Monster,
    SpawnPoint,
    WarpGate,
    Sound,
    Effect,
    Collision,
    Water,
    Animation,
    EventTrigger,
}

impl Category {
    pub const COUNT: usize = 12;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Decoration,
        Category::Construction,
        Category::Npc,
        Category::Monster,
        Category::SpawnPoint,
        Category::WarpGate,
        Category::Sound,
        Category::Effect,
        Category::Collision,
        Category::Water,
        Category::Animation,
        Category::EventTrigger,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Decoration => "Decoration",
            Category::Construction => "Construction",
            Category::Npc => "NPC",
            Category::Monster => "Monster",
            Category::SpawnPoint => "Spawn Point",
            Category::WarpGate => "Warp Gate",
            Category::Sound => "Sound",
            Category::Effect => "Effect",
            Category::Collision => "Collision",
            Category::Water => "Water",
            Category::Animation => "Animation",
            Category::EventTrigger => "Event Trigger",
        }
    }

    /// Block tag used by placement files; spawn points live in the zone file instead.
    pub fn from_block(block: i32) -> Option<Self> {
        match block {
            1 => Some(Category::Decoration),
            2 => Some(Category::Npc),
            3 => Some(Category::Construction),
            4 => Some(Category::Sound),
            5 => Some(Category::Effect),
            6 => Some(Category::Animation),
            8 => Some(Category::Monster),
            9 => Some(Category::Water),
            10 => Some(Category::WarpGate),
            11 => Some(Category::Collision),
            12 => Some(Category::EventTrigger),
            _ => None,
        }
    }

    pub fn is_character(self) -> bool {
        matches!(self, Category::Npc | Category::Monster)
    }

    pub fn has_lightmaps(self) -> bool {
        matches!(self, Category::Decoration | Category::Construction)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which decoded file an entry came from and its slot inside that file's block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EntryOrigin {
    pub file: usize,
    pub local: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Placement {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnTuple {
    pub description: String,
    pub monster_id: i32,
    pub count: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonsterSpawn {
    pub name: String,
    pub basic: Vec<SpawnTuple>,
    pub tactic: Vec<SpawnTuple>,
    pub interval: i32,
    pub limit: i32,
    pub range: i32,
    pub tactic_points: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PlacementExtra {
    #[default]
    None,
    Npc {
        ai_pattern: i32,
        quest_file: String,
    },
    Sound {
        path: String,
        range: i32,
        interval: i32,
    },
    Effect {
        path: String,
    },
    Monster(MonsterSpawn),
    Event {
        function: String,
        conversation: String,
    },
    Water {
        min: Vec3,
        max: Vec3,
    },
}

/// One object placed in the scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementEntry {
    pub placement: Placement,
    pub map_cell: IVec2,
    pub object_type: i32,
    pub object_id: i32,
    pub description: String,
    pub warp_id: i16,
    pub event_id: i16,
    pub extra: PlacementExtra,
    pub origin: EntryOrigin,
}

impl PlacementEntry {
    pub fn water(min: Vec3, max: Vec3) -> Self {
        let mut entry = PlacementEntry { extra: PlacementExtra::Water { min, max }, ..Self::default() };
        entry.placement.position = (min + max) * 0.5;
        entry
    }

    /// Copies every editable field from `other`, leaving `origin` alone since it tracks
    /// list position rather than content.
    pub fn assign_values(&mut self, other: &PlacementEntry) {
        let origin = self.origin;
        *self = other.clone();
        self.origin = origin;
    }

    pub fn same_values(&self, other: &PlacementEntry) -> bool {
        let mut probe = other.clone();
        probe.origin = self.origin;
        *self == probe
    }
}
