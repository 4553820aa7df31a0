use crate::error::LoadError;
use crate::formats::ifo::{self, PlacementFile};
use crate::formats::lit::{self, LightmapFile};
use crate::formats::zon::{self, ZoneFile};
use crate::formats::{self, TextEncoding};
use glam::IVec2;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

const LIGHTMAP_DIR: &str = "LIGHTMAP";
const OBJECT_LIGHTMAPS: &str = "OBJECTLIGHTMAPDATA.LIT";
const BUILDING_LIGHTMAPS: &str = "BUILDINGLIGHTMAPDATA.LIT";

#[derive(Debug, Clone)]
pub struct SceneLoadRequest {
    pub map_dir: PathBuf,
    pub zone: Option<PathBuf>,
    pub encoding: TextEncoding,
}

impl SceneLoadRequest {
    pub fn new(map_dir: impl Into<PathBuf>) -> Self {
        Self { map_dir: map_dir.into(), zone: None, encoding: TextEncoding::default() }
    }

    pub fn with_zone(mut self, zone: impl Into<PathBuf>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// One decoded map cell: its placement file plus the lightmap bindings stored beside it.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub map_cell: IVec2,
    pub placements: PlacementFile,
    pub object_lightmaps: Option<LightmapFile>,
    pub building_lightmaps: Option<LightmapFile>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedScene {
    pub cells: Vec<LoadedFile>,
    pub zone: Option<(PathBuf, ZoneFile)>,
}

impl LoadedScene {
    pub fn entry_count(&self) -> usize {
        let spawns = self.zone.as_ref().map_or(0, |(_, zone)| zone.spawn_points.len());
        self.cells.iter().map(|cell| cell.placements.entry_count()).sum::<usize>() + spawns
    }
}

/// Parses `<x>_<y>.ifo` (any case) into a map cell coordinate.
pub fn parse_cell_name(name: &str) -> Option<IVec2> {
    let (stem, extension) = name.rsplit_once('.')?;
    if !extension.eq_ignore_ascii_case("ifo") {
        return None;
    }
    let (x, y) = stem.split_once('_')?;
    Some(IVec2::new(x.parse().ok()?, y.parse().ok()?))
}

fn placement_files(map_dir: &Path) -> Result<Vec<(IVec2, PathBuf)>, LoadError> {
    let listing = fs::read_dir(map_dir).map_err(|err| LoadError::io(map_dir, err))?;
    let mut cells = Vec::new();
    for entry in listing {
        let entry = entry.map_err(|err| LoadError::io(map_dir, err))?;
        let path = entry.path();
        let Some(cell) = path.file_name().and_then(|name| name.to_str()).and_then(parse_cell_name) else {
            continue;
        };
        if path.is_file() {
            cells.push((cell, path));
        }
    }
    cells.sort_by_key(|(cell, _)| (cell.x, cell.y));
    Ok(cells)
}

fn optional_lightmaps(path: &Path, encoding: TextEncoding) -> Result<Option<LightmapFile>, LoadError> {
    if !path.is_file() {
        return Ok(None);
    }
    formats::load_with(path, encoding, lit::decode).map(Some)
}

/// Decodes every placement file under `request.map_dir`, their lightmaps, and the optional
/// zone file. The first failure aborts the whole load.
pub fn load_scene(request: &SceneLoadRequest) -> Result<LoadedScene, LoadError> {
    let encoding = request.encoding;
    let mut scene = LoadedScene::default();
    for (map_cell, path) in placement_files(&request.map_dir)? {
        let placements = formats::load_with(&path, encoding, ifo::decode)?;
        let lightmap_dir =
            request.map_dir.join(format!("{}_{}", map_cell.x, map_cell.y)).join(LIGHTMAP_DIR);
        let object_lightmaps = optional_lightmaps(&lightmap_dir.join(OBJECT_LIGHTMAPS), encoding)?;
        let building_lightmaps = optional_lightmaps(&lightmap_dir.join(BUILDING_LIGHTMAPS), encoding)?;
        log::debug!("[scene] decoded {} ({} entries)", path.display(), placements.entry_count());
        scene.cells.push(LoadedFile { path, map_cell, placements, object_lightmaps, building_lightmaps });
    }
    if let Some(zone_path) = &request.zone {
        let zone = formats::load_with(zone_path, encoding, zon::decode)?;
        scene.zone = Some((zone_path.clone(), zone));
    }
    log::info!(
        "[scene] loaded {} cells from {} ({} entries)",
        scene.cells.len(),
        request.map_dir.display(),
        scene.entry_count()
    );
    Ok(scene)
}

pub struct SceneLoader;

impl SceneLoader {
    /// Runs [`load_scene`] on a dedicated worker thread.
    pub fn spawn(request: SceneLoadRequest) -> Result<SceneLoadHandle, LoadError> {
        let (tx, rx) = mpsc::channel();
        let map_dir = request.map_dir.clone();
        thread::Builder::new()
            .name("scene-load".to_string())
            .spawn(move || {
                let result = load_scene(&request);
                if tx.send(result).is_err() {
                    log::warn!("[scene] load finished after its handle was dropped");
                }
            })
            .map_err(|err| LoadError::Io { path: map_dir, source: err })?;
        Ok(SceneLoadHandle { rx: Some(rx) })
    }
}

/// Completion side of a background load. Yields exactly one result.
pub struct SceneLoadHandle {
    rx: Option<mpsc::Receiver<Result<LoadedScene, LoadError>>>,
}

impl SceneLoadHandle {
    /// Returns the result once the worker has finished, `None` while it is still running
    /// or after the result was already taken.
    pub fn poll(&mut self) -> Option<Result<LoadedScene, LoadError>> {
        let rx = self.rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => Err(LoadError::WorkerLost),
        };
        self.rx = None;
        Some(result)
    }

    pub fn is_finished(&self) -> bool {
        self.rx.is_none()
    }

    pub fn wait(mut self) -> Result<LoadedScene, LoadError> {
        let rx = self.rx.take().ok_or(LoadError::WorkerLost)?;
        rx.recv().unwrap_or(Err(LoadError::WorkerLost))
    }
}
