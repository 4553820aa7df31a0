use anyhow::{anyhow, Context, Result};
use std::process;
use zone_editor::cli::CliOverrides;
use zone_editor::config::EditorConfig;
use zone_editor::formats::{self, chr, ifo, lit, stb, stl, tileset, zmo, zms, zon, TextEncoding};
use zone_editor::scene::{Category, SceneContext, SceneLoader};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliOverrides::parse_from_env()?;
    let mut config = match cli.config_path() {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let args = cli.positional().to_vec();
    let overrides = cli.into_config_overrides();
    if !overrides.is_empty() {
        log::info!("[config] overrides applied: {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);
    let encoding = config.encoding()?;

    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };
    let mut path_arg = |usage: &str| -> Result<String> {
        args.next().ok_or_else(|| anyhow!("{command} requires a path: scene_tool {command} {usage}"))
    };
    match command.as_str() {
        "ifo" => cmd_ifo(&config, &path_arg("<file.ifo>")?, encoding),
        "zon" => cmd_zon(&config, &path_arg("<file.zon>")?, encoding),
        "mesh" => cmd_mesh(&config, &path_arg("<file.zms>")?, encoding),
        "motion" => cmd_motion(&config, &path_arg("<file.zmo>")?, encoding, zmo::DecodeMode::Skeletal),
        "camera" => cmd_motion(&config, &path_arg("<file.zmo>")?, encoding, zmo::DecodeMode::Camera),
        "chr" => cmd_chr(&config, &path_arg("<list.chr>")?, encoding),
        "stb" => cmd_stb(&config, &path_arg("<table.stb>")?, encoding),
        "stl" => cmd_stl(&config, &path_arg("<strings.stl>")?, encoding),
        "tiles" => cmd_tiles(&config, &path_arg("<tileset.stb>")?, encoding),
        "lit" => cmd_lit(&config, &path_arg("<lightmaps.lit>")?, encoding),
        "load" => {
            let map_dir = path_arg("<map_dir> [zone.zon]")?;
            if let Some(zone) = args.next() {
                config.zone = Some(zone.into());
            }
            cmd_load(&config, &map_dir)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

fn print_usage() {
    eprintln!(
        "Scene Tool

Usage:
  scene_tool ifo <file.ifo>            List placement blocks and entries
  scene_tool zon <file.zon>            Show zone info, spawn points and tile textures
  scene_tool mesh <file.zms>           Show mesh format, bounds and counts
  scene_tool motion <file.zmo>         Show animation channels and frame count
  scene_tool camera <file.zmo>         Same as motion, with camera remapping
  scene_tool chr <list.chr>            List characters and their bindings
  scene_tool stb <table.stb>           Dump a structured table
  scene_tool stl <strings.stl>         Dump a localized string table
  scene_tool tiles <tileset.stb>       List tile brushes
  scene_tool lit <lightmaps.lit>       List lightmap bindings
  scene_tool load <map_dir> [zone]     Load a whole scene on the background worker
  scene_tool help                      Show this message

Flags:
  --config <file.json>  --data-root <dir>  --encoding <label>  --zone <file.zon>
"
    );
}

fn decode<T>(
    config: &EditorConfig,
    path: &str,
    encoding: TextEncoding,
    decoder: impl FnOnce(&[u8], TextEncoding) -> Result<T, zone_editor::DecodeError>,
) -> Result<T> {
    let path = config.resolve(path);
    formats::load_with(&path, encoding, decoder).with_context(|| format!("decoding '{}'", path.display()))
}

fn cmd_ifo(config: &EditorConfig, path: &str, encoding: TextEncoding) -> Result<()> {
    let file = decode(config, path, encoding, ifo::decode)?;
    for block in &file.blocks {
        println!("{} ({} entries)", block.category, block.entries.len());
        for (index, entry) in block.entries.iter().enumerate() {
            let p = entry.placement.position;
            println!(
                "  {:<4} id {:<6} ({:>10.2}, {:>10.2}, {:>10.2}) {}",
                index, entry.object_id, p.x, p.y, p.z, entry.description
            );
        }
    }
    if !file.skipped_blocks.is_empty() {
        println!("skipped blocks: {:?}", file.skipped_blocks);
    }
    Ok(())
}

fn cmd_zon(config: &EditorConfig, path: &str, encoding: TextEncoding) -> Result<()> {
    let zone = decode(config, path, encoding, zon::decode)?;
    let info = &zone.info;
    println!(
        "type {}  size {}x{}  grid {} x {:.1}  start cell ({}, {})",
        info.zone_type,
        info.width,
        info.height,
        info.grid_count,
        info.grid_size,
        info.start_cell.x,
        info.start_cell.y
    );
    for spawn in &zone.spawn_points {
        println!("  spawn '{}' at {:?}", spawn.name, spawn.position);
    }
    println!("{} tile textures, {} tiles", zone.textures.len(), zone.tiles.len());
    Ok(())
}

fn cmd_mesh(config: &EditorConfig, path: &str, encoding: TextEncoding) -> Result<()> {
    let mesh = decode(config, path, encoding, zms::decode)?;
    println!("format {:?}", mesh.format);
    println!("bounds {:?} .. {:?}", mesh.bounds.min, mesh.bounds.max);
    println!(
        "{} vertices, {} triangles, {} bones, {} uv sets",
        mesh.vertices.len(),
        mesh.triangle_count(),
        mesh.bones.len(),
        mesh.format.uv_set_count()
    );
    Ok(())
}

fn cmd_motion(config: &EditorConfig, path: &str, encoding: TextEncoding, mode: zmo::DecodeMode) -> Result<()> {
    let clip = decode(config, path, encoding, |bytes, encoding| zmo::decode_with_mode(bytes, encoding, mode))?;
    println!("{} fps, {} frames, {:.2}s", clip.fps, clip.frames.len(), clip.duration());
    for (index, channel) in clip.channels.iter().enumerate() {
        println!("  {:<4} {:?} bone {}", index, channel.kind, channel.bone);
    }
    Ok(())
}

fn cmd_chr(config: &EditorConfig, path: &str, encoding: TextEncoding) -> Result<()> {
    let list = decode(config, path, encoding, chr::decode)?;
    println!(
        "{} skeletons, {} motions, {} effects, {} characters",
        list.skeletons.len(),
        list.motions.len(),
        list.effects.len(),
        list.characters.len()
    );
    for (index, character) in list.characters.iter().enumerate().filter(|(_, entry)| entry.active) {
        println!(
            "  {:<5} {:<24} skeleton {:<32} models {:?} motions {}",
            index,
            character.name,
            list.skeleton_path(character).unwrap_or("-"),
            character.models,
            character.motions.len()
        );
    }
    Ok(())
}

fn cmd_stb(config: &EditorConfig, path: &str, encoding: TextEncoding) -> Result<()> {
    let table = decode(config, path, encoding, stb::decode)?;
    println!("{}", table.column_names().join(" | "));
    for row in table.rows() {
        println!("{}", row.join(" | "));
    }
    Ok(())
}

fn cmd_stl(config: &EditorConfig, path: &str, encoding: TextEncoding) -> Result<()> {
    let table = decode(config, path, encoding, stl::decode)?;
    println!("{:?}: {} rows, {} languages", table.kind, table.row_count(), table.language_count());
    for (row, key) in table.keys.iter().enumerate() {
        let text = table.get(row, 0).map(|entry| entry.text.as_str()).unwrap_or("");
        println!("  {:<5} {:<20} {}", key.id, key.key, text);
    }
    Ok(())
}

fn cmd_tiles(config: &EditorConfig, path: &str, encoding: TextEncoding) -> Result<()> {
    let table = decode(config, path, encoding, stb::decode)?;
    let tiles = tileset::TileSet::from_table(&table)
        .with_context(|| format!("building tile set from '{path}'"))?;
    for (index, brush) in tiles.brushes.iter().enumerate() {
        println!(
            "  {:<4} {:<20} brushes {}..{} direction {}",
            index, brush.label, brush.min_brush, brush.max_brush, brush.direction
        );
    }
    Ok(())
}

fn cmd_lit(config: &EditorConfig, path: &str, encoding: TextEncoding) -> Result<()> {
    let file = decode(config, path, encoding, lit::decode)?;
    for object in &file.objects {
        println!("object {} ({} parts)", object.object_id, object.parts.len());
        for part in &object.parts {
            println!("  {:<24} {} #{} @ {}", part.name, part.file, part.lightmap_index, part.part_position);
        }
    }
    println!("{} lightmap files", file.files.len());
    Ok(())
}

fn cmd_load(config: &EditorConfig, map_dir: &str) -> Result<()> {
    let request = config.scene_request(map_dir)?;
    let map_dir = request.map_dir.clone();
    let scene = SceneLoader::spawn(request)?
        .wait()
        .with_context(|| format!("loading scene '{}'", map_dir.display()))?;
    let context = SceneContext::from_loaded(scene, config.model_bounds());
    println!("{} files", context.files().len());
    for category in Category::ALL {
        let collection = context.collection(category);
        if !collection.is_empty() {
            println!("  {:<14} {}", category.label(), collection.len());
        }
    }
    Ok(())
}
