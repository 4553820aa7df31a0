mod common;

use common::{base_record, block_file, plain_block, Fixture};
use glam::{Quat, Vec2, Vec3};
use zone_editor::error::DecodeError;
use zone_editor::formats::zmo::{self, ChannelFlags, ChannelKind, ChannelValue};
use zone_editor::formats::zms::{self, VertexFormat};
use zone_editor::formats::{chr, ifo, stb, stl, tileset, zon, ByteReader, TextEncoding};
use zone_editor::scene::{Category, PlacementExtra};

fn euc_kr() -> TextEncoding {
    TextEncoding::euc_kr()
}

#[test]
fn zstring_keeps_embedded_nuls_and_consumes_declared_length() {
    let longest = "x".repeat(255);
    for text in ["", "tree", "a\0b\0", "\0\0\0", longest.as_str()] {
        let bytes = Fixture::new().zstring(text).u8(0xEE).finish();
        let mut reader = ByteReader::new(&bytes, euc_kr());
        assert_eq!(reader.read_zstring().expect("zstring"), text);
        assert_eq!(reader.offset(), text.len() + 1);
        assert_eq!(reader.read_u8().expect("sentinel"), 0xEE);
    }
}

#[test]
fn zstring_decodes_legacy_code_page() {
    let encoded = euc_kr().encode("주점");
    let bytes = Fixture::new().u8(encoded.len() as u8).raw(&encoded).finish();
    let mut reader = ByteReader::new(&bytes, euc_kr());
    assert_eq!(reader.read_zstring().expect("zstring"), "주점");
    assert_eq!(reader.remaining(), 0);
}

fn mesh_fixture(format: VertexFormat, trailing_faces: bool) -> Vec<u8> {
    let mut out = Fixture::new();
    out.cstring("ZMS0008").u32(format.bits()).vec3(Vec3::splat(-1.0)).vec3(Vec3::splat(1.0));
    out.u16(1).i16(4);
    out.u16(3);
    let positions = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
    for position in positions {
        out.vec3(position);
    }
    if format.contains(VertexFormat::NORMAL) {
        for _ in 0..3 {
            out.vec3(Vec3::Z);
        }
    }
    if format.contains(VertexFormat::COLOR) {
        out.raw(&[0xFF; 16 * 3]);
    }
    if format.contains(VertexFormat::SKIN) {
        out.raw(&[0xAB; 24 * 3]);
    }
    if format.contains(VertexFormat::TANGENT) {
        out.raw(&[0xFF; 12 * 3]);
    }
    for (set, flag) in VertexFormat::UV_SETS.into_iter().enumerate() {
        if format.contains(flag) {
            for vertex in 0..3 {
                out.vec2(set as f32, vertex as f32);
            }
        }
    }
    if trailing_faces {
        out.u16(1).u16(0).u16(1).u16(2);
    }
    out.finish()
}

#[test]
fn mesh_skin_block_is_skipped_before_uvs_and_faces() {
    let format = VertexFormat::POSITION | VertexFormat::NORMAL | VertexFormat::SKIN | VertexFormat::UV1;
    let mesh = zms::decode(&mesh_fixture(format, true), euc_kr()).expect("decode mesh");
    assert_eq!(mesh.bones, vec![4]);
    assert_eq!(mesh.vertices.len(), 3);
    assert!(mesh.vertices.iter().all(|vertex| vertex.normal == Vec3::Z));
    assert_eq!(mesh.vertices[2].uv0, Vec2::new(0.0, 2.0));
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.triangle_count(), 1);

    let truncated = mesh_fixture(format, false);
    assert!(matches!(zms::decode(&truncated, euc_kr()), Err(DecodeError::OutOfRange { .. })));
}

#[test]
fn mesh_color_and_tangent_blocks_are_skipped() {
    let format = VertexFormat::POSITION
        | VertexFormat::NORMAL
        | VertexFormat::COLOR
        | VertexFormat::SKIN
        | VertexFormat::TANGENT
        | VertexFormat::UV1;
    let bytes = mesh_fixture(format, true);
    let mesh = zms::decode(&bytes, euc_kr()).expect("decode mesh");
    assert!(mesh.vertices.iter().all(|vertex| vertex.normal == Vec3::Z));
    assert_eq!(mesh.vertices[1].uv0, Vec2::new(0.0, 1.0));
    assert_eq!(mesh.indices, vec![0, 1, 2]);

    let tangent_only = VertexFormat::POSITION | VertexFormat::TANGENT | VertexFormat::UV1;
    let mesh = zms::decode(&mesh_fixture(tangent_only, true), euc_kr()).expect("decode mesh");
    assert_eq!(mesh.vertices[2].uv0, Vec2::new(0.0, 2.0));
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn mesh_with_half_a_skin_pair_skips_nothing() {
    for half in [VertexFormat::BLEND_WEIGHT, VertexFormat::BLEND_INDEX] {
        let format = VertexFormat::POSITION | half | VertexFormat::UV1;
        let bytes = mesh_fixture(format, true);
        let mesh = zms::decode(&bytes, euc_kr()).expect("decode mesh");
        assert_eq!(mesh.vertices[1].uv0, Vec2::new(0.0, 1.0));
        assert_eq!(mesh.indices, vec![0, 1, 2]);

        let mut skinned = mesh_fixture(VertexFormat::POSITION | VertexFormat::SKIN | VertexFormat::UV1, true);
        skinned[8..12].copy_from_slice(&format.bits().to_le_bytes());
        assert!(zms::decode(&skinned, euc_kr()).is_err(), "{half:?} alone must not skip skin data");
    }
}

#[test]
fn mesh_extra_uv_sets_collapse_into_secondary_field() {
    let format =
        VertexFormat::POSITION | VertexFormat::UV1 | VertexFormat::UV2 | VertexFormat::UV3 | VertexFormat::UV4;
    let mesh = zms::decode(&mesh_fixture(format, true), euc_kr()).expect("decode mesh");
    assert_eq!(mesh.format.uv_set_count(), 4);
    assert_eq!(mesh.vertices[1].uv0, Vec2::new(0.0, 1.0));
    assert_eq!(mesh.vertices[1].uv1, Vec2::new(3.0, 1.0));
    assert_eq!(mesh.vertices[1].normal, Vec3::ZERO);
}

#[test]
fn mesh_rejects_wrong_magic() {
    let bytes = Fixture::new().cstring("ZMO0002").u32(0).finish();
    assert!(matches!(zms::decode(&bytes, euc_kr()), Err(DecodeError::BadMagic { .. })));
}

#[test]
fn inactive_character_consumes_only_its_flag() {
    let mut out = Fixture::new();
    out.u16(1).cstring("skel/male.zmd");
    out.u16(2).cstring("motion/idle.zmo").cstring("motion/walk.zmo");
    out.u16(0);
    out.u16(7);
    for index in 0..7u16 {
        if index == 5 {
            out.u8(0);
            continue;
        }
        out.u8(1).u16(0).cstring(&format!("npc{index}"));
        out.u16(2).u16(index).u16(index + 100);
        out.u16(1).u16(1).u16(1);
        out.u16(0);
    }
    let list = chr::decode(&out.finish(), euc_kr()).expect("decode chr");
    assert_eq!(list.characters.len(), 7);

    let inactive = &list.characters[5];
    assert!(!inactive.active);
    assert!(inactive.models.is_empty() && inactive.motions.is_empty() && inactive.effects.is_empty());
    assert!(list.character(5).is_none());

    let next = list.character(6).expect("entry after the inactive one");
    assert_eq!(next.name, "npc6");
    assert_eq!(next.models, vec![6, 106]);
    assert_eq!(list.motion_path(next.motions[0]), Some("motion/walk.zmo"));
    assert_eq!(list.skeleton_path(next), Some("skel/male.zmd"));
}

fn motion_fixture(tags: &[u32], frames: usize) -> Vec<u8> {
    let mut out = Fixture::new();
    out.cstring("ZMO0002").i32(30).i32(frames as i32).i32(tags.len() as i32);
    for (bone, tag) in tags.iter().enumerate() {
        out.u32(*tag).i32(bone as i32);
    }
    for frame in 0..frames {
        for tag in tags {
            let v = frame as f32;
            match *tag {
                t if t == ChannelFlags::POSITION.bits() => {
                    out.vec3(Vec3::new(100.0 * v, 200.0, 300.0));
                }
                t if t == ChannelFlags::ROTATION.bits() => {
                    out.f32(1.0).f32(0.0).f32(0.0).f32(0.0);
                }
                t if t == ChannelFlags::ALPHA.bits() => {
                    out.f32(0.5);
                }
                _ => {
                    out.vec2(v, v);
                }
            }
        }
    }
    out.finish()
}

#[test]
fn motion_frames_follow_channel_order() {
    let tags = [ChannelFlags::POSITION.bits(), ChannelFlags::ROTATION.bits(), ChannelFlags::ALPHA.bits()];
    let clip = zmo::decode(&motion_fixture(&tags, 2), euc_kr()).expect("decode motion");
    assert_eq!(clip.fps, 30);
    assert_eq!(clip.frames.len(), 2);
    assert_eq!(clip.channels[1].kind, ChannelKind::Rotation);
    assert_eq!(clip.presence(), ChannelFlags::POSITION | ChannelFlags::ROTATION | ChannelFlags::ALPHA);
    assert_eq!(clip.value(1, 0), Some(&ChannelValue::Position(Vec3::new(100.0, 200.0, 300.0))));
    assert_eq!(clip.value(0, 1), Some(&ChannelValue::Rotation(Quat::IDENTITY)));
    assert_eq!(clip.value(1, 2), Some(&ChannelValue::Alpha(0.5)));
}

#[test]
fn camera_motion_remaps_first_two_position_tracks() {
    let position = ChannelFlags::POSITION.bits();
    let tags = [position, position, position];
    let clip = zmo::decode_camera(&motion_fixture(&tags, 1), euc_kr()).expect("decode camera");
    let expected = Vec3::new(5200.0, 3.0, -5202.0);
    assert_eq!(clip.value(0, 0), Some(&ChannelValue::Position(expected)));
    assert_eq!(clip.value(0, 1), Some(&ChannelValue::Position(expected)));
    assert_eq!(clip.value(0, 2), Some(&ChannelValue::Position(Vec3::new(0.0, 200.0, 300.0))));
}

#[test]
fn motion_with_unknown_channel_fails() {
    let bytes = motion_fixture(&[1 << 12], 0);
    assert!(matches!(zmo::decode(&bytes, euc_kr()), Err(DecodeError::Unsupported { value: 4096, .. })));
}

#[test]
fn placement_file_decodes_typed_blocks() {
    let decorations = plain_block(&[("tree", 3, Vec3::new(5200.0, 5100.0, 10.0)), ("rock", 8, Vec3::ZERO)]);

    let mut sounds = Fixture::new();
    sounds.i32(1);
    base_record(&mut sounds, "fountain", 0, Vec3::ONE);
    sounds.zstring("sound/water.wav").i32(40).i32(5);

    let mut monsters = Fixture::new();
    monsters.i32(1);
    base_record(&mut monsters, "camp", 0, Vec3::ZERO);
    monsters.zstring("orc camp").i32(2);
    monsters.zstring("grunt").i32(101).i32(3).zstring("archer").i32(102).i32(1);
    monsters.i32(1).zstring("chief").i32(110).i32(1);
    monsters.i32(60).i32(12).i32(800).i32(50);

    let mut water = Fixture::new();
    water.f32(2.5).i32(1).vec3(Vec3::new(0.0, 0.0, -1.0)).vec3(Vec3::new(10.0, 10.0, 1.0));

    let bytes = block_file(&[
        (0, vec![0; 8]),
        (1, decorations),
        (4, sounds.finish()),
        (8, monsters.finish()),
        (9, water.finish()),
        (42, Vec::new()),
    ]);
    let file = ifo::decode(&bytes, euc_kr()).expect("decode ifo");
    assert_eq!(file.entry_count(), 5);
    assert_eq!(file.skipped_blocks, vec![0, 42]);

    let decorations = file.entries(Category::Decoration);
    assert_eq!(decorations[1].description, "rock");
    assert_eq!(decorations[1].origin.local, 1);
    assert_eq!(decorations[0].object_id, 3);
    assert_eq!(decorations[0].event_id, 7);
    assert_eq!(decorations[0].map_cell, glam::IVec2::new(31, 30));

    let sound = &file.entries(Category::Sound)[0];
    assert_eq!(
        sound.extra,
        PlacementExtra::Sound { path: "sound/water.wav".into(), range: 40, interval: 5 }
    );

    let PlacementExtra::Monster(spawn) = &file.entries(Category::Monster)[0].extra else {
        panic!("monster block should carry spawn data");
    };
    assert_eq!(spawn.name, "orc camp");
    assert_eq!(spawn.basic.len(), 2);
    assert_eq!(spawn.basic[1].monster_id, 102);
    assert_eq!(spawn.tactic[0].description, "chief");
    assert_eq!((spawn.interval, spawn.limit, spawn.range, spawn.tactic_points), (60, 12, 800, 50));

    assert_eq!(file.water_width, 2.5);
    let plane = &file.entries(Category::Water)[0];
    assert_eq!(plane.placement.position, Vec3::new(5.0, 5.0, 0.0));
}

#[test]
fn repeated_category_block_continues_the_first() {
    let bytes = block_file(&[
        (1, plain_block(&[("tree", 3, Vec3::ZERO)])),
        (4, plain_block(&[])),
        (1, plain_block(&[("rock", 8, Vec3::ONE), ("bush", 9, Vec3::ONE)])),
    ]);
    let file = ifo::decode(&bytes, euc_kr()).expect("decode ifo");
    assert_eq!(file.blocks.len(), 2);
    let decorations = file.entries(Category::Decoration);
    let names: Vec<&str> = decorations.iter().map(|entry| entry.description.as_str()).collect();
    assert_eq!(names, vec!["tree", "rock", "bush"]);
    let locals: Vec<usize> = decorations.iter().map(|entry| entry.origin.local).collect();
    assert_eq!(locals, vec![0, 1, 2]);
}

#[test]
fn truncated_placement_file_reports_offset() {
    let mut bytes = block_file(&[(1, plain_block(&[("tree", 3, Vec3::ZERO)]))]);
    bytes.truncate(bytes.len() - 6);
    match ifo::decode(&bytes, euc_kr()) {
        Err(DecodeError::OutOfRange { size, .. }) => assert_eq!(size, bytes.len()),
        other => panic!("expected out of range, got {other:?}"),
    }
}

#[test]
fn zone_file_decodes_info_and_spawn_points() {
    let mut info = Fixture::new();
    info.i32(1).i32(64).i32(64).i32(4).f32(250.0).i32(32).i32(31);
    let mut spawns = Fixture::new();
    spawns.i32(2).vec3(Vec3::new(1.0, 2.0, 3.0)).zstring("start").vec3(Vec3::ZERO).zstring("revive");
    let mut textures = Fixture::new();
    textures.i32(1).zstring("3ddata/terrain/grass.dds");
    let mut tiles = Fixture::new();
    tiles.i32(1);
    for value in 0..7 {
        tiles.i32(value);
    }
    let bytes =
        block_file(&[(0, info.finish()), (1, spawns.finish()), (2, textures.finish()), (3, tiles.finish())]);
    let zone = zon::decode(&bytes, euc_kr()).expect("decode zon");
    assert_eq!(zone.info.grid_size, 250.0);
    assert_eq!(zone.info.start_cell, glam::IVec2::new(32, 31));
    assert_eq!(zone.spawn_points[1].name, "revive");
    assert_eq!(zone.textures, vec!["3ddata/terrain/grass.dds".to_string()]);
    assert_eq!(zone.tiles[0].rotation, 5);
}

#[test]
fn string_table_lookup_by_row_and_key() {
    let keys = [("ITEM_001", 1), ("ITEM_002", 2)];
    let mut out = Fixture::new();
    out.zstring("ITST01").i32(keys.len() as i32);
    for (key, id) in keys {
        out.var_string(key).i32(id);
    }
    out.i32(1);
    let language_slot = out.len();
    out.u32(0);

    let table_start = out.len() as u32;
    out.patch_u32(language_slot, table_start);
    let entry_slots: Vec<usize> = (0..keys.len()).map(|index| table_start as usize + index * 4).collect();
    out.u32(0).u32(0);
    let long_comment = "c".repeat(200);
    let texts = [("Sword", "sharp"), ("Shield", long_comment.as_str())];
    for (slot, (text, comment)) in entry_slots.into_iter().zip(texts) {
        let offset = out.len() as u32;
        out.patch_u32(slot, offset);
        out.var_string(text).var_string(comment);
    }

    let table = stl::decode(&out.finish(), euc_kr()).expect("decode stl");
    assert_eq!(table.kind, stl::StringTableKind::Item);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.text("ITEM_002", 0), Some("Shield"));
    assert_eq!(table.get(0, 0).and_then(|entry| entry.comment.as_deref()), Some("sharp"));
    assert_eq!(table.lookup("ITEM_002", 0).and_then(|entry| entry.comment.as_ref()).map(String::len), Some(200));
    assert!(table.text("ITEM_404", 0).is_none());
}

#[test]
fn tile_set_builds_from_structured_table() {
    let text = "NAME\tMIN\tMAX\tT1\tC1\tT2\tC2\tT3\tC3\tDIR\tB0\tB1\r\n\
                grass\t0\t3\t0\t4\t4\t4\t8\t4\t0\t1\t2\r\n\
                dirt\t4\t7\t12\t4\t\t\t\t\t1\t2\t1\r\n";
    let table = stb::decode(text.as_bytes(), euc_kr()).expect("decode stb");
    let tiles = tileset::TileSet::from_table(&table).expect("tile set");
    assert_eq!(tiles.brush_count(), 2);
    assert_eq!(tiles.brushes[1].tiles[1].count, 0);
    assert_eq!(tiles.chain(0, 1), Some(2));
    assert_eq!(tiles.chain(1, 0), Some(2));
    assert_eq!(tiles.brush_for_tile(13), Some(1));

    let bad = "NAME\tMIN\r\nrock\tfive\r\n";
    let table = stb::decode(bad.as_bytes(), euc_kr()).expect("decode stb");
    assert!(matches!(table.int(0, 1), Err(DecodeError::CellParse { .. })));
}
