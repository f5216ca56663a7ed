use std::collections::BTreeSet;

use proptest::prelude::*;
use tessera_blocks::{BlockCatalog, TileType};
use tessera_chunk::{ChunkState, Layer, Rgb};
use tessera_lighting::LightKind;
use tessera_runtime::{SessionConfig, StreamEvent, WorldSession};
use tessera_world::{ChunkCoord, TilePos};

fn config(width: i32, height: i32) -> SessionConfig {
    let mut c = SessionConfig::default();
    c.worldgen.world.width = width;
    c.worldgen.world.height = height;
    c.worldgen.world.chunk_size = 32;
    c.worldgen.world.seed = Some(42);
    c.worldgen.terrain.bedrock_depth = 4;
    c.streaming.workers = 0;
    c.streaming.generation_seed = Some(7);
    c.streaming.horizontal_radius = 40;
    c.streaming.vertical_radius = 40;
    c
}

fn session(c: SessionConfig, view: TilePos) -> WorldSession {
    let mut s = WorldSession::new(c, BlockCatalog::builtin().unwrap()).unwrap();
    s.set_view(view);
    s.settle();
    s
}

/// Every tile and color of the loaded world.
fn snapshot(s: &WorldSession) -> Vec<(TileType, TileType, Option<Rgb>)> {
    let g = s.geometry();
    let mut out = Vec::new();
    for y in 0..g.height {
        for x in 0..g.width {
            let p = TilePos::new(x, y);
            out.push((s.tile_type(p, Layer::Front), s.tile_type(p, Layer::Back), s.tile_color(p)));
        }
    }
    out
}

fn loaded(events: &[StreamEvent]) -> BTreeSet<ChunkCoord> {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::ChunkLoaded(c) => Some(*c),
            _ => None,
        })
        .collect()
}

#[test]
fn settle_loads_and_lights_the_view() {
    let mut s = session(config(128, 64), TilePos::new(64, 32));
    assert_eq!(s.chunks().len(), 8);
    assert!(s.chunks().iter().all(|c| c.state == ChunkState::Ready));
    assert_eq!(s.store().len(), 8);
    assert_eq!(loaded(&s.drain_events()).len(), 8);
    assert!(s.is_idle());
    assert!(!s.lights().registry().is_empty());
    // open sky above the surface is lit by ambient light along the terrain
    let x = 5;
    let surface = s.profile().surface_height(x);
    assert!(s.tile_color(TilePos::new(x, surface)).is_some_and(|c| !c.is_black()));
}

#[test]
fn ticking_streams_in_over_several_ticks() {
    let mut s = WorldSession::new(config(128, 64), BlockCatalog::builtin().unwrap()).unwrap();
    s.set_view(TilePos::new(64, 32));
    s.tick(0.1);
    assert_eq!(s.chunks().len(), 8);
    assert!(s.chunks().iter().all(|c| c.state != ChunkState::Ready));
    let mut ticks = 0;
    while !s.is_idle() && ticks < 100_000 {
        s.tick(0.1);
        ticks += 1;
    }
    assert!(ticks > 1);
    assert!(s.chunks().iter().all(|c| c.state == ChunkState::Ready));
}

#[test]
fn reload_from_store_reproduces_tiles_and_light() {
    let mut s = session(config(128, 64), TilePos::new(64, 32));
    let before = snapshot(&s);
    s.drain_events();

    s.clear_all_chunks();
    assert!(s.chunks().is_empty());
    assert!(s.lights().registry().is_empty());
    let unloaded = s.drain_events().iter().filter(|e| matches!(e, StreamEvent::ChunkUnloaded(_))).count();
    assert_eq!(unloaded, 8);

    s.settle();
    assert_eq!(snapshot(&s), before);
}

#[test]
fn positions_past_the_edge_wrap() {
    let s = session(config(128, 64), TilePos::new(64, 32));
    for (x, y) in [(0, 20), (5, 40), (127, 30)] {
        let a = TilePos::new(x, y);
        let b = TilePos::new(x + 128, y);
        let c = TilePos::new(x - 128, y);
        assert_eq!(s.tile_type(a, Layer::Front), s.tile_type(b, Layer::Front));
        assert_eq!(s.tile_type(a, Layer::Back), s.tile_type(c, Layer::Back));
        assert_eq!(s.tile_color(a), s.tile_color(b));
    }
}

#[test]
fn edits_survive_unloading() {
    let mut s = session(config(128, 64), TilePos::new(64, 32));
    let x = 5;
    let p = TilePos::new(x, s.profile().surface_height(x));
    let tile = s.tile_type(p, Layer::Front);
    assert!(!tile.is_air());
    assert_eq!(s.break_block(p, Layer::Front), Ok(s.catalog().drop_for(tile)));

    s.clear_all_chunks();
    s.settle();
    assert_eq!(s.tile_type(p, Layer::Front), TileType::Air);
    assert_eq!(s.stored_tile(p, Layer::Front), TileType::Air);
}

#[test]
fn placed_lights_come_back_on_reload() {
    let mut s = session(config(128, 64), TilePos::new(64, 32));
    let p = (0..32)
        .map(|x| TilePos::new(x, s.profile().surface_height(x) + 1))
        .find(|&p| s.tile_type(p, Layer::Front).is_air())
        .expect("an open tile above the surface");
    s.place_block(p, Layer::Back, TileType::Torch).unwrap();
    assert_eq!(s.tile_type(p, Layer::Front), TileType::Torch);

    s.clear_all_chunks();
    assert!(s.lights().registry().is_empty());
    s.settle();
    let id = s.lights().light_at(s.chunks(), p).expect("torch light restored");
    assert_eq!(s.lights().registry().get(id).map(|l| l.kind), Some(LightKind::Placed));
    assert!(s.tile_color(p).is_some_and(|c| c.r >= 0.99));
}

#[test]
fn moving_away_unloads_and_detaches() {
    let mut s = session(config(512, 64), TilePos::new(64, 32));
    assert_eq!(s.chunks().len(), 8);
    s.drain_events();

    s.set_view(TilePos::new(320, 32));
    s.settle();
    let events = s.drain_events();
    let unloaded: BTreeSet<_> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::ChunkUnloaded(c) => Some(*c),
            _ => None,
        })
        .collect();
    assert_eq!(unloaded, (0..4).flat_map(|cx| (0..2).map(move |cy| ChunkCoord::new(cx, cy))).collect());
    assert_eq!(loaded(&events).len(), 8);
    assert!(s.chunks().coords().all(|c| (8..12).contains(&c.cx)));
    assert!(
        s.lights()
            .registry()
            .iter()
            .all(|(_, l)| l.owner.is_some_and(|c| (8..12).contains(&c.cx)))
    );
    // the store keeps what was unloaded
    assert_eq!(s.store().len(), 16);
}

#[test]
fn threaded_generation_matches_inline() {
    let inline = session(config(128, 64), TilePos::new(64, 32));
    let mut c = config(128, 64);
    c.streaming.workers = 2;
    let threaded = session(c, TilePos::new(64, 32));
    assert_eq!(snapshot(&inline), snapshot(&threaded));
}

#[test]
fn saved_world_continues_where_it_left_off() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(config(128, 64), TilePos::new(64, 32));
    let p = TilePos::new(9, s.profile().surface_height(9));
    s.break_block(p, Layer::Front).unwrap();
    s.save(dir.path()).unwrap();

    let mut other = config(128, 64);
    other.worldgen.world.seed = Some(999);
    let mut t = WorldSession::from_save(other, BlockCatalog::builtin().unwrap(), dir.path()).unwrap();
    assert_eq!(t.seed(), 42);
    assert_eq!(t.store().len(), 8);
    t.set_view(TilePos::new(64, 32));
    t.settle();
    assert_eq!(t.tile_type(p, Layer::Front), TileType::Air);
    let tiles = |s: &WorldSession| snapshot(s).into_iter().map(|(f, b, _)| (f, b)).collect::<Vec<_>>();
    assert_eq!(tiles(&t), tiles(&s));
}

#[test]
fn missing_save_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let s = WorldSession::from_save(config(128, 64), BlockCatalog::builtin().unwrap(), &dir.path().join("none")).unwrap();
    assert_eq!(s.seed(), 42);
    assert!(s.store().is_empty());
}

#[test]
fn structure_stays_complete_until_edited() {
    let mut c = config(128, 128);
    c.streaming.vertical_radius = 80;
    let mut s = session(c, TilePos::new(64, 64));
    assert_eq!(s.chunks().len(), 16);
    let anchor = s.structure_anchor().expect("structure fits this world");
    assert!(s.structure_complete());
    assert!(s.set_tile(anchor, Layer::Front, TileType::Bedrock));
    assert!(!s.structure_complete());
}

#[test]
fn display_color_shades_back_and_ignores_disabled_lighting() {
    let mut s = session(config(128, 64), TilePos::new(64, 32));
    let x = 5;
    let p = TilePos::new(x, s.profile().surface_height(x));
    let color = s.tile_color(p).unwrap();
    assert_eq!(s.display_color(p, Layer::Front), Some(color));
    assert_eq!(s.display_color(p, Layer::Back), Some(color.scale(0.6)));

    let mut lighting = s.config().lighting.clone();
    lighting.enabled = false;
    s.set_lighting_config(lighting).unwrap();
    assert_eq!(s.display_color(p, Layer::Front), Some(Rgb::WHITE));

    let mut bad = s.config().lighting.clone();
    bad.penetration = 0.0;
    assert!(s.set_lighting_config(bad).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    // After settling, exactly the chunks of the load rectangle are live and lit.
    #[test]
    fn live_chunks_match_load_bounds(x in -600i32..600, y in 0i32..64) {
        let s = session(config(512, 64), TilePos::new(x, y));
        let g = s.geometry();
        let c = s.config().streaming.clone();
        let bounds = tessera_runtime::LoadBounds::around(TilePos::new(x, y), c.horizontal_radius, c.vertical_radius, g);
        let expected: BTreeSet<_> = bounds.scan(g).into_iter().map(|(c, _)| c).collect();
        let live: BTreeSet<_> = s.chunks().coords().collect();
        prop_assert_eq!(live, expected);
        prop_assert!(s.chunks().iter().all(|c| c.state == ChunkState::Ready));
    }
}
