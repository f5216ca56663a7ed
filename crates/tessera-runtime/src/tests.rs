use super::*;
use tessera_world::{ChunkCoord, TilePos, WorldGeometry};

fn geometry() -> WorldGeometry {
    WorldGeometry::new(128, 64, 32)
}

#[test]
fn bounds_cover_the_view_rectangle() {
    let b = LoadBounds::around(TilePos::new(64, 32), 40, 40, geometry());
    assert_eq!(b, LoadBounds { x: 0..4, y: 0..2 });
}

#[test]
fn bounds_left_of_origin_wrap() {
    let g = geometry();
    let b = LoadBounds::around(TilePos::new(10, 10), 40, 8, g);
    assert_eq!(b, LoadBounds { x: -1..2, y: 0..1 });
    assert!(b.contains(ChunkCoord::new(3, 0), g));
    assert!(b.contains(ChunkCoord::new(1, 0), g));
    assert!(!b.contains(ChunkCoord::new(2, 0), g));
    assert!(!b.contains(ChunkCoord::new(0, 1), g));

    let scan = b.scan(g);
    let coords: Vec<_> = scan.iter().map(|(c, _)| *c).collect();
    assert_eq!(coords, vec![ChunkCoord::new(1, 0), ChunkCoord::new(0, 0), ChunkCoord::new(3, 0)]);
    // unwrapped origin keeps the chunk on the view's side
    assert_eq!(scan[2].1, TilePos::new(-32, 0));
}

#[test]
fn bounds_wider_than_world_scan_each_chunk_once() {
    let g = geometry();
    let b = LoadBounds::around(TilePos::new(64, 32), 300, 0, g);
    assert!(b.x.end - b.x.start > g.chunks_x());
    assert_eq!(b.scan(g).len(), (g.chunks_x() * (b.y.end - b.y.start)) as usize);
    assert!((0..4).all(|cx| b.contains(ChunkCoord::new(cx, 1), g)));
}

#[test]
fn session_config_reads_flat_world_tables() {
    let cfg = SessionConfig::from_toml_str(
        r#"
        [world]
        width = 256
        seed = 42

        [terrain]
        bedrock_depth = 4

        [lighting]
        penetration_back = 2.0

        [streaming]
        workers = 0
        horizontal_radius = 10
        "#,
    )
    .unwrap();
    assert_eq!(cfg.worldgen.world.width, 256);
    assert_eq!(cfg.worldgen.world.height, 512);
    assert_eq!(cfg.worldgen.world.seed, Some(42));
    assert_eq!(cfg.worldgen.terrain.bedrock_depth, 4);
    assert_eq!(cfg.lighting.penetration_back, 2.0);
    assert_eq!(cfg.lighting.penetration, 4.0);
    assert_eq!(cfg.streaming.workers, 0);
    assert_eq!(cfg.streaming.horizontal_radius, 10);
    assert_eq!(cfg.streaming.vertical_radius, 48);
}

#[test]
fn negative_radius_is_rejected() {
    let mut s = StreamingConfig::default();
    assert!(s.validate().is_ok());
    s.vertical_radius = -1;
    assert!(matches!(s.validate(), Err(SessionError::NegativeStreaming { what: "vertical radius", .. })));
}
