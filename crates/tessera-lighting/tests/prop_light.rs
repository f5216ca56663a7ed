use proptest::prelude::*;
use tessera_blocks::TileType;
use tessera_chunk::{Chunk, ChunkMap, Rgb};
use tessera_lighting::{LightEngine, LightKind, LightSource, LightingConfig};
use tessera_world::{ChunkCoord, TilePos, WorldGeometry};

const W: i32 = 32;

// 0: open air, 1 and 3: back only, 2: front and back
fn terrain() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, (W * W) as usize)
}

fn pos() -> impl Strategy<Value = TilePos> {
    (0..W, 0..W).prop_map(|(x, y)| TilePos::new(x, y))
}

fn eighths() -> impl Strategy<Value = Rgb> {
    (4u8..=8, 4u8..=8, 4u8..=8).prop_map(|(r, g, b)| Rgb::new(r as f32 / 8.0, g as f32 / 8.0, b as f32 / 8.0))
}

fn world(cells: &[u8]) -> ChunkMap {
    let g = WorldGeometry { width: W, height: W, chunk_size: 16 };
    let mut map = ChunkMap::new(g);
    for cy in 0..2 {
        for cx in 0..2 {
            let coord = ChunkCoord::new(cx, cy);
            let mut c = Chunk::new(coord, g.chunk_origin(coord), 16);
            c.settle_colors();
            map.insert(c);
        }
    }
    for y in 0..W {
        for x in 0..W {
            let p = TilePos::new(x, y);
            let cell = cells[(y * W + x) as usize];
            if cell != 0 {
                map.set_tile(p, tessera_chunk::Layer::Back, TileType::Dirt);
            }
            if cell == 2 {
                map.set_tile(p, tessera_chunk::Layer::Front, TileType::Stone);
            }
        }
    }
    map
}

fn field(map: &ChunkMap) -> Vec<Rgb> {
    (0..W * W).map(|i| map.tile_color(TilePos::new(i % W, i / W)).unwrap_or(Rgb::BLACK)).collect()
}

fn engine(penetration_back: f32) -> LightEngine {
    LightEngine::new(LightingConfig { penetration_back, ..LightingConfig::default() })
}

fn light(p: TilePos, color: Rgb) -> LightSource {
    LightSource::new(p, color, 1.0, LightKind::Placed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Uniform back-layer terrain: value drops one falloff per hop.
    #[test]
    fn falloff_is_monotonic_with_distance(src in pos(), pen in prop::sample::select(vec![2.0f32, 4.0, 8.0])) {
        let mut map = world(&vec![1u8; (W * W) as usize]);
        let mut e = engine(pen);
        e.create_light_source(&mut map, light(src, Rgb::WHITE), true);
        for y in 0..W {
            for x in 0..W {
                let dx = (x - src.x).rem_euclid(W);
                let d = dx.min(W - dx) + (y - src.y).abs();
                let v = map.tile_color(TilePos::new(x, y)).unwrap_or(Rgb::BLACK).r;
                prop_assert!((0.0..=1.0).contains(&v));
                prop_assert_eq!(v, (1.0 - d as f32 / pen).max(0.0));
            }
        }
    }

    // Every lit tile is explained by a brighter neighbor one falloff away.
    #[test]
    fn lit_tiles_have_a_brighter_parent(cells in terrain(), src in pos()) {
        let mut map = world(&cells);
        let e0 = engine(8.0);
        let (f, fb) = (e0.falloff(), e0.falloff_back());
        let mut e = e0;
        e.create_light_source(&mut map, light(src, Rgb::WHITE), true);
        let colors = field(&map);
        for y in 0..W {
            for x in 0..W {
                let p = TilePos::new(x, y);
                let v = colors[(y * W + x) as usize].g;
                if p == src || v <= 0.0 {
                    continue;
                }
                let cost = if cells[(y * W + x) as usize] == 2 { f } else { fb };
                let parent = p.neighbors().into_iter().any(|n| {
                    let n = TilePos::new(n.x.rem_euclid(W), n.y);
                    (0..W).contains(&n.y) && colors[(n.y * W + n.x) as usize].g >= v + cost
                });
                prop_assert!(parent, "({}, {}) = {}", x, y, v);
            }
        }
    }

    // Overlapping lights combine by channel-wise max, never by sum.
    #[test]
    fn overlapping_lights_take_the_max(cells in terrain(), a in pos(), b in pos(), ca in eighths(), cb in eighths()) {
        let alone = |p: TilePos, c: Rgb| {
            let mut map = world(&cells);
            engine(8.0).create_light_source(&mut map, light(p, c), true);
            field(&map)
        };
        let fa = alone(a, ca);
        let fb = alone(b, cb);
        let mut map = world(&cells);
        let mut e = engine(8.0);
        e.create_light_source(&mut map, light(a, ca), true);
        e.create_light_source(&mut map, light(b, cb), true);
        let both = field(&map);
        for i in 0..both.len() {
            prop_assert_eq!(both[i], fa[i].max(fb[i]));
        }
    }

    #[test]
    fn remove_then_reapply_restores_the_field(cells in terrain(), src in pos(), c in eighths()) {
        let mut map = world(&cells);
        let mut e = engine(8.0);
        let id = e.create_light_source(&mut map, light(src, c), true);
        let before = field(&map);
        e.remove_light_source(&mut map, id, true);
        prop_assert!(field(&map).iter().all(|c| *c == Rgb::BLACK));
        e.create_light_source(&mut map, light(src, c), true);
        prop_assert_eq!(field(&map), before);
    }

    #[test]
    fn smoothed_spread_matches_immediate(cells in terrain(), src in pos(), budget in 1usize..64) {
        let mut a = world(&cells);
        let mut ea = engine(8.0);
        ea.create_light_source(&mut a, light(src, Rgb::WHITE), true);

        let mut b = world(&cells);
        let mut eb = engine(8.0);
        let id = eb.create_light_source(&mut b, light(src, Rgb::WHITE), false);
        let mut task = eb.update_light_smooth(&mut b, id).expect("seeded");
        while !task.is_done() {
            task.step(&eb, &mut b, budget);
        }
        prop_assert_eq!(field(&a), field(&b));
    }
}
