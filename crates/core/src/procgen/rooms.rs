//! Room shape generators.
//!
//! Each generator is independent of placement state: it produces a room in
//! its own local coordinate space, with a wall outline, per-side
//! connectable edges, and speculative exits. Placement translates the room
//! into level space later.

use std::collections::BTreeSet;

use crate::rng::Random;
use crate::types::{Cardinal, Pos, TileKind};

use super::flood::{find_outline, find_regions, flood_region, largest_region_index};
use super::grid::{CARDINAL_OFFSETS, Grid, bounding_extents, neighbour_count, points_to_grid};
use super::model::{ConnectableEdges, Exit, Room, RoomKind, RoomTile};

/// Degenerate-outline threshold for bite rooms: below this
/// outline-to-area ratio the shape is regenerated from scratch.
const BITE_MIN_OUTLINE_RATIO: f64 = 0.2;

pub(super) fn generate_room(random: &mut Random) -> Room {
    let generators: [fn(&mut Random) -> Room; 4] =
        [generate_circle_room, generate_rect_room, generate_bite_room, generate_overlap_room];
    let generate = *random.choose(&generators);
    generate(random)
}

/// Disk of cells strictly inside a radius, with an optional concentric
/// hole on larger radii.
pub(super) fn generate_circle_room(random: &mut Random) -> Room {
    let radius = random.int_between_biased(4, 15, 3.0);
    let center = Pos::new(radius, radius);

    let hole_radius = random.between(2.0, f64::from(radius) / 2.0).floor();
    let carve_hole = radius > 6 && random.coin_flip();

    let mut points = Vec::new();
    for y in 0..radius * 2 {
        for x in 0..radius * 2 {
            let pos = Pos::new(x, y);
            let dist = center.euclidean(pos);
            if dist < f64::from(radius) && !(carve_hole && dist <= hole_radius) {
                points.push(pos);
            }
        }
    }

    let outline = find_outline(&points);
    let outline_grid = points_to_grid(&outline);
    // Isolated single cells on an extreme side cannot host a doorway.
    let connectable =
        |p: Pos| neighbour_count(&outline_grid, p, &CARDINAL_OFFSETS) >= 1;

    let connectable_edges = connectable_edges_from_outline(&outline, connectable);
    finish_room(points, outline, connectable_edges, RoomKind::Circle, random)
}

/// Plain rectangle; the four corners are excluded from the connectable
/// edges because no interior lies directly behind them.
pub(super) fn generate_rect_room(random: &mut Random) -> Room {
    let height = random.int_between_biased(4, 16, 3.4);
    let width = random.int_between_biased(4, 26, 1.6);

    let mut points = Vec::new();
    let mut outline = Vec::new();
    for y in 0..=height {
        for x in 0..=width {
            let pos = Pos::new(x, y);
            if x == 0 || x == width || y == 0 || y == height {
                outline.push(pos);
            }
            points.push(pos);
        }
    }

    let is_corner = |p: Pos| (p.x == 0 || p.x == width) && (p.y == 0 || p.y == height);
    let connectable_edges = connectable_edges_from_outline(&outline, |p| !is_corner(p));
    finish_room(points, outline, connectable_edges, RoomKind::Rect, random)
}

/// Rectangle eroded by random "bites" walked inward from the outline.
/// Keeps the largest surviving region, prunes hanging walls, and retries
/// the whole shape when the outline computation degenerates.
pub(super) fn generate_bite_room(random: &mut Random) -> Room {
    loop {
        if let Some(room) = try_generate_bite_room(random) {
            return room;
        }
    }
}

fn try_generate_bite_room(random: &mut Random) -> Option<Room> {
    let height = random.int_between(8, 16);
    let width = random.int_between(8, 16);

    let mut points = Vec::new();
    let mut grid = Grid::filled(width as usize, height as usize, false);
    for y in 0..height {
        for x in 0..width {
            points.push(Pos::new(x, y));
            grid[Pos::new(x, y)] = true;
        }
    }

    let mut outline = find_outline(&points);
    let mut bite = *random.choose(&outline);

    let tiles_to_eat = random.int_between(5, (height * width) / 2);
    let mut tiles_eaten = 0;

    'eating: while tiles_eaten < tiles_to_eat {
        let this_round = (tiles_to_eat - tiles_eaten).min(random.int_between(1, 10));
        for _ in 0..this_round {
            points.retain(|&p| p != bite);
            outline.retain(|&p| p != bite);
            grid[bite] = false;
            tiles_eaten += 1;

            // Walk to a still-filled neighbour to continue the scar.
            let mut found = false;
            for step in random.shuffled(&CARDINAL_OFFSETS) {
                let next = bite + step;
                if grid.get(next).copied().unwrap_or(false) {
                    bite = next;
                    found = true;
                    break;
                }
            }
            if !found {
                break 'eating;
            }
        }

        if outline.is_empty() {
            break;
        }
        bite = *random.choose(&outline);
    }

    let mut outline = find_outline(&points);

    // Erosion can split the shape; only the largest fragment survives.
    let mut regions = find_regions(&grid);
    let largest_index = largest_region_index(&regions)?;
    let largest = regions.swap_remove(largest_index);

    let outline_set: BTreeSet<Pos> = outline.iter().copied().collect();
    let interior: Vec<Pos> =
        largest.into_iter().filter(|p| !outline_set.contains(p)).collect();

    // Prune walls that no longer connect to the interior.
    let hanging: BTreeSet<Pos> = outline
        .iter()
        .copied()
        .filter(|&wall| {
            let mut with_wall = interior.clone();
            with_wall.push(wall);
            let grid = points_to_grid(&with_wall);
            flood_region(&grid, wall, &CARDINAL_OFFSETS).len() != interior.len() + 1
        })
        .collect();
    outline.retain(|p| !hanging.contains(p));

    let mut points = outline.clone();
    points.extend(&interior);

    // Known imprecision in the outline computation, detected by ratio.
    let ratio = outline.len() as f64 / points.len() as f64;
    if ratio < BITE_MIN_OUTLINE_RATIO {
        return None;
    }

    let connectable_edges = connectable_edges_from_outline(&outline, |_| true);
    Some(finish_room(points, outline, connectable_edges, RoomKind::Bite, random))
}

/// Union of two offset rectangles, guaranteed to intersect.
pub(super) fn generate_overlap_room(random: &mut Random) -> Room {
    let width_a = random.int_between(4, 12);
    let height_a = random.int_between(4, 10);
    let width_b = random.int_between(4, 12);
    let height_b = random.int_between(4, 10);

    // Offsets bounded by the first rect's extents keep the union connected.
    let offset = Pos::new(random.int_between(1, width_a), random.int_between(1, height_a));

    let mut cells = BTreeSet::new();
    for y in 0..=height_a {
        for x in 0..=width_a {
            cells.insert(Pos::new(x, y));
        }
    }
    for y in 0..=height_b {
        for x in 0..=width_b {
            cells.insert(Pos::new(x, y) + offset);
        }
    }
    let points: Vec<Pos> = cells.into_iter().collect();

    let outline = find_outline(&points);
    let outline_set: BTreeSet<Pos> = outline.iter().copied().collect();
    let interior: Vec<Pos> =
        points.iter().copied().filter(|p| !outline_set.contains(p)).collect();
    let interior_grid = points_to_grid(&interior);
    let connectable =
        |p: Pos| neighbour_count(&interior_grid, p, &CARDINAL_OFFSETS) >= 1;

    let connectable_edges = connectable_edges_from_outline(&outline, connectable);
    finish_room(points, outline, connectable_edges, RoomKind::Overlap, random)
}

fn finish_room(
    points: Vec<Pos>,
    outline: Vec<Pos>,
    connectable_edges: ConnectableEdges,
    kind: RoomKind,
    random: &mut Random,
) -> Room {
    let outline_set: BTreeSet<Pos> = outline.iter().copied().collect();
    let tiles = points
        .iter()
        .map(|&pos| RoomTile {
            pos,
            kind: if outline_set.contains(&pos) { TileKind::Wall } else { TileKind::Floor },
        })
        .collect();
    let (max_width, max_height) = bounding_extents(&points);

    let mut room = Room {
        tiles,
        exits: exits_from_edges(&connectable_edges, random),
        outline,
        connectable_edges,
        max_width,
        max_height,
        kind,
    };

    // Shapes are drawn in arbitrary local coordinates (a circle starts at
    // its centre minus the radius, erosion can strip a bite room's lowest
    // rows). Anchor at the origin so tiles span exactly [0, extent] on
    // both axes.
    if let Some(&first) = points.first() {
        let min = points
            .iter()
            .fold(first, |m, &p| Pos::new(m.x.min(p.x), m.y.min(p.y)));
        if min != Pos::new(0, 0) {
            room.translate(Pos::new(-min.x, -min.y));
        }
    }
    room
}

/// For each side with a non-empty edge, a coin flip decides whether that
/// side gets one speculative exit at a uniformly chosen edge cell.
fn exits_from_edges(edges: &ConnectableEdges, random: &mut Random) -> Vec<Exit> {
    let mut exits = Vec::new();
    for cardinal in Cardinal::ALL {
        let points = edges.get(cardinal);
        if !points.is_empty() && random.coin_flip() {
            exits.push(Exit { pos: *random.choose(points), cardinal });
        }
    }
    exits
}

fn connectable_edges_from_outline<F>(outline: &[Pos], keep: F) -> ConnectableEdges
where
    F: Fn(Pos) -> bool,
{
    ConnectableEdges {
        north: extreme_cells(outline, |p| -p.y).into_iter().filter(|&p| keep(p)).collect(),
        south: extreme_cells(outline, |p| p.y).into_iter().filter(|&p| keep(p)).collect(),
        east: extreme_cells(outline, |p| p.x).into_iter().filter(|&p| keep(p)).collect(),
        west: extreme_cells(outline, |p| -p.x).into_iter().filter(|&p| keep(p)).collect(),
    }
}

/// All cells maximizing the given axis key, in input order.
fn extreme_cells<F>(points: &[Pos], key: F) -> Vec<Pos>
where
    F: Fn(Pos) -> i32,
{
    let mut best = i32::MIN;
    let mut found = Vec::new();
    for &p in points {
        let v = key(p);
        if v > best {
            best = v;
            found = vec![p];
        } else if v == best {
            found.push(p);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_positions(room: &Room) -> BTreeSet<Pos> {
        room.tiles.iter().map(|t| t.pos).collect()
    }

    #[test]
    fn rect_room_corners_never_appear_in_any_connectable_edge() {
        for seed in 0..50u64 {
            let mut random = Random::from_seed(seed);
            let room = generate_rect_room(&mut random);
            let width = room.max_width;
            let height = room.max_height;
            let corners = [
                Pos::new(0, 0),
                Pos::new(width, 0),
                Pos::new(0, height),
                Pos::new(width, height),
            ];
            for cardinal in Cardinal::ALL {
                for corner in corners {
                    assert!(
                        !room.connectable_edges.get(cardinal).contains(&corner),
                        "corner {corner:?} leaked into {cardinal:?} edge (seed {seed})"
                    );
                }
            }
        }
    }

    #[test]
    fn rect_room_extents_match_the_drawn_ranges() {
        let mut random = Random::from_seed(11);
        let room = generate_rect_room(&mut random);
        assert!((4..16).contains(&room.max_height));
        assert!((4..26).contains(&room.max_width));
        assert_eq!(
            room.tiles.len() as i32,
            (room.max_width + 1) * (room.max_height + 1)
        );
    }

    #[test]
    fn circle_room_tiles_stay_strictly_inside_the_radius_square() {
        for seed in 0..20u64 {
            let mut random = Random::from_seed(seed);
            let room = generate_circle_room(&mut random);
            assert!(room.max_width < 30 && room.max_height < 30);
            assert!(!room.outline.is_empty());
            let positions = tile_positions(&room);
            for wall in &room.outline {
                assert!(positions.contains(wall), "outline cell not part of tiles");
            }
        }
    }

    #[test]
    fn bite_room_outline_ratio_meets_the_validity_threshold() {
        for seed in 0..20u64 {
            let mut random = Random::from_seed(seed);
            let room = generate_bite_room(&mut random);
            let ratio = room.outline.len() as f64 / room.tiles.len() as f64;
            assert!(
                ratio >= BITE_MIN_OUTLINE_RATIO,
                "degenerate bite room escaped the retry loop (seed {seed})"
            );
        }
    }

    #[test]
    fn bite_room_tiles_form_a_single_connected_region() {
        for seed in 0..20u64 {
            let mut random = Random::from_seed(seed);
            let room = generate_bite_room(&mut random);
            let positions: Vec<Pos> = room.tiles.iter().map(|t| t.pos).collect();
            let grid = points_to_grid(&positions);
            let reached = flood_region(&grid, positions[0], &CARDINAL_OFFSETS);
            assert_eq!(reached.len(), positions.len(), "fragmented bite room (seed {seed})");
        }
    }

    #[test]
    fn overlap_room_edges_always_back_onto_interior_cells() {
        for seed in 0..20u64 {
            let mut random = Random::from_seed(seed);
            let room = generate_overlap_room(&mut random);
            let floors: BTreeSet<Pos> = room.floor_tiles().map(|t| t.pos).collect();
            for cardinal in Cardinal::ALL {
                for &edge in room.connectable_edges.get(cardinal) {
                    let has_interior_neighbour = CARDINAL_OFFSETS
                        .iter()
                        .any(|&d| floors.contains(&(edge + d)));
                    assert!(
                        has_interior_neighbour,
                        "edge cell {edge:?} has no interior behind it (seed {seed})"
                    );
                }
            }
        }
    }

    #[test]
    fn exits_always_lie_on_the_matching_connectable_edge() {
        for seed in 0..30u64 {
            let mut random = Random::from_seed(seed);
            let room = generate_room(&mut random);
            for exit in &room.exits {
                assert!(
                    room.connectable_edges.get(exit.cardinal).contains(&exit.pos),
                    "exit {exit:?} detached from its edge (seed {seed})"
                );
            }
        }
    }

    #[test]
    fn every_generator_anchors_tiles_at_the_origin() {
        // Circle rooms are drawn around (radius, radius) and bite erosion
        // can eat a rectangle's lowest rows, so anchoring must hold for
        // every shape, not just rects.
        for seed in 0..150u64 {
            let mut random = Random::from_seed(seed);
            let room = generate_room(&mut random);
            let min_x = room.tiles.iter().map(|t| t.pos.x).min().unwrap();
            let min_y = room.tiles.iter().map(|t| t.pos.y).min().unwrap();
            assert_eq!((min_x, min_y), (0, 0), "room drawn off the origin (seed {seed})");
        }
    }

    #[test]
    fn every_generator_reports_extents_of_the_final_point_set() {
        for seed in 0..20u64 {
            let mut random = Random::from_seed(seed);
            let room = generate_room(&mut random);
            let positions: Vec<Pos> = room.tiles.iter().map(|t| t.pos).collect();
            assert_eq!(
                bounding_extents(&positions),
                (room.max_width, room.max_height)
            );
        }
    }
}
