//! Corridor stitching between rooms that placement left unconnected.
//!
//! Nearby unconnected room pairs are ranked by a sampled taxicab
//! distance, and a random number of the closest pairs get a straight
//! corridor traced between their nearest floor tiles. The span between
//! the trace's first two wall crossings is carved to floor; a trace with
//! a single crossing skims a shared wall and is skipped.

use std::collections::BTreeSet;

use crate::rng::Random;
use crate::types::{Pos, TileKind};

use super::generator::GenEvent;
use super::model::LevelCell;
use super::placement::LevelBuilder;

struct CandidatePair {
    room_a: usize,
    room_b: usize,
    distance: u32,
}

pub(super) fn stitch_corridors(
    builder: &mut LevelBuilder,
    random: &mut Random,
    events: &mut Vec<GenEvent>,
) {
    if builder.rooms.len() < 2 {
        return;
    }

    let mut candidates = unconnected_pairs(builder, random);
    candidates.sort_by_key(|c| c.distance);

    let attempts = random.int_between(1, builder.rooms.len() as i32) as usize;
    for candidate in candidates.into_iter().take(attempts) {
        try_stitch_pair(builder, &candidate, events);
    }
}

/// Every unordered room pair without a recorded connection, with a
/// distance estimated from one random tile of each room.
fn unconnected_pairs(builder: &mut LevelBuilder, random: &mut Random) -> Vec<CandidatePair> {
    let mut pairs = Vec::new();
    for room_a in 0..builder.rooms.len() {
        for room_b in room_a + 1..builder.rooms.len() {
            let already_connected = builder.connections.iter().any(|c| {
                let joins_a = c.room_a == room_a || c.room_b == room_a;
                let joins_b = c.room_a == room_b || c.room_b == room_b;
                joins_a && joins_b
            });
            if already_connected {
                continue;
            }
            let sample_a = random.choose(&builder.rooms[room_a].tiles).pos;
            let sample_b = random.choose(&builder.rooms[room_b].tiles).pos;
            pairs.push(CandidatePair {
                room_a,
                room_b,
                distance: sample_a.taxicab(sample_b),
            });
        }
    }
    pairs
}

fn try_stitch_pair(builder: &mut LevelBuilder, pair: &CandidatePair, events: &mut Vec<GenEvent>) {
    let Some((start, end)) = closest_floor_tiles(builder, pair.room_a, pair.room_b) else {
        return;
    };
    let line = line_between(start, end);

    // The trace may only touch cells owned by the two rooms (or void),
    // and we need to know where it crosses their walls.
    let mut wall_indices = Vec::new();
    for (i, &pos) in line.iter().enumerate() {
        if let Some(cell) = &builder.grid[pos] {
            if cell.kind == TileKind::Wall {
                wall_indices.push(i);
            }
            let owns_a = cell.room_indices.contains(&pair.room_a);
            let owns_b = cell.room_indices.contains(&pair.room_b);
            if !(owns_a || owns_b) || cell.room_indices.len() > 2 {
                return;
            }
        }
    }

    match wall_indices.as_slice() {
        // Carve from the first crossing to the second. Crossings beyond
        // the second stay walls.
        &[first, second, ..] => {
            for &pos in &line[first..=second] {
                match &mut builder.grid[pos] {
                    Some(cell) => {
                        cell.kind = TileKind::Floor;
                        cell.room_indices = vec![pair.room_a, pair.room_b];
                    }
                    empty => {
                        *empty = Some(LevelCell {
                            kind: TileKind::Floor,
                            room_indices: vec![pair.room_a, pair.room_b],
                        });
                    }
                }
            }
        }
        // A single crossing means the trace skims a shared wall; carving
        // it would punch an unmatched hole.
        &[_] => events.push(GenEvent::CorridorSkippedSingleWall {
            room_a: pair.room_a,
            room_b: pair.room_b,
        }),
        &[] => {}
    }
}

/// The closest pair of interior tiles between two rooms, by taxicab
/// distance. Wall and door cells sit on the outline and never qualify.
fn closest_floor_tiles(builder: &LevelBuilder, room_a: usize, room_b: usize) -> Option<(Pos, Pos)> {
    let floors = |index: usize| -> Vec<Pos> {
        let room = &builder.rooms[index];
        let outline: BTreeSet<Pos> = room.outline.iter().copied().collect();
        room.tiles.iter().map(|t| t.pos).filter(|p| !outline.contains(p)).collect()
    };

    let floors_a = floors(room_a);
    let floors_b = floors(room_b);

    let mut best: Option<(Pos, Pos, u32)> = None;
    for &a in &floors_a {
        for &b in &floors_b {
            let distance = a.taxicab(b);
            if best.is_none_or(|(_, _, d)| distance < d) {
                best = Some((a, b, distance));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

/// Traces a cardinal-step line, at each step advancing whichever axis
/// has proportionally further to go. The half-cell nudge centres the
/// trace on the ideal segment.
pub(super) fn line_between(start: Pos, end: Pos) -> Vec<Pos> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    let nx = f64::from(dx.abs());
    let ny = f64::from(dy.abs());

    let sign_x = if dx > 0 { 1 } else { -1 };
    let sign_y = if dy > 0 { 1 } else { -1 };

    let mut points = vec![start];
    let mut p = start;
    let mut ix = 0.0;
    let mut iy = 0.0;

    const NUDGE: f64 = 0.5;

    while ix < nx || iy < ny {
        // Division by a zero extent yields infinity, which loses the
        // comparison and forces the other axis.
        let x_step = (NUDGE + ix) / nx;
        let y_step = (NUDGE + iy) / ny;

        if x_step < y_step {
            p.x += sign_x;
            ix += 1.0;
        } else {
            p.y += sign_y;
            iy += 1.0;
        }
        points.push(p);
    }

    points
}
