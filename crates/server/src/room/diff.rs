//! Building the per-tick network diff from the board's change lists.

use crate::entity::PlayerId;
use crate::powerup::PowerUpManager;
use crate::roster::Roster;
use crate::shape::Shape;
use crate::spatial::{QuadItem, ShapeKind};
use protocol::packets::{PlayerUpdate, PowerUpSpawn, TailRemoval, TickDiff, WireLine};

/// Turn one tick's insertions and removals into a [`TickDiff`].
///
/// Players appear in the order their head or segment was first inserted.
/// Head removals are dropped: a moved head shows up as an update, and
/// deaths travel through the leaderboard.
pub fn collect(
    tick: u64,
    inserted: &[QuadItem],
    removed: &[QuadItem],
    roster: &Roster,
    power_ups: &PowerUpManager,
) -> TickDiff {
    let mut diff = TickDiff {
        tick,
        ..TickDiff::default()
    };

    for item in inserted {
        match item.kind {
            ShapeKind::Player(id) => {
                player_update(&mut diff.players, roster, id);
            }
            ShapeKind::Tail { owner } => {
                let line = wire_line(item);
                if let Some(update) = player_update(&mut diff.players, roster, owner) {
                    update.new_tail = line;
                }
            }
            ShapeKind::PowerUp => {
                if let Some(power_up) = power_ups.get(item.id) {
                    diff.power_ups_added.push(PowerUpSpawn {
                        id: power_up.id.0,
                        x: power_up.circle.center.x,
                        y: power_up.circle.center.y,
                        radius: power_up.circle.radius,
                        kind: power_up.kind.code(),
                        others: power_up.others,
                    });
                }
            }
        }
    }

    for item in removed {
        match item.kind {
            ShapeKind::Player(_) => {}
            ShapeKind::Tail { owner } => {
                match diff.removed_tails.iter_mut().find(|r| r.player_id == owner.0) {
                    Some(removal) => removal.parts.push(item.id.0),
                    None => diff.removed_tails.push(TailRemoval {
                        player_id: owner.0,
                        parts: vec![item.id.0],
                    }),
                }
            }
            ShapeKind::PowerUp => diff.power_ups_removed.push(item.id.0),
        }
    }

    diff
}

/// Find or create the update row for `id`, filled from the roster.
fn player_update<'a>(
    updates: &'a mut Vec<PlayerUpdate>,
    roster: &Roster,
    id: PlayerId,
) -> Option<&'a mut PlayerUpdate> {
    if let Some(index) = updates.iter().position(|u| u.id == id.0) {
        return Some(&mut updates[index]);
    }
    let player = roster.get(id)?;
    updates.push(PlayerUpdate {
        id: id.0,
        x: player.position.x,
        y: player.position.y,
        radius: player.radius,
        color: player.color,
        new_tail: None,
    });
    updates.last_mut()
}

fn wire_line(item: &QuadItem) -> Option<WireLine> {
    match item.shape {
        Shape::Line(line) => Some(WireLine {
            id: item.id.0,
            x1: line.p1.x,
            y1: line.p1.y,
            x2: line.p2.x,
            y2: line.p2.y,
            width: line.width,
        }),
        _ => None,
    }
}
