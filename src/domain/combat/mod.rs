//! Turn resolution for fights.
//!
//! An exchange is a single round between the two active monsters: A strikes B,
//! B strikes back (even when already knocked out), fainted monsters are swapped
//! for the next healthy team-mate and the fight is checked for a winner.

use crate::domain::model::{Fight, FightStatus, Monster, Team};
use crate::error::GameError;
use uuid::Uuid;

/// Every hit deals at least this much damage, however high the defence.
pub const MIN_DAMAGE: i32 = 1;

pub fn calculate_damage(attacker: &Monster, defender: &Monster) -> i32 {
    attacker
        .attack
        .saturating_sub(defender.defence)
        .max(MIN_DAMAGE)
}

/// First monster of the team that can still fight, in team order.
pub fn first_healthy(team: &[Monster]) -> Option<Uuid> {
    team.iter().find(|m| m.is_healthy()).map(|m| m.id)
}

pub fn has_healthy(team: &[Monster]) -> bool {
    team.iter().any(Monster::is_healthy)
}

/// Outcome of one exchange, mostly for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReport {
    pub damage_to_a: i32,
    pub damage_to_b: i32,
    /// The two active monsters after taking damage (A first).
    pub fighters: [Monster; 2],
    pub switched_a: Option<Uuid>,
    pub switched_b: Option<Uuid>,
    pub status: FightStatus,
}

/// Resolves one exchange in place. Finished fights are not touched.
pub fn resolve_exchange(fight: &mut Fight) -> Result<Option<ExchangeReport>, GameError> {
    if fight.status.is_finished() {
        return Ok(None);
    }

    let idx_a = active_index(fight, Team::A)?;
    let idx_b = active_index(fight, Team::B)?;

    let damage_to_b = calculate_damage(&fight.team_a[idx_a], &fight.team_b[idx_b]);
    take_hit(&mut fight.team_b[idx_b], damage_to_b);

    let damage_to_a = calculate_damage(&fight.team_b[idx_b], &fight.team_a[idx_a]);
    take_hit(&mut fight.team_a[idx_a], damage_to_a);

    let fighters = [fight.team_a[idx_a].clone(), fight.team_b[idx_b].clone()];

    let mut switched_a = None;
    if !fighters[0].is_healthy() {
        if let Some(next) = first_healthy(&fight.team_a) {
            fight.active_monster_a = next;
            switched_a = Some(next);
        }
    }
    let mut switched_b = None;
    if !fighters[1].is_healthy() {
        if let Some(next) = first_healthy(&fight.team_b) {
            fight.active_monster_b = next;
            switched_b = Some(next);
        }
    }

    if !has_healthy(&fight.team_a) {
        fight.status = FightStatus::TeamBWon;
    } else if !has_healthy(&fight.team_b) {
        fight.status = FightStatus::TeamAWon;
    }

    Ok(Some(ExchangeReport {
        damage_to_a,
        damage_to_b,
        fighters,
        switched_a,
        switched_b,
        status: fight.status,
    }))
}

fn take_hit(monster: &mut Monster, damage: i32) {
    monster.health = monster.health.saturating_sub(damage).max(0);
}

fn active_index(fight: &Fight, team: Team) -> Result<usize, GameError> {
    let active = fight.active(team);
    fight
        .team(team)
        .iter()
        .position(|m| m.id == active)
        .ok_or_else(|| {
            GameError::CorruptFight(format!(
                "{} active monster not found: {}",
                team.label(),
                active
            ))
        })
}
