//! Enemy manager
//!
//! Owns every enemy behind a generational handle and steps them in a fixed
//! order each frame: AI, player push-out, pairwise separation, corpse
//! despawn, then damage numbers.

use crate::enemy::{DamageOutcome, Enemy, EnemyState};
use crate::enemy_type::EnemyType;
use metal_combat::{DamageNumber, DamageNumberKind};
use metal_core::{horizontal_distance, Handle, HandleMap, Vec3};
use metal_inventory::Loot;
use metal_physics::{push_from, separate_pair, PhysicsConfig, Terrain};
use rand::Rng;
use std::f32::consts::TAU;

/// Handle to a managed enemy
pub type EnemyHandle = Handle<Enemy>;

/// Something the host may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyEvent {
    /// Enemy noticed the player; hosts play the alert cue
    Spotted { enemy: EnemyHandle },
    /// AI state transition
    StateChanged {
        enemy: EnemyHandle,
        from: EnemyState,
        to: EnemyState,
    },
    /// Enemy was killed; `xp` is its reward
    Died { enemy: EnemyHandle, xp: u32 },
    /// Corpse removed from the world
    Despawned { enemy: EnemyHandle },
}

/// Owns enemies and their floating damage numbers
pub struct EnemyManager {
    enemies: HandleMap<Enemy>,
    damage_numbers: Vec<DamageNumber>,
    config: PhysicsConfig,
    next_spawn_order: u64,
    /// Events raised outside `update` (damage calls), flushed by the next update
    pending: Vec<EnemyEvent>,
}

impl EnemyManager {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            enemies: HandleMap::new(),
            damage_numbers: Vec::new(),
            config,
            next_spawn_order: 0,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    fn insert(&mut self, mut enemy: Enemy) -> EnemyHandle {
        enemy.spawn_order = self.next_spawn_order;
        self.next_spawn_order += 1;
        log::info!(
            "Spawned {} (lv {}) at ({:.1}, {:.1})",
            enemy.enemy_type.name(),
            enemy.level,
            enemy.position.x,
            enemy.position.z
        );
        self.enemies.insert(enemy)
    }

    /// Spawn an enemy at a level drawn around the player's
    pub fn spawn_enemy<R: Rng + ?Sized>(
        &mut self,
        enemy_type: EnemyType,
        position: Vec3,
        player_level: u32,
        rng: &mut R,
    ) -> EnemyHandle {
        self.insert(Enemy::spawn(enemy_type, player_level, position, rng))
    }

    /// Spawn an enemy at an exact level
    pub fn spawn_enemy_at_level(&mut self, enemy_type: EnemyType, level: u32, position: Vec3) -> EnemyHandle {
        self.insert(Enemy::new(enemy_type, level, position))
    }

    /// Scatter `count` random enemies uniformly over a disc
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        center: Vec3,
        radius: f32,
        count: usize,
        player_level: u32,
        rng: &mut R,
    ) -> Vec<EnemyHandle> {
        (0..count)
            .map(|_| {
                let angle = rng.gen_range(0.0..TAU);
                let r = radius.max(0.0) * rng.gen::<f32>().sqrt();
                let position = Vec3::new(center.x + angle.cos() * r, center.y, center.z + angle.sin() * r);
                let enemy_type = EnemyType::random(rng);
                self.spawn_enemy(enemy_type, position, player_level, rng)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn get(&self, handle: EnemyHandle) -> Option<&Enemy> {
        self.enemies.get(handle)
    }

    pub fn get_mut(&mut self, handle: EnemyHandle) -> Option<&mut Enemy> {
        self.enemies.get_mut(handle)
    }

    pub fn contains(&self, handle: EnemyHandle) -> bool {
        self.enemies.contains(handle)
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|(_, e)| e.is_alive()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnemyHandle, &Enemy)> {
        self.enemies.iter()
    }

    pub fn damage_numbers(&self) -> &[DamageNumber] {
        &self.damage_numbers
    }

    // ------------------------------------------------------------------
    // Frame update
    // ------------------------------------------------------------------

    /// Step every enemy
    ///
    /// `dt` is clamped to `[0, max_delta]`. Returns the events raised this
    /// frame, preceded by any raised by damage calls since the last update.
    pub fn update<T, R>(
        &mut self,
        dt: f32,
        player_position: Vec3,
        terrain: &T,
        player_radius: f32,
        rng: &mut R,
    ) -> Vec<EnemyEvent>
    where
        T: Terrain + ?Sized,
        R: Rng + ?Sized,
    {
        let dt = self.config.clamp_delta(dt);
        let mut events = std::mem::take(&mut self.pending);
        let creature_radius = self.config.creature_radius;
        let epsilon = self.config.separation_epsilon;

        // 1. AI and player push-out
        for (handle, enemy) in self.enemies.iter_mut() {
            let step = enemy.update(dt, player_position, terrain, rng);
            if step.spotted {
                events.push(EnemyEvent::Spotted { enemy: handle });
            }
            if let Some((from, to)) = step.transition {
                events.push(EnemyEvent::StateChanged { enemy: handle, from, to });
            }
            if enemy.is_alive()
                && push_from(&mut enemy.position, player_position, creature_radius + player_radius, epsilon)
            {
                enemy.snap_to(terrain);
            }
        }

        // 2. Pairwise separation between living enemies
        let living: Vec<EnemyHandle> = self
            .enemies
            .iter()
            .filter(|(_, e)| e.is_alive())
            .map(|(h, _)| h)
            .collect();
        for (i, &a) in living.iter().enumerate() {
            for &b in &living[i + 1..] {
                if let Some((ea, eb)) = self.enemies.get_pair_mut(a, b) {
                    if separate_pair(&mut ea.position, &mut eb.position, creature_radius, creature_radius, epsilon) {
                        ea.snap_to(terrain);
                        eb.snap_to(terrain);
                    }
                }
            }
        }

        // 3. Corpse despawn
        let lifetime = self.config.corpse_lifetime;
        let removed = self
            .enemies
            .retain(|e| e.time_dead().map_or(true, |t| t <= lifetime));
        for handle in removed {
            log::debug!("Despawned corpse {}", handle);
            events.push(EnemyEvent::Despawned { enemy: handle });
        }

        // 4. Damage numbers
        let gravity = self.config.damage_number_gravity;
        let number_lifetime = self.config.damage_number_lifetime;
        for number in &mut self.damage_numbers {
            number.update(dt, gravity);
        }
        self.damage_numbers.retain(|n| !n.is_expired(number_lifetime));

        events
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Living enemies within `radius` of `point`, nearest first
    pub fn enemies_in_range(&self, point: Vec3, radius: f32) -> Vec<EnemyHandle> {
        let mut hits: Vec<(f32, u64, EnemyHandle)> = self
            .enemies
            .iter()
            .filter(|(_, e)| e.is_alive())
            .map(|(h, e)| (horizontal_distance(e.position, point), e.spawn_order, h))
            .filter(|(d, _, _)| *d <= radius)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, _, h)| h).collect()
    }

    /// Swings connecting with a target at `point` this frame
    ///
    /// Each reported swing is marked as landed and will not be reported again.
    pub fn check_enemy_attacks(&mut self, point: Vec3) -> Vec<(EnemyHandle, u32)> {
        let mut hits = Vec::new();
        for (handle, enemy) in self.enemies.iter_mut() {
            if enemy.can_hit(point) {
                enemy.mark_swing_landed();
                hits.push((handle, enemy.damage));
            }
        }
        hits
    }

    /// Nearest dead, unlooted enemy within `range`
    ///
    /// Equal distances resolve to the earlier spawn.
    pub fn nearest_lootable_corpse(&self, point: Vec3, range: f32) -> Option<EnemyHandle> {
        self.enemies
            .iter()
            .filter(|(_, e)| e.is_lootable())
            .map(|(h, e)| (horizontal_distance(e.position, point), e.spawn_order, h))
            .filter(|(d, _, _)| *d <= range)
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, _, h)| h)
    }

    /// Peek at a corpse's loot
    pub fn corpse_loot(&self, handle: EnemyHandle) -> Option<&Loot> {
        self.enemies.get(handle).filter(|e| e.is_lootable()).and_then(Enemy::loot)
    }

    /// Take a corpse's loot; `None` if already looted or not a corpse
    pub fn loot_corpse(&mut self, handle: EnemyHandle) -> Option<Loot> {
        self.enemies.get_mut(handle)?.take_loot()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Hit an enemy and spawn its damage number
    ///
    /// Stale handles and dead targets are ignored.
    pub fn damage_enemy<R: Rng + ?Sized>(
        &mut self,
        handle: EnemyHandle,
        amount: u32,
        critical: bool,
        rng: &mut R,
    ) -> DamageOutcome {
        let Some(enemy) = self.enemies.get_mut(handle) else {
            return DamageOutcome::Ignored;
        };

        let before = enemy.state();
        let outcome = enemy.take_damage(amount, rng);
        let (position, after, xp) = (enemy.position, enemy.state(), enemy.xp_reward);

        if outcome == DamageOutcome::Ignored {
            return outcome;
        }
        if before != after {
            self.pending.push(EnemyEvent::StateChanged {
                enemy: handle,
                from: before,
                to: after,
            });
        }
        if let DamageOutcome::Killed { .. } = outcome {
            self.pending.push(EnemyEvent::Died { enemy: handle, xp });
        }

        let kind = if critical {
            DamageNumberKind::Critical
        } else {
            DamageNumberKind::Damage
        };
        self.spawn_damage_number(outcome.dealt(), kind, position, rng);
        outcome
    }

    /// Queue a floating number above `position`
    pub fn spawn_damage_number<R: Rng + ?Sized>(
        &mut self,
        amount: u32,
        kind: DamageNumberKind,
        position: Vec3,
        rng: &mut R,
    ) {
        self.damage_numbers.push(DamageNumber::new(amount, kind, position, rng));
    }

    /// Events raised by damage calls that no update has returned yet
    pub fn drain_events(&mut self) -> Vec<EnemyEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Remove every enemy and damage number
    pub fn clear(&mut self) {
        self.enemies = HandleMap::new();
        self.damage_numbers.clear();
        self.pending.clear();
    }
}

impl Default for EnemyManager {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metal_physics::FlatTerrain;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FAR: Vec3 = Vec3::new(500.0, 0.0, 500.0);

    #[test]
    fn test_spawn_and_get() {
        let mut m = EnemyManager::default();
        let h = m.spawn_enemy_at_level(EnemyType::Wolf, 2, Vec3::ZERO);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(h).unwrap().enemy_type, EnemyType::Wolf);
        assert_eq!(m.get(h).unwrap().level, 2);
    }

    #[test]
    fn test_spawn_order_increases() {
        let mut m = EnemyManager::default();
        let a = m.spawn_enemy_at_level(EnemyType::Bandit, 1, Vec3::ZERO);
        let b = m.spawn_enemy_at_level(EnemyType::Bandit, 1, Vec3::X * 10.0);
        assert!(m.get(a).unwrap().spawn_order < m.get(b).unwrap().spawn_order);
    }

    #[test]
    fn test_populate_within_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut m = EnemyManager::default();
        let handles = m.populate(Vec3::new(10.0, 0.0, 10.0), 20.0, 12, 3, &mut rng);
        assert_eq!(handles.len(), 12);
        for h in handles {
            let e = m.get(h).unwrap();
            assert!(horizontal_distance(e.position, Vec3::new(10.0, 0.0, 10.0)) <= 20.0 + 1e-3);
            assert!((2..=4).contains(&e.level));
        }
    }

    #[test]
    fn test_damage_enemy_records_events_and_number() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut m = EnemyManager::default();
        let h = m.spawn_enemy_at_level(EnemyType::Bandit, 1, Vec3::ZERO);

        let out = m.damage_enemy(h, 60, true, &mut rng);
        assert_eq!(out, DamageOutcome::Killed { dealt: 50 });
        assert_eq!(m.damage_numbers().len(), 1);
        assert_eq!(m.damage_numbers()[0].kind, DamageNumberKind::Critical);
        assert_eq!(m.damage_numbers()[0].amount, 50);

        let events = m.drain_events();
        assert!(events.contains(&EnemyEvent::Died { enemy: h, xp: 25 }));
        assert!(events.contains(&EnemyEvent::StateChanged {
            enemy: h,
            from: EnemyState::Idle,
            to: EnemyState::Dead
        }));

        // Dead: further hits spawn nothing
        assert_eq!(m.damage_enemy(h, 5, false, &mut rng), DamageOutcome::Ignored);
        assert_eq!(m.damage_numbers().len(), 1);
    }

    #[test]
    fn test_pending_events_returned_by_update() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut m = EnemyManager::default();
        let h = m.spawn_enemy_at_level(EnemyType::Bandit, 1, FAR);
        m.damage_enemy(h, 100, false, &mut rng);
        let events = m.update(0.016, Vec3::ZERO, &FlatTerrain::default(), 0.5, &mut rng);
        assert!(events.contains(&EnemyEvent::Died { enemy: h, xp: 25 }));
        assert!(m.drain_events().is_empty());
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut m = EnemyManager::new(PhysicsConfig::default().with_corpse_lifetime(0.0));
        let h = m.spawn_enemy_at_level(EnemyType::Bandit, 1, FAR);
        m.damage_enemy(h, 100, false, &mut rng);
        m.update(0.05, Vec3::ZERO, &FlatTerrain::default(), 0.5, &mut rng);
        assert!(!m.contains(h));
        assert_eq!(m.damage_enemy(h, 10, false, &mut rng), DamageOutcome::Ignored);
        assert!(m.loot_corpse(h).is_none());
    }

    #[test]
    fn test_player_pushes_enemy_out() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut m = EnemyManager::default();
        // Inside attack range, so the enemy stands still and swings
        let h = m.spawn_enemy_at_level(EnemyType::Bandit, 1, Vec3::new(0.3, 0.0, 0.0));
        m.update(0.016, Vec3::ZERO, &FlatTerrain::default(), 0.5, &mut rng);
        let x = m.get(h).unwrap().position.x;
        // Half the overlap (0.9 - 0.3) plus epsilon
        assert!((x - 0.61).abs() < 1e-4, "{x}");
    }

    #[test]
    fn test_nearest_corpse_tie_break() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut m = EnemyManager::default();
        let a = m.spawn_enemy_at_level(EnemyType::Bandit, 1, Vec3::new(2.0, 0.0, 0.0));
        let b = m.spawn_enemy_at_level(EnemyType::Bandit, 1, Vec3::new(-2.0, 0.0, 0.0));
        m.damage_enemy(b, 100, false, &mut rng);
        m.damage_enemy(a, 100, false, &mut rng);

        assert_eq!(m.nearest_lootable_corpse(Vec3::ZERO, 3.0), Some(a));
        m.loot_corpse(a).unwrap();
        assert_eq!(m.nearest_lootable_corpse(Vec3::ZERO, 3.0), Some(b));
        assert_eq!(m.nearest_lootable_corpse(Vec3::ZERO, 1.0), None);
    }

    #[test]
    fn test_enemies_in_range_sorted() {
        let mut m = EnemyManager::default();
        let far = m.spawn_enemy_at_level(EnemyType::Wolf, 1, Vec3::new(4.0, 0.0, 0.0));
        let near = m.spawn_enemy_at_level(EnemyType::Wolf, 1, Vec3::new(0.0, 0.0, 1.0));
        m.spawn_enemy_at_level(EnemyType::Wolf, 1, Vec3::new(9.0, 0.0, 0.0));
        assert_eq!(m.enemies_in_range(Vec3::ZERO, 5.0), vec![near, far]);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut m = EnemyManager::default();
        let h = m.spawn_enemy_at_level(EnemyType::Bandit, 1, Vec3::ZERO);
        m.damage_enemy(h, 100, false, &mut rng);
        m.update(5.0, FAR, &FlatTerrain::default(), 0.5, &mut rng);
        assert!((m.get(h).unwrap().time_dead().unwrap() - 0.1).abs() < 1e-6);
    }
}
