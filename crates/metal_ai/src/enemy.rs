//! Enemy entity and its AI state machine
//!
//! All proximity checks use horizontal distance; Y is pinned to the terrain
//! every frame and never influences a decision.
//!
//! ```text
//!            detect                  in range, cooldown ready
//!   Idle ───────────────► Chasing ◄──────────────────────────► Attacking
//!    │  ▲                  ▲  │             swing finished
//!    │  └── lose (1.5x) ───┘  │
//!    ▼                        │  any hit         stun over
//!  Patrolling ── detect ──────┘  ──────► Hurt ──────────► Chasing
//!                                 lethal hit ──► Dead
//! ```

use crate::enemy_type::{roll_spawn_level, EnemyType, ScaledStats};
use crate::loot::roll_loot;
use metal_core::{horizontal_distance, yaw_towards, Vec3};
use metal_inventory::Loot;
use metal_physics::Terrain;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Minimum time in idle before a patrol may start
pub const IDLE_BEFORE_PATROL: f32 = 2.0;
/// Chance per second of leaving idle for a patrol once allowed
pub const PATROL_START_RATE: f32 = 0.70;
/// Inner radius of the patrol annulus
pub const PATROL_MIN_RADIUS: f32 = 2.0;
/// Outer radius of the patrol annulus
pub const PATROL_RADIUS: f32 = 5.0;
/// Distance at which a patrol point counts as reached
pub const PATROL_ARRIVAL: f32 = 0.5;
/// Patrol wait bounds after arriving (seconds)
pub const PATROL_WAIT: (f32, f32) = (1.0, 3.0);
/// Chase is abandoned beyond detection range times this factor
pub const GIVE_UP_FACTOR: f32 = 1.5;
/// Length of one swing
pub const ATTACK_DURATION: f32 = 0.5;
/// Attack phase window in which a swing connects (exclusive)
pub const HIT_WINDOW: (f32, f32) = (0.4, 0.6);
/// Swing reach as a multiple of attack range
pub const HIT_REACH_FACTOR: f32 = 1.2;
/// Stun applied by any non-lethal hit
pub const STUN_DURATION: f32 = 1.2;
/// Number of stagger animations to choose from
pub const STAGGER_VARIANTS: u8 = 2;

/// AI states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    Idle,
    Patrolling,
    Chasing,
    Attacking,
    Hurt,
    Dead,
}

impl EnemyState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Patrolling => "patrolling",
            Self::Chasing => "chasing",
            Self::Attacking => "attacking",
            Self::Hurt => "hurt",
            Self::Dead => "dead",
        }
    }
}

/// Probability of starting a patrol during a frame of length `dt`
///
/// `1 - (1 - rate)^dt`, so the expected wait is the same at any frame rate.
pub fn patrol_start_chance(dt: f32) -> f32 {
    1.0 - (1.0 - PATROL_START_RATE).powf(dt)
}

/// Result of a damage call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead, or a zero hit
    Ignored,
    /// Survived and was staggered
    Hurt { dealt: u32 },
    /// The hit was lethal
    Killed { dealt: u32 },
}

impl DamageOutcome {
    /// HP actually removed
    pub fn dealt(&self) -> u32 {
        match *self {
            Self::Ignored => 0,
            Self::Hurt { dealt } | Self::Killed { dealt } => dealt,
        }
    }
}

/// What one AI step changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiStep {
    /// The player was noticed for the first time this chase episode
    pub spotted: bool,
    /// State transition taken this step
    pub transition: Option<(EnemyState, EnemyState)>,
}

/// An enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub enemy_type: EnemyType,
    pub level: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,

    pub max_hp: u32,
    pub current_hp: u32,
    pub damage: u32,
    pub xp_reward: u32,
    pub gold_min: u32,
    pub gold_max: u32,

    state: EnemyState,
    /// Time since entering the current state
    state_timer: f32,
    attack_cooldown: f32,
    attack_phase: f32,
    swing_landed: bool,
    stun_timer: f32,
    stagger_variant: u8,

    patrol_center: Vec3,
    patrol_target: Option<Vec3>,
    patrol_wait: f32,
    has_spotted_player: bool,

    loot: Option<Loot>,
    loot_rolled: bool,
    is_looted: bool,

    /// Monotonic spawn order, used for stable tie-breaks
    pub spawn_order: u64,
}

impl Enemy {
    /// Create an enemy at a fixed level
    pub fn new(enemy_type: EnemyType, level: u32, position: Vec3) -> Self {
        let level = level.max(1);
        let ScaledStats {
            max_hp,
            damage,
            xp_reward,
            gold_min,
            gold_max,
        } = enemy_type.stats().scaled(level);

        Self {
            enemy_type,
            level,
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            max_hp,
            current_hp: max_hp,
            damage,
            xp_reward,
            gold_min,
            gold_max,
            state: EnemyState::Idle,
            state_timer: 0.0,
            attack_cooldown: 0.0,
            attack_phase: 0.0,
            swing_landed: false,
            stun_timer: 0.0,
            stagger_variant: 0,
            patrol_center: position,
            patrol_target: None,
            patrol_wait: 0.0,
            has_spotted_player: false,
            loot: None,
            loot_rolled: false,
            is_looted: false,
            spawn_order: 0,
        }
    }

    /// Create an enemy whose level is drawn around the player's
    pub fn spawn<R: Rng + ?Sized>(
        enemy_type: EnemyType,
        player_level: u32,
        position: Vec3,
        rng: &mut R,
    ) -> Self {
        Self::new(enemy_type, roll_spawn_level(player_level, rng), position)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    pub fn attack_phase(&self) -> f32 {
        self.attack_phase
    }

    pub fn stagger_variant(&self) -> u8 {
        self.stagger_variant
    }

    pub fn has_spotted_player(&self) -> bool {
        self.has_spotted_player
    }

    pub fn patrol_center(&self) -> Vec3 {
        self.patrol_center
    }

    pub fn patrol_target(&self) -> Option<Vec3> {
        self.patrol_target
    }

    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    pub fn is_looted(&self) -> bool {
        self.is_looted
    }

    pub fn loot_rolled(&self) -> bool {
        self.loot_rolled
    }

    /// Loot waiting on the corpse
    pub fn loot(&self) -> Option<&Loot> {
        self.loot.as_ref()
    }

    pub fn detection_range(&self) -> f32 {
        self.enemy_type.stats().detection_range
    }

    pub fn attack_range(&self) -> f32 {
        self.enemy_type.stats().attack_range
    }

    pub fn speed(&self) -> f32 {
        self.enemy_type.stats().speed
    }

    /// Time since death, if dead
    pub fn time_dead(&self) -> Option<f32> {
        self.is_dead().then_some(self.state_timer)
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    fn transition(&mut self, to: EnemyState) -> Option<(EnemyState, EnemyState)> {
        let from = self.state;
        if from == to {
            return None;
        }
        log::debug!(
            "{} (lv {}) transitioning from {} to {}",
            self.enemy_type.name(),
            self.level,
            from.name(),
            to.name()
        );
        self.state = to;
        self.state_timer = 0.0;
        Some((from, to))
    }

    /// Advance the AI by `dt`
    ///
    /// Dead enemies only age. Everything else ticks the attack cooldown, runs
    /// the current state and snaps Y to the terrain.
    pub fn update<T, R>(&mut self, dt: f32, player_position: Vec3, terrain: &T, rng: &mut R) -> AiStep
    where
        T: Terrain + ?Sized,
        R: Rng + ?Sized,
    {
        let mut step = AiStep::default();
        self.state_timer += dt;
        if self.is_dead() {
            self.velocity = Vec3::ZERO;
            return step;
        }

        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        let distance = horizontal_distance(self.position, player_position);
        let stats = *self.enemy_type.stats();

        match self.state {
            EnemyState::Idle => {
                self.velocity = Vec3::ZERO;
                if distance < stats.detection_range {
                    step = self.start_chase();
                } else if self.state_timer >= IDLE_BEFORE_PATROL
                    && rng.gen::<f32>() < patrol_start_chance(dt)
                {
                    self.patrol_target = Some(self.pick_patrol_target(rng));
                    self.patrol_wait = 0.0;
                    step.transition = self.transition(EnemyState::Patrolling);
                }
            }
            EnemyState::Patrolling => {
                if distance < stats.detection_range {
                    step = self.start_chase();
                } else {
                    self.patrol(dt, stats.speed * 0.5, rng);
                }
            }
            EnemyState::Chasing => {
                if distance > stats.detection_range * GIVE_UP_FACTOR {
                    self.has_spotted_player = false;
                    self.velocity = Vec3::ZERO;
                    step.transition = self.transition(EnemyState::Idle);
                } else if distance < stats.attack_range && self.attack_cooldown <= 0.0 {
                    self.velocity = Vec3::ZERO;
                    self.attack_cooldown = stats.attack_cooldown;
                    self.attack_phase = 0.0;
                    self.swing_landed = false;
                    self.face(player_position);
                    step.transition = self.transition(EnemyState::Attacking);
                } else {
                    self.move_towards(player_position, stats.speed, dt);
                }
            }
            EnemyState::Attacking => {
                self.velocity = Vec3::ZERO;
                self.face(player_position);
                self.attack_phase = (self.state_timer / ATTACK_DURATION).min(1.0);
                if self.state_timer >= ATTACK_DURATION {
                    step.transition = self.transition(EnemyState::Chasing);
                }
            }
            EnemyState::Hurt => {
                self.velocity = Vec3::ZERO;
                self.stun_timer -= dt;
                if self.stun_timer <= 0.0 {
                    self.stun_timer = 0.0;
                    step.transition = self.transition(EnemyState::Chasing);
                }
            }
            EnemyState::Dead => {}
        }

        self.snap_to(terrain);
        step
    }

    fn start_chase(&mut self) -> AiStep {
        let spotted = !self.has_spotted_player;
        self.has_spotted_player = true;
        AiStep {
            spotted,
            transition: self.transition(EnemyState::Chasing),
        }
    }

    fn patrol<R: Rng + ?Sized>(&mut self, dt: f32, speed: f32, rng: &mut R) {
        let Some(target) = self.patrol_target else {
            self.velocity = Vec3::ZERO;
            self.patrol_wait -= dt;
            if self.patrol_wait <= 0.0 {
                self.patrol_target = Some(self.pick_patrol_target(rng));
            }
            return;
        };

        if horizontal_distance(self.position, target) < PATROL_ARRIVAL {
            self.velocity = Vec3::ZERO;
            self.patrol_target = None;
            self.patrol_wait = rng.gen_range(PATROL_WAIT.0..=PATROL_WAIT.1);
        } else {
            self.move_towards(target, speed, dt);
        }
    }

    /// Random point in the patrol annulus around the patrol center
    fn pick_patrol_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let angle = rng.gen_range(0.0..TAU);
        let radius = rng.gen_range(PATROL_MIN_RADIUS..=PATROL_RADIUS);
        Vec3::new(
            self.patrol_center.x + angle.cos() * radius,
            self.patrol_center.y,
            self.patrol_center.z + angle.sin() * radius,
        )
    }

    fn move_towards(&mut self, target: Vec3, speed: f32, dt: f32) {
        let dx = target.x - self.position.x;
        let dz = target.z - self.position.z;
        let dist = (dx * dx + dz * dz).sqrt();
        if dist <= f32::EPSILON {
            self.velocity = Vec3::ZERO;
            return;
        }

        let step = (speed * dt).min(dist);
        self.velocity = Vec3::new(dx / dist * speed, 0.0, dz / dist * speed);
        self.position.x += dx / dist * step;
        self.position.z += dz / dist * step;
        self.yaw = yaw_towards(dx, dz);
    }

    fn face(&mut self, point: Vec3) {
        let dx = point.x - self.position.x;
        let dz = point.z - self.position.z;
        if dx != 0.0 || dz != 0.0 {
            self.yaw = yaw_towards(dx, dz);
        }
    }

    /// Pin Y to the terrain under the enemy
    pub fn snap_to<T: Terrain + ?Sized>(&mut self, terrain: &T) {
        self.position.y = terrain.height_at(self.position.x, self.position.z);
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    /// Whether the current swing is inside its hit window
    pub fn in_hit_window(&self) -> bool {
        self.state == EnemyState::Attacking
            && self.attack_phase > HIT_WINDOW.0
            && self.attack_phase < HIT_WINDOW.1
    }

    /// Whether the current swing would land on `target` right now
    pub fn can_hit(&self, target: Vec3) -> bool {
        self.in_hit_window()
            && !self.swing_landed
            && horizontal_distance(self.position, target) <= self.attack_range() * HIT_REACH_FACTOR
    }

    /// Record that the current swing connected
    pub fn mark_swing_landed(&mut self) {
        self.swing_landed = true;
    }

    pub fn swing_landed(&self) -> bool {
        self.swing_landed
    }

    /// Apply a hit
    ///
    /// A lethal hit kills and rolls loot. Any other hit interrupts whatever
    /// the enemy was doing with a stun.
    pub fn take_damage<R: Rng + ?Sized>(&mut self, amount: u32, rng: &mut R) -> DamageOutcome {
        if self.is_dead() || amount == 0 {
            return DamageOutcome::Ignored;
        }

        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        self.velocity = Vec3::ZERO;

        if self.current_hp == 0 {
            self.transition(EnemyState::Dead);
            self.attack_phase = 0.0;
            self.generate_loot(rng);
            log::info!("{} (lv {}) killed", self.enemy_type.name(), self.level);
            DamageOutcome::Killed { dealt }
        } else {
            self.stun_timer = STUN_DURATION;
            self.stagger_variant = rng.gen_range(0..STAGGER_VARIANTS);
            self.attack_phase = 0.0;
            // Re-entering Hurt restarts the stun and the state clock
            if self.transition(EnemyState::Hurt).is_none() {
                self.state_timer = 0.0;
            }
            DamageOutcome::Hurt { dealt }
        }
    }

    /// Roll loot for a corpse
    ///
    /// Only the first call on a dead enemy rolls; later calls return false.
    pub fn generate_loot<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.is_dead() || self.loot_rolled {
            return false;
        }
        self.loot = Some(roll_loot(self.gold_min, self.gold_max, rng));
        self.loot_rolled = true;
        true
    }

    /// Whether the corpse still has loot to take
    pub fn is_lootable(&self) -> bool {
        self.is_dead() && self.loot_rolled && !self.is_looted
    }

    /// Take the loot off a corpse, once
    pub fn take_loot(&mut self) -> Option<Loot> {
        if !self.is_lootable() {
            return None;
        }
        self.is_looted = true;
        self.loot.take()
    }
}
