//! Headless game loop
//!
//! Plays the role a renderer and input layer would: walks the player around
//! a route, fights whatever attacks, loots corpses, tops up potions at the
//! merchant and feeds every frame through the simulation crates.

use crate::config::SimConfig;
use crate::world::{obstacles, patrol_route, RollingHills};
use metal_ai::{EnemyEvent, EnemyManager, Npc, NpcManager, NpcType};
use metal_combat::{Attribute, DamageNumberKind, PlayerCharacter};
use metal_core::{horizontal_distance, yaw_towards, Vec3};
use metal_gamestate::{SaveError, SaveManager, SaveRecord};
use metal_physics::{resolve_movement_at_height, standable_height, Collider, Terrain};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// How far the player's sword reaches
const PLAYER_REACH: f32 = 2.0;
/// Seconds between player swings
const PLAYER_ATTACK_INTERVAL: f32 = 0.8;
/// Corpses closer than this are looted
const LOOT_RANGE: f32 = 2.5;
/// Drink a potion below this fraction of max HP
const POTION_THRESHOLD: f32 = 0.4;
/// Potions the player tries to keep in stock
const POTION_RESERVE: u32 = 3;
/// Waypoint counts as reached within this distance
const WAYPOINT_ARRIVAL: f32 = 1.0;
/// Radius of the player's walking loop, as a share of the spawn radius
const ROUTE_SHARE: f32 = 0.6;

/// Receives one-shot sound cues
pub trait AudioSink {
    fn play_cue(&mut self, cue: &str, position: Vec3);
}

/// Audio sink that only logs
#[derive(Debug, Default)]
pub struct LogAudio {
    pub cues_played: u32,
}

impl AudioSink for LogAudio {
    fn play_cue(&mut self, cue: &str, position: Vec3) {
        self.cues_played += 1;
        log::debug!("Audio cue '{}' at ({:.1}, {:.1})", cue, position.x, position.z);
    }
}

/// What happened during a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimSummary {
    pub frames: u32,
    pub elapsed: f32,
    pub kills: u32,
    pub xp_earned: u64,
    pub levels_gained: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub blocks: u32,
    pub deaths: u32,
    pub corpses_looted: u32,
    pub items_left_behind: u32,
    pub potions_used: u32,
    pub purchases: u32,
    pub alerts: u32,
    pub final_level: u32,
    pub final_gold: u32,
}

/// The whole simulated world
pub struct Simulation<A: AudioSink = LogAudio> {
    config: SimConfig,
    rng: StdRng,
    terrain: RollingHills,
    scenery: Vec<Collider>,
    route: Vec<Vec3>,
    waypoint: usize,
    attack_timer: f32,
    home: Vec3,
    pub player: PlayerCharacter,
    pub enemies: EnemyManager,
    pub npcs: NpcManager,
    pub audio: A,
    pub summary: SimSummary,
}

impl Simulation<LogAudio> {
    pub fn new(config: SimConfig) -> Self {
        Self::with_audio(config, LogAudio::default())
    }
}

impl<A: AudioSink> Simulation<A> {
    pub fn with_audio(config: SimConfig, audio: A) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let terrain = RollingHills::default();
        let ground = |x: f32, z: f32| Vec3::new(x, terrain.height_at(x, z), z);

        let home = ground(0.0, 0.0);
        let player = PlayerCharacter::new(config.player_name.clone()).with_position(home);

        let mut npcs = NpcManager::new().with_config(config.physics.clone());
        npcs.spawn(Npc::new(NpcType::Merchant, ground(3.0, 2.0)).with_name("Marta"));
        npcs.spawn(Npc::new(NpcType::Blacksmith, ground(-3.0, 2.5)).with_name("Bram"));
        npcs.spawn(Npc::new(NpcType::Villager, ground(0.5, -4.0)));

        let mut enemies = EnemyManager::new(config.physics.clone());
        enemies.populate(home, config.spawn_radius, config.enemy_count, player.level(), &mut rng);

        let route = patrol_route(config.spawn_radius * ROUTE_SHARE, 8);

        Self {
            scenery: obstacles(&terrain),
            rng,
            terrain,
            route,
            waypoint: 0,
            attack_timer: 0.0,
            home,
            player,
            enemies,
            npcs,
            audio,
            summary: SimSummary::default(),
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn terrain(&self) -> &RollingHills {
        &self.terrain
    }

    /// Run every configured frame
    pub fn run(&mut self) -> &SimSummary {
        let dt = self.config.frame_dt;
        for _ in 0..self.config.frames {
            self.step(dt);
        }
        &self.summary
    }

    /// Advance one frame
    pub fn step(&mut self, dt: f32) {
        let dt = self.config.physics.clamp_delta(dt);
        self.summary.frames += 1;
        self.summary.elapsed += dt;

        self.move_player(dt);

        let events = self.enemies.update(
            dt,
            self.player.position,
            &self.terrain,
            self.config.physics.player_radius,
            &mut self.rng,
        );
        self.handle_events(&events);

        self.player_attack(dt);
        self.enemy_attacks();
        self.loot_corpses();
        self.manage_supplies();
        self.visit_npcs(dt);

        if self.config.enemy_count > 0 && self.enemies.alive_count() == 0 {
            log::info!("Area cleared, spawning a new wave");
            self.enemies.populate(
                self.home,
                self.config.spawn_radius,
                self.config.enemy_count,
                self.player.level(),
                &mut self.rng,
            );
        }
    }

    fn colliders(&self) -> Vec<Collider> {
        let mut colliders = self.scenery.clone();
        colliders.extend(self.npcs.colliders());
        colliders
    }

    /// Walk the route unless an enemy is in reach
    fn move_player(&mut self, dt: f32) {
        if self.player.is_dead() {
            return;
        }
        if let Some(&target) = self.enemies.enemies_in_range(self.player.position, PLAYER_REACH).first() {
            if let Some(enemy) = self.enemies.get(target) {
                let dx = enemy.position.x - self.player.position.x;
                let dz = enemy.position.z - self.player.position.z;
                self.player.yaw = yaw_towards(dx, dz);
            }
            return;
        }

        let Some(&waypoint) = self.route.get(self.waypoint) else {
            return;
        };
        let position = self.player.position;
        if horizontal_distance(position, waypoint) < WAYPOINT_ARRIVAL {
            self.waypoint = (self.waypoint + 1) % self.route.len();
            return;
        }

        let dx = waypoint.x - position.x;
        let dz = waypoint.z - position.z;
        let dist = (dx * dx + dz * dz).sqrt();
        let step = (self.player.move_speed() * dt).min(dist);
        let desired = Vec3::new(position.x + dx / dist * step, position.y, position.z + dz / dist * step);

        let physics = &self.config.physics;
        let colliders = self.colliders();
        let mut resolved =
            resolve_movement_at_height(desired, physics.player_radius, &colliders, position.y, physics.step_height);
        let ground = self.terrain.height_at(resolved.x, resolved.z);
        resolved.y = standable_height(resolved.x, resolved.z, position.y, physics.step_height, &colliders)
            .map_or(ground, |top| top.max(ground));

        self.player.position = resolved;
        self.player.yaw = yaw_towards(dx, dz);
    }

    fn handle_events(&mut self, events: &[EnemyEvent]) {
        for event in events {
            match *event {
                EnemyEvent::Spotted { enemy } => {
                    if let Some(e) = self.enemies.get(enemy) {
                        self.summary.alerts += 1;
                        self.audio.play_cue("enemy_alert", e.position);
                    }
                }
                EnemyEvent::Died { enemy, xp } => {
                    self.summary.kills += 1;
                    self.summary.xp_earned += self.player.scaled_xp(xp);
                    self.summary.levels_gained += self.player.gain_xp(xp);
                    log::debug!("Enemy {} died, {} xp", enemy, xp);
                }
                EnemyEvent::StateChanged { .. } | EnemyEvent::Despawned { .. } => {}
            }
        }
    }

    fn player_attack(&mut self, dt: f32) {
        self.attack_timer = (self.attack_timer - dt).max(0.0);
        if self.player.is_dead() || self.attack_timer > 0.0 {
            return;
        }
        let Some(&target) = self.enemies.enemies_in_range(self.player.position, PLAYER_REACH).first() else {
            return;
        };

        let roll = self.player.roll_attack(&mut self.rng);
        let outcome = self.enemies.damage_enemy(target, roll.damage, roll.critical, &mut self.rng);
        self.summary.damage_dealt += outcome.dealt();
        self.attack_timer = PLAYER_ATTACK_INTERVAL;
    }

    fn enemy_attacks(&mut self) {
        if self.player.is_dead() {
            return;
        }
        for (_, damage) in self.enemies.check_enemy_attacks(self.player.position) {
            let position = self.player.position;
            if self.player.roll_block(&mut self.rng) {
                self.summary.blocks += 1;
                self.enemies
                    .spawn_damage_number(0, DamageNumberKind::Block, position, &mut self.rng);
                continue;
            }
            let lost = self.player.take_damage(damage);
            self.summary.damage_taken += lost;
            self.enemies
                .spawn_damage_number(lost, DamageNumberKind::Damage, position, &mut self.rng);

            if self.player.is_dead() {
                self.summary.deaths += 1;
                log::warn!("{} fell at level {}; returning home", self.player.name, self.player.level());
                self.player.revive();
                self.player.position = self.home;
                self.waypoint = 0;
                break;
            }
        }
    }

    fn loot_corpses(&mut self) {
        let Some(corpse) = self.enemies.nearest_lootable_corpse(self.player.position, LOOT_RANGE) else {
            return;
        };
        let Some(mut loot) = self.enemies.loot_corpse(corpse) else {
            return;
        };
        if !self.player.can_take_loot(&loot) {
            if let Some(item) = loot.item.take() {
                self.summary.items_left_behind += 1;
                log::warn!("Inventory full, leaving {} behind", item.name);
            }
        }
        match self.player.add_loot(loot) {
            Ok(()) => self.summary.corpses_looted += 1,
            Err(e) => log::warn!("Could not take loot: {}", e),
        }
    }

    /// Drink potions when hurt, equip upgrades and spend level-up points
    fn manage_supplies(&mut self) {
        let max_hp = self.player.effective_max_hp().max(1);
        let hp_fraction = self.player.current_hp() as f32 / max_hp as f32;
        if !self.player.is_dead() && hp_fraction < POTION_THRESHOLD {
            if let Some(at) = self.player.inventory.find_key("health_potion") {
                match self.player.use_item(at) {
                    Ok(effect) => {
                        self.summary.potions_used += 1;
                        self.enemies.spawn_damage_number(
                            effect.healed,
                            DamageNumberKind::Heal,
                            self.player.position,
                            &mut self.rng,
                        );
                    }
                    Err(e) => log::warn!("Could not drink potion: {}", e),
                }
            }
        }

        self.equip_upgrades();

        while self.player.unspent_points > 0 {
            let attribute = match self.player.unspent_points % 3 {
                0 => Attribute::Strength,
                1 => Attribute::Dexterity,
                _ => Attribute::Intelligence,
            };
            if self.player.allocate_point(attribute).is_err() {
                break;
            }
        }
    }

    /// Equip any carried item that beats what is worn in its slot
    fn equip_upgrades(&mut self) {
        let candidate = self.player.inventory.items().find_map(|(at, stack)| {
            let item = &stack.item;
            let slot = self.player.equipment.target_slot(item)?;
            let worn = self.player.equipment.get(slot).map_or(0, |w| w.value);
            (item.value > worn).then_some(at)
        });
        if let Some(at) = candidate {
            match self.player.equip(at) {
                Ok(_) => log::debug!("Equipped an upgrade from slot {}", at),
                Err(e) => log::debug!("Upgrade in slot {} not equipped: {}", at, e),
            }
        }
    }

    fn visit_npcs(&mut self, dt: f32) {
        for id in self.npcs.update(dt, self.player.position) {
            if let Some(npc) = self.npcs.get(id) {
                log::info!("{} waves at {}", npc.name, self.player.name);
            }
        }

        let Some(id) = self.npcs.nearest_interactable(self.player.position) else {
            return;
        };
        let Some(npc) = self.npcs.get_mut(id) else {
            return;
        };
        if npc.npc_type != NpcType::Merchant {
            return;
        }
        let Some(index) = npc.shop.iter().position(|s| s.item.key == "health_potion") else {
            return;
        };
        while self.player.inventory.count_key("health_potion") < POTION_RESERVE {
            match npc.purchase(index, &mut self.player) {
                Ok(_) => self.summary.purchases += 1,
                Err(e) => {
                    log::debug!("Stopped shopping: {}", e);
                    break;
                }
            }
        }
    }

    /// Write the player to the configured slot
    pub fn save(&self) -> Result<PathBuf, SaveError> {
        let saves = SaveManager::new(&self.config.save_dir).with_format(self.config.save_format);
        saves.save(&self.config.save_slot, &SaveRecord::capture(&self.player))
    }

    /// Final numbers, with the player's current level and gold
    pub fn finish(&mut self) -> SimSummary {
        self.summary.final_level = self.player.level();
        self.summary.final_gold = self.player.gold();
        self.summary.clone()
    }
}
