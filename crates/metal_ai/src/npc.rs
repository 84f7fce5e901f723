//! Town NPCs and vendors
//!
//! NPCs do not fight. They turn to face a nearby player, wave once when the
//! player walks up, and vendors trade from a small limited stock.

use metal_combat::PlayerCharacter;
use metal_core::{horizontal_distance, rotate_towards, yaw_towards, IdGenerator, Vec3};
use metal_inventory::catalog::{self, ArmorQuality, ShieldQuality, SwordQuality};
use metal_inventory::Item;
use metal_physics::{Collider, PhysicsConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the greeting wave
pub const WAVE_DURATION: f32 = 2.0;
/// Turning speed toward the player (rad/s)
pub const TURN_SPEED: f32 = 3.0;

static NPC_IDS: IdGenerator = IdGenerator::new();

/// NPC kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpcType {
    Merchant,
    Blacksmith,
    Villager,
}

/// Per-type constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpcInfo {
    pub name: &'static str,
    pub is_vendor: bool,
    /// Range at which the NPC turns toward and greets the player
    pub notice_range: f32,
    /// Range at which the player can talk or trade
    pub interact_range: f32,
    /// Collision radius
    pub radius: f32,
}

static NPC_TABLE: [NpcInfo; 3] = [
    NpcInfo {
        name: "Merchant",
        is_vendor: true,
        notice_range: 8.0,
        interact_range: 3.0,
        radius: 0.4,
    },
    NpcInfo {
        name: "Blacksmith",
        is_vendor: true,
        notice_range: 8.0,
        interact_range: 3.0,
        radius: 0.5,
    },
    NpcInfo {
        name: "Villager",
        is_vendor: false,
        notice_range: 6.0,
        interact_range: 2.5,
        radius: 0.4,
    },
];

impl NpcType {
    pub const ALL: [NpcType; 3] = [Self::Merchant, Self::Blacksmith, Self::Villager];

    pub fn info(self) -> &'static NpcInfo {
        &NPC_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn is_vendor(self) -> bool {
        self.info().is_vendor
    }

    /// Starting stock for this type
    pub fn default_shop(self) -> Vec<ShopItem> {
        match self {
            Self::Merchant => vec![
                ShopItem::unlimited(catalog::health_potion(), 25),
                ShopItem::new(catalog::greater_health_potion(), 60, 5),
                ShopItem::new(catalog::xp_tome(), 150, 2),
                ShopItem::new(catalog::scholar_ring(), 120, 1),
                ShopItem::new(catalog::vigor_amulet(), 180, 1),
            ],
            Self::Blacksmith => vec![
                ShopItem::new(catalog::sword(SwordQuality::Iron), 60, 3),
                ShopItem::new(catalog::sword(SwordQuality::Steel), 150, 1),
                ShopItem::new(catalog::armor(ArmorQuality::Chain), 120, 2),
                ShopItem::new(catalog::shield(ShieldQuality::Iron), 70, 2),
                ShopItem::new(catalog::leather_cap(), 25, 3),
                ShopItem::new(catalog::leather_boots(), 28, 3),
                ShopItem::new(catalog::leather_gloves(), 28, 3),
                ShopItem::new(catalog::leather_leggings(), 36, 3),
            ],
            Self::Villager => Vec::new(),
        }
    }
}

/// Shop errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("{0} does not trade")]
    NotAVendor(&'static str),

    #[error("No shop entry at index {0}")]
    InvalidIndex(usize),

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("Not enough gold: costs {price}, have {available}")]
    InsufficientGold { price: u32, available: u32 },

    #[error("Inventory is full")]
    InventoryFull,

    #[error("Inventory slot {0} is empty")]
    EmptySlot(usize),
}

/// A shop entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    /// Template; buyers receive a fresh copy
    pub item: Item,
    pub price: u32,
    /// Initial stock, negative for unlimited
    pub stock: i32,
    pub sold: u32,
}

impl ShopItem {
    pub fn new(item: Item, price: u32, stock: i32) -> Self {
        Self {
            item,
            price,
            stock,
            sold: 0,
        }
    }

    pub fn unlimited(item: Item, price: u32) -> Self {
        Self::new(item, price, -1)
    }

    pub fn is_unlimited(&self) -> bool {
        self.stock < 0
    }

    /// Units left; `u32::MAX` when unlimited
    pub fn available(&self) -> u32 {
        if self.is_unlimited() {
            return u32::MAX;
        }
        u32::try_from(self.stock).unwrap_or(0).saturating_sub(self.sold)
    }

    pub fn in_stock(&self) -> bool {
        self.available() > 0
    }
}

/// A non-combat character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: u64,
    pub npc_type: NpcType,
    pub name: String,
    pub position: Vec3,
    pub yaw: f32,
    pub shop: Vec<ShopItem>,
    player_was_near: bool,
    wave_timer: f32,
}

impl Npc {
    pub fn new(npc_type: NpcType, position: Vec3) -> Self {
        Self {
            id: NPC_IDS.next(),
            npc_type,
            name: npc_type.name().to_string(),
            position,
            yaw: 0.0,
            shop: npc_type.default_shop(),
            player_was_near: false,
            wave_timer: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_shop(mut self, shop: Vec<ShopItem>) -> Self {
        self.shop = shop;
        self
    }

    pub fn info(&self) -> &'static NpcInfo {
        self.npc_type.info()
    }

    pub fn is_waving(&self) -> bool {
        self.wave_timer > 0.0
    }

    pub fn wave_timer(&self) -> f32 {
        self.wave_timer
    }

    pub fn player_is_near(&self) -> bool {
        self.player_was_near
    }

    pub fn collider(&self) -> Collider {
        Collider::circle(self.position, self.info().radius)
    }

    pub fn can_interact(&self, point: Vec3) -> bool {
        horizontal_distance(self.position, point) <= self.info().interact_range
    }

    /// Face and greet the player
    ///
    /// Returns true on the frame a wave starts. A negative or non-finite
    /// `dt` counts as zero.
    pub fn update(&mut self, dt: f32, player_position: Vec3) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.wave_timer = (self.wave_timer - dt).max(0.0);

        let near = horizontal_distance(self.position, player_position) <= self.info().notice_range;
        let greeted = near && !self.player_was_near;
        if greeted {
            self.wave_timer = WAVE_DURATION;
            log::debug!("{} waves", self.name);
        }
        self.player_was_near = near;

        if near {
            let dx = player_position.x - self.position.x;
            let dz = player_position.z - self.position.z;
            if dx != 0.0 || dz != 0.0 {
                self.yaw = rotate_towards(self.yaw, yaw_towards(dx, dz), TURN_SPEED * dt);
            }
        }
        greeted
    }

    fn ensure_vendor(&self) -> Result<(), ShopError> {
        if self.npc_type.is_vendor() {
            Ok(())
        } else {
            Err(ShopError::NotAVendor(self.npc_type.name()))
        }
    }

    /// Buy one unit of shop entry `index`
    ///
    /// Stock, gold and inventory room are all checked before anything changes.
    pub fn purchase(&mut self, index: usize, player: &mut PlayerCharacter) -> Result<Item, ShopError> {
        self.ensure_vendor()?;
        let entry = self.shop.get(index).ok_or(ShopError::InvalidIndex(index))?;

        if !entry.in_stock() {
            return Err(ShopError::OutOfStock(entry.item.name.clone()));
        }
        let gold = player.gold();
        if gold < entry.price {
            return Err(ShopError::InsufficientGold {
                price: entry.price,
                available: gold,
            });
        }
        if !player.inventory.can_add(&entry.item, 1) {
            log::warn!("Purchase of {} rejected: inventory full", entry.item.name);
            return Err(ShopError::InventoryFull);
        }

        let bought = entry.item.duplicate();
        let price = entry.price;
        player
            .inventory
            .spend_gold(price)
            .map_err(|_| ShopError::InsufficientGold { price, available: gold })?;
        player
            .inventory
            .add_item(bought.clone(), 1)
            .map_err(|_| ShopError::InventoryFull)?;

        if let Some(entry) = self.shop.get_mut(index) {
            entry.sold += 1;
        }
        log::info!("{} bought {} for {}g", player.name, bought.name, price);
        Ok(bought)
    }

    /// Sell one unit from an inventory slot for half its value
    pub fn sell(&self, player: &mut PlayerCharacter, slot: usize) -> Result<u32, ShopError> {
        self.ensure_vendor()?;
        let item = player.inventory.remove_one(slot).ok_or(ShopError::EmptySlot(slot))?;
        let payout = item.value / 2;
        player.inventory.add_gold(payout);
        log::info!("{} sold {} for {}g", player.name, item.name, payout);
        Ok(payout)
    }
}

/// Owns every NPC
#[derive(Debug, Default)]
pub struct NpcManager {
    npcs: Vec<Npc>,
    config: PhysicsConfig,
}

impl NpcManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for the frame delta clamp
    pub fn with_config(mut self, config: PhysicsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Add an NPC, returning its id
    pub fn spawn(&mut self, npc: Npc) -> u64 {
        let id = npc.id;
        log::info!(
            "Spawned {} at ({:.1}, {:.1})",
            npc.name,
            npc.position.x,
            npc.position.z
        );
        self.npcs.push(npc);
        id
    }

    /// Update every NPC; returns the ids that started waving
    pub fn update(&mut self, dt: f32, player_position: Vec3) -> Vec<u64> {
        let dt = self.config.clamp_delta(dt);
        self.npcs
            .iter_mut()
            .filter_map(|npc| npc.update(dt, player_position).then_some(npc.id))
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|n| n.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.iter()
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    /// Nearest NPC whose interact range covers `point`
    pub fn nearest_interactable(&self, point: Vec3) -> Option<u64> {
        self.npcs
            .iter()
            .filter(|n| n.can_interact(point))
            .min_by(|a, b| {
                horizontal_distance(a.position, point).total_cmp(&horizontal_distance(b.position, point))
            })
            .map(|n| n.id)
    }

    /// Colliders for player movement resolution
    pub fn colliders(&self) -> Vec<Collider> {
        self.npcs.iter().map(Npc::collider).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn rich_player(gold: u32) -> PlayerCharacter {
        let mut p = PlayerCharacter::new("Buyer");
        p.inventory.add_gold(gold);
        p
    }

    #[test]
    fn test_available() {
        let mut entry = ShopItem::new(catalog::health_potion(), 10, 2);
        assert_eq!(entry.available(), 2);
        entry.sold = 2;
        assert_eq!(entry.available(), 0);
        entry.sold = 5;
        assert_eq!(entry.available(), 0);
        assert!(ShopItem::unlimited(catalog::health_potion(), 10).in_stock());
    }

    #[test]
    fn test_purchase_decrements_stock_and_gold() {
        let mut npc = Npc::new(NpcType::Merchant, Vec3::ZERO)
            .with_shop(vec![ShopItem::new(catalog::health_potion(), 25, 1)]);
        let mut player = rich_player(60);

        let item = npc.purchase(0, &mut player).unwrap();
        assert_eq!(item.key, "health_potion");
        assert_eq!(player.gold(), 35);
        assert_eq!(player.inventory.count_key("health_potion"), 1);
        assert_eq!(npc.shop[0].available(), 0);

        let err = npc.purchase(0, &mut player).unwrap_err();
        assert_eq!(err, ShopError::OutOfStock("Health Potion".to_string()));
        assert_eq!(player.gold(), 35);
    }

    #[test]
    fn test_purchase_without_gold_changes_nothing() {
        let mut npc = Npc::new(NpcType::Merchant, Vec3::ZERO);
        let mut player = rich_player(5);
        let err = npc.purchase(0, &mut player).unwrap_err();
        assert_eq!(err, ShopError::InsufficientGold { price: 25, available: 5 });
        assert_eq!(npc.shop[0].sold, 0);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_purchase_with_full_inventory() {
        let mut npc = Npc::new(NpcType::Blacksmith, Vec3::ZERO);
        let mut player = rich_player(1_000);
        for _ in 0..player.inventory.capacity() {
            player.inventory.add_item(catalog::leather_cap(), 1).unwrap();
        }
        assert_eq!(npc.purchase(0, &mut player), Err(ShopError::InventoryFull));
        assert_eq!(player.gold(), 1_000);
        assert_eq!(npc.shop[0].sold, 0);
    }

    #[test]
    fn test_villager_does_not_trade() {
        let mut npc = Npc::new(NpcType::Villager, Vec3::ZERO);
        let mut player = rich_player(100);
        assert!(matches!(npc.purchase(0, &mut player), Err(ShopError::NotAVendor(_))));
    }

    #[test]
    fn test_sell_pays_half() {
        let npc = Npc::new(NpcType::Merchant, Vec3::ZERO);
        let mut player = rich_player(0);
        player.inventory.add_item(catalog::sword(SwordQuality::Steel), 1).unwrap();
        assert_eq!(npc.sell(&mut player, 0), Ok(37));
        assert_eq!(player.gold(), 37);
        assert!(player.inventory.is_empty());
        assert_eq!(npc.sell(&mut player, 0), Err(ShopError::EmptySlot(0)));
    }

    #[test]
    fn test_wave_on_rising_edge_only() {
        let mut npc = Npc::new(NpcType::Villager, Vec3::ZERO);
        let far = Vec3::new(20.0, 0.0, 0.0);
        let near = Vec3::new(3.0, 0.0, 0.0);

        assert!(!npc.update(0.1, far));
        assert!(npc.update(0.1, near));
        assert!(npc.is_waving());
        assert!(!npc.update(0.1, near));

        // Wave runs out while the player lingers
        for _ in 0..25 {
            npc.update(0.1, near);
        }
        assert!(!npc.is_waving());

        // Leave and come back: waves again
        npc.update(0.1, far);
        assert!(npc.update(0.1, near));
    }

    #[test]
    fn test_turns_toward_player_without_overshoot() {
        let mut npc = Npc::new(NpcType::Merchant, Vec3::ZERO);
        // Player along +x: target yaw is PI/2
        let player = Vec3::new(4.0, 0.0, 0.0);
        npc.update(0.1, player);
        assert_relative_eq!(npc.yaw, 0.3, epsilon = 1e-5);

        for _ in 0..20 {
            npc.update(0.1, player);
        }
        assert_relative_eq!(npc.yaw, PI / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_turns_shortest_way() {
        let mut npc = Npc::new(NpcType::Merchant, Vec3::ZERO).with_yaw(PI - 0.1);
        // Target just past -PI: the short way is increasing yaw across the seam
        let player = Vec3::new(-0.2, 0.0, -4.0);
        npc.update(0.01, player);
        assert!(npc.yaw > PI - 0.1 || npc.yaw < -PI + 0.5);
    }

    #[test]
    fn test_no_turn_out_of_range() {
        let mut npc = Npc::new(NpcType::Merchant, Vec3::ZERO);
        npc.update(1.0, Vec3::new(20.0, 0.0, 0.0));
        assert_eq!(npc.yaw, 0.0);
    }

    #[test]
    fn test_manager_nearest_interactable() {
        let mut m = NpcManager::new();
        let a = m.spawn(Npc::new(NpcType::Merchant, Vec3::new(2.0, 0.0, 0.0)));
        let b = m.spawn(Npc::new(NpcType::Blacksmith, Vec3::new(-1.0, 0.0, 0.0)));
        assert_eq!(m.nearest_interactable(Vec3::ZERO), Some(b));
        assert_eq!(m.nearest_interactable(Vec3::new(4.5, 0.0, 0.0)), Some(a));
        assert_eq!(m.nearest_interactable(Vec3::new(50.0, 0.0, 0.0)), None);
        assert_eq!(m.colliders().len(), 2);
    }

    #[test]
    fn test_bad_frame_delta_is_ignored() {
        let mut npc = Npc::new(NpcType::Merchant, Vec3::ZERO);
        let player = Vec3::new(4.0, 0.0, 0.0);

        npc.update(f32::NAN, player);
        for _ in 0..100 {
            npc.update(0.016, player);
        }
        assert!(npc.yaw.is_finite());
        assert_relative_eq!(npc.yaw, PI / 2.0, epsilon = 1e-5);

        let mut idle = Npc::new(NpcType::Villager, Vec3::ZERO);
        assert!(!idle.update(-5.0, Vec3::new(50.0, 0.0, 0.0)));
        assert!(!idle.is_waving());
    }

    #[test]
    fn test_manager_clamps_frame_delta() {
        let mut m = NpcManager::new().with_config(PhysicsConfig::default());
        let id = m.spawn(Npc::new(NpcType::Villager, Vec3::ZERO));
        let far = Vec3::new(50.0, 0.0, 0.0);

        assert!(m.update(-5.0, far).is_empty());
        assert!(!m.get(id).unwrap().is_waving());

        m.update(f32::NAN, Vec3::new(0.0, 0.0, -3.0));
        assert!(m.get(id).unwrap().yaw.is_finite());

        // One long frame turns at most max_delta worth
        let mut m = NpcManager::new();
        let id = m.spawn(Npc::new(NpcType::Merchant, Vec3::ZERO));
        m.update(5.0, Vec3::new(4.0, 0.0, 0.0));
        let max_turn = TURN_SPEED * m.config().max_delta;
        assert_relative_eq!(m.get(id).unwrap().yaw, max_turn, epsilon = 1e-5);
    }
}
