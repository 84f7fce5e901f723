//! Save and reload a played character through both file formats

use metal_combat::{Attribute, PlayerCharacter};
use metal_core::Vec3;
use metal_gamestate::prelude::*;
use metal_inventory::catalog::{self, ShieldQuality, SwordQuality};
use metal_inventory::EquipmentSlot;
use std::env::temp_dir;
use std::fs;
use std::path::PathBuf;

fn scratch(name: &str) -> PathBuf {
    let dir = temp_dir().join(format!("metal_save_it_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn played_character() -> PlayerCharacter {
    let mut p = PlayerCharacter::new("Rook").with_position(Vec3::new(-12.0, 3.25, 40.5));
    p.yaw = -1.2;
    p.gain_xp(700);
    p.allocate_point(Attribute::Strength).unwrap();
    p.inventory.add_gold(512);
    p.inventory.add_item(catalog::health_potion(), 7).unwrap();
    p.inventory.add_item(catalog::xp_tome(), 2).unwrap();
    p.inventory.add_item(catalog::sword(SwordQuality::Mithril), 1).unwrap();
    p.inventory.add_item(catalog::shield(ShieldQuality::Tower), 1).unwrap();
    p.inventory.add_item(catalog::scholar_ring(), 1).unwrap();
    for key in ["mithril_sword", "tower_shield", "scholar_ring"] {
        let at = p.inventory.find_key(key).unwrap();
        p.equip(at).unwrap();
    }
    p.take_damage(40);
    p
}

fn assert_same_player(a: &PlayerCharacter, b: &PlayerCharacter) {
    assert_eq!(a.name, b.name);
    assert_eq!(a.vitals, b.vitals);
    assert_eq!(a.attributes, b.attributes);
    assert_eq!(a.unspent_points, b.unspent_points);
    assert_eq!(a.gold(), b.gold());
    assert_eq!(a.position, b.position);
    assert_eq!(a.yaw, b.yaw);
    assert_eq!(a.effective_damage(), b.effective_damage());
    assert_eq!(a.effective_armor(), b.effective_armor());
    assert_eq!(a.effective_block_chance(), b.effective_block_chance());
    assert_eq!(a.effective_max_hp(), b.effective_max_hp());
    assert_eq!(a.inventory.used_slots(), b.inventory.used_slots());
    for slot in EquipmentSlot::ALL {
        assert_eq!(
            a.equipment.get(slot).map(|i| i.key.as_str()),
            b.equipment.get(slot).map(|i| i.key.as_str())
        );
    }
}

#[test]
fn test_json_round_trip() {
    let dir = scratch("json");
    let saves = SaveManager::new(&dir).with_format(SaveFormat::Json);
    let player = played_character();

    let path = saves.save("slot1", &SaveRecord::capture(&player)).unwrap();
    assert!(path.ends_with("slot1.json"));
    assert!(saves.exists("slot1"));

    let restored = saves.load("slot1").unwrap().restore().unwrap();
    assert_same_player(&player, &restored);
    assert_eq!(restored.inventory.count_key("health_potion"), 7);
    assert_eq!(restored.inventory.count_key("xp_tome"), 2);

    saves.delete("slot1").unwrap();
    assert!(!saves.exists("slot1"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_binary_round_trip() {
    let dir = scratch("binary");
    let saves = SaveManager::new(&dir).with_format(SaveFormat::Binary);
    let player = played_character();

    saves.quicksave(&SaveRecord::capture(&player)).unwrap();
    let restored = saves.quickload().unwrap().restore().unwrap();
    assert_same_player(&player, &restored);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_list_slots_newest_first() {
    let dir = scratch("list");
    let saves = SaveManager::new(&dir);
    let base = SaveRecord::capture(&PlayerCharacter::new("Hero"));

    saves.save("old", &base.clone().with_timestamp(1_000)).unwrap();
    saves.save("newest", &base.clone().with_timestamp(3_000)).unwrap();
    saves.save("middle", &base.with_timestamp(2_000)).unwrap();
    // Other formats are ignored
    fs::write(dir.join("stray.sav"), b"\0\0").unwrap();

    let ids: Vec<String> = saves.list_slots().unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["newest", "middle", "old"]);
    let _ = fs::remove_dir_all(&dir);
}
