//! Static content tables: the starting character, skill tree, and levels.
//!
//! Tables are built once and cloned into a session; the engine never
//! mutates them.

use crate::world::{
    ChoiceEffect, Enemy, Inventory, Item, ItemKind, Level, Mission, MissionType, Npc,
    PlayerCharacter, Reward, Skill, SpecialAbility, SpecialEffect, Stats,
};

/// Id of the item the combat "Use Item" action consumes.
pub const HEALING_HERB: &str = "healing_herb";

/// Look up a level by id.
pub fn find_level(level_id: u32) -> Option<&'static Level> {
    GAME_LEVELS.iter().find(|l| l.id == level_id)
}

/// Look up a skill by id.
pub fn find_skill(skill_id: &str) -> Option<&'static Skill> {
    SKILL_TREE.iter().find(|s| s.id == skill_id)
}

/// Everything a journey is built from. Cloned on every reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub player: PlayerCharacter,
    pub levels: Vec<Level>,
    pub skills: Vec<Skill>,
}

impl Campaign {
    /// The shipped four-level campaign.
    pub fn standard() -> Self {
        Self {
            player: PLAYER_CHARACTER.clone(),
            levels: GAME_LEVELS.clone(),
            skills: SKILL_TREE.clone(),
        }
    }

    pub fn new(player: PlayerCharacter, levels: Vec<Level>, skills: Vec<Skill>) -> Self {
        Self {
            player,
            levels,
            skills,
        }
    }
}

fn herb() -> Item {
    Item::new(HEALING_HERB, "Ashwagandha", ItemKind::Healing).with_effect("Restores 30 HP")
}

fn relic(id: &str, name: &str, effect: &str) -> Item {
    Item::new(id, name, ItemKind::Relic).with_effect(effect)
}

fn mission(id: &str, title: &str, kind: MissionType, reward: Reward, difficulty: u8) -> Mission {
    Mission::new(id, title, kind, reward, difficulty)
}

fn npc(id: &str, name: &str, title: &str) -> Npc {
    let mut npc = Npc::new(id, name);
    npc.title = title.to_string();
    npc
}

// ============================================================================
// Player
// ============================================================================

lazy_static::lazy_static! {
    /// The character every journey starts with.
    pub static ref PLAYER_CHARACTER: PlayerCharacter = {
        let mut player = PlayerCharacter::new("arjun", "Arjun", Stats::new(120, 22, 15));
        player.title = "The Seeker of Dharma".to_string();
        player.archetype = "Warrior-Sage".to_string();
        player.gold = 50;
        player.inventory = Inventory::new(vec![
            Item::new("gandhiva", "Gandhiva Bow", ItemKind::Weapon)
                .with_effect("+8 attack in combat"),
            herb(),
            herb(),
            herb(),
            Item::new("chariot_token", "Chariot Token", ItemKind::Token)
                .with_effect("Unlocks secret path"),
        ]);
        player
    };
}

// ============================================================================
// Skill Tree
// ============================================================================

lazy_static::lazy_static! {
    pub static ref SKILL_TREE: Vec<Skill> = vec![
        Skill::new("swift_strike", "Swift Strike", 50)
            .with_effect("Deal 25% more damage on first attack", "+25% first strike damage"),
        Skill::new("iron_will", "Iron Will", 75)
            .with_effect("Reduce all incoming damage by 15%", "-15% damage taken"),
        Skill::new("healing_hands", "Healing Hands", 60)
            .with_effect("Heal 15 HP at the start of each combat", "+15 HP per combat"),
        Skill::new("karma_shield", "Karma Shield", 100)
            .with_effect("Gain 10% damage boost per 50 karma", "+10% dmg per 50 karma"),
        Skill::new("divine_arrow", "Divine Arrow", 120)
            .with_effect("Critical hits deal double damage", "Crits deal 2x damage"),
        Skill::new("meditation", "Deep Meditation", 80)
            .with_effect("Gain 20 wisdom and 10 karma permanently", "+20 Wisdom, +10 Karma"),
    ];
}

// ============================================================================
// Choice Scenarios
// ============================================================================

lazy_static::lazy_static! {
    /// Option outcomes for the village choice scenarios, one list per scenario.
    pub static ref VILLAGE_CHOICES: Vec<Vec<ChoiceEffect>> = vec![
        vec![
            ChoiceEffect::new(25, 10, 20),
            ChoiceEffect::new(5, -5, 50),
            ChoiceEffect::new(30, 15, 30),
        ],
        vec![
            ChoiceEffect::new(25, 15, 10),
            ChoiceEffect::new(0, -10, 0),
            ChoiceEffect::new(35, 20, 25),
        ],
        vec![
            ChoiceEffect::new(30, 20, 15),
            ChoiceEffect::new(15, 5, 40),
            ChoiceEffect::new(25, 15, 20),
        ],
    ];
}

// ============================================================================
// Levels
// ============================================================================

fn gurukul() -> Level {
    let boon = relic("drona_boon", "Drona's Boon", "+20 max HP permanently");
    let mut level = Level::new(1, "The Gurukul Awakening");
    level.region = "Himalayan Foothills, Gurukul Ashram".to_string();
    level.unlock_condition = "Starting level".to_string();
    level.missions = vec![
        mission(
            "m1_1",
            "The Morning Assembly",
            MissionType::Dialogue,
            Reward::new(30).with_karma(5).with_gold(10),
            1,
        )
        .with_objective("Speak with Guru Dronacharya and learn about the stolen scroll"),
        mission(
            "m1_2",
            "Interview the Students",
            MissionType::Dialogue,
            Reward::new(50).with_karma(5).with_gold(15),
            2,
        )
        .with_objective("Talk to Bhima, Duryodhana, and Karna about the missing scroll"),
        mission(
            "m1_3",
            "Gather Intelligence",
            MissionType::Resource,
            Reward::new(40).with_gold(20).with_item(
                Item::new("clue_map", "Gurukul Map", ItemKind::Map)
                    .with_effect("Reveals hidden paths"),
            ),
            2,
        )
        .with_objective("Find 3 hidden clues scattered around the Gurukul"),
        mission(
            "m1_4",
            "Decode the Ancient Clue",
            MissionType::Puzzle,
            Reward::new(75).with_gold(25).with_item(
                Item::new("ancient_key", "Ancient Key", ItemKind::Key)
                    .with_effect("Opens secret doors"),
            ),
            3,
        )
        .with_objective("Solve the Sanskrit riddle left by the thief"),
        mission(
            "m1_5",
            "The Forest Path",
            MissionType::Stealth,
            Reward::new(60).with_karma(10).with_gold(30),
            3,
        )
        .with_objective("Reach the forest clearing without being detected"),
        mission(
            "m1_6",
            "Confront the Betrayer",
            MissionType::Choice,
            Reward::new(100).with_karma(15).with_gold(50),
            4,
        )
        .with_objective("Defeat or persuade the scroll thief in the forest"),
        mission(
            "m1_7",
            "Boss: Ashwatthama's Trial",
            MissionType::Boss,
            Reward::new(200)
                .with_karma(20)
                .with_gold(100)
                .with_item(boon.clone()),
            5,
        )
        .with_objective("Defeat Ashwatthama in combat"),
    ];
    level.boss = Some(
        Enemy::new("ashwatthama_young", "Ashwatthama", 90, 18)
            .with_title("The Resentful Son of Drona")
            .with_defense(10)
            .with_special(
                SpecialAbility::new("Fury Strike", SpecialEffect::Empower { multiplier: 2.0 })
                    .with_description("Doubles attack when cornered"),
                3,
            )
            .with_rewards(Reward::new(200).with_karma(20).with_gold(100).with_item(boon))
            .with_dialogue(
                "You think you're better than me, Arjun? I am his son, and still overlooked!",
                "Your precious Dharma won't save you from my blade!",
                "I... I was wrong. Jealousy blinded me. Forgive me, Arjun.",
            ),
    );
    level.npcs = vec![
        npc("drona", "Guru Dronacharya", "Master of All Weapons").with_dialogues(&[
            "A true warrior does not merely master weapons, Arjun. He masters himself.",
            "Your Gandhiva bow is a tool. Your mind is the true weapon.",
        ]),
        npc("bhima", "Bhima", "The Mighty Warrior").with_dialogues(&[
            "I saw Ashwatthama sneaking near the vault before dawn, Arjun!",
            "He's always been jealous of your relationship with our Guru. This is his doing.",
            "Want me to come with you? I'll smash him into the ground!",
        ]),
        npc("karna", "Karna", "The Generous Warrior").with_dialogues(&[
            "I did not take the scroll, Arjun. But I know who did.",
            "Jealousy is a poison more deadly than any weapon. Remember that.",
        ]),
        npc("vyasa", "Sage Vyasa", "The Sage of the Forest").with_dialogues(&[
            "The forest holds many secrets, young Arjun. Walk carefully.",
            "Knowledge gained through struggle is knowledge that stays.",
            "Your journey has only just begun.",
        ]),
    ];
    level.completion_message = "The scroll is recovered and the Guruksha can begin.".to_string();
    level
}

fn river() -> Level {
    let gem = relic("naga_gem", "Naga's Repentance Gem", "+15 attack permanently");
    let mut level = Level::new(2, "The River of Righteousness");
    level.region = "Banks of the Ganga, Kingdom of Panchala".to_string();
    level.unlock_condition = "Complete Level 1".to_string();
    level.missions = vec![
        mission(
            "m2_1",
            "The Dying Village",
            MissionType::Choice,
            Reward::new(80).with_karma(15).with_gold(40),
            2,
        )
        .with_objective("Help 3 village elders find the forest spring route"),
        mission(
            "m2_2",
            "The Starving Family",
            MissionType::Resource,
            Reward::new(50).with_karma(20).with_gold(30),
            2,
        )
        .with_objective("Help the family without depleting your food supplies"),
        mission(
            "m2_3",
            "The Hidden Spring",
            MissionType::Stealth,
            Reward::new(70).with_karma(10).with_gold(50),
            3,
        )
        .with_objective("Find the hidden spring while avoiding Kaliya's scouts"),
        mission(
            "m2_4",
            "Infiltrate Kaliya's Camp",
            MissionType::Dialogue,
            Reward::new(100).with_gold(60).with_item(
                Item::new("dam_plans", "Dam Blueprints", ItemKind::Map)
                    .with_effect("Reveals Kaliya's weak points"),
            ),
            3,
        )
        .with_objective("Gather 3 pieces of intelligence from Kaliya's camp"),
        mission(
            "m2_5",
            "The Poisoned Well",
            MissionType::Puzzle,
            Reward::new(90)
                .with_gold(45)
                .with_item(relic("antidote", "River Antidote", "Cures poison effects")),
            3,
        )
        .with_objective("Solve the temple riddle to find the antidote"),
        mission(
            "m2_6",
            "The Village Defense",
            MissionType::Combat,
            Reward::new(120).with_karma(15).with_gold(70),
            4,
        )
        .with_objective("Defend the village against Kaliya's soldiers"),
        mission(
            "m2_7",
            "Boss: Kaliya Naga",
            MissionType::Boss,
            Reward::new(250)
                .with_karma(25)
                .with_gold(150)
                .with_item(gem.clone()),
            5,
        )
        .with_objective("Defeat Kaliya Naga in combat"),
    ];
    level.boss = Some(
        Enemy::new("kaliya_naga", "Kaliya Naga", 130, 24)
            .with_title("The River Tyrant")
            .with_defense(14)
            .with_special(
                SpecialAbility::new("Poison Wave", SpecialEffect::Poison { turns: 3 })
                    .with_description("Poisons Arjun for 3 turns, dealing 8 damage per turn"),
                4,
            )
            .with_rewards(Reward::new(250).with_karma(25).with_gold(150).with_item(gem))
            .with_dialogue(
                "You kings never cared about us farmers until we took what you ignored!",
                "The river belongs to those who FIGHT for it, not those who pray to it!",
                "You... you didn't kill me. Why?",
            ),
    );
    level.npcs = vec![
        npc("drupada", "King Drupada", "Righteous King of Panchala").with_dialogues(&[
            "A king's first duty is to his people, not his pride. Remember that, Arjun.",
            "Kaliya Naga was once a farmer whose lands were destroyed by floods. His anger has reason.",
            "Can you defeat him without destroying him? That is the true test of a Dharmic warrior.",
        ]),
        npc("draupadi", "Draupadi", "Princess of Panchala").with_dialogues(&[
            "The women of these villages have walked miles for water, Arjun. Every day.",
            "Do not see only the battle ahead. See the thousands who suffer and pray for your victory.",
        ]),
        npc("village_elder", "Village Elder", "Village Elder").with_dialogues(&[
            "We have lived by this river for generations. Now it turns against us.",
            "The children are dying, warrior. Help us, and the gods will bless you.",
            "Kaliya's soldiers take our food. We have nothing left to give.",
        ]),
    ];
    level.completion_message = "The iron dam breaks and the Ganga flows again.".to_string();
    level
}

fn kurukshetra() -> Level {
    let vijaya = relic(
        "vijaya_bow",
        "Vijaya, Karna's Bow",
        "+20 attack. Unlocks divine arrow ability.",
    );
    let mut level = Level::new(3, "The Kurukshetra Dilemma");
    level.region = "Plains of Kurukshetra, The Great War".to_string();
    level.unlock_condition = "Complete Level 2".to_string();
    level.missions = vec![
        mission(
            "m3_1",
            "The Inner War Begins",
            MissionType::Combat,
            Reward::new(120).with_karma(20).with_gold(80),
            3,
        )
        .with_objective(
            "Defeat the 3 manifestations of inner weakness: Fear, Attachment, and Grief",
        ),
        mission(
            "m3_2",
            "Krishna's First Teaching",
            MissionType::Dialogue,
            Reward::new(80).with_karma(15).with_gold(50),
            2,
        )
        .with_objective("Understand Krishna's teaching about the immortal soul"),
        mission(
            "m3_3",
            "The Fallen Warrior",
            MissionType::Choice,
            Reward::new(100).with_karma(25).with_gold(60),
            3,
        )
        .with_objective("Decide whether to grant the burial or continue the march"),
        mission(
            "m3_4",
            "Understand the Gita's Teaching",
            MissionType::Puzzle,
            Reward::new(150).with_gold(100).with_item(relic(
                "gita_wisdom",
                "Gita's Wisdom",
                "+25 max HP and +5 attack",
            )),
            4,
        )
        .with_objective("Answer Krishna's 5 questions about Dharma correctly"),
        mission(
            "m3_5",
            "The Chariot Inspection",
            MissionType::Resource,
            Reward::new(60).with_gold(70).with_item(
                Item::new("chariot_token", "Chariot Token", ItemKind::Token)
                    .with_effect("Unlocks secret path"),
            ),
            2,
        )
        .with_objective("Check and prepare your chariot for battle"),
        mission(
            "m3_6",
            "The Betrayal of Drona",
            MissionType::Choice,
            Reward::new(110).with_karma(20).with_gold(90),
            4,
        )
        .with_objective("Choose the proper way to honor Guru Drona"),
        mission(
            "m3_7",
            "The Final Stand",
            MissionType::Boss,
            Reward::new(300)
                .with_karma(30)
                .with_gold(200)
                .with_item(vijaya),
            5,
        )
        .with_objective("Face Karna in the ultimate test of Dharmic combat"),
    ];
    level.boss = Some(
        Enemy::new("karna_boss", "Karna", 180, 30)
            .with_title("The Invincible Son of the Sun")
            .with_defense(20)
            .with_special(
                SpecialAbility::new("Surya Kavach", SpecialEffect::Announce)
                    .with_description("Divine armor glows around Karna"),
                2,
            )
            .with_rewards(
                Reward::new(300).with_karma(30).with_gold(200).with_item(relic(
                    "surya_armor",
                    "Fragment of Surya Kavach",
                    "Block 1 attack per battle",
                )),
            )
            .with_dialogue(
                "So it comes to this, Arjun. Fight me as the warrior you truly are!",
                "I have only my own strength, and yet I still stand!",
                "You fought with honor, Arjun. That is all a warrior can ask.",
            ),
    );
    level.npcs = vec![
        npc("krishna", "Krishna", "Divine Charioteer, Bhagavan").with_dialogues(&[
            "You have a right to perform your prescribed duty, but never to the fruits of action.",
            "The soul is neither born nor dies at any time. It is not slain when the body is slain.",
            "Set thy heart upon thy work, but never on its reward.",
        ]),
        npc("vyasa", "Sage Vyasa", "Author of the Mahabharata").with_dialogues(&[
            "What is not in the Mahabharata, is not in this world.",
            "This war teaches us that even the most moral choices carry consequences.",
        ]),
        npc("bhisma", "Bhishma", "The Grandsire of the Kurus").with_dialogues(&[
            "Arjun, I am bound by my vow. I cannot fight you, but I cannot join you either.",
            "Remember your Dharma, even when it is painful.",
        ]),
    ];
    level.completion_message = "The war within is won before the war without.".to_string();
    level
}

fn vijayanagara() -> Level {
    let torch = relic(
        "divine_torch",
        "Torch of Enlightenment",
        "Reveals hidden choices in all future levels",
    );
    let mut level = Level::new(4, "The Lost City of Temples");
    level.region = "Vijayanagara, The City of Victory".to_string();
    level.unlock_condition = "Complete Level 3".to_string();
    level.missions = vec![
        mission(
            "m4_1",
            "The Temple Patrol",
            MissionType::Stealth,
            Reward::new(70).with_karma(10).with_gold(80),
            3,
        )
        .with_objective("Observe and record the patrol patterns of enemy soldiers"),
        mission(
            "m4_2",
            "Protect the Temple Priests",
            MissionType::Escort,
            Reward::new(150).with_karma(25).with_gold(120),
            4,
        )
        .with_objective("Escort all 20 priests to the cave monastery undetected"),
        mission(
            "m4_3",
            "The Secret Passage",
            MissionType::Puzzle,
            Reward::new(100).with_gold(90).with_item(
                Item::new("secret_key", "Temple Key", ItemKind::Key)
                    .with_effect("Opens temple doors"),
            ),
            4,
        )
        .with_objective("Navigate the secret passage and disarm 5 traps"),
        mission(
            "m4_4",
            "The Burning Library",
            MissionType::Combat,
            Reward::new(180).with_karma(20).with_gold(150),
            5,
        )
        .with_objective("Defeat Ravan Das and protect the library"),
        mission(
            "m4_5",
            "Decode the Astronomical Map",
            MissionType::Puzzle,
            Reward::new(150).with_gold(100).with_item(
                Item::new("vedic_star_map", "Vedic Star Map", ItemKind::Map)
                    .with_effect("Reveals the hidden library location"),
            ),
            4,
        )
        .with_objective("Use Vedic astronomy to decode the star map in the Virupaksha temple"),
        mission(
            "m4_6",
            "The Merchant's Dilemma",
            MissionType::Choice,
            Reward::new(90).with_karma(15).with_gold(110),
            3,
        )
        .with_objective("Decide how to obtain the merchant's information"),
        mission(
            "m4_7",
            "Boss: Ravan Das",
            MissionType::Boss,
            Reward::new(350)
                .with_karma(35)
                .with_gold(300)
                .with_item(torch.clone()),
            5,
        )
        .with_objective("Defeat Ravan Das in combat"),
        mission(
            "m4_8",
            "The Final Archive",
            MissionType::Resource,
            Reward::new(200).with_karma(30).with_gold(250),
            4,
        )
        .with_objective("Collect 5 sacred manuscripts from the library"),
    ];
    level.boss = Some(
        Enemy::new("ravan_das", "Ravan Das", 160, 28)
            .with_title("The Knowledge Destroyer")
            .with_defense(18)
            .with_special(
                SpecialAbility::new("Hellfire", SpecialEffect::Burn { damage: 10, turns: 3 })
                    .with_description("Sets the battlefield ablaze for 3 turns"),
                5,
            )
            .with_rewards(Reward::new(350).with_karma(35).with_gold(300).with_item(torch))
            .with_dialogue(
                "Ancient scrolls? Old superstitions! Burn it all!",
                "You fight for dust and old paper. I fight for POWER.",
                "HOW?! Why do you care so much about old books?",
            ),
    );
    level.npcs = vec![
        npc("vidyaranya", "Vidyaranya", "Protector of Ancient Wisdom").with_dialogues(&[
            "Our ancestors calculated the distance to the Moon accurately without telescopes.",
            "Protect this library, Arjun. Inside are the roots of the world's knowledge.",
        ]),
        npc("hampi_queen", "Queen of Hampi", "Defender of Hampi").with_dialogues(&[
            "A civilization is not made of stones and temples. It is made of knowledge and values.",
            "Fight for the future, Arjun. Our descendants need to know who they truly are.",
        ]),
        npc("temple_guard", "Temple Guard", "Temple Guard Captain").with_dialogues(&[
            "The priests have hidden in the caves. But we cannot leave without securing the library.",
            "Ravan Das will not stop until everything burns. We must hold the line.",
        ]),
    ];
    level.completion_message = "The library is saved and its knowledge endures.".to_string();
    level
}

lazy_static::lazy_static! {
    /// All levels in unlock order.
    pub static ref GAME_LEVELS: Vec<Level> =
        vec![gurukul(), river(), kurukshetra(), vijayanagara()];
}
