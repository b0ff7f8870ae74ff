use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub framerate: u32,
    pub rng_seed: Option<u64>,
    pub world: WorldSettings,
    pub agent: AgentSettings,
    pub reproduction: ReproductionSettings,
    pub behavior: BehaviorSettings,
    pub combat: CombatSettings,
    pub eating: EatingSettings,
    pub energy_points: EnergyPointSettings,
    pub spatial: SpatialSettings,
    pub transport: TransportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            framerate: 60,
            rng_seed: None,
            world: WorldSettings::default(),
            agent: AgentSettings::default(),
            reproduction: ReproductionSettings::default(),
            behavior: BehaviorSettings::default(),
            combat: CombatSettings::default(),
            eating: EatingSettings::default(),
            energy_points: EnergyPointSettings::default(),
            spatial: SpatialSettings::default(),
            transport: TransportConfig::default(),
        }
    }
}

// --- World ---

/// Arena dimensions, population limits and the initial population
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorldSettings {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_population_cap")]
    pub population_cap: usize,
    #[serde(default = "default_initial_schools")]
    pub initial_schools: u32,
    #[serde(default = "default_initial_predators")]
    pub initial_predators: u32,
    #[serde(default = "default_school_size")]
    pub school_size: usize,
    #[serde(default = "default_school_radius")]
    pub school_radius: f32,
    /// Seconds between sweeps of relations pointing at removed agents
    #[serde(default = "default_scrub_interval")]
    pub scrub_interval_secs: f32,
    /// Extra pick tolerance around an agent's body for clicks
    #[serde(default = "default_click_padding")]
    pub click_padding: f32,
}

fn default_width() -> f32 { 1280.0 }
fn default_height() -> f32 { 720.0 }
fn default_population_cap() -> usize { 300 }
fn default_initial_schools() -> u32 { 2 }
fn default_initial_predators() -> u32 { 1 }
fn default_school_size() -> usize { 20 }
fn default_school_radius() -> f32 { 50.0 }
fn default_scrub_interval() -> f32 { 1.0 }
fn default_click_padding() -> f32 { 5.0 }

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            population_cap: default_population_cap(),
            initial_schools: default_initial_schools(),
            initial_predators: default_initial_predators(),
            school_size: default_school_size(),
            school_radius: default_school_radius(),
            scrub_interval_secs: default_scrub_interval(),
            click_padding: default_click_padding(),
        }
    }
}

// --- Agents ---

/// How an agent's travel speed is derived
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedModel {
    /// Constant per kind; the DNA speed trait is inherited but ignored
    #[default]
    Fixed,
    /// DNA speed trait scaled by the kind multiplier
    Trait,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AgentSettings {
    pub base_speed: f32,
    pub predator_speed_multiplier: f32,
    pub flee_speed_multiplier: f32,
    pub speed_model: SpeedModel,
    pub initial_energy: f32,
    /// Energy paid every tick just for being alive
    pub metabolic_cost: f32,
    pub curiosity_jitter_chance: f32,
    pub curiosity_jitter: f32,
    pub predator_size: f32,
    pub low_energy_display: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            base_speed: 1.0,
            predator_speed_multiplier: 3.0,
            flee_speed_multiplier: 1.5,
            speed_model: SpeedModel::Fixed,
            initial_energy: 100.0,
            metabolic_cost: 0.02,
            curiosity_jitter_chance: 0.02,
            curiosity_jitter: 0.5,
            predator_size: 8.0,
            low_energy_display: 50.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ReproductionSettings {
    pub energy_threshold: f32,
    pub energy_cost: f32,
    /// Per-tick chance once every other condition holds
    pub chance: f64,
    /// Children land within +/- half of this on each axis
    pub spawn_jitter: f32,
    /// Relative size/speed change applied to a child (0.1 = +/-10%)
    pub scale_mutation: f32,
    /// Absolute change applied to unit-range traits (0.2 = +/-0.1)
    pub trait_mutation: f32,
    pub color_mutation_chance: f64,
    /// Full width of the hue shift window, in degrees
    pub hue_shift: f32,
}

impl Default for ReproductionSettings {
    fn default() -> Self {
        Self {
            energy_threshold: 120.0,
            energy_cost: 60.0,
            chance: 0.005,
            spawn_jitter: 20.0,
            scale_mutation: 0.1,
            trait_mutation: 0.2,
            color_mutation_chance: 0.3,
            hue_shift: 60.0,
        }
    }
}

// --- Behaviors ---

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BehaviorSettings {
    pub flock_radius: f32,
    pub separation_radius: f32,
    /// Global gain on the summed flocking force
    pub flock_strength: f32,

    pub threat_radius: f32,
    pub flee_give_up_radius: f32,
    /// Ticks a flee is held before the agent reconsiders
    pub flee_duration: u32,

    pub hunt_radius: f32,
    pub hunt_give_up_radius: f32,
    pub hunt_cooldown: u32,
    /// Radians a hunter may turn per tick
    pub max_turn_rate: f32,

    pub follow_radius: f32,
    pub follow_give_up_radius: f32,
    pub follow_offset_min: f32,
    pub follow_offset_max: f32,
    /// Half-width, in degrees, of the cone behind the lord the offset is drawn from
    pub follow_offset_spread_deg: f32,
    pub follow_strength: f32,
    pub lord_recheck_interval: u32,

    pub observer_radius: f32,
    pub observer_close_distance: f32,
    pub observer_pull: f32,
    pub exclamation_duration: u32,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            flock_radius: 50.0,
            separation_radius: 20.0,
            flock_strength: 0.1,
            threat_radius: 100.0,
            flee_give_up_radius: 200.0,
            flee_duration: 90,
            hunt_radius: 200.0,
            hunt_give_up_radius: 300.0,
            hunt_cooldown: 120,
            max_turn_rate: 0.12,
            follow_radius: 120.0,
            follow_give_up_radius: 250.0,
            follow_offset_min: 40.0,
            follow_offset_max: 60.0,
            follow_offset_spread_deg: 60.0,
            follow_strength: 0.3,
            lord_recheck_interval: 60,
            observer_radius: 150.0,
            observer_close_distance: 30.0,
            observer_pull: 0.5,
            exclamation_duration: 60,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CombatSettings {
    pub size_ratio_min: f32,
    pub size_ratio_max: f32,
    pub bounce_damping: f32,
    pub size_loss_min: f32,
    pub size_loss_max: f32,
    pub energy_cost: f32,
    pub winner_bonus: f32,
    /// Ticks before a fighter may start another combat
    pub cooldown: u32,
    /// Observers above this curiosity are drawn to new fights
    pub curiosity_threshold: f32,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            size_ratio_min: 0.8,
            size_ratio_max: 1.2,
            bounce_damping: 0.8,
            size_loss_min: 0.1,
            size_loss_max: 0.5,
            energy_cost: 5.0,
            winner_bonus: 20.0,
            cooldown: 180,
            curiosity_threshold: 0.7,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EatingSettings {
    pub normal_threshold: f32,
    pub predator_threshold: f32,
    /// Share of the victim's size the eater gains
    pub size_gain: f32,
    pub predator_size_gain_factor: f32,
    /// Share of the victim's energy the eater gains
    pub energy_gain: f32,
    pub predator_energy_bonus: f32,
}

impl Default for EatingSettings {
    fn default() -> Self {
        Self {
            normal_threshold: 1.2,
            predator_threshold: 1.1,
            size_gain: 0.3,
            predator_size_gain_factor: 0.5,
            energy_gain: 0.8,
            predator_energy_bonus: 20.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EnergyPointSettings {
    /// Ticks an energy point lives
    pub lifespan: u32,
    pub attraction_radius: f32,
    pub attraction_strength: f32,
    pub min_split: u32,
    pub max_split: u32,
    pub jitter: f32,
    pub pulse_rate: f32,
}

impl Default for EnergyPointSettings {
    fn default() -> Self {
        Self {
            lifespan: 300,
            attraction_radius: 120.0,
            attraction_strength: 0.3,
            min_split: 3,
            max_split: 6,
            jitter: 20.0,
            pulse_rate: 0.1,
        }
    }
}

// --- Neighbor queries ---

/// How agents look for neighbors, threats, prey and lords
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScanPolicy {
    /// Look at the first `limit` live agents in storage order
    Bounded { limit: usize },
    /// Uniform grid rebuilt every tick; only nearby cells are visited
    Grid { cell_size: f32 },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SpatialSettings {
    pub policy: ScanPolicy,
}

impl Default for SpatialSettings {
    fn default() -> Self {
        Self {
            policy: ScanPolicy::Bounded { limit: 60 },
        }
    }
}

// --- Transport ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializerType {
    #[default]
    Json,
    Binary,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Stdio,
    File,
    #[default]
    Null,
}

/// Transport-specific configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TransportConfig {
    pub serializer: SerializerType,
    pub sender: SenderType,
    pub output_path: Option<String>,
    /// Send every Nth frame
    pub output_frequency: u32,
    /// Attach the recorded draw calls to each snapshot
    pub include_scene: bool,
    /// Populations at or above this size are captured in parallel
    pub parallel_threshold: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            serializer: SerializerType::Json,
            sender: SenderType::Null,
            output_path: None,
            output_frequency: 10,
            include_scene: false,
            parallel_threshold: 2000,
        }
    }
}
