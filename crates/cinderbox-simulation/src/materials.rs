//! Material definitions and registry

use serde::{Deserialize, Serialize};

/// Built-in material IDs
///
/// Ids are grouped into contiguous category ranges (see [`MaterialCategory`]);
/// the first id of each range doubles as the category's fallback descriptor.
pub struct MaterialId;

impl MaterialId {
    // Empty range (0-15)
    pub const AIR: u8 = 0;

    // Static range (16-79)
    pub const STONE: u8 = 16;
    pub const BEDROCK: u8 = 17;
    pub const WOOD: u8 = 18;
    pub const ICE: u8 = 19;
    pub const GLASS: u8 = 20;
    pub const METAL: u8 = 21;

    // Granular solid range (80-143)
    pub const SAND: u8 = 80;
    pub const DIRT: u8 = 81;
    pub const GRAVEL: u8 = 82;
    pub const ASH: u8 = 83;

    // Liquid range (144-207)
    pub const WATER: u8 = 144;
    pub const OIL: u8 = 145;
    pub const LAVA: u8 = 146;
    pub const ACID: u8 = 147;

    // Gas range (208-239)
    pub const STEAM: u8 = 208;
    pub const SMOKE: u8 = 209;

    // Entity range (240-255), reserved for the entity layer
    pub const ENTITY: u8 = 240;
}

/// How a material behaves physically, derived from its id range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialCategory {
    /// Nothing there (air, vacuum)
    Empty,
    /// Doesn't move (stone, wood, metal)
    Static,
    /// Falls, piles up (sand, gravel, ash)
    Solid,
    /// Flows, seeks level (water, oil, lava)
    Liquid,
    /// Rises, disperses (steam, smoke)
    Gas,
    /// Occupied by an entity; rigid as far as physics is concerned
    Entity,
}

impl MaterialCategory {
    /// Category of a material id. Total over the whole u8 range.
    pub fn of(id: u8) -> Self {
        match id {
            0..=15 => MaterialCategory::Empty,
            16..=79 => MaterialCategory::Static,
            80..=143 => MaterialCategory::Solid,
            144..=207 => MaterialCategory::Liquid,
            208..=239 => MaterialCategory::Gas,
            240..=255 => MaterialCategory::Entity,
        }
    }

    /// First id of this category's range; its descriptor is the fallback
    /// for unregistered ids in the range.
    pub fn base_id(self) -> u8 {
        match self {
            MaterialCategory::Empty => 0,
            MaterialCategory::Static => 16,
            MaterialCategory::Solid => 80,
            MaterialCategory::Liquid => 144,
            MaterialCategory::Gas => 208,
            MaterialCategory::Entity => 240,
        }
    }

    /// Solids and liquids participate in movement and extraction
    pub fn is_movable(self) -> bool {
        matches!(self, MaterialCategory::Solid | MaterialCategory::Liquid)
    }

    /// Statics and entities freeze any automaton block containing them
    pub fn is_rigid(self) -> bool {
        matches!(self, MaterialCategory::Static | MaterialCategory::Entity)
    }

    /// Thermal expansion coefficient (per Kelvin of deviation from the
    /// material's default temperature). Liquids expand more than solids,
    /// gases most of all.
    pub fn thermal_expansion(self) -> f32 {
        match self {
            MaterialCategory::Solid => 1.0e-4,
            MaterialCategory::Liquid => 4.0e-4,
            MaterialCategory::Gas => 2.0e-3,
            _ => 0.0,
        }
    }
}

/// Definition of a material's physical properties
///
/// Temperatures are in Kelvin throughout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialDef {
    pub id: u8,
    pub name: String,
    pub category: MaterialCategory,

    /// Density (g/cm³) - affects sinking/floating
    pub density: f32,
    /// Topple resistance (0.0 = frictionless, 1.0 = never topples)
    pub friction: f32,

    /// Heat conductivity (0.0 - 1.0)
    pub conductivity: f32,
    /// Heat retention (0.0 - 1.0); higher keeps more of its own heat per exchange
    pub capacity: f32,
    /// Temperature this material spawns at
    pub default_temperature: u16,

    /// Temperature at which this melts
    pub melting_point: Option<u16>,
    /// Temperature at which this boils/evaporates
    pub boiling_point: Option<u16>,
    /// Temperature at which this freezes/condenses
    pub freezing_point: Option<u16>,
    /// What this becomes when melted
    pub melts_to: Option<u8>,
    /// What this becomes when boiled
    pub boils_to: Option<u8>,
    /// What this becomes when frozen
    pub freezes_to: Option<u8>,

    /// Damages entities on contact
    pub corrosive: bool,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            id: 0,
            name: "unknown".to_string(),
            category: MaterialCategory::Empty,
            density: 1.0,
            friction: 0.5,
            conductivity: 0.5,
            capacity: 0.5,
            default_temperature: 293,
            melting_point: None,
            boiling_point: None,
            freezing_point: None,
            melts_to: None,
            boils_to: None,
            freezes_to: None,
            corrosive: false,
        }
    }
}

impl MaterialDef {
    /// Density adjusted for thermal expansion at the given temperature.
    ///
    /// The expansion multiplier is clamped to [0.2, 3.5] of base density so
    /// extreme temperatures never invert the buoyancy ordering entirely.
    pub fn effective_density(&self, temperature: u16) -> f32 {
        let deviation = temperature as f32 - self.default_temperature as f32;
        let factor = 1.0 - self.category.thermal_expansion() * deviation;
        self.density * factor.clamp(0.2, 3.5)
    }
}

/// Registry of all materials
///
/// Every id in 0..=255 resolves to a descriptor: construction seeds the
/// whole table with each category's base descriptor, and `register`
/// overwrites specific ids.
pub struct Materials {
    defs: Vec<MaterialDef>,
}

impl Materials {
    pub fn new() -> Self {
        let defs = (0u16..=255)
            .map(|id| {
                let id = id as u8;
                let category = MaterialCategory::of(id);
                MaterialDef {
                    id,
                    name: format!("{}_{}", Self::category_name(category), id),
                    category,
                    density: Self::category_density(category),
                    friction: Self::category_friction(category),
                    ..Default::default()
                }
            })
            .collect();

        let mut materials = Self { defs };
        materials.register_defaults();
        materials
    }

    fn category_name(category: MaterialCategory) -> &'static str {
        match category {
            MaterialCategory::Empty => "empty",
            MaterialCategory::Static => "static",
            MaterialCategory::Solid => "solid",
            MaterialCategory::Liquid => "liquid",
            MaterialCategory::Gas => "gas",
            MaterialCategory::Entity => "entity",
        }
    }

    fn category_density(category: MaterialCategory) -> f32 {
        match category {
            MaterialCategory::Empty => 0.0012,
            MaterialCategory::Static => 2.5,
            MaterialCategory::Solid => 1.5,
            MaterialCategory::Liquid => 1.0,
            MaterialCategory::Gas => 0.0008,
            MaterialCategory::Entity => 1.0,
        }
    }

    fn category_friction(category: MaterialCategory) -> f32 {
        match category {
            MaterialCategory::Empty => 0.0,
            MaterialCategory::Static => 1.0,
            MaterialCategory::Solid => 0.4,
            MaterialCategory::Liquid => 0.05,
            MaterialCategory::Gas => 0.0,
            MaterialCategory::Entity => 1.0,
        }
    }

    fn register_defaults(&mut self) {
        // Air (empty space)
        self.register(MaterialDef {
            id: MaterialId::AIR,
            name: "air".to_string(),
            category: MaterialCategory::Empty,
            density: 0.0012,
            friction: 0.0,
            conductivity: 0.1,
            capacity: 0.0,
            ..Default::default()
        });

        // Stone
        self.register(MaterialDef {
            id: MaterialId::STONE,
            name: "stone".to_string(),
            category: MaterialCategory::Static,
            density: 2.6,
            friction: 1.0,
            conductivity: 0.5,
            capacity: 0.6,
            melting_point: Some(1473),
            melts_to: Some(MaterialId::LAVA),
            ..Default::default()
        });

        // Bedrock - indestructible world boundary
        self.register(MaterialDef {
            id: MaterialId::BEDROCK,
            name: "bedrock".to_string(),
            category: MaterialCategory::Static,
            density: 100.0,
            friction: 1.0,
            conductivity: 0.05,
            capacity: 0.9,
            ..Default::default()
        });

        // Wood
        self.register(MaterialDef {
            id: MaterialId::WOOD,
            name: "wood".to_string(),
            category: MaterialCategory::Static,
            density: 0.7,
            friction: 1.0,
            conductivity: 0.15,
            capacity: 0.4,
            ..Default::default()
        });

        // Ice
        self.register(MaterialDef {
            id: MaterialId::ICE,
            name: "ice".to_string(),
            category: MaterialCategory::Static,
            density: 0.92,
            friction: 1.0,
            conductivity: 0.4,
            capacity: 0.3,
            default_temperature: 263,
            melting_point: Some(273),
            melts_to: Some(MaterialId::WATER),
            ..Default::default()
        });

        // Glass
        self.register(MaterialDef {
            id: MaterialId::GLASS,
            name: "glass".to_string(),
            category: MaterialCategory::Static,
            density: 2.5,
            friction: 1.0,
            conductivity: 0.2,
            capacity: 0.5,
            melting_point: Some(1673),
            melts_to: Some(MaterialId::LAVA),
            ..Default::default()
        });

        // Metal
        self.register(MaterialDef {
            id: MaterialId::METAL,
            name: "metal".to_string(),
            category: MaterialCategory::Static,
            density: 7.8,
            friction: 1.0,
            conductivity: 0.95,
            capacity: 0.7,
            melting_point: Some(1773),
            melts_to: Some(MaterialId::LAVA),
            ..Default::default()
        });

        // Sand
        self.register(MaterialDef {
            id: MaterialId::SAND,
            name: "sand".to_string(),
            category: MaterialCategory::Solid,
            density: 1.6,
            friction: 0.35,
            conductivity: 0.35,
            capacity: 0.5,
            melting_point: Some(1973),
            melts_to: Some(MaterialId::LAVA),
            ..Default::default()
        });

        // Dirt
        self.register(MaterialDef {
            id: MaterialId::DIRT,
            name: "dirt".to_string(),
            category: MaterialCategory::Solid,
            density: 1.3,
            friction: 0.5,
            conductivity: 0.3,
            capacity: 0.5,
            ..Default::default()
        });

        // Gravel
        self.register(MaterialDef {
            id: MaterialId::GRAVEL,
            name: "gravel".to_string(),
            category: MaterialCategory::Solid,
            density: 1.8,
            friction: 0.55,
            conductivity: 0.4,
            capacity: 0.55,
            ..Default::default()
        });

        // Ash - very loose, insulating
        self.register(MaterialDef {
            id: MaterialId::ASH,
            name: "ash".to_string(),
            category: MaterialCategory::Solid,
            density: 0.5,
            friction: 0.15,
            conductivity: 0.1,
            capacity: 0.2,
            ..Default::default()
        });

        // Water
        self.register(MaterialDef {
            id: MaterialId::WATER,
            name: "water".to_string(),
            category: MaterialCategory::Liquid,
            density: 1.0,
            friction: 0.05,
            conductivity: 0.6,
            capacity: 0.7,
            boiling_point: Some(373),
            boils_to: Some(MaterialId::STEAM),
            freezing_point: Some(273),
            freezes_to: Some(MaterialId::ICE),
            ..Default::default()
        });

        // Oil - floats on water
        self.register(MaterialDef {
            id: MaterialId::OIL,
            name: "oil".to_string(),
            category: MaterialCategory::Liquid,
            density: 0.85,
            friction: 0.1,
            conductivity: 0.25,
            capacity: 0.6,
            boiling_point: Some(573),
            boils_to: Some(MaterialId::SMOKE),
            ..Default::default()
        });

        // Lava
        self.register(MaterialDef {
            id: MaterialId::LAVA,
            name: "lava".to_string(),
            category: MaterialCategory::Liquid,
            density: 2.8,
            friction: 0.4,
            conductivity: 0.8,
            capacity: 0.95,
            default_temperature: 1473,
            freezing_point: Some(973),
            freezes_to: Some(MaterialId::STONE),
            ..Default::default()
        });

        // Acid
        self.register(MaterialDef {
            id: MaterialId::ACID,
            name: "acid".to_string(),
            category: MaterialCategory::Liquid,
            density: 1.1,
            friction: 0.05,
            conductivity: 0.45,
            capacity: 0.5,
            boiling_point: Some(391),
            boils_to: Some(MaterialId::SMOKE),
            corrosive: true,
            ..Default::default()
        });

        // Steam
        self.register(MaterialDef {
            id: MaterialId::STEAM,
            name: "steam".to_string(),
            category: MaterialCategory::Gas,
            density: 0.0006,
            friction: 0.0,
            conductivity: 0.3,
            capacity: 0.1,
            default_temperature: 383,
            freezing_point: Some(373),
            freezes_to: Some(MaterialId::WATER),
            ..Default::default()
        });

        // Smoke
        self.register(MaterialDef {
            id: MaterialId::SMOKE,
            name: "smoke".to_string(),
            category: MaterialCategory::Gas,
            density: 0.0008,
            friction: 0.0,
            conductivity: 0.1,
            capacity: 0.1,
            default_temperature: 423,
            ..Default::default()
        });

        // Entity range base
        self.register(MaterialDef {
            id: MaterialId::ENTITY,
            name: "entity".to_string(),
            category: MaterialCategory::Entity,
            density: 1.0,
            friction: 1.0,
            conductivity: 0.3,
            capacity: 0.6,
            default_temperature: 310,
            ..Default::default()
        });
    }

    fn register(&mut self, material: MaterialDef) {
        let id = material.id as usize;
        if material.category != MaterialCategory::of(material.id) {
            log::warn!(
                "material '{}' registered with id {} outside its category range",
                material.name,
                material.id
            );
        }
        self.defs[id] = material;
    }

    /// Get material definition by ID. Total: unregistered ids resolve to
    /// their category's base descriptor seeded at construction.
    pub fn get(&self, id: u8) -> &MaterialDef {
        &self.defs[id as usize]
    }
}

impl Default for Materials {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges_cover_u8() {
        for id in 0..=255u8 {
            // of() is a total match; just confirm base ids stay in-range
            let category = MaterialCategory::of(id);
            assert_eq!(MaterialCategory::of(category.base_id()), category);
        }
    }

    #[test]
    fn test_every_id_resolves() {
        let materials = Materials::new();
        for id in 0..=255u8 {
            let def = materials.get(id);
            assert_eq!(def.category, MaterialCategory::of(id), "id {id}");
        }
    }

    #[test]
    fn test_unregistered_id_falls_back_to_category() {
        let materials = Materials::new();
        // 100 is in the granular solid range but unregistered
        let def = materials.get(100);
        assert_eq!(def.category, MaterialCategory::Solid);
        assert!(def.category.is_movable());
    }

    #[test]
    fn test_builtin_materials() {
        let materials = Materials::new();
        assert_eq!(materials.get(MaterialId::WATER).name, "water");
        assert_eq!(
            materials.get(MaterialId::SAND).category,
            MaterialCategory::Solid
        );
        assert_eq!(
            materials.get(MaterialId::BEDROCK).category,
            MaterialCategory::Static
        );
        assert!(materials.get(MaterialId::ACID).corrosive);
    }

    #[test]
    fn test_movable_categories() {
        assert!(MaterialCategory::Solid.is_movable());
        assert!(MaterialCategory::Liquid.is_movable());
        assert!(!MaterialCategory::Static.is_movable());
        assert!(!MaterialCategory::Gas.is_movable());
        assert!(!MaterialCategory::Empty.is_movable());
        assert!(MaterialCategory::Entity.is_rigid());
    }

    #[test]
    fn test_effective_density_expands_with_heat() {
        let materials = Materials::new();
        let water = materials.get(MaterialId::WATER);

        let cold = water.effective_density(water.default_temperature);
        let hot = water.effective_density(water.default_temperature + 50);
        assert!(hot < cold, "hot water should be less dense");
    }

    #[test]
    fn test_effective_density_clamped() {
        let materials = Materials::new();
        let steam = materials.get(MaterialId::STEAM);

        // Gas expansion at extreme heat bottoms out at 0.2x base
        let extreme = steam.effective_density(u16::MAX);
        assert!((extreme - steam.density * 0.2).abs() < 1e-9);

        // Cold gas is denser, but never beyond 3.5x base
        let frozen = steam.effective_density(0);
        assert!(frozen > steam.density);
        assert!(frozen <= steam.density * 3.5);
    }

    #[test]
    fn test_state_change_chain_is_closed() {
        let materials = Materials::new();
        for id in 0..=255u8 {
            let def = materials.get(id);
            for successor in [def.melts_to, def.boils_to, def.freezes_to]
                .into_iter()
                .flatten()
            {
                // Successors must themselves resolve (trivially true, but
                // guards against ids pointing at the wrong range)
                let next = materials.get(successor);
                assert_ne!(
                    next.category,
                    MaterialCategory::Entity,
                    "material {} transitions into the entity range",
                    def.name
                );
            }
        }
    }
}
