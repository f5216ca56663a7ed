use serde::{Deserialize, Serialize};

/// Every tile kind the world can hold. The numeric code of each variant is
/// what lands in save files, so variants are only ever appended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TileType {
    #[default]
    Air = 0,
    Coal,
    Copper,
    Dirt,
    DirtGrass,
    Iron,
    Stone,
    Bedrock,
    Log,
    Wood,
    Stick,
    Torch,
    Workbench,
    Leaf,
    LeafApple,
    LeafOrange,
    Sand,
    Cactus,
    Furnace,
    Chest,
    CoalOre,
    IronOre,
    CopperOre,
    Wire,
    Steel,
    SteelPlate,
    Engine,
    Glass,
    LandingGear,
    Hatch,
    Wing,
    ControlModule,
    Blade,
    Turbine,
    Snow,
    Ice,
    LavaTop,
    Lava,
}

impl TileType {
    pub const ALL: [TileType; 38] = [
        TileType::Air,
        TileType::Coal,
        TileType::Copper,
        TileType::Dirt,
        TileType::DirtGrass,
        TileType::Iron,
        TileType::Stone,
        TileType::Bedrock,
        TileType::Log,
        TileType::Wood,
        TileType::Stick,
        TileType::Torch,
        TileType::Workbench,
        TileType::Leaf,
        TileType::LeafApple,
        TileType::LeafOrange,
        TileType::Sand,
        TileType::Cactus,
        TileType::Furnace,
        TileType::Chest,
        TileType::CoalOre,
        TileType::IronOre,
        TileType::CopperOre,
        TileType::Wire,
        TileType::Steel,
        TileType::SteelPlate,
        TileType::Engine,
        TileType::Glass,
        TileType::LandingGear,
        TileType::Hatch,
        TileType::Wing,
        TileType::ControlModule,
        TileType::Blade,
        TileType::Turbine,
        TileType::Snow,
        TileType::Ice,
        TileType::LavaTop,
        TileType::Lava,
    ];

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_code(code: u8) -> Option<TileType> {
        Self::ALL.get(code as usize).copied()
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, TileType::Air)
    }

    /// Ores that the vein pass may shuffle between layers.
    #[inline]
    pub const fn is_ore(self) -> bool {
        matches!(self, TileType::CoalOre | TileType::CopperOre | TileType::IronOre)
    }

    /// The item a broken tile turns into.
    pub const fn drop(self) -> TileType {
        match self {
            TileType::DirtGrass => TileType::Dirt,
            TileType::Leaf | TileType::LeafApple | TileType::LeafOrange => TileType::Stick,
            TileType::CoalOre => TileType::Coal,
            other => other,
        }
    }

    pub const fn smelted(self) -> Option<TileType> {
        match self {
            TileType::IronOre => Some(TileType::Iron),
            TileType::CopperOre => Some(TileType::Copper),
            TileType::CoalOre => Some(TileType::Coal),
            TileType::Sand => Some(TileType::Glass),
            TileType::Iron => Some(TileType::Steel),
            _ => None,
        }
    }
}
