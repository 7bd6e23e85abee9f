use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Weapon table index
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumString,
    IntoStaticStr,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum Weapon {
    #[strum(serialize = "NONE")]
    None = 0,
    #[strum(serialize = "M9")]
    M9 = 1,
    #[strum(serialize = "USP")]
    Usp = 2,
    #[strum(serialize = "SOCOM")]
    Socom = 3,
    #[strum(serialize = "PSG1")]
    Psg1 = 4,
    #[strum(serialize = "RGB6")]
    Rgb6 = 5,
    #[strum(serialize = "NIKITA")]
    Nikita = 6,
    #[strum(serialize = "STINGER")]
    Stinger = 7,
    #[strum(serialize = "CLAYMORE")]
    Claymore = 8,
    #[strum(serialize = "C4")]
    C4 = 9,
    #[strum(serialize = "CHAFF")]
    Chaff = 10,
    #[strum(serialize = "STUNG")]
    StunGrenade = 11,
    #[strum(serialize = "DMIC")]
    DirectionalMic = 12,
    #[strum(serialize = "HFBLADE")]
    HfBlade = 13,
    #[strum(serialize = "COOLANT")]
    Coolant = 14,
    #[strum(serialize = "AKS74U")]
    Aks74u = 15,
    #[strum(serialize = "MAGAZINE")]
    Magazine = 16,
    #[strum(serialize = "GRENADE")]
    Grenade = 17,
    #[strum(serialize = "M4")]
    M4 = 18,
    #[strum(serialize = "PSG1T")]
    Psg1T = 19,
    #[strum(serialize = "DMIC2")]
    DirectionalMic2 = 20,
    #[strum(serialize = "BOOK")]
    Book = 21,
}

impl Weapon {
    /// Decode an equipped-weapon or table index. Out-of-range values are `None`.
    pub fn from_raw(value: i16) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::from_repr)
    }

    pub fn index(self) -> i64 {
        self as i64
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }

    /// Name used in player-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "nothing",
            Self::M9 => "M9",
            Self::Usp => "USP",
            Self::Socom => "SOCOM",
            Self::Psg1 => "PSG1",
            Self::Rgb6 => "RGB6",
            Self::Nikita => "Nikita",
            Self::Stinger => "Stinger",
            Self::Claymore => "Claymore",
            Self::C4 => "C4",
            Self::Chaff => "Chaff Grenade",
            Self::StunGrenade => "Stun Grenade",
            Self::DirectionalMic => "Directional Microphone",
            Self::HfBlade => "HF Blade",
            Self::Coolant => "Coolant",
            Self::Aks74u => "AKS74U",
            Self::Magazine => "Empty Magazine",
            Self::Grenade => "Grenade",
            Self::M4 => "M4",
            Self::Psg1T => "PSG1-T",
            Self::DirectionalMic2 => "Directional Microphone",
            Self::Book => "Book",
        }
    }

    /// Whether the weapon carries a count at all. Unequipped, the
    /// microphones, the blade and the coolant spray share the table layout
    /// but their counts must not be touched.
    pub fn has_ammo(&self) -> bool {
        !matches!(
            self,
            Self::None | Self::DirectionalMic | Self::HfBlade | Self::Coolant | Self::DirectionalMic2
        )
    }

    /// Whether the weapon is fed from the clip counter.
    pub fn has_clip(&self) -> bool {
        matches!(
            self,
            Self::M9 | Self::Usp | Self::Socom | Self::Psg1 | Self::Rgb6 | Self::Aks74u | Self::M4 | Self::Psg1T
        )
    }

    /// What an ammo top-up adds to, completing "added N ..."
    pub fn top_up_phrase(&self) -> String {
        match self {
            Self::Rgb6 => "grenades into the RGB6".to_string(),
            Self::Nikita => "remote controlled missiles to the Nikita".to_string(),
            Self::Stinger => "missiles to the Stinger".to_string(),
            Self::Claymore | Self::Chaff | Self::StunGrenade | Self::Grenade => {
                format!("to the {} pouch", self.label())
            }
            Self::C4 | Self::Magazine => format!("to the {} count", self.label()),
            Self::Book => "to the Book supply".to_string(),
            other => format!("ammo to the {}", other.label()),
        }
    }
}

/// Item table index
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumString,
    IntoStaticStr,
    Display,
    EnumIter,
)]
#[repr(u8)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Item {
    None = 0,
    Ration = 1,
    Scope = 2,
    Medicine = 3,
    Bandage = 4,
    Pentazemin = 5,
    Bdu = 6,
    Armor = 7,
    Stealth = 8,
    #[strum(serialize = "MINED")]
    MineDetector = 9,
    #[strum(serialize = "SENSA")]
    SensorA = 10,
    #[strum(serialize = "SENSB")]
    SensorB = 11,
    Nvg = 12,
    #[strum(serialize = "THERMG")]
    ThermalGoggles = 13,
    Scope2 = 14,
    #[strum(serialize = "DGCAM")]
    DigitalCamera = 15,
    Box1 = 16,
    Cigs = 17,
    Card = 18,
    Shaver = 19,
    Phone = 20,
    Camera = 21,
    Box2 = 22,
    Box3 = 23,
    #[strum(serialize = "WETBOX")]
    WetBox = 24,
    #[strum(serialize = "APSENSR")]
    ApSensor = 25,
    Box4 = 26,
    Box5 = 27,
    Razor = 28,
    #[strum(serialize = "SCMSUPR")]
    SocomSuppressor = 29,
    #[strum(serialize = "AKSUPR")]
    AkSuppressor = 30,
    Camera2 = 31,
    Bandana = 32,
    #[strum(serialize = "DOGTAGS")]
    DogTags = 33,
    #[strum(serialize = "MODISC")]
    MoDisc = 34,
    #[strum(serialize = "USPSUPR")]
    UspSuppressor = 35,
    #[strum(serialize = "SPWIG")]
    SpWig = 36,
    #[strum(serialize = "WIGA")]
    WigA = 37,
    #[strum(serialize = "WIGB")]
    WigB = 38,
    #[strum(serialize = "WIGC")]
    WigC = 39,
    #[strum(serialize = "WIGD")]
    WigD = 40,
}

impl Item {
    pub fn from_raw(value: i16) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::from_repr)
    }

    pub fn index(self) -> i64 {
        self as i64
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }
}

/// Playable character, from the character id string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Character {
    Snake,
    Raiden,
    Other,
}

impl Character {
    pub fn from_id(id: &str) -> Self {
        match id.trim() {
            "r_tnk0" | "r_vr_s" | "r_vr_1" => Self::Snake,
            "r_plt0" | "r_vr_b" | "r_vr_r" => Self::Raiden,
            _ => Self::Other,
        }
    }

    /// Item that grants unlimited ammo to this character, if any
    pub fn infinite_ammo_item(&self) -> Option<Item> {
        match self {
            Self::Snake => Some(Item::Bandana),
            Self::Raiden => Some(Item::SpWig),
            Self::Other => None,
        }
    }
}
