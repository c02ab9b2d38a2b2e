use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

pub const CONFIG_VERSION: u32 = 1;

/// Largest drop radius whose fixed-point depth `r² << 16` fits an `i32`.
pub const MAX_DROP_RADIUS: i32 = 181;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WallConfig {
    pub version: u32,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub fall: FallSettings,
    #[serde(default)]
    pub galaxy: GalaxySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunSettings {
    pub frames: u64,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub frame_interval: Duration,
    pub seed: u64,
    #[serde(
        deserialize_with = "deserialize_viewport",
        serialize_with = "serialize_viewport"
    )]
    pub viewport: ViewportSize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FallSettings {
    pub mesh_resolution: u32,
    pub leaves: u32,
    pub falling_leaves: u32,
    pub drop_radius: i32,
    /// Sky scroll per frame in texture units; random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sky_speed: Option<[f32; 2]>,
    pub show_normals: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GalaxySettings {
    pub particles: u32,
    pub galaxy_radius: f32,
    pub layout: ParticleLayout,
    pub x_offset: f32,
    pub preview: bool,
}

/// How star particles are expanded into vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleLayout {
    /// One point sprite per star; requires host point-size support.
    Points,
    /// One billboard triangle per star.
    Triangles,
}

impl ParticleLayout {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "points" | "point" | "sprites" => Ok(Self::Points),
            "triangles" | "triangle" | "tris" => Ok(Self::Triangles),
            other => Err(format!(
                "unknown particle layout '{other}'; expected points or triangles"
            )),
        }
    }

    pub fn vertices_per_particle(self) -> u32 {
        match self {
            Self::Points => 1,
            Self::Triangles => 3,
        }
    }
}

impl Default for ParticleLayout {
    fn default() -> Self {
        Self::Triangles
    }
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            run: RunSettings::default(),
            fall: FallSettings::default(),
            galaxy: GalaxySettings::default(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_interval: default_frame_interval(),
            seed: 0x5eed,
            viewport: ViewportSize {
                width: 1080,
                height: 1920,
            },
        }
    }
}

impl Default for FallSettings {
    fn default() -> Self {
        Self {
            mesh_resolution: 48,
            leaves: 14,
            falling_leaves: 4,
            drop_radius: 2,
            sky_speed: None,
            show_normals: false,
        }
    }
}

impl Default for GalaxySettings {
    fn default() -> Self {
        Self {
            particles: 12_000,
            galaxy_radius: 300.0,
            layout: ParticleLayout::default(),
            x_offset: 0.5,
            preview: false,
        }
    }
}

fn default_frame_interval() -> Duration {
    Duration::from_millis(16)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_viewport<'de, D>(deserializer: D) -> Result<ViewportSize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Table { width: u32, height: u32 },
    }

    match Helper::deserialize(deserializer)? {
        Helper::Str(raw) => parse_viewport(&raw).map_err(de::Error::custom),
        Helper::Table { width, height } => Ok(ViewportSize { width, height }),
    }
}

fn serialize_viewport<S>(value: &ViewportSize, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{}x{}", value.width, value.height))
}

pub fn parse_viewport(raw: &str) -> Result<ViewportSize, String> {
    let (w, h) = raw
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid viewport width '{w}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid viewport height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err("viewport dimensions must be greater than zero".into());
    }
    Ok(ViewportSize { width, height })
}

impl WallConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: WallConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        let viewport = self.run.viewport;
        if viewport.width == 0 || viewport.height == 0 {
            return Err(ConfigError::Invalid(
                "run.viewport dimensions must be greater than zero".into(),
            ));
        }

        if self.run.frame_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "run.frame_interval must be greater than zero".into(),
            ));
        }

        let fall = &self.fall;
        if !(1..=MAX_DROP_RADIUS).contains(&fall.drop_radius) {
            return Err(ConfigError::Invalid(format!(
                "fall.drop_radius must be between 1 and {MAX_DROP_RADIUS}, got {}",
                fall.drop_radius
            )));
        }

        let min_resolution = 2 * fall.drop_radius as u32 + 2;
        if fall.mesh_resolution < min_resolution {
            return Err(ConfigError::Invalid(format!(
                "fall.mesh_resolution must be >= {min_resolution} for drop_radius {}",
                fall.drop_radius
            )));
        }

        if fall.falling_leaves > fall.leaves {
            return Err(ConfigError::Invalid(format!(
                "fall.falling_leaves ({}) exceeds fall.leaves ({})",
                fall.falling_leaves, fall.leaves
            )));
        }

        if let Some([x, y]) = fall.sky_speed {
            if !x.is_finite() || !y.is_finite() {
                return Err(ConfigError::Invalid(
                    "fall.sky_speed components must be finite".into(),
                ));
            }
        }

        let galaxy = &self.galaxy;
        if galaxy.particles == 0 {
            return Err(ConfigError::Invalid(
                "galaxy.particles must be greater than zero".into(),
            ));
        }

        if !(galaxy.galaxy_radius > 0.0) {
            return Err(ConfigError::Invalid(
                "galaxy.galaxy_radius must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&galaxy.x_offset) {
            return Err(ConfigError::Invalid(format!(
                "galaxy.x_offset {} must be within [0, 1]",
                galaxy.x_offset
            )));
        }

        Ok(())
    }
}
