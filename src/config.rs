//! Session configuration.
//!
//! A [`SessionConfig`] is the single, explicitly constructed description of
//! everything static in a session: the category tree, the leaf-to-resource
//! table, the slice slider and the heatmap gradient. It is validated once and
//! never mutated by the running session.
use crate::category::{CategoryDecl, CategoryTree};
use crate::gradient::{GradientConfig, SliceRange, default_gradient};
use crate::loader::ResourceTable;
use geolayers_types::gradient::GradientSpec;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Which sinks a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Checkbox selection feeds the cluster renderer only
    Cluster,
    /// Slice slider feeds the heatmap renderer only
    Heatmap,
    /// Both layers on one map
    #[default]
    Combined,
}

impl SessionMode {
    pub fn clusters(self) -> bool {
        matches!(self, Self::Cluster | Self::Combined)
    }

    pub fn heatmap(self) -> bool {
        matches!(self, Self::Heatmap | Self::Combined)
    }
}

/// Slice slider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SliceConfig {
    /// Resource key prefix; slice `i` loads `<prefix><i>`
    #[serde(default = "SliceConfig::default_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub min: u32,

    #[serde(default = "SliceConfig::default_max")]
    pub max: u32,

    /// Slice committed when the session starts
    #[serde(default)]
    pub initial: u32,
}

impl SliceConfig {
    fn default_prefix() -> String {
        "d201".to_string()
    }

    const fn default_max() -> u32 {
        9
    }

    pub fn range(&self) -> Result<SliceRange, String> {
        SliceRange::new(self.min, self.max).map_err(|e| e.to_string())
    }
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
            min: 0,
            max: Self::default_max(),
            initial: 0,
        }
    }
}

/// Gradient used for one specific slice instead of the base gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradientOverride {
    pub slice: u32,
    pub spec: GradientSpec,
}

/// Session configuration
///
/// # Example
///
/// ```rust
/// use geolayers::{SessionConfig, SessionMode};
///
/// let json = r#"{
///     "categories": [{"id": "pub", "children": ["cafe", "club"]}],
///     "resources": {"cafe": "pub1", "club": "pub2"},
///     "slices": {"min": 0, "max": 5},
///     "mode": "cluster"
/// }"#;
/// let config = SessionConfig::from_json(json).unwrap();
/// assert_eq!(config.mode, SessionMode::Cluster);
/// assert_eq!(config.slices.prefix, "d201");
/// assert_eq!(config.gradient.radius, 40);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Parent categories and their leaves, in display order
    #[serde(default)]
    pub categories: Vec<CategoryDecl>,

    /// Leaf category -> resource key
    #[serde(default)]
    pub resources: ResourceTable,

    #[serde(default)]
    pub slices: SliceConfig,

    #[serde(default = "default_gradient")]
    pub gradient: GradientSpec,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gradient_overrides: Vec<GradientOverride>,

    #[serde(default)]
    pub mode: SessionMode,
}

impl SessionConfig {
    /// Configuration with no categories and default slider/gradient settings.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
            resources: ResourceTable::new(),
            slices: SliceConfig::default(),
            gradient: default_gradient(),
            gradient_overrides: Vec::new(),
            mode: SessionMode::default(),
        }
    }

    /// City amenities preset: five parent groups of OpenStreetMap amenity
    /// leaves, each bound to a per-leaf resource.
    pub fn amenities() -> Self {
        const GROUPS: &[(&str, &[(&str, &str)])] = &[
            (
                "children",
                &[
                    ("arts_centre", "child0"),
                    ("school", "child1"),
                    ("university", "child2"),
                    ("college", "child3"),
                    ("kindergarten", "child4"),
                    ("language_school", "child5"),
                ],
            ),
            (
                "women",
                &[("cinema", "wo0"), ("spa", "wo1"), ("pharmacy", "wo2")],
            ),
            (
                "money",
                &[
                    ("bank", "money0"),
                    ("bureau_de_change", "money1"),
                    ("payment_terminal", "money2"),
                ],
            ),
            (
                "sport",
                &[
                    ("bicycle_parking", "sport0"),
                    ("bicycle_rental", "sport1"),
                    ("training", "sport2"),
                    ("boat_rental", "sport3"),
                ],
            ),
            (
                "pub",
                &[
                    ("pub_small", "pub0"),
                    ("cafe", "pub1"),
                    ("club", "pub2"),
                    ("nightclub", "pub3"),
                ],
            ),
        ];

        let categories = GROUPS
            .iter()
            .map(|(parent, leaves)| CategoryDecl::new(*parent, leaves.iter().map(|(id, _)| *id)))
            .collect();
        let resources = GROUPS
            .iter()
            .flat_map(|(_, leaves)| leaves.iter().copied())
            .collect();

        Self {
            categories,
            resources,
            ..Self::empty()
        }
    }

    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_categories(mut self, categories: Vec<CategoryDecl>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_resources(mut self, resources: ResourceTable) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_slices(mut self, slices: SliceConfig) -> Self {
        self.slices = slices;
        self
    }

    pub fn with_gradient(mut self, gradient: GradientSpec) -> Self {
        self.gradient = gradient;
        self
    }

    pub fn with_gradient_override(mut self, slice: u32, spec: GradientSpec) -> Self {
        self.gradient_overrides.retain(|o| o.slice != slice);
        self.gradient_overrides.push(GradientOverride { slice, spec });
        self
    }

    /// Build the immutable category tree.
    pub fn category_tree(&self) -> crate::Result<CategoryTree> {
        CategoryTree::from_declarations(&self.categories)
    }

    /// Build the slice -> gradient mapping.
    pub fn gradient_config(&self) -> crate::Result<GradientConfig> {
        let range = SliceRange::new(self.slices.min, self.slices.max)?;
        let mut config = GradientConfig::new(range, self.gradient.clone())?;
        for o in &self.gradient_overrides {
            config = config.with_override(o.slice, o.spec.clone())?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let tree = self.category_tree().map_err(|e| e.to_string())?;
        self.resources.validate(&tree)?;

        if self.slices.prefix.is_empty() {
            return Err("Slice prefix cannot be empty".to_string());
        }
        let range = self.slices.range()?;
        if !range.contains(self.slices.initial) {
            return Err(format!(
                "Initial slice {} lies outside [{}, {}]",
                self.slices.initial, range.min, range.max
            ));
        }

        self.gradient_config().map_err(|e| e.to_string())?;

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: SessionConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: SessionConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::amenities()
    }
}
