use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A theme grouping stories across sprints.
///
/// Stories point at epics by `name`. The `total` field is stored remotely but
/// never trusted: the board recomputes it from stories (see
/// [`views::epic_totals`](crate::views::epic_totals)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    pub id: String,
    pub name: String,
    #[serde(rename = "iconName")]
    pub icon_key: String,
    #[serde(rename = "color")]
    pub color_key: String,
    #[serde(default)]
    pub total: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Icon used for epics created without an explicit choice.
pub const DEFAULT_EPIC_ICON: &str = "BookIcon";

/// Color used for epics created without an explicit choice.
pub const DEFAULT_EPIC_COLOR: &str = "bg-purple-500";

/// Icons the epic editor offers.
pub const EPIC_ICONS: &[&str] = &[
    "BookIcon",
    "SmartphoneIcon",
    "DollarIcon",
    "LinkIcon",
    "ZapIcon",
    "CalendarIcon",
    "CircleIcon",
    "PlayIcon",
    "CheckIcon",
    "TrendingIcon",
];

/// Colors the epic editor offers.
pub const EPIC_COLORS: &[&str] = &[
    "bg-purple-500",
    "bg-blue-500",
    "bg-green-500",
    "bg-yellow-500",
    "bg-red-500",
    "bg-pink-500",
    "bg-indigo-500",
    "bg-orange-500",
];
