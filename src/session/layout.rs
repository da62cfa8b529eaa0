use serde::Serialize;

/// Built-in strip layouts offered on the layout screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LayoutPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub photo_count: usize,
}

pub const LAYOUT_PRESETS: &[LayoutPreset] = &[
    LayoutPreset {
        id: "strip-3-vertical",
        name: "Layout A",
        description: "Size 6 x 2 Strip (3 Pose)",
        photo_count: 3,
    },
    LayoutPreset {
        id: "strip-4-vertical",
        name: "Layout B",
        description: "Size 6 x 2 Strip (4 Pose)",
        photo_count: 4,
    },
    LayoutPreset {
        id: "strip-2-vertical",
        name: "Layout C",
        description: "Size 6 x 2 Strip (2 Pose)",
        photo_count: 2,
    },
    LayoutPreset {
        id: "strip-6-grid",
        name: "Layout D",
        description: "Size 6 x 4 Strip (6 Pose)",
        photo_count: 6,
    },
    LayoutPreset {
        id: "strip-4-horizontal",
        name: "Layout E",
        description: "Size 8 x 2 Strip (4 Pose Horizontal)",
        photo_count: 4,
    },
    LayoutPreset {
        id: "strip-mixed",
        name: "Layout F",
        description: "Mixed Layout Strip",
        photo_count: 4,
    },
];

impl LayoutPreset {
    /// Look up by id or display name, ignoring ASCII case.
    pub fn by_id(id: &str) -> Option<&'static Self> {
        let id = id.trim();
        LAYOUT_PRESETS
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id) || p.name.eq_ignore_ascii_case(id))
    }
}
