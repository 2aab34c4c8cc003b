//! Hit regions rebuilt on every pane render.

use serde::Serialize;

use crate::pane::PaneId;

/// What a region stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Cluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
    RowResize,
}

impl Cursor {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::RowResize => "row-resize",
        }
    }
}

/// An interactive box in pane-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitRegion {
    pub kind: RegionKind,
    /// Payload interpreted by the pane that added the region; for
    /// [`RegionKind::Cluster`] it is the index into the pane's clusters.
    pub data: usize,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub cursor: Option<Cursor>,
    pub pane: PaneId,
}

impl HitRegion {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Ordered region table for one pane. Lookups return the first region that
/// contains the point, so earlier regions win over later ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitRegions {
    regions: Vec<HitRegion>,
}

impl HitRegions {
    pub fn add(&mut self, region: HitRegion) {
        self.regions.push(region);
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HitRegion> {
        self.regions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitRegion> {
        self.regions.iter()
    }

    pub fn find(&self, x: f64, y: f64) -> Option<&HitRegion> {
        self.regions.iter().find(|r| r.contains(x, y))
    }
}
