//! Editable regions and their identities.

use serde::{Deserialize, Serialize};

use super::geometry::{BoundingBox, Viewport};

/// Stable identity of one editable region within a page.
///
/// Backed by the browser's node identity (backend node id over CDP); never
/// derived from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u64);

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to exactly one live editable region.
///
/// Equality is by identity, not content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComposerHandle {
    pub id: RegionId,
}

impl ComposerHandle {
    pub fn new(id: RegionId) -> Self {
        Self { id }
    }
}

/// One directly user-editable element, as observed in a page snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableRegion {
    pub id: RegionId,
    pub bounds: BoundingBox,
    /// False when hidden via `display` or `visibility`.
    pub visible: bool,
    pub tag_name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub aria_label: Option<String>,
}

impl EditableRegion {
    pub fn new(id: RegionId, bounds: BoundingBox) -> Self {
        Self {
            id,
            bounds,
            visible: true,
            tag_name: "div".to_string(),
            role: None,
            aria_label: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Point-in-time view of all editable regions plus the viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub viewport: Viewport,
    pub regions: Vec<EditableRegion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality_is_by_id() {
        let a = ComposerHandle::new(RegionId(1));
        let b = ComposerHandle::new(RegionId(1));
        let c = ComposerHandle::new(RegionId(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_snapshot_deserializes_from_page_json() {
        let json = serde_json::json!({
            "viewport": {"width": 1280.0, "height": 800.0},
            "regions": [{
                "id": 7,
                "bounds": {"x": 100.0, "y": 700.0, "width": 600.0, "height": 40.0},
                "visible": true,
                "tagName": "div",
                "role": "textbox",
                "ariaLabel": "Type a message"
            }]
        });
        let snapshot: PageSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.regions.len(), 1);
        assert_eq!(snapshot.regions[0].id, RegionId(7));
        assert_eq!(snapshot.regions[0].role.as_deref(), Some("textbox"));
    }

    #[test]
    fn test_region_optional_attributes_default() {
        let json = serde_json::json!({
            "id": 1,
            "bounds": {"x": 0.0, "y": 0.0, "width": 300.0, "height": 40.0},
            "visible": true,
            "tagName": "div"
        });
        let region: EditableRegion = serde_json::from_value(json).unwrap();
        assert!(region.role.is_none());
        assert!(region.aria_label.is_none());
    }
}
