//! Page-break markers

use crate::pagination::PaginationState;
use serde::Serialize;

/// Which side of its position a marker sticks to when content is inserted
/// exactly there. Markers always render in front of the block they precede.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Before,
}

/// A non-editable visual marker placed in front of the block that starts a
/// new page. Not part of document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreakMarker {
    /// Document position the marker is anchored at
    pub position: usize,
    /// Number of the page that starts here (the first break starts page 2)
    pub page_number: usize,
    pub label: String,
    /// Stable per-index key for the host's reconciliation
    pub key: String,
    pub side: Side,
}

impl PageBreakMarker {
    pub fn new(index: usize, position: usize) -> Self {
        let page_number = index + 2;
        Self {
            position,
            page_number,
            label: format!("Page {page_number}"),
            key: format!("page-break-{index}"),
            side: Side::Before,
        }
    }
}

/// One marker per break, in document order
pub fn build_markers(state: &PaginationState) -> Vec<PageBreakMarker> {
    state
        .breaks()
        .iter()
        .enumerate()
        .map(|(index, &position)| PageBreakMarker::new(index, position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_marker_fields() {
        let marker = PageBreakMarker::new(0, 42);
        assert_eq!(marker.position, 42);
        assert_eq!(marker.page_number, 2);
        assert_eq!(marker.label, "Page 2");
        assert_eq!(marker.key, "page-break-0");
        assert_eq!(marker.side, Side::Before);
    }

    #[test]
    fn test_build_markers_in_order() {
        let state = PaginationState::new(smallvec![10, 25, 90], 4);
        let markers = build_markers(&state);
        let labels: Vec<_> = markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Page 2", "Page 3", "Page 4"]);
        assert_eq!(markers[2].position, 90);
    }

    #[test]
    fn test_no_breaks_no_markers() {
        assert!(build_markers(&PaginationState::initial()).is_empty());
    }

    #[test]
    fn test_marker_json_shape() {
        let json = serde_json::to_value(PageBreakMarker::new(1, 7)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "position": 7,
                "pageNumber": 3,
                "label": "Page 3",
                "key": "page-break-1",
                "side": "before",
            })
        );
    }
}
