//! Drag-and-drop bookkeeping
//!
//! One gesture at a time: a drag starts on one source, and the first drop
//! ends it. A drop with no gesture in flight does nothing.

use crate::component::ComponentId;
use corkboard_kanban::types::CardId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The payload carried by a drag gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropData {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl DropData {
    pub const CARD: &'static str = "card";

    pub fn card(id: &CardId) -> Self {
        Self {
            kind: Self::CARD.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_card(&self) -> bool {
        self.kind == Self::CARD
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Gesture {
    source: ComponentId,
    data: DropData,
}

/// Drop targets and the gesture in flight
#[derive(Debug, Default)]
pub struct DragDrop {
    targets: BTreeSet<ComponentId>,
    gesture: Option<Gesture>,
}

impl DragDrop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(&mut self, id: ComponentId) {
        self.targets.insert(id);
    }

    pub fn is_target(&self, id: ComponentId) -> bool {
        self.targets.contains(&id)
    }

    /// Begin a gesture; false if one is already in flight
    pub fn start(&mut self, source: ComponentId, data: DropData) -> bool {
        if self.gesture.is_some() {
            return false;
        }
        self.gesture = Some(Gesture { source, data });
        true
    }

    /// End the gesture, handing back its payload
    pub fn finish(&mut self) -> Option<DropData> {
        self.gesture.take().map(|gesture| gesture.data)
    }

    pub fn cancel(&mut self) {
        self.gesture = None;
    }

    pub fn active(&self) -> Option<&DropData> {
        self.gesture.as_ref().map(|gesture| &gesture.data)
    }

    /// Forget a component: it stops being a target, and a gesture it
    /// started is abandoned
    pub fn release(&mut self, id: ComponentId) {
        self.targets.remove(&id);
        if self.gesture.as_ref().is_some_and(|g| g.source == id) {
            self.gesture = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_data_wire_shape() {
        let data = DropData::card(&CardId::from("k1"));
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({"type": "card", "id": "k1"}));
        assert!(data.is_card());
    }

    #[test]
    fn test_one_gesture_at_a_time() {
        let mut dnd = DragDrop::new();
        let a = ComponentId(1);
        let b = ComponentId(2);

        assert!(dnd.start(a, DropData::card(&"k1".into())));
        assert!(!dnd.start(b, DropData::card(&"k2".into())));
        assert_eq!(dnd.active().unwrap().id, "k1");

        assert_eq!(dnd.finish().unwrap().id, "k1");
        assert!(dnd.finish().is_none());
    }

    #[test]
    fn test_release_abandons_own_gesture() {
        let mut dnd = DragDrop::new();
        let a = ComponentId(1);
        dnd.add_target(a);
        dnd.start(a, DropData::card(&"k1".into()));

        dnd.release(ComponentId(2));
        assert!(dnd.active().is_some());

        dnd.release(a);
        assert!(dnd.active().is_none());
        assert!(!dnd.is_target(a));
    }
}
