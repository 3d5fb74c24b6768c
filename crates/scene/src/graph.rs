//! Fan-out of frame snapshots to every registered subsystem.

use tinsel_hand_model::FrameSnapshot;

use crate::effects::{HeartBurst, VictoryGlow};
use crate::formation::{FoliageField, OrnamentField, RibbonStrip};
use crate::rig::TreeRig;
use crate::{AnimationSubsystem, SubsystemReport};

/// Owns the subsystems and advances them in registration order.
#[derive(Default)]
pub struct SceneGraph {
    subsystems: Vec<Box<dyn AnimationSubsystem>>,
    ticks: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full tree scene: formation layers, rig, and both effects.
    pub fn standard() -> Self {
        let mut graph = Self::new();
        graph.add(Box::new(FoliageField::new()));
        graph.add(Box::new(OrnamentField::default()));
        graph.add(Box::new(RibbonStrip::new()));
        graph.add(Box::new(TreeRig::new()));
        graph.add(Box::new(HeartBurst::new()));
        graph.add(Box::new(VictoryGlow::new()));
        graph
    }

    pub fn add(&mut self, subsystem: Box<dyn AnimationSubsystem>) {
        tracing::debug!(subsystem = subsystem.name(), "Registered subsystem");
        self.subsystems.push(subsystem);
    }

    /// Hand the same snapshot to every subsystem.
    pub fn broadcast(&mut self, frame: &FrameSnapshot, dt: f64) {
        for subsystem in &mut self.subsystems {
            subsystem.advance(frame, dt);
        }
        self.ticks += 1;
    }

    pub fn reports(&self) -> Vec<SubsystemReport> {
        self.subsystems.iter().map(|s| s.report()).collect()
    }

    pub fn report(&self, name: &str) -> Option<SubsystemReport> {
        self.subsystems
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.report())
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.subsystems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsystems.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scene_has_every_subsystem() {
        let graph = SceneGraph::standard();
        let names: Vec<&str> = graph.reports().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            ["foliage", "ornaments", "ribbon", "tree-rig", "heart", "victory"]
        );
    }

    #[test]
    fn test_broadcast_counts_ticks() {
        let mut graph = SceneGraph::standard();
        graph.broadcast(&FrameSnapshot::default(), 0.016);
        graph.broadcast(&FrameSnapshot::default(), 0.016);
        assert_eq!(graph.ticks(), 2);
        assert!(graph.report("ribbon").is_some());
        assert!(graph.report("snow").is_none());
    }
}
