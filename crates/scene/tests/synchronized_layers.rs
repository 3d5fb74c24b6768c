//! The formation layers must never drift apart, whatever the tick pattern.

use proptest::prelude::*;
use tinsel_gesture_core::ProgressSynchronizer;
use tinsel_hand_model::{FrameSnapshot, MacroState};
use tinsel_scene::SceneGraph;

const SYNCHRONIZED: [&str; 3] = ["foliage", "ornaments", "ribbon"];

fn formations(graph: &SceneGraph) -> Vec<u64> {
    SYNCHRONIZED
        .iter()
        .map(|name| {
            graph
                .report(name)
                .and_then(|r| r.formation)
                .map(f64::to_bits)
                .unwrap()
        })
        .collect()
}

proptest! {
    #[test]
    fn formation_layers_agree_bit_for_bit(
        steps in prop::collection::vec((any::<bool>(), 0.001f64..0.25), 1..200)
    ) {
        let mut graph = SceneGraph::standard();
        let mut progress = ProgressSynchronizer::with_defaults();
        let mut elapsed = 0.0;

        for (tick, (assembled, dt)) in steps.into_iter().enumerate() {
            let state = if assembled { MacroState::Assembled } else { MacroState::Dispersed };
            progress.advance(state, dt);
            elapsed += dt;

            let frame = FrameSnapshot {
                tick: tick as u64,
                elapsed_secs: elapsed,
                progress: progress.progress(),
                eased_progress: progress.eased(),
                macro_state: state,
                ..FrameSnapshot::default()
            };
            graph.broadcast(&frame, dt);

            let bits = formations(&graph);
            prop_assert!(bits.iter().all(|b| *b == frame.eased_progress.to_bits()));
        }
    }
}

#[test]
fn scene_assembles_from_scatter() {
    let mut graph = SceneGraph::standard();
    let mut progress = ProgressSynchronizer::with_defaults();

    for tick in 0..240u64 {
        let dt = 1.0 / 60.0;
        progress.advance(MacroState::Assembled, dt);
        let frame = FrameSnapshot {
            tick,
            elapsed_secs: tick as f64 * dt,
            progress: progress.progress(),
            eased_progress: progress.eased(),
            ..FrameSnapshot::default()
        };
        graph.broadcast(&frame, dt);
    }

    assert_eq!(progress.progress(), 1.0);
    for name in SYNCHRONIZED {
        assert_eq!(graph.report(name).unwrap().formation, Some(1.0));
    }
    assert!(graph.report("tree-rig").unwrap().presence > 0.99);
    assert_eq!(graph.report("heart").unwrap().presence, 0.0);
}
