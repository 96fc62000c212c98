// muse-synth -- pitched music from rapidly triggered drums
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Gliding from one pitch to another by changing the tempo step by step.
//!
//! A glide is a geometric series of tempos, one per tuplet step. The number
//! of outer steps is sized for the lowest tempo of the glide, so at higher
//! tempos a single step passes too quickly. Such a step is replaced by a
//! nested segment of `round(tempo / lowest tempo)` steps that glides on
//! towards the tempo of the next outer step. Nested segments are refined
//! by the same rule until every step is short enough.

use std::rc::Rc;

use log::{trace, warn};
use musesynth_core::rational::Rational;

use crate::voices::VoicePart;

/// Nesting depth at which steps are no longer refined.
pub const MAX_DEPTH: usize = 16;

/// Tempo range covered by a gliding segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glide {
    pub goal_tempo: f64,
    pub min_tempo: f64,
    pub max_tempo: f64,
}

impl Glide {
    pub fn between(start_tempo: f64, goal_tempo: f64) -> Glide {
        Glide {
            goal_tempo,
            min_tempo: start_tempo.min(goal_tempo),
            max_tempo: start_tempo.max(goal_tempo),
        }
    }
}

/// A run of tuplet steps, all played by the same voice parts.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoSegment {
    /// Number of steps.
    pub length: i64,
    pub start_tempo: f64,
    /// What each voice plays during a step.
    pub parts: Rc<[VoicePart]>,
    /// `None` if the tempo stays the same for all steps.
    pub glide: Option<Glide>,
    /// Whether this segment spans a whole note, rather than refining a single step.
    pub outermost: bool,
}

/// One step of a fully refined segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlideStep {
    pub tempo: f64,
    /// How deeply nested the segment producing this step was.
    pub depth: usize,
    /// Portion of one outer step that this step stands in for.
    pub share: Rational,
}

impl TempoSegment {
    pub fn steady(length: i64, tempo: f64, parts: Rc<[VoicePart]>) -> Self {
        TempoSegment {
            length,
            start_tempo: tempo,
            parts,
            glide: None,
            outermost: true,
        }
    }

    pub fn gliding(length: i64, start_tempo: f64, goal_tempo: f64, parts: Rc<[VoicePart]>) -> Self {
        TempoSegment {
            length,
            start_tempo,
            parts,
            glide: Some(Glide::between(start_tempo, goal_tempo)),
            outermost: true,
        }
    }

    /// Ratio between the tempos of consecutive steps.
    ///
    /// The outermost segment reaches the goal tempo with its last step. A nested segment
    /// stops one step short of it, the goal being where the next outer step begins.
    pub fn portfactor(&self) -> f64 {
        let glide = match self.glide {
            Some(glide) => glide,
            None => return 1.0,
        };
        let steps = if self.outermost {
            self.length - 1
        } else {
            self.length
        };
        if steps <= 0 {
            1.0
        } else {
            (glide.goal_tempo / self.start_tempo).powf(1.0 / steps as f64)
        }
    }

    /// Tempo of step `step`, given the segment's portfactor.
    pub fn step_tempo(&self, portfactor: f64, step: i64) -> f64 {
        self.start_tempo * portfactor.powi(step as i32)
    }

    /// Number of nested steps needed in place of a step at `tempo`, if more than one.
    fn refinement(&self, tempo: f64) -> Option<i64> {
        let glide = self.glide?;
        let ratio = (tempo / glide.min_tempo).round() as i64;
        if ratio > 1 {
            Some(ratio)
        } else {
            None
        }
    }

    fn refine(&self, tempo: f64, portfactor: f64, ratio: i64) -> TempoSegment {
        TempoSegment {
            length: ratio,
            start_tempo: tempo,
            parts: Rc::clone(&self.parts),
            glide: Some(Glide::between(tempo, tempo * portfactor)),
            outermost: false,
        }
    }

    /// Refine this segment and return its steps in playing order.
    pub fn expand(&self) -> Vec<GlideStep> {
        expand(self.clone())
    }
}

/// A segment that is partially expanded.
struct Frame {
    segment: TempoSegment,
    portfactor: f64,
    next_step: i64,
    share: Rational,
}

impl Frame {
    fn new(segment: TempoSegment, share: Rational) -> Self {
        Frame {
            portfactor: segment.portfactor(),
            segment,
            next_step: 0,
            share,
        }
    }
}

/// Expand a segment depth first, using an explicit stack of partially expanded segments.
pub fn expand(root: TempoSegment) -> Vec<GlideStep> {
    let mut steps = Vec::with_capacity(root.length.max(0) as usize);
    let mut stack = vec![Frame::new(root, Rational::one())];

    while let Some(depth) = stack.len().checked_sub(1) {
        let frame = &mut stack[depth];
        if frame.next_step >= frame.segment.length {
            stack.pop();
            continue;
        }

        let tempo = frame.segment.step_tempo(frame.portfactor, frame.next_step);
        frame.next_step += 1;
        let share = frame.share;

        match frame.segment.refinement(tempo) {
            Some(ratio) if depth + 1 < MAX_DEPTH => {
                let nested = frame.segment.refine(tempo, frame.portfactor, ratio);
                trace!(
                    "refining step at {:.3} bpm into {} steps (depth {})",
                    tempo,
                    ratio,
                    depth + 1
                );
                stack.push(Frame::new(nested, share / ratio));
            }
            refinement => {
                if let Some(ratio) = refinement {
                    warn!(
                        "step at {:.3} bpm would need {} nested steps, giving up at depth {}",
                        tempo, ratio, depth
                    );
                }
                steps.push(GlideStep {
                    tempo,
                    depth,
                    share,
                });
            }
        }
    }
    steps
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::voices::{Division, VoicePart};

    fn parts() -> Rc<[VoicePart]> {
        vec![VoicePart::Play(Division::new(4).unwrap())].into()
    }

    fn total_share(steps: &[GlideStep]) -> Rational {
        steps.iter().map(|step| step.share).sum()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6 * expected,
            "{} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn steady_segment() {
        let steps = TempoSegment::steady(33, 122.6, parts()).expand();
        assert_eq!(steps.len(), 33);
        assert!(steps.iter().all(|step| step.tempo == 122.6 && step.depth == 0));
        assert_eq!(total_share(&steps), Rational::int(33));
    }

    #[test]
    fn glide_to_same_tempo_is_steady() {
        let steps = TempoSegment::gliding(20, 180.0, 180.0, parts()).expand();
        assert_eq!(steps.len(), 20);
        assert!(steps.iter().all(|step| step.tempo == 180.0 && step.depth == 0));
    }

    #[test]
    fn degenerate_lengths() {
        assert!(TempoSegment::gliding(0, 100.0, 400.0, parts())
            .expand()
            .is_empty());
        let single = TempoSegment::gliding(1, 100.0, 400.0, parts()).expand();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].tempo, 100.0);
    }

    #[test]
    fn portfactor_reaches_goal() {
        let outer = TempoSegment::gliding(5, 100.0, 400.0, parts());
        let factor = outer.portfactor();
        assert_close(factor, 2.0f64.sqrt());
        assert_close(outer.step_tempo(factor, 4), 400.0);

        let nested = outer.refine(200.0, factor, 2);
        assert!(!nested.outermost);
        let nested_factor = nested.portfactor();
        // the nested segment ends one step before the next outer step
        assert_close(nested.step_tempo(nested_factor, 2), 200.0 * factor);
    }

    #[test]
    fn quadrupling_glide_refines_once() {
        let steps = TempoSegment::gliding(5, 100.0, 400.0, parts()).expand();
        let depths: Vec<_> = steps.iter().map(|step| step.depth).collect();
        assert_eq!(depths, vec![0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1]);

        // the first refined step is the third outer step, at twice the start tempo
        let first_nested = steps.iter().position(|step| step.depth == 1).unwrap();
        assert_eq!(first_nested, 2);
        assert_close(steps[first_nested].tempo, 200.0);
        assert_eq!(steps[first_nested].share, Rational::new(1, 2));

        let shares: Vec<_> = steps.iter().map(|step| step.share).collect();
        let third = Rational::new(1, 3);
        let quarter = Rational::new(1, 4);
        assert_eq!(
            shares,
            vec![
                Rational::one(),
                Rational::one(),
                Rational::new(1, 2),
                Rational::new(1, 2),
                third,
                third,
                third,
                quarter,
                quarter,
                quarter,
                quarter,
            ]
        );
        assert_eq!(total_share(&steps), Rational::int(5));
    }

    #[test]
    fn rising_glide_is_monotonic() {
        let steps = TempoSegment::gliding(12, 100.0, 800.0, parts()).expand();
        assert!(steps.len() > 12);
        assert!(steps
            .windows(2)
            .all(|pair| pair[0].tempo < pair[1].tempo));
        assert_eq!(steps[0].tempo, 100.0);
        assert_eq!(total_share(&steps), Rational::int(12));
    }

    #[test]
    fn falling_glide_preserves_outer_length() {
        let steps = TempoSegment::gliding(12, 800.0, 100.0, parts()).expand();
        assert!(steps
            .windows(2)
            .all(|pair| pair[0].tempo > pair[1].tempo));
        // the first step at eight times the lowest tempo is split into eight
        assert!(steps[..8].iter().all(|step| step.depth == 1));
        assert_eq!(steps[8].depth, 1);
        assert_eq!(total_share(&steps), Rational::int(12));
    }

    #[test]
    fn steep_descent_nests_deeper() {
        // every outer step drops the tempo by a factor of ten
        let steps = TempoSegment::gliding(3, 10000.0, 100.0, parts()).expand();
        let max_depth = steps.iter().map(|step| step.depth).max().unwrap();
        assert!(max_depth >= 2);
        assert!(max_depth < MAX_DEPTH);
        assert_eq!(total_share(&steps), Rational::int(3));
    }
}
