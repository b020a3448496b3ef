//! Constraint-guided sequence design.
//!
//! A stochastic, GC-targeted stand-in for an external ant-colony designer.
//! Fixed nucleotides in the sequence constraint are honored, bracketed
//! positions receive complementary bases, and free positions are sampled
//! toward the record's GC content. Several restarts are drawn and the
//! candidate closest to the GC target wins. Design is best-effort by
//! contract: the designer always returns its best candidate and never
//! fails for non-convergence.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constraints::ConstraintRecord;
use crate::traits::ConstraintDesigner;
use crate::types::{Base, SEQUENCE_PAD};

/// GC-targeted stochastic designer.
#[derive(Debug)]
pub struct GcDesigner {
    /// Independent sampling restarts per design call.
    pub restarts: usize,
    rng: Mutex<StdRng>,
}

impl GcDesigner {
    pub fn new(restarts: usize, seed: u64) -> Self {
        Self {
            restarts: restarts.max(1),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn candidate(&self, record: &ConstraintRecord, rng: &mut StdRng) -> Vec<Base> {
        let n = record.sequence_constraint.chars().count();
        let mut slots: Vec<Option<Base>> = record
            .sequence_constraint
            .chars()
            .map(|c| {
                if c == SEQUENCE_PAD {
                    None
                } else {
                    Base::from_char(c).ok()
                }
            })
            .collect();

        // Fill basepairs first so complementarity wins over GC sampling.
        for (i, j) in bracket_pairs(&record.structure_constraint) {
            match (slots[i], slots[j]) {
                (Some(a), None) => slots[j] = Some(a.complement()),
                (None, Some(b)) => slots[i] = Some(b.complement()),
                (None, None) => {
                    let (a, b) = self.sample_pair(record.gc_content, rng);
                    slots[i] = Some(a);
                    slots[j] = Some(b);
                }
                // Both fixed by the sequence constraint: leave them alone,
                // even if they do not pair.
                (Some(_), Some(_)) => {}
            }
        }

        (0..n)
            .map(|idx| slots[idx].unwrap_or_else(|| self.sample_base(record.gc_content, rng)))
            .collect()
    }

    fn sample_base(&self, gc_target: f64, rng: &mut StdRng) -> Base {
        if rng.gen_bool(gc_target.clamp(0.0, 1.0)) {
            if rng.gen_bool(0.5) {
                Base::G
            } else {
                Base::C
            }
        } else if rng.gen_bool(0.5) {
            Base::A
        } else {
            Base::U
        }
    }

    fn sample_pair(&self, gc_target: f64, rng: &mut StdRng) -> (Base, Base) {
        let first = self.sample_base(gc_target, rng);
        (first, first.complement())
    }
}

impl Default for GcDesigner {
    fn default() -> Self {
        Self::new(10, 0)
    }
}

impl ConstraintDesigner for GcDesigner {
    fn design(&self, record: &ConstraintRecord) -> String {
        let mut rng = self.rng.lock().expect("designer RNG poisoned");
        let mut best: Option<(f64, Vec<Base>)> = None;
        for _ in 0..self.restarts {
            let candidate = self.candidate(record, &mut rng);
            let gc = if candidate.is_empty() {
                0.0
            } else {
                candidate.iter().filter(|b| b.is_gc()).count() as f64 / candidate.len() as f64
            };
            let distance = (gc - record.gc_content).abs();
            if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                best = Some((distance, candidate));
            }
        }
        best.map(|(_, bases)| bases.iter().map(|b| b.to_char()).collect())
            .unwrap_or_default()
    }
}

/// Matches brackets in a structure constraint, ignoring pads and dots.
/// Unmatched brackets are dropped rather than rejected: constraint strings
/// can legitimately lose one side of a pair to the unpaired overwrite.
fn bracket_pairs(structure: &str) -> Vec<(usize, usize)> {
    let mut stack = Vec::new();
    let mut pairs = Vec::new();
    for (idx, c) in structure.chars().enumerate() {
        match c {
            '(' => stack.push(idx),
            ')' => {
                if let Some(open) = stack.pop() {
                    pairs.push((open, idx));
                }
            }
            _ => {}
        }
    }
    pairs
}
