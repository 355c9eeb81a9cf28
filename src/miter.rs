//! Miters: single signals that are true iff some pairs of signals differ.
//!
//! For background on what is a miter, please check
//! [Verification of large synthesized designs](https://doi.org/10.1109/ICCAD.1993.580110) by D. Brand.

use std::collections::HashMap;

use thiserror::Error;

use crate::{Aig, AigEdge, AigError, CONST1_ID, Result};

/// Error returned when building a miter between two AIGs failed.
#[derive(Debug, Error)]
pub enum MiterError {
    /// The two AIGs do not have the same number of inputs.
    #[error("AIGs have different inputs : {0} vs {1}")]
    MiterDifferentInputs(usize, usize),

    /// The two AIGs do not have the same number of outputs.
    #[error("AIGs have different outputs : {0} vs {1}")]
    MiterDifferentOutputs(usize, usize),

    /// Only combinational AIGs can be compared this way.
    #[error("trying to construct a miter between AIGs with latches")]
    MiterSequential,
}

impl Aig {
    /// Builds a signal that is true iff one of the pairs differs, ie the OR of their XORs.
    ///
    /// With `implication`, a pair `(a, b)` contributes `a AND NOT b` instead (true iff `a`
    /// does not imply `b`).
    /// The ORs form a balanced tree. No pair at all gives constant false.
    ///
    /// ```rust
    /// use strashaig::Aig;
    /// let mut aig = Aig::new();
    /// let a = aig.add_input();
    /// let b = aig.add_input();
    /// let ab = aig.make_and(a, b);
    /// let ba = aig.make_and(b, a);
    /// // structurally identical signals cancel out
    /// assert_eq!(aig.miter(&[(ab, ba)], false), aig.const0());
    /// assert_eq!(aig.miter(&[], false), aig.const0());
    /// ```
    pub fn miter(&mut self, pairs: &[(AigEdge, AigEdge)], implication: bool) -> AigEdge {
        let terms: Vec<AigEdge> = pairs
            .iter()
            .map(|&(a, b)| {
                if implication {
                    self.make_and(a, !b)
                } else {
                    self.xor(a, b)
                }
            })
            .collect();
        self.or_tree(&terms)
    }

    fn or_tree(&mut self, terms: &[AigEdge]) -> AigEdge {
        match terms.len() {
            0 => self.const0(),
            1 => terms[0],
            n => {
                let left = self.or_tree(&terms[..n / 2]);
                let right = self.or_tree(&terms[n / 2..]);
                self.or(left, right)
            }
        }
    }

    /// Same as [`Aig::miter`] with XORs, the ORs forming a chain instead of a tree.
    pub fn miter_chain(&mut self, pairs: &[(AigEdge, AigEdge)]) -> AigEdge {
        let mut miter = self.const0();
        for &(a, b) in pairs {
            let xor = self.xor(a, b);
            miter = self.or(miter, xor);
        }
        miter
    }

    /// Builds the miter of two combinational AIGs: a new AIG sharing their inputs (matched by
    /// position) and with a single output, true iff some pair of outputs (matched by position)
    /// differs.
    ///
    /// Both sides are hashed together, so the parts they have in common are built once.
    pub fn miter_of(a: &Aig, b: &Aig) -> Result<Aig> {
        if a.get_inputs().len() != b.get_inputs().len() {
            return Err(
                MiterError::MiterDifferentInputs(a.get_inputs().len(), b.get_inputs().len()).into(),
            );
        }
        if a.get_outputs().len() != b.get_outputs().len() {
            return Err(MiterError::MiterDifferentOutputs(
                a.get_outputs().len(),
                b.get_outputs().len(),
            )
            .into());
        }
        if !a.get_latches().is_empty() || !b.get_latches().is_empty() {
            return Err(MiterError::MiterSequential.into());
        }

        let mut miter = Aig::new();
        let inputs: Vec<AigEdge> = a.get_inputs().iter().map(|_| miter.add_input()).collect();

        let mut outputs = Vec::with_capacity(2);
        for side in [a, b] {
            let mut map: HashMap<_, _> = side
                .get_inputs()
                .iter()
                .copied()
                .zip(inputs.iter().copied())
                .collect();
            map.insert(CONST1_ID, miter.const1());
            miter.copy_logic(side, &mut map)?;
            let mut signals = Vec::with_capacity(side.get_outputs().len());
            for output in side.get_outputs() {
                let copy = map
                    .get(&output.get_node_id())
                    .ok_or(AigError::NodeDoesNotExist(output.get_node_id()))?;
                signals.push(copy.negate_if(output.get_complement()));
            }
            outputs.push(signals);
        }

        let pairs: Vec<(AigEdge, AigEdge)> = outputs[0]
            .iter()
            .copied()
            .zip(outputs[1].iter().copied())
            .collect();
        let out = miter.miter(&pairs, false);
        miter.add_output(out)?;
        miter.cleanup_all();
        Ok(miter)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    fn inputs(aig: &mut Aig, n: usize) -> Vec<AigEdge> {
        (0..n).map(|_| aig.add_input()).collect()
    }

    #[test]
    fn miter_of_xors() {
        let mut aig = Aig::new();
        let x = inputs(&mut aig, 4);
        let m = aig.miter(&[(x[0], x[1]), (x[2], x[3])], false);
        let x01 = aig.xor(x[0], x[1]);
        let x23 = aig.xor(x[2], x[3]);
        assert_eq!(aig.or(x01, x23), m);
        assert_eq!(aig.lookup_xor(x[0], x[1]), Some(x01));
    }

    #[test]
    fn implication_miter() {
        let mut aig = Aig::new();
        let x = inputs(&mut aig, 2);
        let m = aig.miter(&[(x[0], x[1])], true);
        assert_eq!(m, aig.make_and(x[0], !x[1]));
        assert_eq!(aig.miter(&[(x[0], x[0])], true), aig.const0());
    }

    #[test]
    fn balanced_tree_is_shallower_than_chain() {
        let mut aig = Aig::new();
        let x = inputs(&mut aig, 16);
        let pairs: Vec<_> = x.chunks(2).map(|c| (c[0], c[1])).collect();
        let tree = aig.miter(&pairs, false);
        let chain = aig.miter_chain(&pairs);
        // xor: 2 levels, then 3 levels of ors
        assert_eq!(aig.level(tree.get_node_id()), 5);
        // the first or of the chain simplifies against constant false
        assert_eq!(aig.level(chain.get_node_id()), 9);
        assert_eq!(aig.miter_chain(&[]), aig.const0());
    }

    #[test]
    fn miter_of_equivalent_aigs() {
        let mut a = Aig::new();
        let x = inputs(&mut a, 3);
        let t = a.make_and(x[0], x[1]);
        let f = a.make_and(t, !x[2]);
        a.add_output(f).unwrap();
        a.add_output(x[2]).unwrap();

        // same logic, built the other way round
        let mut b = Aig::new();
        let y = inputs(&mut b, 3);
        let u = b.make_and(!y[2], y[1]);
        let g = b.make_and(y[0], u);
        b.add_output(g).unwrap();
        b.add_output(y[2]).unwrap();
        // not structurally identical
        assert_eq!(a.and_count(), 2);
        assert_eq!(b.and_count(), 2);

        let same = Aig::miter_of(&a, &a.deep_clone().unwrap()).unwrap();
        assert_eq!(same.get_outputs(), vec![same.const0()]);
        assert_eq!(same.and_count(), 0);

        let different = Aig::miter_of(&a, &b).unwrap();
        assert_eq!(different.get_outputs().len(), 1);
        assert!(!different.get_outputs()[0].is_const());
        assert!(different.check());
    }

    #[test]
    fn miter_errors() {
        let mut a = Aig::new();
        let mut b = Aig::new();
        let x = a.add_input();
        assert!(matches!(
            Aig::miter_of(&a, &b),
            Err(AigError::MiterError(MiterError::MiterDifferentInputs(1, 0)))
        ));
        b.add_input();
        a.add_output(x).unwrap();
        assert!(matches!(
            Aig::miter_of(&a, &b),
            Err(AigError::MiterError(MiterError::MiterDifferentOutputs(1, 0)))
        ));
        let l = b.add_latch(None);
        b.add_output(l).unwrap();
        assert!(matches!(
            Aig::miter_of(&a, &b),
            Err(AigError::MiterError(MiterError::MiterSequential))
        ));
    }
}
