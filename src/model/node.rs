use crate::Symbol;
use crate::Weight;

const LN_HALF: Weight = -std::f64::consts::LN_2;

/// One node of the context tree. It carries the symbol counts observed
/// under its context, the log Krichevsky-Trofimov estimate of that
/// subsequence, the log CTW-weighted probability mixing the estimate with
/// the children, and one owned child per context bit.
#[derive(Clone, Default)]
pub struct Node {
    counts: [u32; 2],
    log_pe: Weight,
    log_pw: Weight,
    children: [Option<Box<Node>>; 2],
}

impl Node {
    pub fn count(&self, sym: Symbol) -> u32 {
        self.counts[usize::from(sym)]
    }

    /// how many history bits this context has matched
    pub fn visits(&self) -> u64 {
        u64::from(self.counts[0]) + u64::from(self.counts[1])
    }

    pub fn log_estimated(&self) -> Weight {
        self.log_pe
    }

    pub fn log_weighted(&self) -> Weight {
        self.log_pw
    }

    pub fn child(&self, sym: Symbol) -> Option<&Node> {
        self.children[usize::from(sym)].as_deref()
    }

    /// number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.children.iter().flatten().map(|c| c.size()).sum::<usize>()
    }

    /// log of the KT update multiplier for observing `sym`,
    /// taken over the counts prior to the increment
    fn kt(&self, sym: Symbol) -> Weight {
        let numerator = self.count(sym) as Weight + 0.5;
        let denominator = self.visits() as Weight + 1.0;
        (numerator / denominator).ln()
    }

    /// recompute the weighted probability from the KT estimate and the
    /// children. nodes at maximum depth carry the estimate unmixed.
    fn refresh(&mut self) {
        self.log_pw = match self.children {
            [None, None] => self.log_pe,
            _ => {
                let product = self
                    .children
                    .iter()
                    .flatten()
                    .map(|child| child.log_pw)
                    .sum::<Weight>();
                mix(self.log_pe, product)
            }
        };
    }

    /// Absorb one symbol along the given context path, deepest node first
    /// so that every refresh sees already-updated children. The prior
    /// estimate of each visited node is pushed onto `frame`, root first,
    /// which is what makes the matching revert exact.
    pub(crate) fn update(&mut self, sym: Symbol, context: &[Symbol], frame: &mut Vec<Weight>) {
        frame.push(self.log_pe);
        if let Some((&bit, rest)) = context.split_last() {
            self.children[usize::from(bit)]
                .get_or_insert_default()
                .update(sym, rest, frame);
        }
        self.log_pe += self.kt(sym);
        self.refresh();
        self.counts[usize::from(sym)] += 1;
    }

    /// Undo the most recent update along the same context path. Estimates
    /// are restored from the recorded frame rather than re-derived, and
    /// children left with no visits are dropped.
    pub(crate) fn revert(&mut self, sym: Symbol, context: &[Symbol], frame: &[Weight]) {
        if let Some((&bit, rest)) = context.split_last() {
            let slot = &mut self.children[usize::from(bit)];
            let child = slot.as_mut().expect("context path was built by update");
            child.revert(sym, rest, &frame[1..]);
            if child.visits() == 0 {
                *slot = None;
            }
        }
        self.counts[usize::from(sym)] -= 1;
        self.log_pe = frame[0];
        self.refresh();
    }
}

/// log(half * e^x + half * e^y) without leaving the log domain
fn mix(x: Weight, y: Weight) -> Weight {
    let (hi, lo) = if x > y { (x, y) } else { (y, x) };
    match lo - hi {
        gap if gap < -crate::LOG_MIX_CUTOFF => LN_HALF + hi,
        gap => LN_HALF + hi + gap.exp().ln_1p(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_kt_multiplier_closed_form() {
        let mut node = Node::default();
        let mut frame = Vec::new();
        assert!((node.kt(true) - 0.5f64.ln()).abs() < 1e-12);
        node.update(true, &[], &mut frame);
        assert!((node.kt(true) - 0.75f64.ln()).abs() < 1e-12);
        assert!((node.kt(false) - 0.25f64.ln()).abs() < 1e-12);
        node.update(true, &[], &mut frame);
        assert!((node.kt(false) - (1.0f64 / 6.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn is_mix_even() {
        assert!((mix(0.0, 0.0) - 0.0).abs() < 1e-12);
        let a = (-1.0f64).exp();
        let b = (-2.0f64).exp();
        let expect = (0.5 * a + 0.5 * b).ln();
        assert!((mix(-1.0, -2.0) - expect).abs() < 1e-12);
        assert!((mix(-2.0, -1.0) - expect).abs() < 1e-12);
    }

    #[test]
    fn is_mix_dropping_invisible_terms() {
        assert_eq!(mix(-1.0, -100.0), LN_HALF - 1.0);
    }

    #[test]
    fn is_childless_node_unmixed() {
        let mut node = Node::default();
        let mut frame = Vec::new();
        for sym in [true, false, true] {
            node.update(sym, &[], &mut frame);
            assert_eq!(node.log_weighted(), node.log_estimated());
        }
    }

    #[test]
    fn is_update_reaching_the_context_path() {
        let mut node = Node::default();
        let mut frame = Vec::new();
        node.update(true, &[false, true], &mut frame);
        assert_eq!(frame.len(), 3);
        assert_eq!(node.count(true), 1);
        // the context is walked most recent bit first
        let inner = node.child(true).expect("first context bit");
        let leaf = inner.child(false).expect("second context bit");
        assert_eq!(inner.count(true), 1);
        assert_eq!(leaf.count(true), 1);
        assert!(leaf.child(false).is_none() && leaf.child(true).is_none());
    }

    #[test]
    fn is_revert_pruning_empty_children() {
        let mut node = Node::default();
        let mut frame = Vec::new();
        node.update(true, &[false, true], &mut frame);
        assert_eq!(node.size(), 3);
        node.revert(true, &[false, true], &frame);
        assert_eq!(node.size(), 1);
        assert_eq!(node.visits(), 0);
        assert_eq!(node.log_estimated(), 0.0);
        assert_eq!(node.log_weighted(), 0.0);
    }
}
