use super::node::Node;
use crate::Symbol;
use crate::Weight;
use rand::Rng;

/// Context Tree Weighting over binary sequences: a Bayesian mixture of all
/// prefix-context Markov models up to a fixed depth, maintained online.
///
/// The tree owns the full bit history it has absorbed. Every mutating
/// operation is reversible: `update` records the prior estimates of the
/// touched nodes on an undo trail, and `revert` plays them back, so a
/// save/revert cycle restores the block probability bit for bit. The trail
/// is what lets the planner roll hypothetical futures forward through the
/// model and rewind them thousands of times per decision.
#[derive(Clone)]
pub struct ContextTree {
    root: Node,
    depth: usize,
    history: Vec<Symbol>,
    trail: Vec<Vec<Weight>>,
}

impl ContextTree {
    pub fn new(depth: usize) -> Self {
        Self {
            root: Node::default(),
            depth,
            history: Vec::new(),
            trail: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[Symbol] {
        &self.history
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// number of nodes currently allocated
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// log probability of everything observed so far under the mixture
    pub fn log_block_probability(&self) -> Weight {
        self.root.log_weighted()
    }

    /// forget everything
    pub fn clear(&mut self) {
        self.root = Node::default();
        self.history.clear();
        self.trail.clear();
    }

    /// Absorb one symbol. The tree is updated against the current history
    /// first, then the symbol joins the history. The first `depth` symbols
    /// have no usable context and only extend the history.
    pub fn update(&mut self, sym: Symbol) {
        if self.history.len() >= self.depth {
            let context = &self.history[self.history.len() - self.depth..];
            let mut frame = Vec::with_capacity(self.depth + 1);
            self.root.update(sym, context, &mut frame);
            self.trail.push(frame);
        }
        self.history.push(sym);
    }

    pub fn update_all(&mut self, symbols: &[Symbol]) {
        for &sym in symbols {
            self.update(sym);
        }
    }

    /// Append symbols to the history without touching the tree. Used for
    /// the agent's own actions, which condition the model but are not
    /// modelled themselves.
    pub fn update_history(&mut self, symbols: &[Symbol]) {
        self.history.extend_from_slice(symbols);
    }

    /// Undo the most recent `update`. A no-op on an empty history.
    pub fn revert(&mut self) {
        let Some(sym) = self.history.pop() else { return };
        if self.history.len() >= self.depth {
            let frame = self.trail.pop().expect("revert past committed history");
            let context = &self.history[self.history.len() - self.depth..];
            self.root.revert(sym, context, &frame);
        }
    }

    /// Shrink the history back to `size` without touching the tree,
    /// undoing a matching run of `update_history`.
    pub fn revert_history(&mut self, size: usize) {
        assert!(
            size <= self.history.len(),
            "cannot grow history from {} to {}",
            self.history.len(),
            size
        );
        self.history.truncate(size);
    }

    /// Drop the undo records for everything observed so far. Whatever has
    /// been committed can no longer be reverted; the live loop does this
    /// once per cycle to keep the trail from growing with the agent's age.
    pub fn commit(&mut self) {
        self.trail.clear();
    }

    /// Sample one symbol from the predictive distribution, leaving the
    /// tree untouched. With less history than context depth there is
    /// nothing to condition on and the draw is uniform.
    pub fn predict_next<R: Rng>(&mut self, rng: &mut R) -> Symbol {
        if self.history.len() < self.depth {
            return rng.random::<bool>();
        }
        let before = self.log_block_probability();
        self.update(true);
        let with_one = self.log_block_probability();
        self.revert();
        let after = self.log_block_probability();
        assert!(
            (after - before).abs() < crate::REVERT_PRECISION,
            "prediction drifted the block probability from {} to {}",
            before,
            after
        );
        rng.random::<f64>() < (with_one - before).exp()
    }

    /// Sample `count` symbols, absorbing each so later draws are
    /// conditioned on earlier ones.
    pub fn gen_random_symbols_and_update<R: Rng>(&mut self, rng: &mut R, count: usize) -> Vec<Symbol> {
        (0..count)
            .map(|_| {
                let sym = self.predict_next(rng);
                self.update(sym);
                sym
            })
            .collect()
    }

    /// Sample `count` symbols from the forward distribution with no net
    /// change to the tree.
    pub fn gen_random_symbols<R: Rng>(&mut self, rng: &mut R, count: usize) -> Vec<Symbol> {
        let symbols = self.gen_random_symbols_and_update(rng, count);
        for _ in 0..count {
            self.revert();
        }
        symbols
    }
}
