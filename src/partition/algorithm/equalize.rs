use std::cmp::Ordering;

use ahash::AHashSet;
use tracing::debug;

use crate::partition::Partition;

/// How an equalization run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualizeOutcome {
    /// Every district is within tolerance of the ideal.
    Converged,
    /// No adjacent pair has a feasible move that narrows its gap, directly or by relay.
    Stalled,
    /// The move budget ran out first.
    MaxIterations,
}

/// Summary of an equalization run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EqualizeReport {
    pub moves: usize,
    /// Largest absolute relative deviation from the ideal after the run.
    pub max_deviation: f64,
    pub outcome: EqualizeOutcome,
}

impl Partition {
    /// Greedily move boundary nodes from heavier to lighter neighboring districts until
    /// every district is within `tolerance` of the ideal share of `series`.
    ///
    /// A move either strictly narrows the gap between its two districts, or is a relay
    /// that leaves the gap's size unchanged and is taken only when the receiving district
    /// can then strictly narrow a gap with another neighbor. The sum of squared totals
    /// therefore drops at least every second move and the loop cannot cycle.
    pub(crate) fn equalize(&mut self, series: &str, tolerance: f64, max_iter: usize) -> EqualizeReport {
        let mut moves = 0;
        loop {
            let max_deviation = self.max_population_deviation(series);
            let outcome = if max_deviation <= tolerance { Some(EqualizeOutcome::Converged) }
                else if moves >= max_iter { Some(EqualizeOutcome::MaxIterations) }
                else if !self.equalize_step(series) { Some(EqualizeOutcome::Stalled) }
                else { None };

            match outcome {
                Some(outcome) => return EqualizeReport { moves, max_deviation, outcome },
                None => moves += 1,
            }
        }
    }

    /// Apply the best feasible gap-narrowing move for the most imbalanced adjacent pair
    /// that has one, or failing that a relay. Returns false if neither exists.
    fn equalize_step(&mut self, series: &str) -> bool {
        let Some(totals) = self.part_totals(series) else { return false };
        let pairs = self.imbalanced_pairs(&totals, None);

        for &(a, b) in &pairs {
            let found = self.transfer_candidates(series, &totals, a, b).into_iter()
                .take_while(|&(_, reduction)| reduction > 0.0)
                .find(|&(node, _)| self.check_move(node, b).is_ok());
            if let Some((node, reduction)) = found {
                self.move_node(node, b);
                debug!(node, from = a, to = b, reduction, "[equalize] moved unit");
                return true;
            }
        }

        // No pair narrows directly; pass weight through a middle district instead.
        for &(a, b) in &pairs {
            let relays = self.transfer_candidates(series, &totals, a, b).into_iter()
                .filter(|&(_, reduction)| reduction >= 0.0)
                .map(|(node, _)| node)
                .collect::<Vec<_>>();
            for node in relays {
                if self.check_move(node, b).is_err() { continue }
                self.move_node(node, b);
                if self.has_narrowing_move(series, b, a) {
                    debug!(node, from = a, to = b, "[equalize] relayed unit");
                    return true;
                }
                self.move_node(node, a);
            }
        }
        false
    }

    /// Adjacent (heavy, light) district pairs, most imbalanced first.
    /// With `from` set, only pairs whose heavy side is that district.
    fn imbalanced_pairs(&self, totals: &[f64], from: Option<usize>) -> Vec<(usize, usize)> {
        let mut pairs = AHashSet::new();
        for a in (0..self.num_districts()).filter(|&a| from.is_none_or(|f| f == a)) {
            for &e in self.frontier_edges(a) {
                let b = self.assignment(self.graph().target(e));
                if b < self.num_districts() && totals[a] > totals[b] { pairs.insert((a, b)); }
            }
        }
        let mut pairs = pairs.into_iter().collect::<Vec<_>>();
        pairs.sort_by(|&(a1, b1), &(a2, b2)| {
            (totals[a2] - totals[b2]).partial_cmp(&(totals[a1] - totals[b1]))
                .unwrap_or(Ordering::Equal)
                .then((a1, b1).cmp(&(a2, b2)))
        });
        pairs
    }

    /// Nonzero-weight nodes of `a` bordering `b`, with the amount moving each would narrow
    /// the gap (negative if it overshoots), best first.
    fn transfer_candidates(&self, series: &str, totals: &[f64], a: usize, b: usize) -> Vec<(usize, f64)> {
        let gap = totals[a] - totals[b];
        let mut candidates = self.frontier(a).iter()
            .filter(|&&node| self.node_borders_part(node, b))
            .filter_map(|&node| {
                let weight = self.units().weight(series, node)?;
                (weight > 0.0).then(|| (node, gap - (gap - 2.0 * weight).abs()))
            })
            .collect::<Vec<_>>();
        candidates.sort_by(|(n1, r1), (n2, r2)| r2.partial_cmp(r1).unwrap_or(Ordering::Equal).then(n1.cmp(n2)));
        candidates
    }

    /// Whether `part` has a feasible move that strictly narrows its gap to a lighter
    /// neighbor other than `except`.
    fn has_narrowing_move(&self, series: &str, part: usize, except: usize) -> bool {
        let Some(totals) = self.part_totals(series) else { return false };
        self.imbalanced_pairs(&totals, Some(part)).into_iter()
            .filter(|&(_, c)| c != except)
            .any(|(_, c)| self.transfer_candidates(series, &totals, part, c).into_iter()
                .take_while(|&(_, reduction)| reduction > 0.0)
                .any(|(node, _)| self.check_move(node, c).is_ok()))
    }
}
