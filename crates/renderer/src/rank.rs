//! Rank-based coloring for sparse statistics.
//!
//! When only a handful of regions carry data, interpolating over the value
//! domain tends to paint everything the same. Instead, valid regions are
//! sorted by value (descending) and a small fixed palette is distributed
//! across the ranks.

use std::collections::HashMap;

use atlas_common::FeatureId;

use crate::gradient::Color;

/// `region-id -> sort position` over the features with a valid value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankIndex {
    ranks: HashMap<FeatureId, usize>,
    valid_count: usize,
}

impl RankIndex {
    /// Rank features by value, highest first.
    ///
    /// Features with `None` or non-finite values get no rank. Ties keep their
    /// input order.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a FeatureId, Option<f64>)>,
    {
        let mut valid: Vec<(&FeatureId, f64)> = entries
            .into_iter()
            .filter_map(|(id, v)| v.filter(|v| v.is_finite()).map(|v| (id, v)))
            .collect();
        // Stable sort keeps input order among equal values.
        valid.sort_by(|a, b| b.1.total_cmp(&a.1));

        let ranks: HashMap<FeatureId, usize> = valid
            .iter()
            .enumerate()
            .map(|(rank, (id, _))| ((*id).clone(), rank))
            .collect();

        Self {
            valid_count: valid.len(),
            ranks,
        }
    }

    pub fn rank(&self, id: &FeatureId) -> Option<usize> {
        self.ranks.get(id).copied()
    }

    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    pub fn is_empty(&self) -> bool {
        self.valid_count == 0
    }
}

/// Palette indices used when too few regions have data for the general formula.
///
/// Some statistics pin these to specific colors; the default keeps a single
/// region off the palette edges and spreads a pair across both extremes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankPolicy {
    /// Palette index when exactly one region has data; `None` = middle.
    pub single: Option<usize>,
    /// Palette indices when exactly two regions have data; `None` = both extremes.
    pub pair: Option<(usize, usize)>,
}

impl RankPolicy {
    pub fn with_single(mut self, index: usize) -> Self {
        self.single = Some(index);
        self
    }

    pub fn with_pair(mut self, first: usize, second: usize) -> Self {
        self.pair = Some((first, second));
        self
    }
}

/// Palette index for a rank.
///
/// `floor(rank * palette_len / valid_count)` clamped into the palette, with
/// the one- and two-region cases handled by `policy`.
pub fn rank_palette_index(
    rank: usize,
    valid_count: usize,
    palette_len: usize,
    policy: &RankPolicy,
) -> Option<usize> {
    if palette_len == 0 || valid_count == 0 || rank >= valid_count {
        return None;
    }
    let last = palette_len - 1;

    let index = match valid_count {
        1 => policy.single.unwrap_or(palette_len / 2),
        2 => {
            let (first, second) = policy.pair.unwrap_or((0, last));
            if rank == 0 {
                first
            } else {
                second
            }
        }
        _ => rank * palette_len / valid_count,
    };
    Some(index.min(last))
}

/// Color for a ranked feature.
pub fn rank_color(rank: usize, valid_count: usize, palette: &[Color], policy: &RankPolicy) -> Option<Color> {
    rank_palette_index(rank, valid_count, palette.len(), policy).map(|i| palette[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::rank_palettes;

    fn ids(n: i64) -> Vec<FeatureId> {
        (0..n).map(FeatureId::Code).collect()
    }

    #[test]
    fn test_rank_descending_skips_missing() {
        let ids = ids(4);
        let values = [Some(1.0), None, Some(5.0), Some(3.0)];
        let index = RankIndex::build(ids.iter().zip(values));
        assert_eq!(index.valid_count(), 3);
        assert_eq!(index.rank(&ids[2]), Some(0));
        assert_eq!(index.rank(&ids[3]), Some(1));
        assert_eq!(index.rank(&ids[0]), Some(2));
        assert_eq!(index.rank(&ids[1]), None);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ids = ids(3);
        let index = RankIndex::build(ids.iter().zip([Some(2.0), Some(2.0), Some(2.0)]));
        assert_eq!(index.rank(&ids[0]), Some(0));
        assert_eq!(index.rank(&ids[1]), Some(1));
        assert_eq!(index.rank(&ids[2]), Some(2));
    }

    #[test]
    fn test_general_distribution() {
        let policy = RankPolicy::default();
        let got: Vec<usize> = (0..10)
            .map(|r| rank_palette_index(r, 10, 5, &policy).unwrap())
            .collect();
        assert_eq!(got, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn test_single_valid_uses_mid_palette() {
        let palette = rank_palettes::WARM;
        let color = rank_color(0, 1, &palette, &RankPolicy::default()).unwrap();
        assert_eq!(color, palette[2]);
        assert_ne!(color, palette[0]);
        assert_ne!(color, palette[4]);
    }

    #[test]
    fn test_two_valid_use_extremes() {
        let palette = rank_palettes::COOL;
        let policy = RankPolicy::default();
        let first = rank_color(0, 2, &palette, &policy).unwrap();
        let second = rank_color(1, 2, &palette, &policy).unwrap();
        assert_eq!(first, palette[0]);
        assert_eq!(second, palette[4]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_policy_overrides_are_clamped() {
        let policy = RankPolicy::default().with_single(9).with_pair(1, 3);
        assert_eq!(rank_palette_index(0, 1, 5, &policy), Some(4));
        assert_eq!(rank_palette_index(1, 2, 5, &policy), Some(3));
    }

    #[test]
    fn test_out_of_range_rank() {
        assert_eq!(rank_palette_index(3, 3, 5, &RankPolicy::default()), None);
        assert_eq!(rank_palette_index(0, 0, 5, &RankPolicy::default()), None);
    }
}
