//! 单点杂交

use crate::codec::Chromosome;
use crate::selection::SelectionCache;
use crate::Error;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 一次杂交的全部记录，下标与种群一一对应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverOutcome {
    /// 参与杂交的个体，未被选中的为 None
    pub parents: Vec<Option<Chromosome>>,
    /// 产生的后代，未被选中的为 None；落单的个体原样传下
    pub offspring: Vec<Option<Chromosome>>,
    /// 每对个体共用的切点，未配对的为 None
    pub cut_points: Vec<Option<usize>>,
}

impl CrossoverOutcome {
    pub fn pairs(&self) -> usize {
        self.cut_points.iter().flatten().count() / 2
    }
}

/// 累积分布上界不超过 `cp` 的个体参与杂交，从左到右两两配对，每对在 `[0, L - 2]`
/// 中随机取一个切点交换尾部。
pub fn crossover<R: Rng>(
    population: &mut [Chromosome],
    cache: &SelectionCache,
    crossover_probability: f64,
    rng: &mut R,
) -> Result<CrossoverOutcome, Error> {
    if population.is_empty() || cache.len() != population.len() {
        return Err(Error::StaleCache);
    }
    if !(crossover_probability > 0.5 && crossover_probability <= 1.0) {
        return Err(Error::InvalidCrossoverProbability(crossover_probability));
    }

    let size = population.len();
    let parents: Vec<Option<Chromosome>> = (0..size)
        .map(|i| {
            cache
                .is_selected(i, crossover_probability)
                .then(|| population[i].clone())
        })
        .collect();
    let mut offspring: Vec<Option<Chromosome>> = vec![None; size];
    let mut cut_points: Vec<Option<usize>> = vec![None; size];

    let selected: Vec<usize> = (0..size).filter(|&i| parents[i].is_some()).collect();
    for pair in selected.chunks(2) {
        let &[i, j] = pair else {
            // 落单
            offspring[pair[0]] = parents[pair[0]].clone();
            continue;
        };
        let (Some(a), Some(b)) = (&parents[i], &parents[j]) else {
            continue;
        };
        let length = a.len();
        if length < 2 {
            offspring[i] = Some(a.clone());
            offspring[j] = Some(b.clone());
            continue;
        }
        let cut = rng.random_range(0..length - 1);
        offspring[i] = Some(a.splice(b, cut));
        offspring[j] = Some(b.splice(a, cut));
        cut_points[i] = Some(cut);
        cut_points[j] = Some(cut);
    }

    for (slot, child) in population.iter_mut().zip(&offspring) {
        if let Some(child) = child {
            slot.clone_from(child);
        }
    }

    Ok(CrossoverOutcome {
        parents,
        offspring,
        cut_points,
    })
}
