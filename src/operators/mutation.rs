//! 逐位变异

use crate::codec::Chromosome;
use crate::Error;
use rand::Rng;

/// 每个个体被翻转的位置，按从左到右的顺序
pub type Mutations = Vec<Vec<usize>>;

pub const MAX_MUTATION_PROBABILITY: f64 = 0.01;

pub fn mutate<R: Rng>(
    population: &mut [Chromosome],
    mutation_probability: f64,
    rng: &mut R,
) -> Result<Mutations, Error> {
    if population.is_empty() {
        return Err(Error::StaleCache);
    }
    if !(mutation_probability > 0.0 && mutation_probability <= MAX_MUTATION_PROBABILITY) {
        return Err(Error::InvalidMutationProbability(mutation_probability));
    }
    let mutations = population
        .iter_mut()
        .map(|chromosome| {
            let mut flipped = vec![];
            for position in 0..chromosome.len() {
                if rng.random::<f64>() <= mutation_probability {
                    chromosome.flip(position);
                    flipped.push(position);
                }
            }
            flipped
        })
        .collect();
    Ok(mutations)
}
