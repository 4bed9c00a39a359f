use evolalg::codec::Chromosome;
use evolalg::operators::{crossover, mutate};
use evolalg::selection::SelectionCache;
use evolalg::Error;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn population(rows: &[&str]) -> Vec<Chromosome> {
    rows.iter()
        .map(|row| Chromosome::from(row.bytes().map(|c| c - b'0').collect::<Vec<u8>>()))
        .collect()
}

/// 按给定的累积分布上界构造一个缓存，其余字段只需长度一致
fn cache_with_bounds(bounds: &[f64]) -> SelectionCache {
    let n = bounds.len();
    let mut previous = 0.0;
    let probabilities = bounds
        .iter()
        .map(|&bound| {
            let p = bound - previous;
            previous = bound;
            p
        })
        .collect();
    SelectionCache {
        grades: vec![0.0; n],
        fitnesses: vec![1.0; n],
        probabilities,
        cdf_upper_bounds: bounds.to_vec(),
        fitness_sum: n as f64,
    }
}

#[test]
fn crossover_pairs_selected_individuals_left_to_right() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut pop = population(&["0000000000", "1111111111", "0101010101", "1100110011", "1010101010"]);
    let before = pop.clone();
    let cache = cache_with_bounds(&[0.1, 0.3, 0.6, 0.8, 1.0]);

    let outcome = crossover(&mut pop, &cache, 0.7, &mut rng).unwrap();

    assert_eq!(pop.len(), before.len());
    assert_eq!(outcome.pairs(), 1);
    let cut = outcome.cut_points[0].unwrap();
    assert!(cut <= 10 - 2);
    assert_eq!(outcome.cut_points[1], Some(cut));
    assert_eq!(&outcome.cut_points[2..], &[None, None, None]);

    // 第 0、1 个配对
    assert_eq!(outcome.parents[0].as_ref(), Some(&before[0]));
    assert_eq!(outcome.parents[1].as_ref(), Some(&before[1]));
    assert_eq!(pop[0].bits()[..cut], before[0].bits()[..cut]);
    assert_eq!(pop[0].bits()[cut..], before[1].bits()[cut..]);
    assert_eq!(pop[1].bits()[..cut], before[1].bits()[..cut]);
    assert_eq!(pop[1].bits()[cut..], before[0].bits()[cut..]);

    // 第 2 个落单，原样传下
    assert_eq!(outcome.parents[2].as_ref(), Some(&before[2]));
    assert_eq!(outcome.offspring[2].as_ref(), Some(&before[2]));
    assert_eq!(pop[2], before[2]);

    // 第 3、4 个未被选中
    assert_eq!(outcome.parents[3], None);
    assert_eq!(outcome.offspring[4], None);
    assert_eq!(pop[3], before[3]);
    assert_eq!(pop[4], before[4]);
}

#[test]
fn offspring_only_differ_at_or_after_cut() {
    let mut rng = StdRng::seed_from_u64(42);
    let rows = [
        "0010011100111",
        "1101100011000",
        "0000011111000",
        "1111100000111",
        "0101010101010",
        "1010101010101",
    ];
    let cache = cache_with_bounds(&[0.1, 0.2, 0.3, 0.4, 0.5, 1.0]);
    for _ in 0..50 {
        let mut pop = population(&rows);
        let before = pop.clone();
        let outcome = crossover(&mut pop, &cache, 0.6, &mut rng).unwrap();
        assert_eq!(outcome.pairs(), 2);
        for i in 0..5 {
            if let Some(cut) = outcome.cut_points[i] {
                assert!(cut <= 11);
                assert_eq!(pop[i].bits()[..cut], before[i].bits()[..cut]);
            }
        }
        assert_eq!(outcome.cut_points[4], None);
        assert_eq!(pop[4], before[4]);
        assert_eq!(pop[5], before[5]);
    }
}

#[test]
fn nothing_selected_leaves_population_untouched() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pop = population(&["0000", "1111", "0101"]);
    let before = pop.clone();
    let cache = cache_with_bounds(&[0.6, 0.8, 1.0]);
    let outcome = crossover(&mut pop, &cache, 0.55, &mut rng).unwrap();
    assert_eq!(pop, before);
    assert!(outcome.parents.iter().all(Option::is_none));
    assert!(outcome.cut_points.iter().all(Option::is_none));
}

#[test]
fn single_bit_chromosomes_pass_through() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pop = population(&["0", "1"]);
    let before = pop.clone();
    let cache = cache_with_bounds(&[0.5, 1.0]);
    let outcome = crossover(&mut pop, &cache, 1.0, &mut rng).unwrap();
    assert_eq!(pop, before);
    assert_eq!(outcome.cut_points, vec![None, None]);
    assert_eq!(outcome.offspring[0].as_ref(), Some(&before[0]));
}

#[test]
fn crossover_probability_out_of_range() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pop = population(&["0000", "1111"]);
    let cache = cache_with_bounds(&[0.5, 1.0]);
    for cp in [0.5, 0.3, 1.01, f64::NAN] {
        let result = crossover(&mut pop, &cache, cp, &mut rng);
        assert!(matches!(result, Err(Error::InvalidCrossoverProbability(_))));
    }
}

#[test]
fn crossover_needs_matching_cache() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pop = population(&["0000", "1111", "0011"]);
    let cache = cache_with_bounds(&[0.5, 1.0]);
    assert!(matches!(
        crossover(&mut pop, &cache, 0.75, &mut rng),
        Err(Error::StaleCache)
    ));
    let mut empty: Vec<Chromosome> = vec![];
    assert!(matches!(
        crossover(&mut empty, &SelectionCache::default(), 0.75, &mut rng),
        Err(Error::StaleCache)
    ));
}

#[test]
fn mutations_match_flipped_bits() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut pop = population(&["0010011100111"; 200]);
    let before = pop.clone();
    let mutations = mutate(&mut pop, 0.01, &mut rng).unwrap();
    assert_eq!(mutations.len(), pop.len());
    for ((after, before), flipped) in pop.iter().zip(&before).zip(&mutations) {
        let differing: Vec<usize> = (0..after.len())
            .filter(|&k| after.bits()[k] != before.bits()[k])
            .collect();
        assert_eq!(&differing, flipped);
        assert!(after.bits().iter().all(|&bit| bit <= 1));
    }
}

#[test]
fn mutation_probability_out_of_range() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pop = population(&["0000"]);
    for mp in [0.0, -0.1, 0.02, f64::NAN] {
        let result = mutate(&mut pop, mp, &mut rng);
        assert!(matches!(result, Err(Error::InvalidMutationProbability(_))));
    }
    assert_eq!(pop, population(&["0000"]));
}

#[test]
fn mutation_needs_population() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut empty: Vec<Chromosome> = vec![];
    assert!(matches!(
        mutate(&mut empty, 0.005, &mut rng),
        Err(Error::StaleCache)
    ));
}
