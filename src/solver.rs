//! 遗传算法求解器
//!
//! 一次求解的流程：随机生成初始种群并评估（第 0 代），之后每一代依次执行
//! 更新精英 → 杂交 → 变异 → 解码 → 选择 → 精英修复 → 记录快照。

use crate::codec::{Chromosome, Codec};
use crate::config::{ProblemConfig, RunConfig};
use crate::fitness::FitnessEngine;
use crate::interfaces::{Interface, Message, Silent};
use crate::objectives;
use crate::operators::{self, CrossoverOutcome, Mutations};
use crate::selection::{self, SelectionCache};
use crate::snapshot::{Elite, EpochSnapshot, GradeSummary};
use crate::{Error, RunError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use web_time::Instant;

pub struct Solver<R: Rng = StdRng> {
    codec: Codec,
    engine: FitnessEngine,
    rng: R,
    population: Vec<Chromosome>,
    cache: Option<SelectionCache>,
    elite: Option<Elite>,
}

impl Solver<StdRng> {
    pub fn new<F>(lower: f64, upper: f64, precision: u8, objective: F) -> Result<Self, Error>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::with_rng(lower, upper, precision, objective, StdRng::from_os_rng())
    }

    /// 按配置创建求解器，给定种子时结果可复现
    pub fn from_config(problem: &ProblemConfig, seed: Option<u64>) -> Result<Self, Error> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let codec = Codec::new(problem.lower_bound, problem.upper_bound, problem.precision)?;
        let engine = FitnessEngine::new(&codec, objectives::build(&problem.objective));
        Ok(Self::assemble(codec, engine, rng))
    }
}

impl<R: Rng> Solver<R> {
    pub fn with_rng<F>(
        lower: f64,
        upper: f64,
        precision: u8,
        objective: F,
        rng: R,
    ) -> Result<Self, Error>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let codec = Codec::new(lower, upper, precision)?;
        let engine = FitnessEngine::new(&codec, Box::new(objective));
        Ok(Self::assemble(codec, engine, rng))
    }

    fn assemble(codec: Codec, engine: FitnessEngine, rng: R) -> Self {
        debug!(
            capacity = codec.capacity(),
            bits = codec.bits(),
            fmin = engine.fmin(),
            "创建求解器"
        );
        Self {
            codec,
            engine,
            rng,
            population: vec![],
            cache: None,
            elite: None,
        }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn fmin(&self) -> f64 {
        self.engine.fmin()
    }

    pub fn grade(&self, x: f64) -> f64 {
        self.engine.grade(x)
    }

    pub fn fitness(&self, x: f64) -> f64 {
        self.engine.fitness(x)
    }

    pub fn elite(&self) -> Option<Elite> {
        self.elite
    }

    /// 最近一次选择的结果；种群被改写之后为 None
    pub fn cache(&self) -> Option<&SelectionCache> {
        self.cache.as_ref()
    }

    /// 当前种群的一份独立拷贝
    pub fn population(&self) -> Vec<Chromosome> {
        self.population.clone()
    }

    /// 把当前种群解码为实数
    pub fn decode_population(&self) -> Vec<f64> {
        self.population
            .iter()
            .map(|chromosome| self.codec.decode(chromosome))
            .collect()
    }

    /// 用一组实数的编码替换当前种群
    pub fn populate(&mut self, values: &[f64]) -> Result<(), Error> {
        let population = values
            .iter()
            .map(|&x| self.codec.encode(x))
            .collect::<Result<Vec<_>, _>>()?;
        self.population = population;
        self.cache = None;
        Ok(())
    }

    pub fn selection(&mut self, values: &[f64]) -> Result<&SelectionCache, Error> {
        let cache = selection::select(&self.codec, &self.engine, values)?;
        Ok(self.cache.insert(cache))
    }

    /// 杂交之后选择缓存作废
    pub fn crossover(&mut self, crossover_probability: f64) -> Result<CrossoverOutcome, Error> {
        let cache = self.cache.as_ref().ok_or(Error::StaleCache)?;
        let outcome = operators::crossover(
            &mut self.population,
            cache,
            crossover_probability,
            &mut self.rng,
        )?;
        self.cache = None;
        Ok(outcome)
    }

    /// 变异之后选择缓存作废
    pub fn mutate(&mut self, mutation_probability: f64) -> Result<Mutations, Error> {
        let mutations =
            operators::mutate(&mut self.population, mutation_probability, &mut self.rng)?;
        self.cache = None;
        Ok(mutations)
    }

    pub fn solve(
        &mut self,
        population_size: usize,
        epochs: usize,
        crossover_probability: f64,
        mutation_probability: f64,
    ) -> Result<Vec<EpochSnapshot>, RunError> {
        let run = RunConfig {
            population_size,
            epochs,
            crossover_probability,
            mutation_probability,
            seed: None,
        };
        self.solve_with(&run, &Silent)
    }

    pub fn solve_with(
        &mut self,
        run: &RunConfig,
        interface: &dyn Interface,
    ) -> Result<Vec<EpochSnapshot>, RunError> {
        let mut history = vec![];
        if let Err(source) = run.check_size() {
            return Err(abort(0, source, history));
        }
        info!(
            population_size = run.population_size,
            epochs = run.epochs,
            crossover_probability = run.crossover_probability,
            mutation_probability = run.mutation_probability,
            "开始求解"
        );

        let mut values = match self.initialize(run.population_size) {
            Ok(values) => values,
            Err(source) => return Err(abort(0, source, history)),
        };
        match self.snapshot(0, &values) {
            Ok(snapshot) => history.push(snapshot),
            Err(source) => return Err(abort(0, source, history)),
        }

        let start = Instant::now();
        for epoch in 1..=run.epochs {
            match self.epoch(epoch, &mut values, run, interface) {
                Ok(snapshot) => history.push(snapshot),
                Err(source) => return Err(abort(epoch, source, history)),
            }
            if epoch == 1 {
                let time = start.elapsed().as_micros() as u64;
                interface.post(Message::Elapsed { time });
            }
        }

        let elite = self.elite.unwrap_or(Elite {
            value: f64::NAN,
            fitness: f64::NAN,
        });
        info!(elite = elite.value, fitness = elite.fitness, "求解完成");
        interface.post(Message::Finished {
            epochs: run.epochs,
            elite,
        });
        Ok(history)
    }

    /// 在区间内均匀地随机生成初始种群，评估并选出最初的精英
    fn initialize(&mut self, population_size: usize) -> Result<Vec<f64>, Error> {
        if population_size == 0 {
            return Err(Error::StaleCache);
        }
        let (lower, upper) = (self.codec.lower(), self.codec.upper());
        let values: Vec<f64> = (0..population_size)
            .map(|_| {
                let x = lower + self.rng.random::<f64>() * (upper - lower);
                self.codec.quantize(x).clamp(lower, upper)
            })
            .collect();
        self.populate(&values)?;
        self.elite = None;
        self.selection(&values)?;
        self.update_elite(&values)?;
        Ok(values)
    }

    fn epoch(
        &mut self,
        epoch: usize,
        values: &mut Vec<f64>,
        run: &RunConfig,
        interface: &dyn Interface,
    ) -> Result<EpochSnapshot, Error> {
        let improved = self.update_elite(values)?;
        self.crossover(run.crossover_probability)?;
        self.mutate(run.mutation_probability)?;
        *values = self.decode_population();
        self.selection(values)?;
        let promoted = self.repair_elite(values)?;

        let snapshot = self.snapshot(epoch, values)?;
        if improved || promoted {
            interface.post(Message::BetterSolution {
                epoch,
                elite: snapshot.elite,
            });
        }
        debug!(
            epoch,
            min = snapshot.summary.min,
            avg = snapshot.summary.avg,
            max = snapshot.summary.max,
            elite = snapshot.elite.value,
            "完成一代"
        );
        interface.post(Message::Progress {
            epoch,
            summary: snapshot.summary,
            elite: snapshot.elite,
        });
        Ok(snapshot)
    }

    /// 在当前种群中寻找比精英更好的个体，返回精英是否更新。需要与 `values` 对应的选择缓存。
    pub fn update_elite(&mut self, values: &[f64]) -> Result<bool, Error> {
        let cache = self.cache.as_ref().ok_or(Error::StaleCache)?;
        let mut improved = false;
        for (&value, &fitness) in values.iter().zip(&cache.fitnesses) {
            if self.elite.map_or(true, |elite| elite.fitness < fitness) {
                self.elite = Some(Elite { value, fitness });
                improved = true;
            }
        }
        Ok(improved)
    }

    /// 精英若已不在种群中，随机选一个位置：该位置更好则接受它为新精英，否则把精英放回该位置
    /// 并重新选择。返回精英是否被替换。
    pub fn repair_elite(&mut self, values: &mut [f64]) -> Result<bool, Error> {
        let Some(elite) = self.elite else {
            return Ok(false);
        };
        let cache = self.cache.as_ref().ok_or(Error::StaleCache)?;
        let size = values.len();
        if size == 0 || cache.len() != size || self.population.len() != size {
            return Err(Error::StaleCache);
        }
        if cache.fitnesses.iter().any(|&fitness| fitness == elite.fitness) {
            return Ok(false);
        }
        let slot = self.rng.random_range(0..size);
        let fitness = cache.fitnesses[slot];
        if fitness > elite.fitness {
            self.elite = Some(Elite {
                value: values[slot],
                fitness,
            });
            return Ok(true);
        }
        debug!(slot, elite = elite.value, "精英丢失，放回种群");
        self.population[slot] = self.codec.encode(elite.value)?;
        values[slot] = elite.value;
        self.selection(values)?;
        Ok(false)
    }

    fn snapshot(&self, epoch: usize, values: &[f64]) -> Result<EpochSnapshot, Error> {
        let cache = self.cache.as_ref().ok_or(Error::StaleCache)?;
        let elite = self.elite.ok_or(Error::StaleCache)?;
        Ok(EpochSnapshot {
            epoch,
            values: values.to_vec(),
            chromosomes: self.population(),
            grades: cache.grades.clone(),
            fitnesses: cache.fitnesses.clone(),
            elite,
            summary: GradeSummary::of(&cache.grades),
        })
    }
}

fn abort(epoch: usize, source: Error, history: Vec<EpochSnapshot>) -> RunError {
    RunError {
        epoch,
        source,
        history,
    }
}
