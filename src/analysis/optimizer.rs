//! Sampling route optimization.
//!
//! Picks which at-risk sensors to visit, and in what order, with a genetic
//! search over ordered subsets of the candidate pool. A route starts and ends
//! at the base and holds at most `capacity` stops.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use crate::analysis::detection::is_at_risk;
use crate::analysis::genetic::{crossover, mutate, random_route, tournament_index};
use crate::analysis::{geo, quality};
use crate::{Coordinate, EngineError, EngineResult, OptimizationResult, SensorReading};

// ---

/// Penalty applied per km of closed-loop travel.
const DISTANCE_PENALTY_PER_KM: f64 = 5.0;

/// Genetic search hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerParams {
    pub population_size: usize,
    pub generations: usize,
    /// Share of each generation copied unchanged into the next.
    pub elite_fraction: f64,
    pub tournament_size: usize,
    /// Probability that a child is mutated.
    pub mutation_rate: f64,
}

impl Default for OptimizerParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            elite_fraction: 0.2,
            tournament_size: 3,
            mutation_rate: 0.2,
        }
    }
}

impl OptimizerParams {
    /// Reject configurations the search cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        // ---
        if self.population_size == 0 {
            return Err(EngineError::EmptyPopulation);
        }
        if self.generations == 0 {
            return Err(EngineError::NoGenerations);
        }
        if !(0.0..1.0).contains(&self.elite_fraction) {
            return Err(EngineError::InvalidElitism(self.elite_fraction));
        }
        if self.tournament_size == 0 {
            return Err(EngineError::EmptyTournament);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EngineError::InvalidMutationRate(self.mutation_rate));
        }
        Ok(())
    }

    fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_fraction) as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    reading: &'a SensorReading,
    wqi: u8,
}

/// At-risk sensors eligible for a visit, with their WQI precomputed.
///
/// Ids keep first-seen input order; later duplicates of an id are ignored.
#[derive(Debug, Clone)]
pub struct CandidatePool<'a> {
    ids: Vec<&'a str>,
    by_id: HashMap<&'a str, Candidate<'a>>,
}

impl<'a> CandidatePool<'a> {
    /// Keep the sensors with WQI below 75 or at least one stored alert.
    pub fn from_sensors<I>(sensors: I) -> Self
    where
        I: IntoIterator<Item = &'a SensorReading>,
    {
        // ---
        let mut ids = Vec::new();
        let mut by_id = HashMap::new();

        for reading in sensors {
            let wqi = quality::wqi(reading);
            if !is_at_risk(reading, wqi) || by_id.contains_key(reading.id.as_str()) {
                continue;
            }
            ids.push(reading.id.as_str());
            by_id.insert(reading.id.as_str(), Candidate { reading, wqi });
        }

        Self { ids, by_id }
    }

    pub fn ids(&self) -> &[&'a str] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Closed-loop travel distance in km: base, every stop in order, base.
    ///
    /// Ids outside the pool are skipped. An empty route has infinite
    /// distance so it can never be chosen as best.
    pub fn route_distance<S: AsRef<str>>(&self, route: &[S], base: Coordinate) -> f64 {
        // ---
        if route.is_empty() {
            return f64::INFINITY;
        }

        let mut total = 0.0;
        let mut here = base;

        for id in route {
            let Some(candidate) = self.by_id.get(id.as_ref()) else {
                continue;
            };
            total += geo::distance(here, candidate.reading.location);
            here = candidate.reading.location;
        }

        total + geo::distance(here, base)
    }

    /// `priority + urgency - 5 * distance`; higher is better.
    ///
    /// Priority is `(100 - wqi) * 2` per stop. Urgency sums the weight of
    /// every stored alert on each stop. Empty routes score `-inf`.
    pub fn fitness<S: AsRef<str>>(&self, route: &[S], base: Coordinate) -> f64 {
        // ---
        let distance = self.route_distance(route, base);
        if distance.is_infinite() {
            return f64::NEG_INFINITY;
        }

        let mut priority = 0.0;
        let mut urgency = 0.0;

        for candidate in route.iter().filter_map(|id| self.by_id.get(id.as_ref())) {
            priority += (100.0 - f64::from(candidate.wqi)) * 2.0;
            urgency += candidate
                .reading
                .alerts
                .iter()
                .map(|a| a.severity.urgency_weight())
                .sum::<f64>();
        }

        priority + urgency - distance * DISTANCE_PENALTY_PER_KM
    }
}

/// Optimize with the default hyperparameters and no cancellation.
pub fn optimize<'a, I, R>(
    sensors: I,
    base: Coordinate,
    capacity: usize,
    rng: &mut R,
) -> EngineResult<OptimizationResult>
where
    I: IntoIterator<Item = &'a SensorReading>,
    R: Rng + ?Sized,
{
    optimize_with(sensors, base, capacity, &OptimizerParams::default(), rng, None)
}

/// Search for the fittest sampling route over the at-risk sensors.
///
/// Returns an empty route with zero distance when no sensor is at risk.
/// When `cancel` is set the search stops at the next generation boundary
/// and returns the best route seen so far.
pub fn optimize_with<'a, I, R>(
    sensors: I,
    base: Coordinate,
    capacity: usize,
    params: &OptimizerParams,
    rng: &mut R,
    cancel: Option<&AtomicBool>,
) -> EngineResult<OptimizationResult>
where
    I: IntoIterator<Item = &'a SensorReading>,
    R: Rng + ?Sized,
{
    // ---
    params.validate()?;
    if capacity == 0 {
        return Err(EngineError::ZeroCapacity);
    }

    let pool = CandidatePool::from_sensors(sensors);
    if pool.is_empty() {
        tracing::info!("No at-risk sensors, skipping route search");
        return Ok(OptimizationResult::default());
    }

    let route_len = capacity.min(pool.len());
    tracing::info!(
        "Optimizing route over {} candidates (stops <= {}, population {}, generations {})",
        pool.len(),
        route_len,
        params.population_size,
        params.generations
    );

    let mut population: Vec<Vec<&str>> = (0..params.population_size)
        .map(|_| random_route(pool.ids(), route_len, rng))
        .collect();

    let mut best: Option<(Vec<&str>, f64)> = None;

    for generation in 0..params.generations {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            tracing::warn!("Route search cancelled at generation {}", generation);
            break;
        }

        let fitness: Vec<f64> = population
            .iter()
            .map(|route| pool.fitness(route, base))
            .collect();

        let mut leader = 0;
        for (i, &f) in fitness.iter().enumerate() {
            if f > fitness[leader] {
                leader = i;
            }
        }

        let improved = best
            .as_ref()
            .map_or(true, |(_, best_fitness)| fitness[leader] > *best_fitness);
        if improved && fitness[leader].is_finite() {
            tracing::debug!(
                "Generation {}: new best fitness {:.2} ({} stops)",
                generation,
                fitness[leader],
                population[leader].len()
            );
            best = Some((population[leader].clone(), fitness[leader]));
        }

        population = next_generation(&population, &fitness, pool.ids(), route_len, params, rng);
    }

    let Some((route, fitness)) = best else {
        return Ok(OptimizationResult::default());
    };

    let distance = pool.route_distance(&route, base);
    tracing::info!(
        "Route search complete: {} stops, {:.2} km, fitness {:.2}",
        route.len(),
        distance,
        fitness
    );

    Ok(OptimizationResult {
        route: route.into_iter().map(String::from).collect(),
        distance,
        fitness: Some(fitness),
    })
}

/// Elites first, then children bred from tournament-selected parents.
fn next_generation<'a, R>(
    population: &[Vec<&'a str>],
    fitness: &[f64],
    pool: &[&'a str],
    max_len: usize,
    params: &OptimizerParams,
    rng: &mut R,
) -> Vec<Vec<&'a str>>
where
    R: Rng + ?Sized,
{
    // ---
    let mut ranked: Vec<usize> = (0..population.len()).collect();
    ranked.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

    let mut next: Vec<Vec<&str>> = ranked
        .iter()
        .take(params.elite_count())
        .map(|&i| population[i].clone())
        .collect();

    while next.len() < params.population_size {
        let parent1 = &population[tournament_index(fitness, params.tournament_size, rng)];
        let parent2 = &population[tournament_index(fitness, params.tournament_size, rng)];

        let mut child = crossover(parent1, parent2, rng);
        mutate(&mut child, pool, max_len, params.mutation_rate, rng);
        next.push(child);
    }

    next
}
