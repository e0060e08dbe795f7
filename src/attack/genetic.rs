//! Genetic search over simultaneous renames.
//!
//! A chromosome assigns a replacement (possibly the name itself) to every
//! identifier that has at least one candidate. The population starts with
//! the unchanged baseline plus one single-rename chromosome per identifier
//! and evolves steady-state: each iteration breeds a batch of children,
//! classifies them in one call, stops at the first child that flips the
//! label and otherwise lets fitter children replace the weakest members.
//!
//! # Example
//!
//! ```
//! use codeflip::attack::{Example, GeneticAttack};
//! use codeflip::candidates::{CandidateMap, CandidateSet};
//! use codeflip::config::AttackConfig;
//! use codeflip::oracle::Prediction;
//! use codeflip::program::TokenizedProgram;
//!
//! // flips only when both identifiers are renamed
//! let classifier = |programs: &[String]| -> codeflip::Result<Vec<Prediction>> {
//!     Ok(programs
//!         .iter()
//!         .map(|p| match (p.contains("left"), p.contains("right")) {
//!             (true, true) => Prediction::from_probs(vec![0.2, 0.8]),
//!             (true, false) | (false, true) => Prediction::from_probs(vec![0.7, 0.3]),
//!             (false, false) => Prediction::from_probs(vec![0.9, 0.1]),
//!         })
//!         .collect())
//! };
//!
//! let program = TokenizedProgram::from_source("a = b + a ;", ["a", "b"]);
//! let example = Example::new("a = b + a;", program, 0);
//! let candidates: CandidateMap = [
//!     CandidateSet::from_candidates("a", ["left"]),
//!     CandidateSet::from_candidates("b", ["right"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let config = AttackConfig::new().with_seed(7);
//! let original = Prediction::from_probs(vec![0.9, 0.1]);
//! let result = GeneticAttack::new(&classifier, &config)
//!     .run(&example, &original, &candidates, None)
//!     .unwrap();
//! assert!(result.outcome.is_success());
//! assert_eq!(result.adversarial_code, "left = right + left ;");
//! ```

use super::greedy::best_gap;
use super::{AttackOutcome, AttackResult, Example};
use crate::candidates::CandidateMap;
use crate::config::AttackConfig;
use crate::error::Result;
use crate::oracle::{BatchClassifier, Classifier, Prediction};
use crate::program::{Identifier, Substitutions, TokenizedProgram};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use tracing::{debug, info, trace};

/// Selection weight given to the least fit member
const SELECTION_FLOOR: f64 = 0.01;

/// Genetic attack engine.
#[derive(Debug)]
pub struct GeneticAttack<'a, C: ?Sized> {
    classifier: &'a C,
    config: &'a AttackConfig,
}

impl<'a, C: Classifier + ?Sized> GeneticAttack<'a, C> {
    /// Create an engine over `classifier`
    #[must_use]
    pub fn new(classifier: &'a C, config: &'a AttackConfig) -> Self {
        Self { classifier, config }
    }

    /// Run with a generator seeded from `config.seed` (entropy if unset).
    ///
    /// `original` is the prediction on the unmodified program; `seeds`
    /// supplies ready-made replacements (typically the greedy substitutions)
    /// that skip per-identifier seeding queries.
    ///
    /// # Errors
    ///
    /// Propagates classifier failures.
    pub fn run(
        &self,
        example: &Example,
        original: &Prediction,
        candidates: &CandidateMap,
        seeds: Option<&Substitutions>,
    ) -> Result<AttackResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(example, original, candidates, seeds, &mut rng)
    }

    /// Run with an injected generator.
    ///
    /// # Errors
    ///
    /// Propagates classifier failures.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        example: &Example,
        original: &Prediction,
        candidates: &CandidateMap,
        seeds: Option<&Substitutions>,
        rng: &mut R,
    ) -> Result<AttackResult> {
        let program = &example.program;
        let label = original.label;
        let base_prob = original.prob(label);
        let mut clf = BatchClassifier::new(self.classifier, self.config.eval_batch_size)
            .with_num_labels(original.probs.len());
        let mut result = AttackResult::pending(example, label);

        let domain = Domain::new(program, candidates);
        if domain.is_empty() {
            debug!("no identifier has a candidate");
            result.outcome = AttackOutcome::NoValidCandidates;
            return Ok(result);
        }

        let seeded = self.seed_chromosomes(&mut clf, program, &domain, base_prob, label, seeds)?;
        let preds = clf.classify_tokens(
            &seeded
                .iter()
                .map(|c| c.tokens(program, &domain))
                .collect::<Vec<_>>(),
        )?;
        result.final_label = Some(label);
        if let Some(i) = preds.iter().position(|p| p.label != label) {
            info!(identifier = domain.name(i), "seed chromosome flipped the label");
            return Ok(succeed(result, program, &domain, &seeded[i], &preds[i], &clf));
        }

        let mut population = Population::new(Chromosome::baseline(&domain));
        for (chromosome, pred) in seeded.into_iter().zip(&preds) {
            population.push(chromosome, base_prob - pred.prob(label));
        }

        let iterations = self
            .config
            .max_iterations
            .unwrap_or_else(|| (5 * population.len()).max(10));
        let brood = self.config.eval_batch_size.max(1);
        debug!(
            population = population.len(),
            iterations, brood, "genetic search started"
        );

        for iteration in 0..iterations {
            result.genetic_iterations = iteration + 1;
            let children = self.breed(&population, &domain, brood, rng);
            let preds = clf.classify_tokens(
                &children
                    .iter()
                    .map(|c| c.tokens(program, &domain))
                    .collect::<Vec<_>>(),
            )?;

            if let Some(i) = preds.iter().position(|p| p.label != label) {
                info!(iteration, "SUC! genetic child flipped the label");
                return Ok(succeed(result, program, &domain, &children[i], &preds[i], &clf));
            }

            for (child, pred) in children.into_iter().zip(&preds) {
                population.replace_weakest(child, base_prob - pred.prob(label));
            }
            trace!(
                iteration,
                best = population.best().1,
                "generation evaluated"
            );
        }

        let (best, fitness) = population.best();
        if fitness > 0.0 {
            result.commit(
                program,
                best.substitutions(&domain),
                best.tokens(program, &domain).join(" "),
            );
        }
        result.usage = clf.usage();
        debug!(best = fitness, "genetic search exhausted");
        Ok(result)
    }

    /// One chromosome per domain identifier, baseline plus a single rename.
    fn seed_chromosomes(
        &self,
        clf: &mut BatchClassifier<'_, C>,
        program: &TokenizedProgram,
        domain: &Domain<'_>,
        base_prob: f32,
        label: usize,
        seeds: Option<&Substitutions>,
    ) -> Result<Vec<Chromosome>> {
        let baseline = Chromosome::baseline(domain);
        let unmodified = program.working();
        let mut seeded = Vec::with_capacity(domain.len());

        for k in 0..domain.len() {
            let name = domain.name(k);
            let gene = match seeds.and_then(|s| s.get(name)) {
                Some(replacement) => replacement.clone(),
                None => {
                    let options = domain.options(k);
                    let variants: Vec<Vec<String>> = options
                        .iter()
                        .map(|c| unmodified.preview(domain.ident(k), c))
                        .collect();
                    let preds = clf.classify_tokens(&variants)?;
                    best_gap(&preds, label, base_prob)
                        .map_or_else(|| name.to_string(), |(i, _)| options[i].clone())
                }
            };
            seeded.push(baseline.with_gene(k, gene));
        }
        Ok(seeded)
    }

    /// Draw `brood` children from the current population.
    fn breed<R: Rng + ?Sized>(
        &self,
        population: &Population,
        domain: &Domain<'_>,
        brood: usize,
        rng: &mut R,
    ) -> Vec<Chromosome> {
        let selector = population.selector();
        let mut children = Vec::with_capacity(brood);

        while children.len() < brood {
            let first = population.member(population.pick(selector.as_ref(), rng));
            let second = population.member(population.pick(selector.as_ref(), rng));

            if rng.gen::<f64>() < self.config.crossover_prob && first != second {
                let (a, b) = first.crossover(second, rng);
                if a != *first && a != *second {
                    let keep_b = b != *first && b != *second;
                    children.push(a);
                    if keep_b && children.len() < brood {
                        children.push(b);
                    }
                    continue;
                }
            }
            children.push(first.mutate(domain, rng));
        }
        children
    }
}

fn succeed<C: Classifier + ?Sized>(
    mut result: AttackResult,
    program: &TokenizedProgram,
    domain: &Domain<'_>,
    winner: &Chromosome,
    pred: &Prediction,
    clf: &BatchClassifier<'_, C>,
) -> AttackResult {
    result.commit(
        program,
        winner.substitutions(domain),
        winner.tokens(program, domain).join(" "),
    );
    result.final_label = Some(pred.label);
    result.outcome = AttackOutcome::Success;
    result.usage = clf.usage();
    result
}

/// Identifiers with at least one candidate and their options.
#[derive(Debug)]
struct Domain<'a> {
    idents: Vec<&'a Identifier>,
    options: Vec<&'a [String]>,
}

impl<'a> Domain<'a> {
    fn new(program: &'a TokenizedProgram, candidates: &'a CandidateMap) -> Self {
        let (idents, options) = candidates
            .domain()
            .filter_map(|name| program.identifier(name).map(|id| (id, candidates.candidates(name))))
            .unzip();
        Self { idents, options }
    }

    fn len(&self) -> usize {
        self.idents.len()
    }

    fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }

    fn ident(&self, k: usize) -> &'a Identifier {
        self.idents[k]
    }

    fn name(&self, k: usize) -> &'a str {
        self.idents[k].name()
    }

    fn options(&self, k: usize) -> &'a [String] {
        self.options[k]
    }
}

/// Replacement per domain identifier, aligned with [`Domain`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chromosome {
    genes: Vec<String>,
}

impl Chromosome {
    /// Every identifier mapped to itself
    fn baseline(domain: &Domain<'_>) -> Self {
        Self {
            genes: (0..domain.len()).map(|k| domain.name(k).to_string()).collect(),
        }
    }

    fn with_gene(&self, k: usize, gene: String) -> Self {
        let mut next = self.clone();
        next.genes[k] = gene;
        next
    }

    /// Uniform crossover: a fair coin per gene, the second child gets the
    /// other parent's gene.
    fn crossover<R: Rng + ?Sized>(&self, other: &Self, rng: &mut R) -> (Self, Self) {
        let mut a = self.clone();
        let mut b = other.clone();
        for k in 0..self.genes.len() {
            if rng.gen_bool(0.5) {
                std::mem::swap(&mut a.genes[k], &mut b.genes[k]);
            }
        }
        (a, b)
    }

    /// Reassign one random gene to a random candidate or back to identity.
    fn mutate<R: Rng + ?Sized>(&self, domain: &Domain<'_>, rng: &mut R) -> Self {
        let k = rng.gen_range(0..domain.len());
        let options = domain.options(k);
        let choice = rng.gen_range(0..=options.len());
        let gene = options
            .get(choice)
            .cloned()
            .unwrap_or_else(|| domain.name(k).to_string());
        self.with_gene(k, gene)
    }

    fn substitutions(&self, domain: &Domain<'_>) -> Substitutions {
        self.genes
            .iter()
            .enumerate()
            .map(|(k, gene)| (domain.name(k).to_string(), gene.clone()))
            .collect()
    }

    fn tokens(&self, program: &TokenizedProgram, domain: &Domain<'_>) -> Vec<String> {
        program.apply(&self.substitutions(domain))
    }
}

/// Chromosomes with cached fitness; size fixed after seeding.
#[derive(Debug)]
struct Population {
    members: Vec<Chromosome>,
    fitness: Vec<f32>,
}

impl Population {
    /// Population holding only `baseline`, whose fitness is 0 by definition
    fn new(baseline: Chromosome) -> Self {
        Self {
            members: vec![baseline],
            fitness: vec![0.0],
        }
    }

    fn push(&mut self, chromosome: Chromosome, fitness: f32) {
        self.members.push(chromosome);
        self.fitness.push(fitness);
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    fn member(&self, i: usize) -> &Chromosome {
        &self.members[i]
    }

    /// First member with the lowest fitness
    fn weakest(&self) -> usize {
        let mut idx = 0;
        for (i, &f) in self.fitness.iter().enumerate() {
            if f < self.fitness[idx] {
                idx = i;
            }
        }
        idx
    }

    /// First member with the highest fitness
    fn best(&self) -> (&Chromosome, f32) {
        let mut idx = 0;
        for (i, &f) in self.fitness.iter().enumerate() {
            if f > self.fitness[idx] {
                idx = i;
            }
        }
        (&self.members[idx], self.fitness[idx])
    }

    /// Replace the weakest member if `fitness` beats it.
    fn replace_weakest(&mut self, child: Chromosome, fitness: f32) -> bool {
        let idx = self.weakest();
        if fitness > self.fitness[idx] {
            self.members[idx] = child;
            self.fitness[idx] = fitness;
            true
        } else {
            false
        }
    }

    /// Fitness-proportional sampler over shifted fitness, `None` when all
    /// members are equally fit.
    fn selector(&self) -> Option<WeightedIndex<f64>> {
        let min = self.fitness.iter().copied().fold(f32::INFINITY, f32::min);
        let max = self.fitness.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if max - min <= f32::EPSILON {
            return None;
        }
        WeightedIndex::new(
            self.fitness
                .iter()
                .map(|&f| f64::from(f - min) + SELECTION_FLOOR),
        )
        .ok()
    }

    fn pick<R: Rng + ?Sized>(&self, selector: Option<&WeightedIndex<f64>>, rng: &mut R) -> usize {
        match selector {
            Some(weights) => weights.sample(rng),
            None => rng.gen_range(0..self.len()),
        }
    }
}

#[cfg(test)]
#[path = "genetic_tests.rs"]
mod tests;
