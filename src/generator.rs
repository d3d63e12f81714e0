//! Random starting boards.
//!
//! Boards are built by shuffling `capacity` copies of each color into a pool
//! and drawing full tubes from it. A drawn tube that is already uniform is
//! returned to the pool and the pool is reshuffled. If a layout cannot be
//! finished (the pool ends on a single uniform tube, or too many draws are
//! rejected) the whole layout restarts, up to `generation_attempts` times.
use crate::config::GameConfig;
use crate::engine::{Board, Color, Tube};
use crate::error::GenerateError;
use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Uniform draws tolerated within one layout before it restarts.
const MAX_REJECTIONS_PER_LAYOUT: usize = 64;

/// Produces randomized starting boards from a [`GameConfig`].
#[derive(Debug, Clone)]
pub struct Generator {
    config: GameConfig,
    rng: SmallRng,
}

impl Generator {
    /// Creates a generator seeded from system entropy.
    pub fn new(config: GameConfig) -> Self {
        Generator {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Creates a generator with a fixed seed. The same seed and config always
    /// produce the same sequence of boards.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Generator {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // Only called on a validated config, so the range is never empty.
    fn random_tube_count(&mut self) -> usize {
        self.rng.gen_range(self.config.min_tubes..=self.config.max_tubes)
    }

    /// Generates a new starting board.
    ///
    /// # Arguments
    /// * `tube_count`: Total number of tubes, including the empty ones. When
    ///   `None`, a count is drawn uniformly from `min_tubes..=max_tubes`.
    ///
    /// # Returns
    /// * `Ok(Board)` with `tube_count - empty_tubes` full, non-uniform tubes
    ///   followed by `empty_tubes` empty tubes.
    /// * `Err(GenerateError::InvalidConfig)` if the config fails
    ///   [`GameConfig::validate`].
    /// * `Err(GenerateError::TubeCountOutOfRange)` if the count leaves no room
    ///   for colors or needs more colors than the palette has.
    /// * `Err(GenerateError::Exhausted)` if every attempt failed, which happens
    ///   when the parameters cannot produce a non-uniform tube (e.g. one color).
    ///
    /// # Examples
    /// ```
    /// use color_sort::config::GameConfig;
    /// use color_sort::generator::Generator;
    ///
    /// let mut generator = Generator::with_seed(GameConfig::default(), 7);
    /// let board = generator.generate(Some(5)).unwrap();
    /// assert_eq!(board.len(), 5);
    /// assert!(board.tubes()[3].is_empty() && board.tubes()[4].is_empty());
    /// ```
    pub fn generate(&mut self, tube_count: Option<usize>) -> Result<Board, GenerateError> {
        self.config.validate()?;
        let tube_count = match tube_count {
            Some(count) => count,
            None => self.random_tube_count(),
        };
        let min = self.config.empty_tubes + 1;
        let max = self.config.empty_tubes + self.config.palette.len();
        if tube_count < min || tube_count > max {
            return Err(GenerateError::TubeCountOutOfRange {
                requested: tube_count,
                min,
                max,
            });
        }

        let colors = self.config.palette[..self.config.color_count(tube_count)].to_vec();
        for attempt in 1..=self.config.generation_attempts {
            if let Some(mut tubes) = self.try_layout(&colors) {
                let empty = (0..self.config.empty_tubes).map(|_| Tube::new(self.config.capacity));
                tubes.extend(empty);
                debug!(
                    "generated {} tubes with {} colors on attempt {}",
                    tube_count,
                    colors.len(),
                    attempt
                );
                return Ok(Board::new(tubes));
            }
            debug!("layout attempt {} failed, restarting", attempt);
        }
        Err(GenerateError::Exhausted {
            attempts: self.config.generation_attempts,
        })
    }

    /// One pass of shuffle-and-draw. Returns `None` if the layout got stuck.
    fn try_layout(&mut self, colors: &[Color]) -> Option<Vec<Tube>> {
        let capacity = self.config.capacity;
        let mut pool: Vec<Color> = colors
            .iter()
            .flat_map(|&color| std::iter::repeat(color).take(capacity))
            .collect();
        pool.shuffle(&mut self.rng);

        let mut tubes = Vec::with_capacity(colors.len());
        let mut rejections = 0;
        while !pool.is_empty() {
            let drawn = pool.split_off(pool.len().saturating_sub(capacity));
            let tube = Tube::with_tokens(drawn, capacity)?;
            if tube.is_uniform() {
                rejections += 1;
                trace!("rejected uniform draw {:?}", tube.tokens());
                // Reshuffling cannot help when nothing else is left in the pool.
                if pool.is_empty() || rejections > MAX_REJECTIONS_PER_LAYOUT {
                    return None;
                }
                pool.extend_from_slice(tube.tokens());
                pool.shuffle(&mut self.rng);
                continue;
            }
            tubes.push(tube);
        }
        Some(tubes)
    }
}
