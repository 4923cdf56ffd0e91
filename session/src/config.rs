use palefiz_core::{DEFAULT_GRID_SIZE, MAX_FIGURES, MAX_GRID_SIZE};
use serde::Deserialize;
use thiserror::Error;

/// Seed used for the die when no seed is configured.
pub const DEFAULT_RNG_SEED: u64 = 0x5eed_cafe;

/// Settings required to open a new game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Number of cells along each edge of the square board.
    pub grid_size: u32,
    /// Seed of the die rolled during the simulation.
    pub rng_seed: u64,
    /// Maximum number of figures that may be placed during setup.
    pub max_figures: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            rng_seed: DEFAULT_RNG_SEED,
            max_figures: MAX_FIGURES,
        }
    }
}

impl SessionConfig {
    /// Checks that the configuration describes a playable board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if self.max_figures == 0 {
            return Err(ConfigError::NoFigureSlots);
        }
        Ok(())
    }
}

/// Reasons a session configuration is unusable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The board would contain no cells.
    #[error("grid size must be at least 1")]
    EmptyGrid,
    /// The board would exceed the largest supported size.
    #[error("grid size {size} exceeds the maximum of {max}")]
    GridTooLarge {
        /// Requested edge length.
        size: u32,
        /// Largest supported edge length.
        max: u32,
    },
    /// No figure could ever be placed.
    #[error("at least one figure must be allowed on the board")]
    NoFigureSlots,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SessionConfig::default();
        assert_eq!(config.grid_size, 10);
        assert_eq!(config.max_figures, 4);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let config = SessionConfig {
            grid_size: 0,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyGrid));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let largest = SessionConfig {
            grid_size: MAX_GRID_SIZE,
            ..SessionConfig::default()
        };
        assert_eq!(largest.validate(), Ok(()));

        let config = SessionConfig {
            grid_size: 200_000,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooLarge {
                size: 200_000,
                max: MAX_GRID_SIZE,
            })
        );
        assert_eq!(
            config.validate().map_err(|error| error.to_string()),
            Err("grid size 200000 exceeds the maximum of 256".to_owned())
        );
    }

    #[test]
    fn zero_figure_slots_are_rejected() {
        let config = SessionConfig {
            max_figures: 0,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoFigureSlots));
    }
}
