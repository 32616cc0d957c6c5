//! Algorithm configuration and validation.
//!
//! All tunables live in one immutable struct handed to the engine at
//! construction; nothing reads the process environment at run time.

use crate::domain::error::EodtraderError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_MAX_POSITIONS: usize = 15;
pub const DEFAULT_STOP_LOSS: f64 = 0.07;
/// Calendar-day lookback for price history; ~400 trading days, enough for
/// the 252-observation momentum window.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 600;

#[derive(Debug, Clone, PartialEq)]
pub struct AlgoConfig {
    pub max_positions: usize,
    pub stop_loss_threshold: f64,
    /// Accept MACD-bullish OR RSI-bullish instead of requiring both.
    pub relaxed_filters: bool,
    pub allow_after_hours: bool,
    pub extended_hours: bool,
    pub trading_enabled: bool,
    pub lookback_days: u32,
}

impl Default for AlgoConfig {
    fn default() -> Self {
        AlgoConfig {
            max_positions: DEFAULT_MAX_POSITIONS,
            stop_loss_threshold: DEFAULT_STOP_LOSS,
            relaxed_filters: false,
            allow_after_hours: false,
            extended_hours: false,
            trading_enabled: false,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl AlgoConfig {
    /// Read the `[algorithm]` section, falling back to defaults for absent
    /// keys, then validate the result.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EodtraderError> {
        let algo = AlgoConfig {
            max_positions: config.get_int(
                "algorithm",
                "max_positions",
                DEFAULT_MAX_POSITIONS as i64,
            ) as usize,
            stop_loss_threshold: config.get_double(
                "algorithm",
                "stop_loss_threshold",
                DEFAULT_STOP_LOSS,
            ),
            relaxed_filters: config.get_bool("algorithm", "relaxed_filters", false),
            allow_after_hours: config.get_bool("algorithm", "allow_after_hours", false),
            extended_hours: config.get_bool("brokerage", "extended_hours", false),
            trading_enabled: config.get_bool("algorithm", "trading_enabled", false),
            lookback_days: config.get_int(
                "algorithm",
                "lookback_days",
                DEFAULT_LOOKBACK_DAYS as i64,
            ) as u32,
        };
        algo.validate()?;
        Ok(algo)
    }

    pub fn validate(&self) -> Result<(), EodtraderError> {
        if self.max_positions == 0 {
            return Err(invalid("max_positions", "max_positions must be at least 1"));
        }
        if self.stop_loss_threshold <= 0.0 || self.stop_loss_threshold >= 1.0 {
            return Err(invalid(
                "stop_loss_threshold",
                "stop_loss_threshold must be between 0 and 1",
            ));
        }
        if (self.lookback_days as usize) < crate::domain::momentum::MOMENTUM_WINDOW {
            return Err(invalid(
                "lookback_days",
                "lookback_days must cover at least 252 observations",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> EodtraderError {
    EodtraderError::ConfigInvalid {
        section: "algorithm".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn defaults() {
        let config = AlgoConfig::default();
        assert_eq!(config.max_positions, 15);
        assert!((config.stop_loss_threshold - 0.07).abs() < f64::EPSILON);
        assert!(!config.relaxed_filters);
        assert!(!config.allow_after_hours);
        assert!(!config.extended_hours);
        assert!(!config.trading_enabled);
        assert_eq!(config.lookback_days, 600);
    }

    #[test]
    fn default_config_validates() {
        assert!(AlgoConfig::default().validate().is_ok());
    }

    #[test]
    fn from_config_reads_algorithm_section() {
        let adapter = FileConfigAdapter::from_string(
            "[algorithm]\n\
             max_positions = 10\n\
             stop_loss_threshold = 0.05\n\
             relaxed_filters = true\n\
             trading_enabled = true\n\
             [brokerage]\n\
             extended_hours = true\n",
        )
        .unwrap();

        let config = AlgoConfig::from_config(&adapter).unwrap();
        assert_eq!(config.max_positions, 10);
        assert!((config.stop_loss_threshold - 0.05).abs() < f64::EPSILON);
        assert!(config.relaxed_filters);
        assert!(config.trading_enabled);
        assert!(config.extended_hours);
        assert!(!config.allow_after_hours);
        assert_eq!(config.lookback_days, 600);
    }

    #[test]
    fn zero_max_positions_rejected() {
        let config = AlgoConfig {
            max_positions: 0,
            ..AlgoConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EodtraderError::ConfigInvalid { key, .. }) if key == "max_positions"
        ));
    }

    #[test]
    fn stop_loss_out_of_range_rejected() {
        for bad in [0.0, -0.1, 1.0, 1.5] {
            let config = AlgoConfig {
                stop_loss_threshold: bad,
                ..AlgoConfig::default()
            };
            assert!(config.validate().is_err(), "expected rejection for {}", bad);
        }
    }

    #[test]
    fn short_lookback_rejected() {
        let config = AlgoConfig {
            lookback_days: 100,
            ..AlgoConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EodtraderError::ConfigInvalid { key, .. }) if key == "lookback_days"
        ));
    }
}
