//! 도메인 모델.

pub mod candle;
pub mod market_condition;
pub mod movement;
pub mod pattern;
pub mod sources;

pub use candle::Candle;
pub use market_condition::MarketCondition;
pub use movement::{
    nearest_price_horizon, nearest_volume_horizon, DistributionBucket, MovementAnalysis,
    PriceChanges, PriceDistribution, SimilarPattern, SuccessRate, VolumeChanges, PRICE_HORIZONS,
    VOLUME_HORIZONS,
};
pub use pattern::{DojiPattern, DojiType, PatternContext, TrendDirection};
pub use sources::{
    CandleSource, HistoricalPatternStore, MarketRegimeSource, SourceError, SourceResult,
    UniverseSource,
};
