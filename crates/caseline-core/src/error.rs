pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("canvas width must be positive, got {width}")]
    NonPositiveCanvasWidth { width: f64 },

    #[error("event cap must be at least 1")]
    ZeroEventCap,

    #[error("sizing tier table must not be empty")]
    EmptyTierTable,
}
