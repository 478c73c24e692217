use std::error::Error as StdError;

pub type QrResult<T> = Result<T, QrError>;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum QrError {
    /// Bad QR content or raster size.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A bundled resource or local file does not exist.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// The remote fetch failed or returned something that is not an image.
    #[error("remote asset error: {0}")]
    RemoteAsset(String),

    #[error("composition error: {context}")]
    Composition {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("serialization error: {0}")]
    Serialization(#[source] image::ImageError),

    /// No readable QR symbol in the image.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QrError {
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn asset_not_found(msg: impl Into<String>) -> Self {
        Self::AssetNotFound(msg.into())
    }

    pub fn remote_asset(msg: impl Into<String>) -> Self {
        Self::RemoteAsset(msg.into())
    }

    pub fn composition(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Composition {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
