//! Error types for alignment and rendering.

use thiserror::Error;

/// Errors that can occur while aligning or rendering a container.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The operation needs at least one image and got none.
    #[error("No images to {operation}")]
    NoImages { operation: &'static str },

    /// The container backend does not model this feature.
    #[error("{operation} is not supported by this container type")]
    Unsupported { operation: &'static str },

    #[error("Image {index} has no planes")]
    NoPlanes { index: usize },

    #[error("Index {index} is out of range (count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("No cached offset between images {first} and {second}")]
    OffsetNotCached { first: usize, second: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_images_error_message() {
        let err = Error::NoImages { operation: "align" };
        assert_eq!(err.to_string(), "No images to align");
    }

    #[test]
    fn test_unsupported_error_message() {
        let err = Error::Unsupported {
            operation: "mask lookup",
        };
        assert_eq!(
            err.to_string(),
            "mask lookup is not supported by this container type"
        );
    }

    #[test]
    fn test_index_error_mentions_both_numbers() {
        let msg = Error::IndexOutOfRange { index: 7, count: 3 }.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&Error::NoPlanes { index: 0 });
    }
}
