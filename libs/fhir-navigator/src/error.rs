//! Navigator error taxonomy (spec §7).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NavigatorError>;

#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("'{segment}' not found under '{previous_path}' in structure {snapshot_id}")]
    NotFound {
        segment: String,
        previous_path: String,
        snapshot_id: String,
    },

    #[error(
        "'{slice}' under '{previous_path}' in structure {snapshot_id} is not compatible with the parent element's allowed types"
    )]
    SliceMismatch {
        slice: String,
        previous_path: String,
        snapshot_id: String,
    },

    #[error("cannot resolve children for choice-type element '{path}' in structure {snapshot_id}")]
    AmbiguousChoice { path: String, snapshot_id: String },

    #[error("upstream provider error while resolving '{context}': {source}")]
    UpstreamUnavailable {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl NavigatorError {
    pub fn not_found(
        segment: impl Into<String>,
        previous_path: impl Into<String>,
        snapshot_id: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            segment: segment.into(),
            previous_path: previous_path.into(),
            snapshot_id: snapshot_id.into(),
        }
    }

    pub fn slice_mismatch(
        slice: impl Into<String>,
        previous_path: impl Into<String>,
        snapshot_id: impl Into<String>,
    ) -> Self {
        Self::SliceMismatch {
            slice: slice.into(),
            previous_path: previous_path.into(),
            snapshot_id: snapshot_id.into(),
        }
    }

    pub fn ambiguous_choice(path: impl Into<String>, snapshot_id: impl Into<String>) -> Self {
        Self::AmbiguousChoice {
            path: path.into(),
            snapshot_id: snapshot_id.into(),
        }
    }

    pub fn upstream(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::UpstreamUnavailable {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
