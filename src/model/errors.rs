//! Errors raised by the dataset loaders, the classifier and its block
//! evaluators.

/// Result alias for model-layer operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Parameters ----
    /// Flat parameter vector does not match the architecture.
    ParamLengthMismatch { expected: usize, actual: usize },

    /// Parameter entries must be finite.
    NonFiniteParameter { index: usize, value: f64 },

    /// No parameter block with this name exists in the registry.
    UnknownBlock { name: String },

    /// A block cannot be used as a differentiation target.
    UnsupportedTarget { block: String, reason: &'static str },

    /// A block value has the wrong shape.
    BlockShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    // ---- Architecture ----
    /// Layer widths are zero or do not chain.
    InvalidArchitecture { reason: String },

    // ---- Data ----
    /// Dataset contains no examples.
    EmptyDataset,

    /// Input rows and labels disagree in count.
    RowMismatch { inputs: usize, labels: usize },

    /// Input width does not match the first layer.
    InputDimMismatch { expected: usize, found: usize },

    /// Pixel intensity outside `[0, 1]` or non-finite.
    PixelOutOfRange { row: usize, col: usize, value: f64 },

    /// Class label outside `0..n_classes`.
    LabelOutOfRange { index: usize, label: usize, n_classes: usize },

    /// Synthetic dataset parameters are unusable.
    InvalidSynthetic { reason: &'static str },

    /// Malformed IDX file.
    InvalidIdx { reason: String },

    /// Filesystem failure while reading a dataset.
    Io { text: String },

    // ---- Evaluation ----
    /// Loss evaluated to NaN or infinity.
    NonFiniteLoss { value: f64 },
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Parameters ----
            ModelError::ParamLengthMismatch { expected, actual } => {
                write!(f, "Parameter length mismatch: expected {expected}, actual {actual}")
            }
            ModelError::NonFiniteParameter { index, value } => {
                write!(f, "Non-finite parameter at index {index}: {value}")
            }
            ModelError::UnknownBlock { name } => {
                write!(f, "Unknown parameter block '{name}'")
            }
            ModelError::UnsupportedTarget { block, reason } => {
                write!(f, "Block '{block}' cannot be a differentiation target: {reason}")
            }
            ModelError::BlockShapeMismatch { expected, found } => {
                write!(f, "Block shape mismatch: expected {expected:?}, found {found:?}")
            }

            // ---- Architecture ----
            ModelError::InvalidArchitecture { reason } => {
                write!(f, "Invalid architecture: {reason}")
            }

            // ---- Data ----
            ModelError::EmptyDataset => write!(f, "Dataset is empty"),
            ModelError::RowMismatch { inputs, labels } => {
                write!(f, "Dataset has {inputs} input rows but {labels} labels")
            }
            ModelError::InputDimMismatch { expected, found } => {
                write!(f, "Input dimension mismatch: expected {expected}, found {found}")
            }
            ModelError::PixelOutOfRange { row, col, value } => {
                write!(f, "Pixel ({row}, {col}) = {value} is outside [0, 1]")
            }
            ModelError::LabelOutOfRange { index, label, n_classes } => {
                write!(f, "Label {label} at index {index} is outside 0..{n_classes}")
            }
            ModelError::InvalidSynthetic { reason } => {
                write!(f, "Invalid synthetic dataset: {reason}")
            }
            ModelError::InvalidIdx { reason } => write!(f, "Invalid IDX file: {reason}"),
            ModelError::Io { text } => write!(f, "I/O error: {text}"),

            // ---- Evaluation ----
            ModelError::NonFiniteLoss { value } => write!(f, "Non-finite loss: {value}"),
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io { text: err.to_string() }
    }
}
