use crate::domain::model::ImageFrame;
use crate::domain::source::SourceNode;
use crate::utils::error::Result;

/// Read access to an opened recording. Implementations own the source tree;
/// callers only borrow nodes from it.
pub trait SourceReader {
    fn origin(&self) -> &str;

    fn root(&self) -> &SourceNode;

    /// Walks `keys` from the root, failing with `NotFound` on the first missing key.
    fn retrieve_by_path(&self, keys: &[String]) -> Result<&SourceNode>;

    /// Time axis of a series, decimated to at most `max_samples` values.
    fn timestamps(&self, node: &SourceNode, max_samples: usize) -> Result<Vec<f64>>;

    /// Data axis of a series, decimated with the same bound as [`Self::timestamps`].
    fn data_series(&self, node: &SourceNode, max_samples: usize) -> Result<Vec<f64>>;

    fn image(&self, name: &str, interface: &str, index: usize) -> Result<ImageFrame>;
}

pub trait ConfigProvider {
    fn model_name(&self) -> &str;
    fn library_id(&self) -> &str;
    fn root_name(&self) -> &str;
    fn max_samples(&self) -> usize;
    fn path_separator(&self) -> &str;
    fn extended_policy(&self) -> bool;
}
