use crate::{Pipeline, Tokenize};

/// A builder for creating a [`Pipeline`].
///
/// Tokenizers are tried in the order they are added; add shadowing tokenizers (comments before
/// symbols) first.
#[derive(Default)]
pub struct PipelineBuilder {
    tokenizers: Vec<Box<dyn Tokenize>>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    pub fn new() -> Self {
        Self {
            tokenizers: Vec::new(),
        }
    }

    /// Adds a tokenizer to the pipeline builder.
    pub fn add_tokenizer(mut self, tokenizer: impl Tokenize + 'static) -> Self {
        self.tokenizers.push(Box::new(tokenizer));
        self
    }

    /// Builds the pipeline from the pipeline builder.
    pub fn build(self) -> Pipeline {
        Pipeline {
            tokenizers: self.tokenizers,
        }
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("tokenizers", &self.tokenizers.len())
            .finish()
    }
}
