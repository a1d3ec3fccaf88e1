use std::fmt;

use crate::metadata::Metadata;

/// One (search algorithm, validation strategy, validation size) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    pub search_type: String,
    pub validation_strategy: String,
    pub validation_size: String,
}

impl Combination {
    /// Every triple of the given values, in nested search type, strategy, size order.
    pub fn cross_product(
        search_types: &[String],
        validation_strategies: &[String],
        validation_sizes: &[String],
    ) -> Vec<Self> {
        let mut combinations =
            Vec::with_capacity(search_types.len() * validation_strategies.len() * validation_sizes.len());
        for search_type in search_types {
            for validation_strategy in validation_strategies {
                for validation_size in validation_sizes {
                    combinations.push(Combination {
                        search_type: search_type.clone(),
                        validation_strategy: validation_strategy.clone(),
                        validation_size: validation_size.clone(),
                    });
                }
            }
        }
        combinations
    }

    pub fn all(metadata: &Metadata) -> Vec<Self> {
        Self::cross_product(
            &metadata.search_types,
            &metadata.validation_strategies,
            &metadata.validation_sizes,
        )
    }

    /// Key shared by the raw result file names and the output file name.
    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.search_type, self.validation_strategy, self.validation_size
        )
    }
}
