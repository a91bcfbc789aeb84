// Generic record trait for any collection element

use serde::{Serialize, de::DeserializeOwned};

/// Core trait that any storable record must implement
pub trait Record: Serialize + DeserializeOwned + Clone + 'static {
    /// Collection name for this record type (e.g., "tasks", "notes")
    /// Determines the provider key: {prefix}{collection}
    fn collection_name() -> &'static str
    where
        Self: Sized;

    /// Value returned by `list` before anything has been persisted
    fn seed() -> Vec<Self>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestRecord {
        name: String,
    }

    impl Record for TestRecord {
        fn collection_name() -> &'static str {
            "test"
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Seeded {
        n: u8,
    }

    impl Record for Seeded {
        fn collection_name() -> &'static str {
            "seeded"
        }

        fn seed() -> Vec<Self> {
            vec![Seeded { n: 1 }, Seeded { n: 2 }]
        }
    }

    #[test]
    fn test_record_trait_implementation() {
        assert_eq!(TestRecord::collection_name(), "test");
        assert!(TestRecord::seed().is_empty());
    }

    #[test]
    fn test_seed_override() {
        let seed = Seeded::seed();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[1].n, 2);
    }
}
