//! The product-import collaborator interface.

use std::collections::HashMap;

use product_common::{Product, ProductError};

/// Imports a product from a file.
///
/// Readers for the various on-disk formats implement this; the regrid
/// engine only needs to load the matching products named by a
/// collocation table.
pub trait ProductImporter {
    fn import(&self, filename: &str) -> product_common::Result<Product>;
}

/// An importer backed by in-memory products, keyed by filename.
///
/// Used by tests and by callers that pre-load their match products.
#[derive(Debug, Default)]
pub struct InMemoryImporter {
    products: HashMap<String, Product>,
}

impl InMemoryImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, product: Product) {
        self.products.insert(filename.into(), product);
    }
}

impl ProductImporter for InMemoryImporter {
    fn import(&self, filename: &str) -> product_common::Result<Product> {
        self.products
            .get(filename)
            .cloned()
            .ok_or_else(|| ProductError::FileNotFound(filename.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_importer() {
        let mut importer = InMemoryImporter::new();
        importer.insert("a.dat", Product::new());
        assert!(importer.import("a.dat").is_ok());
        assert!(matches!(
            importer.import("b.dat"),
            Err(ProductError::FileNotFound(_))
        ));
    }
}
