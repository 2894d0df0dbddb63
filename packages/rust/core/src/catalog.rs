//! Product and FAQ catalog loading.
//!
//! Each CSV row becomes one [`CatalogDocument`] whose text is what gets
//! embedded and later quoted to the model as context.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use salesagent_shared::{CatalogDocument, Result, SalesAgentError};

/// A row of the products CSV: `id,title,description,category,price,tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Kept as text so it is quoted back exactly as written.
    pub price: String,
    pub tags: String,
}

impl ProductRecord {
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            source: format!("product:{}", self.id),
            content: format!(
                "Title: {}\nDescription: {}\nCategory: {}\nPrice: {}\nTags: {}",
                self.title, self.description, self.category, self.price, self.tags
            ),
        }
    }
}

/// A row of the FAQs CSV: `id,question,answer`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FaqRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
}

impl FaqRecord {
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            source: format!("faq:{}", self.id),
            content: format!("Q: {}\nA: {}", self.question, self.answer),
        }
    }
}

/// Load product rows from a CSV file with a header row.
pub fn load_products(path: &Path) -> Result<Vec<ProductRecord>> {
    read_records(path)
}

/// Load FAQ rows from a CSV file with a header row.
pub fn load_faqs(path: &Path) -> Result<Vec<FaqRecord>> {
    read_records(path)
}

/// Load both catalog files and build documents, products first.
pub fn load_catalog(products_csv: &Path, faqs_csv: &Path) -> Result<Vec<CatalogDocument>> {
    let products = load_products(products_csv)?;
    let faqs = load_faqs(faqs_csv)?;

    info!(
        products = products.len(),
        faqs = faqs.len(),
        "catalog loaded"
    );

    Ok(products
        .iter()
        .map(ProductRecord::to_document)
        .chain(faqs.iter().map(FaqRecord::to_document))
        .collect())
}

fn read_records<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| SalesAgentError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    reader
        .deserialize::<T>()
        .map(|row| {
            row.map_err(|e| SalesAgentError::parse(format!("{}: {e}", path.display())))
        })
        .collect()
}
