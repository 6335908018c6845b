//! Sheet payload parsing and the in-memory product catalog.

use crate::normalize::RowNormalizer;
use crate::types::{ProductRecord, RawTable};
use crate::{Error, Result};
use serde_json::Value;

/// Parse a sheet endpoint body: `{"values": [[...]]}` or a bare 2-D array.
///
/// Non-string cells are stringified and `null` becomes the empty string.
pub fn parse_sheet_payload(bytes: &[u8]) -> Result<RawTable> {
    let value: Value = serde_json::from_slice(bytes)?;

    let rows = match value {
        Value::Object(mut object) => match object.remove("values") {
            Some(Value::Array(rows)) => rows,
            // The sheets API omits `values` entirely for an empty range.
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(Error::InvalidSheet(format!(
                    "expected `values` to be an array, found {}",
                    json_kind(&other)
                )))
            }
        },
        Value::Array(rows) => rows,
        other => {
            return Err(Error::InvalidSheet(format!(
                "expected an object or array, found {}",
                json_kind(&other)
            )))
        }
    };

    Ok(rows
        .into_iter()
        .map(|row| match row {
            Value::Array(cells) => cells.into_iter().map(cell_to_string).collect(),
            single => vec![cell_to_string(single)],
        })
        .collect())
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// User-selectable listing orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Spreadsheet row order.
    #[default]
    Sheet,
    Name,
    Code,
    Category,
}

impl SortOrder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sheet" => Some(Self::Sheet),
            "name" => Some(Self::Name),
            "code" | "sku" => Some(Self::Code),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// The normalized product list for one catalog load. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

impl Catalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    /// Normalize a raw table into a catalog.
    pub fn from_table(table: &RawTable, normalizer: &RowNormalizer) -> Self {
        let products = normalizer.normalize(table);
        log::info!("Catalog loaded with {} products", products.len());
        Self::new(products)
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in the requested order. Sorting is stable and case-insensitive.
    pub fn sorted(&self, order: SortOrder) -> Vec<&ProductRecord> {
        let mut products: Vec<&ProductRecord> = self.products.iter().collect();
        let key = |p: &ProductRecord| -> String {
            match order {
                SortOrder::Sheet => String::new(),
                SortOrder::Name => p.display_name().to_lowercase(),
                SortOrder::Code => p.code.to_lowercase(),
                SortOrder::Category => p.category.to_lowercase(),
            }
        };
        if order != SortOrder::Sheet {
            products.sort_by_key(|p| key(p));
        }
        products
    }

    /// Products whose name, code, description or category contain the query.
    pub fn search(&self, query: &str) -> Vec<&ProductRecord> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|p| {
                [&p.name, &p.code, &p.description, &p.category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Distinct categories in first-seen order, blank shown as `Other`.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for product in &self.products {
            let category = crate::deck::category_label(&product.category).to_string();
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    /// Resolve selection keys to products, keeping the order of `keys`.
    ///
    /// Each key matches a code first, then a name, case-insensitively.
    /// Unknown keys are returned separately.
    pub fn select<S: AsRef<str>>(&self, keys: &[S]) -> (Vec<ProductRecord>, Vec<String>) {
        let mut selected = Vec::new();
        let mut missing = Vec::new();

        for key in keys {
            let key = key.as_ref().trim();
            let wanted = key.to_lowercase();
            let found = self
                .products
                .iter()
                .find(|p| !p.code.is_empty() && p.code.to_lowercase() == wanted)
                .or_else(|| {
                    self.products
                        .iter()
                        .find(|p| !p.name.is_empty() && p.name.to_lowercase() == wanted)
                });
            match found {
                Some(product) => selected.push(product.clone()),
                None => missing.push(key.to_string()),
            }
        }

        (selected, missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, name: &str, category: &str) -> ProductRecord {
        ProductRecord {
            code: code.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product("C2", "beta lamp", "Lighting"),
            product("C1", "Alpha chair", ""),
            product("C3", "Gamma desk", "Furniture"),
        ])
    }

    #[test]
    fn test_parse_values_object() {
        let table = parse_sheet_payload(br#"{"range":"A1:C2","values":[["SKU","Name"],["A1",12.5,null,true]]}"#)
            .unwrap();
        assert_eq!(table[0], vec!["SKU", "Name"]);
        assert_eq!(table[1], vec!["A1", "12.5", "", "true"]);
    }

    #[test]
    fn test_parse_bare_array_and_missing_values() {
        let table = parse_sheet_payload(br#"[["SKU"],["A1"]]"#).unwrap();
        assert_eq!(table.len(), 2);

        let table = parse_sheet_payload(br#"{"range":"A1:C2"}"#).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_rejects_scalar() {
        assert!(matches!(
            parse_sheet_payload(b"42"),
            Err(Error::InvalidSheet(_))
        ));
        assert!(matches!(parse_sheet_payload(b"{not json"), Err(Error::JsonError(_))));
    }

    #[test]
    fn test_sorted_orders() {
        let catalog = catalog();
        let codes = |order| -> Vec<String> {
            catalog.sorted(order).iter().map(|p| p.code.clone()).collect()
        };
        assert_eq!(codes(SortOrder::Sheet), vec!["C2", "C1", "C3"]);
        assert_eq!(codes(SortOrder::Name), vec!["C1", "C2", "C3"]);
        assert_eq!(codes(SortOrder::Code), vec!["C1", "C2", "C3"]);
        assert_eq!(codes(SortOrder::Category), vec!["C1", "C3", "C2"]);
    }

    #[test]
    fn test_search() {
        let catalog = catalog();
        let hits: Vec<&str> = catalog.search("LAMP").iter().map(|p| p.code.as_str()).collect();
        assert_eq!(hits, vec!["C2"]);
        assert_eq!(catalog.search("  ").len(), 3);
    }

    #[test]
    fn test_categories_first_seen() {
        assert_eq!(catalog().categories(), vec!["Lighting", "Other", "Furniture"]);
    }

    #[test]
    fn test_select_keeps_requested_order() {
        let (selected, missing) = catalog().select(&["c3", "Alpha Chair", "nope"]);
        let codes: Vec<&str> = selected.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["C3", "C1"]);
        assert_eq!(missing, vec!["nope"]);
    }

    #[test]
    fn test_sort_order_from_name() {
        assert_eq!(SortOrder::from_name("SKU"), Some(SortOrder::Code));
        assert_eq!(SortOrder::from_name("random"), None);
    }
}
