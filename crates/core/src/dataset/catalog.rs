use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoPurchase {
    pub item: String,
    pub count: u32,
}

impl CoPurchase {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self { item: item.into(), count }
    }
}

/// One catalog row: the base product, its total purchase count, and its co-purchase
/// counts in dataset order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub total_purchases: u32,
    #[serde(default)]
    pub co_purchases: Vec<CoPurchase>,
}

impl ProductRecord {
    pub fn new(
        name: impl Into<String>,
        total_purchases: u32,
        co_purchases: impl IntoIterator<Item = (&'static str, u32)>,
    ) -> Self {
        Self {
            name: name.into(),
            total_purchases,
            co_purchases: co_purchases
                .into_iter()
                .map(|(item, count)| CoPurchase::new(item, count))
                .collect(),
        }
    }
}

/// Co-purchase table plus total-purchase denominators, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalog {
    products: Vec<ProductRecord>,
}

impl ProductCatalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    pub fn get(&self, name: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|record| record.name == name)
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|record| record.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

pub(crate) fn builtin_catalog() -> ProductCatalog {
    ProductCatalog::new(vec![
        ProductRecord::new(
            "Laptop",
            165,
            [
                ("Mouse", 45),
                ("Keyboard", 37),
                ("USB Cable", 28),
                ("Monitor", 22),
                ("Phone Case", 5),
            ],
        ),
        ProductRecord::new(
            "Smartphone",
            210,
            [
                ("Phone Case", 78),
                ("Screen Protector", 64),
                ("Charger", 41),
                ("Headphones", 33),
                ("USB Cable", 19),
            ],
        ),
        ProductRecord::new(
            "Headphones",
            120,
            [("Phone Case", 18), ("Smartphone", 33), ("Carrying Case", 27), ("USB Cable", 12)],
        ),
        ProductRecord::new(
            "Tablet",
            140,
            [("Stylus", 30), ("Keyboard", 30), ("Tablet Case", 26), ("Charger", 14)],
        ),
        ProductRecord::new(
            "Camera",
            90,
            [("Memory Card", 52), ("Tripod", 24), ("Camera Bag", 24), ("Lens Cleaner", 9)],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::{builtin_catalog, ProductCatalog, ProductRecord};

    #[test]
    fn builtin_catalog_keeps_laptop_row_in_dataset_order() {
        let catalog = builtin_catalog();
        let laptop = catalog.get("Laptop").expect("laptop row");

        assert_eq!(laptop.total_purchases, 165);
        let items: Vec<_> = laptop.co_purchases.iter().map(|row| row.item.as_str()).collect();
        assert_eq!(items, ["Mouse", "Keyboard", "USB Cable", "Monitor", "Phone Case"]);
    }

    #[test]
    fn co_purchase_sum_is_independent_of_total() {
        let catalog = builtin_catalog();
        for record in catalog.products() {
            assert!(record.total_purchases > 0, "{} needs a denominator", record.name);
            assert!(record.co_purchases.iter().all(|row| row.count <= record.total_purchases));
        }
        let laptop = catalog.get("Laptop").expect("laptop row");
        let co_purchased: u32 = laptop.co_purchases.iter().map(|row| row.count).sum();
        assert_ne!(co_purchased, laptop.total_purchases);
    }

    #[test]
    fn lookup_is_exact_match() {
        let catalog = ProductCatalog::new(vec![ProductRecord::new("Laptop", 10, [])]);

        assert!(catalog.get("Laptop").is_some());
        assert!(catalog.get("laptop").is_none());
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["Laptop"]);
    }
}
