//! Fixed catalog of non-prescription products.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, FieldErrors},
    wizard::{Dimensions, NonPrescriptionItem},
};

struct Product {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    price: f64,
    weight: f64,
    dimensions: (f64, f64, f64),
    image: &'static str,
}

const PRODUCTS: &[Product] = &[
    Product {
        id: "np-001",
        name: "Vitamin D3",
        category: "Vitamins",
        price: 9.99,
        weight: 50.0,
        dimensions: (5.0, 5.0, 10.0),
        image: "Vitamin+D3",
    },
    Product {
        id: "np-002",
        name: "Pain Relief Tablets",
        category: "Pain Management",
        price: 5.49,
        weight: 30.0,
        dimensions: (8.0, 4.0, 2.0),
        image: "Pain+Relief",
    },
    Product {
        id: "np-003",
        name: "Cold & Flu Relief",
        category: "Cold & Flu",
        price: 7.99,
        weight: 80.0,
        dimensions: (12.0, 6.0, 3.0),
        image: "Cold+%26+Flu",
    },
    Product {
        id: "np-004",
        name: "Sunscreen SPF 50",
        category: "Skin Care",
        price: 12.99,
        weight: 150.0,
        dimensions: (15.0, 5.0, 3.0),
        image: "Sunscreen",
    },
    Product {
        id: "np-005",
        name: "First Aid Kit",
        category: "First Aid",
        price: 15.99,
        weight: 300.0,
        dimensions: (20.0, 15.0, 5.0),
        image: "First+Aid+Kit",
    },
    Product {
        id: "np-006",
        name: "Multivitamin Complex",
        category: "Vitamins",
        price: 11.49,
        weight: 100.0,
        dimensions: (10.0, 6.0, 6.0),
        image: "Multivitamin",
    },
];

impl Product {
    fn to_item(&self) -> NonPrescriptionItem {
        let (length, width, height) = self.dimensions;
        NonPrescriptionItem {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category.to_string(),
            price: self.price,
            weight: self.weight,
            dimensions: Dimensions::new(length, width, height),
            description: None,
            image_url: Some(format!("https://placehold.co/100x100?text={}", self.image)),
        }
    }
}

pub fn products() -> Vec<NonPrescriptionItem> {
    PRODUCTS.iter().map(Product::to_item).collect()
}

pub fn find(id: &str) -> Option<NonPrescriptionItem> {
    PRODUCTS.iter().find(|p| p.id == id).map(Product::to_item)
}

/// Categories in catalog order, without duplicates.
pub fn categories() -> Vec<&'static str> {
    let mut categories = Vec::new();
    for product in PRODUCTS {
        if !categories.contains(&product.category) {
            categories.push(product.category);
        }
    }
    categories
}

/// Whole catalog for `None`, otherwise only the given category.
pub fn by_category(category: Option<&str>) -> Vec<NonPrescriptionItem> {
    PRODUCTS
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .map(Product::to_item)
        .collect()
}

/// Largest quantity of a single product one order may contain.
pub const MAX_QUANTITY: u32 = 99;

/// Product quantities picked on the catalog screen.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    #[serde(default)]
    pub quantities: BTreeMap<String, u32>,
}

impl Cart {
    pub fn count(&self) -> u32 {
        self.quantities
            .values()
            .fold(0, |count, quantity| count.saturating_add(*quantity))
    }

    /// Price of everything in the cart; unknown ids count for nothing.
    pub fn total(&self) -> f64 {
        self.quantities
            .iter()
            .filter_map(|(id, quantity)| find(id).map(|item| item.price * f64::from(*quantity)))
            .sum()
    }

    /// One catalog item per unit, in id order.
    pub fn into_items(self) -> Result<Vec<NonPrescriptionItem>, Error> {
        let mut errors = FieldErrors::new();
        let mut products = Vec::new();

        for (id, quantity) in &self.quantities {
            match find(id) {
                Some(_) if *quantity > MAX_QUANTITY => errors.insert(
                    format!("quantities.{id}"),
                    format!("At most {MAX_QUANTITY} per product"),
                ),
                Some(item) => products.push((item, *quantity)),
                None => errors.insert(format!("quantities.{id}"), "Unknown product"),
            }
        }
        errors.into_result()?;

        let mut items = Vec::with_capacity(self.count() as usize);
        for (item, quantity) in products {
            items.extend(std::iter::repeat(item).take(quantity as usize));
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_products_in_five_categories() {
        assert_eq!(products().len(), 6);
        assert_eq!(
            categories(),
            vec!["Vitamins", "Pain Management", "Cold & Flu", "Skin Care", "First Aid"]
        );
    }

    #[test]
    fn filters_by_category() {
        let vitamins = by_category(Some("Vitamins"));
        let ids: Vec<&str> = vitamins.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["np-001", "np-006"]);
        assert_eq!(by_category(None).len(), 6);
        assert!(by_category(Some("Garden")).is_empty());
    }

    fn cart(quantities: &[(&str, u32)]) -> Cart {
        Cart {
            quantities: quantities
                .iter()
                .map(|(id, quantity)| (id.to_string(), *quantity))
                .collect(),
        }
    }

    #[test]
    fn cart_counts_units_and_prices() {
        let cart = cart(&[("np-001", 2), ("np-404", 1)]);

        assert_eq!(cart.count(), 3);
        assert!((cart.total() - 19.98).abs() < 1e-9);
    }

    #[test]
    fn cart_expands_into_items() {
        let items = cart(&[("np-005", 1), ("np-003", 2)]).into_items().unwrap();
        let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["np-003", "np-003", "np-005"]);
    }

    #[test]
    fn unknown_products_are_rejected() {
        match cart(&[("np-999", 1)]).into_items() {
            Err(Error::Validation { fields }) => assert!(fields.contains("quantities.np-999")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn quantities_are_capped_per_product() {
        assert_eq!(
            cart(&[("np-002", MAX_QUANTITY)]).into_items().unwrap().len(),
            MAX_QUANTITY as usize
        );

        let oversized = cart(&[("np-001", u32::MAX), ("np-002", 1)]);
        assert_eq!(oversized.count(), u32::MAX);
        match oversized.into_items() {
            Err(Error::Validation { fields }) => {
                assert!(fields.contains("quantities.np-001"));
                assert_eq!(fields.len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
