//! Entity/DTO mapping. Pure functions, no I/O.

use std::collections::BTreeSet;

use crate::dto::{CategoryDto, ProductDto};
use crate::models::{Category, CategoryDraft, CategoryId, CategoryRef, Product, ProductDraft};

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name.clone(),
        }
    }
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            img_url: product.img_url.clone(),
            date: Some(product.date),
            categories: product.categories.iter().map(CategoryDto::from).collect(),
        }
    }
}

/// Resolves every DTO category id through `resolve`, ignoring names.
///
/// DTOs without an id are skipped; validation rejects them before this point.
pub fn category_refs<F>(categories: &[CategoryDto], mut resolve: F) -> BTreeSet<CategoryRef>
where
    F: FnMut(CategoryId) -> CategoryRef,
{
    categories
        .iter()
        .filter_map(|c| c.id)
        .map(&mut resolve)
        .collect()
}

impl ProductDraft {
    /// Copies scalar fields from `dto` and replaces the category links with `refs`.
    ///
    /// The id and creation date are left as they are.
    pub fn apply(&mut self, dto: &ProductDto, refs: BTreeSet<CategoryRef>) {
        self.name = dto.name.clone();
        self.description = dto.description.clone();
        self.price = dto.price;
        self.img_url = dto.img_url.clone();
        self.categories = refs;
    }
}

impl CategoryDraft {
    pub fn apply(&mut self, dto: &CategoryDto) {
        self.name = dto.name.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn electronics() -> Category {
        Category {
            id: 1,
            name: "Electronics".to_string(),
        }
    }

    fn phone() -> Product {
        Product {
            id: 1,
            name: "Phone".to_string(),
            description: "Good Phone".to_string(),
            price: 800.0,
            img_url: "https://img.com/img.png".to_string(),
            date: Utc.with_ymd_and_hms(2020, 10, 20, 3, 0, 0).unwrap(),
            categories: vec![electronics()],
        }
    }

    #[test]
    fn test_product_to_dto_includes_categories() {
        let dto = ProductDto::from(&phone());

        assert_eq!(dto.id, Some(1));
        assert_eq!(dto.name, "Phone");
        assert_eq!(dto.price, 800.0);
        assert_eq!(dto.date, Some(phone().date));
        assert_eq!(
            dto.categories,
            vec![CategoryDto {
                id: Some(1),
                name: "Electronics".to_string()
            }]
        );
    }

    #[test]
    fn test_category_refs_ignore_names_and_duplicates() {
        let dtos = vec![
            CategoryDto {
                id: Some(2),
                name: "forged name".to_string(),
            },
            CategoryDto {
                id: Some(1),
                name: String::new(),
            },
            CategoryDto {
                id: Some(2),
                name: String::new(),
            },
        ];

        let mut resolved = Vec::new();
        let refs = category_refs(&dtos, |id| {
            resolved.push(id);
            CategoryRef(id)
        });

        assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec![CategoryRef(1), CategoryRef(2)]);
        assert_eq!(resolved, vec![2, 1, 2]);
    }

    #[test]
    fn test_apply_replaces_links_but_keeps_date() {
        let original_date = phone().date;
        let mut draft = phone().into_draft();
        let dto = ProductDto {
            name: "Phone X".to_string(),
            price: 999.0,
            date: Some(Utc::now()),
            ..ProductDto::default()
        };

        draft.apply(&dto, BTreeSet::from([CategoryRef(3)]));

        assert_eq!(draft.id, Some(1));
        assert_eq!(draft.name, "Phone X");
        assert_eq!(draft.price, 999.0);
        assert_eq!(draft.date, original_date);
        assert_eq!(draft.categories, BTreeSet::from([CategoryRef(3)]));
    }

    #[test]
    fn test_category_draft_apply() {
        let mut draft = CategoryDraft::from(electronics());
        draft.apply(&CategoryDto {
            id: Some(99),
            name: "Gadgets".to_string(),
        });

        assert_eq!(draft.id, Some(1));
        assert_eq!(draft.name, "Gadgets");
    }
}
